use crate::prop::{Property, PropertyError};
use alloc::{boxed::Box, collections::btree_map::BTreeMap, string::String, vec, vec::Vec};
use core::ops::Range;

pub struct DeviceTree {
    pub root_id: usize,
    pub container: Vec<Node>,
    pub mem_rsv_map: Vec<Range<usize>>,
    pub phandle_map: BTreeMap<u32, usize>,
}

pub struct Node {
    pub node_id: usize,
    pub parent_id: usize,
    pub full_name: Box<str>,
    pub node_name: Box<str>,
    pub unit_addr: Box<str>,
    pub children: Vec<usize>,
    pub props: Vec<Property>,
}

impl Node {
    /// Create a detached node; `full_name` is split into name and unit address at '@'.
    pub fn new(node_id: usize, parent_id: usize, full_name: &str, props: Vec<Property>) -> Node {
        let (node_name, unit_addr) = full_name.split_once('@').unwrap_or((full_name, ""));
        Node {
            node_id,
            parent_id,
            full_name: Box::from(full_name),
            node_name: Box::from(node_name),
            unit_addr: Box::from(unit_addr),
            children: vec![],
            props,
        }
    }
}

/// A phandle reference with its argument cells, as found in properties such
/// as `resets = <&provider 1>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhandleArgs {
    /// Node the phandle points to.
    pub node_id: usize,
    pub args: Vec<u32>,
}

impl DeviceTree {
    /// Assemble a tree from an already linked node arena and index every phandle.
    pub fn from_nodes(
        root_id: usize,
        container: Vec<Node>,
        mem_rsv_map: Vec<Range<usize>>,
    ) -> Result<DeviceTree, PropertyError> {
        let mut tree = DeviceTree {
            root_id,
            container,
            mem_rsv_map,
            phandle_map: BTreeMap::new(),
        };
        for node in &tree.container {
            if let Some(phandle) = tree.get_phandle(node) {
                if tree.phandle_map.insert(phandle, node.node_id).is_some() {
                    return Err(PropertyError::DuplicatedHandle { phandle });
                }
            }
        }
        Ok(tree)
    }
    pub fn is_root(&self, node: &Node) -> bool {
        node.node_id == self.root_id
    }
    fn full_path(&self, node: &Node) -> String {
        if self.is_root(node) {
            String::from("")
        } else {
            self.full_path(self.get_parent(node)) + "/" + node.full_name.as_ref()
        }
    }
    pub fn get_full_path(&self, node: &Node) -> Box<str> {
        if self.is_root(node) {
            return Box::from("/");
        }
        self.full_path(node).into_boxed_str()
    }
    pub fn get_root(&self) -> &Node {
        &self.container[self.root_id]
    }
    pub fn get_node_by_id(&self, node_id: usize) -> Option<&Node> {
        self.container.get(node_id)
    }
    pub fn get_parent(&self, node: &Node) -> &Node {
        &self.container[node.parent_id]
    }
    pub fn get_children<'b>(&'b self, node: &Node) -> impl Iterator<Item = &'b Node> {
        node.children.iter().map(|x| &self.container[*x])
    }
    /// First direct child whose name (with or without unit address) equals `name`.
    pub fn get_child_by_name<'b>(&'b self, node: &Node, name: impl AsRef<str>) -> Option<&'b Node> {
        let name = name.as_ref();
        self.get_children(node)
            .find(|child| child.full_name.as_ref() == name || child.node_name.as_ref() == name)
    }
    pub fn get_property<'b>(&self, node: &'b Node, name: impl AsRef<str>) -> Option<&'b Property> {
        let name = name.as_ref();
        node.props.iter().find(|prop| prop.name.as_ref() == name)
    }
    /// The node's phandle, from `phandle` or the legacy `linux,phandle`.
    pub fn get_phandle(&self, node: &Node) -> Option<u32> {
        self.get_property(node, "phandle")
            .or_else(|| self.get_property(node, "linux,phandle"))
            .and_then(|prop| prop.value_as_u32().ok())
    }
    pub fn get_node_by_phandle(&self, phandle: u32) -> Option<&Node> {
        self.phandle_map
            .get(&phandle)
            .and_then(|id| self.container.get(*id))
    }
    pub fn get_node(&self, path: impl AsRef<str>) -> Option<&Node> {
        let mut node = self.get_root();
        for section in path.as_ref().split('/') {
            if section.trim().is_empty() {
                continue;
            }
            node = self
                .get_children(node)
                .find(|subnode| subnode.full_name.as_ref() == section)?;
        }
        Some(node)
    }
    /// Collect every node matching `path`, where a section may be `*` or a
    /// node name without its unit address.
    pub fn get_nodes(&self, path: impl AsRef<str>) -> Vec<&Node> {
        let path: Vec<&str> = path.as_ref().split('/').collect();
        self.get_sub_nodes(self.get_root(), &path, 0)
    }
    fn get_sub_nodes<'b>(&'b self, node: &'b Node, path: &[&str], mut cursor: usize) -> Vec<&'b Node> {
        while cursor < path.len() && path[cursor].trim().is_empty() {
            cursor += 1;
        }
        if cursor >= path.len() {
            return vec![node];
        }
        let sec = path[cursor];
        self.get_children(node)
            .filter(|child| {
                sec == "*" || child.full_name.as_ref() == sec || child.node_name.as_ref() == sec
            })
            .flat_map(|child| self.get_sub_nodes(child, path, cursor + 1))
            .collect()
    }
    pub fn get_reg_value(&self, node: &Node) -> Result<Vec<Range<usize>>, PropertyError> {
        let mut size_cel = 1;
        let mut addr_cel = 2;
        if !self.is_root(node) {
            let parent = self.get_parent(node);
            if let Some(prop) = self.get_property(parent, "#address-cells") {
                addr_cel = prop.value_as_u32()? as usize;
            }
            if let Some(prop) = self.get_property(parent, "#size-cells") {
                size_cel = prop.value_as_u32()? as usize;
            }
        }
        let reg = self
            .get_property(node, "reg")
            .ok_or(PropertyError::PropNotFound)?
            .value_as_cells()?;
        let width = size_cel + addr_cel;
        if width == 0 || reg.len() % width != 0 {
            return Err(PropertyError::InvalidPropFormat);
        }
        let fold = |cells: &[u32]| {
            let value = cells.iter().fold(0u64, |acc, c| (acc << 32) | *c as u64);
            usize::try_from(value).map_err(|_| PropertyError::InvalidPropFormat)
        };
        reg.chunks_exact(width)
            .map(|entry| -> Result<Range<usize>, PropertyError> {
                let addr = fold(&entry[..addr_cel])?;
                let size = fold(&entry[addr_cel..])?;
                // A region may not wrap past the end of the address space.
                let end = addr.checked_add(size).ok_or(PropertyError::InvalidPropFormat)?;
                Ok(addr..end)
            })
            .collect()
    }
    /// Decode the `index`-th phandle reference of `list_name`, with the
    /// argument count taken from the referenced node's `cells_name` property.
    pub fn parse_phandle_with_args(
        &self,
        node: &Node,
        list_name: &str,
        cells_name: &str,
        index: usize,
    ) -> Result<PhandleArgs, PropertyError> {
        let list = self
            .get_property(node, list_name)
            .ok_or(PropertyError::PropNotFound)?
            .value_as_cells()?;
        let mut cursor = 0;
        let mut current = 0;
        while cursor < list.len() {
            let target = self
                .get_node_by_phandle(list[cursor])
                .ok_or(PropertyError::DanglingHandle)?;
            let count = self
                .get_property(target, cells_name)
                .ok_or(PropertyError::PropNotFound)?
                .value_as_u32()? as usize;
            let args = list
                .get(cursor + 1..cursor + 1 + count)
                .ok_or(PropertyError::InvalidPropFormat)?;
            if current == index {
                return Ok(PhandleArgs {
                    node_id: target.node_id,
                    args: args.to_vec(),
                });
            }
            cursor += 1 + count;
            current += 1;
        }
        Err(PropertyError::PropNotFound)
    }
    /// Position of `name` inside a string-list property such as `reset-names`.
    pub fn get_string_index(&self, node: &Node, list_name: &str, name: &str) -> Result<usize, PropertyError> {
        self.get_property(node, list_name)
            .ok_or(PropertyError::PropNotFound)?
            .value_as_strlist()?
            .iter()
            .position(|s| *s == name)
            .ok_or(PropertyError::PropNotFound)
    }
}
