//! Programmatic construction of a [DeviceTree], for board code that does not
//! boot with a blob and for tests.
use crate::{
    node::{DeviceTree, Node},
    prop::{Property, PropertyError},
};
use alloc::{vec, vec::Vec};

pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    /// Start a tree holding only the root node (id 0).
    pub fn new() -> TreeBuilder {
        TreeBuilder {
            nodes: vec![Node::new(0, 0, "", vec![])],
        }
    }

    /// Append a child under `parent` and return its node id.
    pub fn add_node(&mut self, parent: usize, full_name: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, parent, full_name, vec![]));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn prop(&mut self, node: usize, prop: Property) -> &mut Self {
        let props = &mut self.nodes[node].props;
        props.retain(|p| p.name != prop.name);
        props.push(prop);
        self
    }

    pub fn remove_prop(&mut self, node: usize, name: &str) -> &mut Self {
        self.nodes[node].props.retain(|p| p.name.as_ref() != name);
        self
    }

    pub fn prop_u8(&mut self, node: usize, name: &str, value: u8) -> &mut Self {
        self.prop(node, Property::new(name, [value]))
    }

    pub fn prop_u32(&mut self, node: usize, name: &str, value: u32) -> &mut Self {
        self.prop(node, Property::new(name, value.to_be_bytes()))
    }

    pub fn prop_cells(&mut self, node: usize, name: &str, cells: &[u32]) -> &mut Self {
        let data: Vec<u8> = cells.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.prop(node, Property::new(name, data))
    }

    pub fn prop_str_list(&mut self, node: usize, name: &str, values: &[&str]) -> &mut Self {
        let mut data = Vec::new();
        for value in values {
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        self.prop(node, Property::new(name, data))
    }

    pub fn phandle(&mut self, node: usize, phandle: u32) -> &mut Self {
        self.prop_u32(node, "phandle", phandle)
    }

    /// Finish the tree; fails if two nodes share a phandle.
    pub fn build(self) -> Result<DeviceTree, PropertyError> {
        DeviceTree::from_nodes(0, self.nodes, vec![])
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicated_phandles_are_rejected() {
        let mut builder = TreeBuilder::new();
        let a = builder.add_node(0, "a");
        let b = builder.add_node(0, "b");
        builder.phandle(a, 5).phandle(b, 5);
        assert_eq!(
            builder.build().err(),
            Some(PropertyError::DuplicatedHandle { phandle: 5 })
        );
    }

    #[test]
    fn later_property_replaces_earlier() {
        let mut builder = TreeBuilder::new();
        let a = builder.add_node(0, "a");
        builder.prop_u32(a, "rstctrl_offs", 1).prop_u32(a, "rstctrl_offs", 2);
        let tree = builder.build().unwrap();
        let node = tree.get_node("/a").unwrap();
        assert_eq!(node.props.len(), 1);
        assert_eq!(tree.get_property(node, "rstctrl_offs").unwrap().value_as_u32(), Ok(2));
    }

    #[test]
    fn removed_property_is_gone() {
        let mut builder = TreeBuilder::new();
        let a = builder.add_node(0, "a");
        builder.phandle(a, 3).remove_prop(a, "phandle");
        let tree = builder.build().unwrap();
        assert!(tree.get_node_by_phandle(3).is_none());
    }
}
