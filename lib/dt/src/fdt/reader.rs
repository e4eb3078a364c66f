use core::{ops::Range, str};

use crate::{
    fdt::{FdtHeader, FdtNodeType},
    node::{DeviceTree, Node},
    prop::{Property, PropertyError},
};
use alloc::{vec, vec::Vec};
use utils::{
    endian::{BigEndian32, BigEndian64, EndianData},
    num::AlignableTo,
};

/// Reader over a flattened device-tree blob.
///
/// Every access is bounds-checked against the blob, so a truncated or
/// corrupt blob yields an [FdtError] instead of reading past its end.
pub struct FdtReader<'a> {
    blob: &'a [u8],
    cursor: usize,
    nodes: Vec<Node>,
}

/// Basic Reader Functions
impl<'a> FdtReader<'a> {
    /// Read a 32-bit big-endian word at the cursor without advancing.
    #[inline(always)]
    fn peek_u32(&self) -> Result<u32, FdtError> {
        self.blob
            .get(self.cursor..)
            .and_then(BigEndian32::from_bytes)
            .map(|w| w.value())
            .ok_or(FdtError::Truncated {
                cursor: self.cursor,
            })
    }

    /// Read a 32-bit big-endian word and advance the cursor by 4 bytes.
    #[inline(always)]
    fn read_u32(&mut self) -> Result<u32, FdtError> {
        let res = self.peek_u32()?;
        self.cursor += 4;
        Ok(res)
    }

    /// Read `len` bytes and move the cursor to the next 4-byte aligned position.
    fn readbytes_aligned(&mut self, len: usize) -> Result<&'a [u8], FdtError> {
        let start = self.cursor;
        let blob: &'a [u8] = self.blob;
        let res = start
            .checked_add(len)
            .and_then(|end| blob.get(start..end))
            .ok_or(FdtError::Truncated { cursor: start })?;
        self.cursor = (start + len).align_up(4);
        Ok(res)
    }

    /// Advance past zero words and NOPs to the next meaningful token.
    fn skip(&mut self) -> Result<(), FdtError> {
        loop {
            let p = self.peek_u32()?;
            if p != 0 && p != FdtNodeType::FDT_NOP.bits() {
                return Ok(());
            }
            self.cursor += 4;
        }
    }

    /// Read a NUL-terminated string and move the cursor to the next aligned position.
    fn readstr_aligned(&mut self) -> Result<&'a str, FdtError> {
        let start = self.cursor;
        let blob: &'a [u8] = self.blob;
        let rest = blob.get(start..).ok_or(FdtError::Truncated { cursor: start })?;
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(FdtError::Truncated { cursor: start })?;
        self.cursor = (start + len + 1).align_up(4);
        str::from_utf8(&rest[..len]).map_err(|_| FdtError::InvalidString { offset: start })
    }

    /// Read a tag word and verify it equals `supposed`.
    fn read_and_check(&mut self, supposed: FdtNodeType) -> Result<(), FdtError> {
        let node_type = self.read_u32()?;
        if node_type != supposed.bits() {
            return Err(FdtError::InvalidNodeType {
                node_type,
                cursor: self.cursor,
            });
        }
        Ok(())
    }
}

impl<'a> FdtReader<'a> {
    /// Expected FDT magic number (0xd00dfeed).
    pub const FDT_MAGIC: u32 = 0xd00dfeed;
    /// The FDT version this parser targets.
    pub const FDT_VERSION: u32 = 17;
    /// The last compatible FDT version accepted by this parser.
    pub const LAST_COMP_VERSION: u32 = 16;

    pub fn new(blob: &'a [u8]) -> FdtReader<'a> {
        FdtReader {
            blob,
            cursor: 0,
            nodes: vec![],
        }
    }

    /// Validate the FDT header (magic number, size and compatible version range).
    pub fn validate(&self) -> Result<FdtHeader, FdtError> {
        let header = FdtHeader::parse(self.blob).ok_or(FdtError::Truncated { cursor: 0 })?;

        if header.magic != Self::FDT_MAGIC {
            return Err(FdtError::InvalidMagic {
                magic: header.magic,
            });
        }
        if header.version < Self::LAST_COMP_VERSION
            || header.last_comp_version > Self::FDT_VERSION
        {
            return Err(FdtError::IncompatibleVersion {
                version: header.version,
            });
        }
        if header.totalsize as usize > self.blob.len() {
            return Err(FdtError::Truncated {
                cursor: self.blob.len(),
            });
        }
        Ok(header)
    }

    /// Read a null-terminated string from the FDT string table at `offset`.
    fn get_string(&self, header: &FdtHeader, offset: usize) -> Result<&'a str, FdtError> {
        let blob: &'a [u8] = self.blob;
        let start = (header.off_dt_strings as usize).saturating_add(offset);
        let rest = blob.get(start..).ok_or(FdtError::Truncated { cursor: start })?;
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(FdtError::Truncated { cursor: start })?;
        str::from_utf8(&rest[..len]).map_err(|_| FdtError::InvalidString { offset: start })
    }

    /// Read consecutive property entries; stops at the first non-`FDT_PROP` tag.
    fn read_props(&mut self, header: &FdtHeader) -> Result<Vec<Property>, FdtError> {
        let mut res = Vec::<Property>::new();
        loop {
            self.skip()?;
            if self.peek_u32()? != FdtNodeType::FDT_PROP.bits() {
                break Ok(res);
            }
            self.read_u32()?;
            let len = self.read_u32()? as usize;
            let name_offset = self.read_u32()? as usize;
            let name = self.get_string(header, name_offset)?;
            let data = self.readbytes_aligned(len)?;
            res.push(Property::new(name, data));
        }
    }

    /// Parse a single node (name, properties and child nodes) without setting its parent.
    fn read_node(&mut self, header: &FdtHeader) -> Result<usize, FdtError> {
        self.skip()?;
        self.read_and_check(FdtNodeType::FDT_BEGIN_NODE)?;
        let full_name = self.readstr_aligned()?;
        // The node is pushed before its children, so its id is known here.
        let id = self.nodes.len();
        let mut node = Node::new(id, 0, full_name, vec![]);
        self.nodes.push(Node::new(id, 0, "", vec![]));
        node.props = self.read_props(header)?;
        loop {
            self.skip()?;
            let nodetype = self.peek_u32()?;
            if nodetype == FdtNodeType::FDT_BEGIN_NODE.bits() {
                let child = self.read_node(header)?;
                self.nodes[child].parent_id = id;
                node.children.push(child);
            } else if nodetype == FdtNodeType::FDT_END_NODE.bits() {
                self.cursor += 4;
                break;
            } else {
                return Err(FdtError::InvalidNodeType {
                    node_type: nodetype,
                    cursor: self.cursor,
                });
            }
        }
        self.nodes[id] = node;
        Ok(id)
    }

    /// Get the memory reservation map, terminated by an all-zero entry.
    fn get_mem_rsv_map(&self, header: &FdtHeader) -> Result<Vec<Range<usize>>, FdtError> {
        let mut res = Vec::new();
        let mut offset = header.off_mem_rsvmap as usize;
        loop {
            let entry = self
                .blob
                .get(offset..)
                .ok_or(FdtError::Truncated { cursor: offset })?;
            let addr = BigEndian64::from_bytes(entry).ok_or(FdtError::Truncated { cursor: offset })?;
            let size = entry
                .get(8..)
                .and_then(BigEndian64::from_bytes)
                .ok_or(FdtError::Truncated { cursor: offset })?;
            let (addr, size) = (addr.value(), size.value());
            if addr == 0 && size == 0 {
                break Ok(res);
            }
            let region = addr
                .checked_add(size)
                .and_then(|end| Some(usize::try_from(addr).ok()?..usize::try_from(end).ok()?))
                .ok_or(FdtError::InvalidReservation { offset })?;
            res.push(region);
            offset += 16;
        }
    }

    fn read_internal(&mut self) -> Result<DeviceTree, FdtError> {
        let header = self.validate()?;
        self.cursor = header.off_dt_struct as usize;
        let root_id = self.read_node(&header)?;
        self.nodes[root_id].parent_id = root_id;
        self.skip()?;
        self.read_and_check(FdtNodeType::FDT_END)?;

        let mem_rsv_map = self.get_mem_rsv_map(&header)?;
        let nodes = core::mem::take(&mut self.nodes);
        Ok(DeviceTree::from_nodes(root_id, nodes, mem_rsv_map)?)
    }

    /// Parse the entire blob into a [DeviceTree].
    ///
    /// All strings and byte-array data are **copied** into the tree, so the blob can be dropped afterwards.
    pub fn read(&mut self) -> Result<DeviceTree, FdtError> {
        let res = self.read_internal();
        if res.is_err() {
            self.cursor = 0;
            self.nodes.clear();
        }
        res
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdtError {
    InvalidNodeType { node_type: u32, cursor: usize },
    InvalidMagic { magic: u32 },
    IncompatibleVersion { version: u32 },
    Truncated { cursor: usize },
    InvalidString { offset: usize },
    /// A memory reservation entry that runs past the end of the address space.
    InvalidReservation { offset: usize },
    Tree(PropertyError),
}

impl From<PropertyError> for FdtError {
    fn from(value: PropertyError) -> Self {
        FdtError::Tree(value)
    }
}
