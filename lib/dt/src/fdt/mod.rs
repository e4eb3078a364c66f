//! This module provides functionalities to resolve a flattened device tree

use bitflags::bitflags;
use utils::endian::{BigEndian32, EndianData};

pub mod reader;

/// Flattened Device Tree header, decoded to native endianness.
#[derive(Debug, Clone, Copy)]
pub struct FdtHeader {
    pub magic: u32,
    pub totalsize: u32,
    pub off_dt_struct: u32,
    pub off_dt_strings: u32,
    pub off_mem_rsvmap: u32,
    pub version: u32,
    pub last_comp_version: u32,
    pub boot_cpuid_phys: u32,
    pub size_dt_strings: u32,
    pub size_dt_struct: u32,
}

impl FdtHeader {
    /// Size of the on-disk header in bytes.
    pub const SIZE: usize = 40;

    /// Decode the header from the start of `blob`; `None` if the blob is too short.
    pub fn parse(blob: &[u8]) -> Option<FdtHeader> {
        let word = |idx: usize| BigEndian32::from_bytes(blob.get(idx * 4..)?).map(|w| w.value());
        Some(FdtHeader {
            magic: word(0)?,
            totalsize: word(1)?,
            off_dt_struct: word(2)?,
            off_dt_strings: word(3)?,
            off_mem_rsvmap: word(4)?,
            version: word(5)?,
            last_comp_version: word(6)?,
            boot_cpuid_phys: word(7)?,
            size_dt_strings: word(8)?,
            size_dt_struct: word(9)?,
        })
    }
}

bitflags! {
    /// Type tags found in the FDT structure block.
    pub struct FdtNodeType : u32{
        /// Begin a node (followed by its name string)
        const FDT_BEGIN_NODE  = 0x01;
        /// End a node
        const FDT_END_NODE    = 0x02;
        /// A property entry (length, nameoff, data)
        const FDT_PROP        = 0x03;
        /// No-op padding word
        const FDT_NOP         = 0x04;
        /// End of the structure block
        const FDT_END         = 0x09;
    }
}
