//! Device plumbing used by the reset controller: shared handles and
//! memory-mapped register windows.

pub mod handle;
pub mod mmio;
