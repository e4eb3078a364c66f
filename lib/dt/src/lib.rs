//! In-memory device tree: node arena, property decoding, phandle
//! resolution and a reader for flattened device-tree blobs.
#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod builder;
pub mod fdt;
pub mod node;
pub mod prop;

pub use node::{DeviceTree, Node, PhandleArgs};
pub use prop::{Property, PropertyError};
