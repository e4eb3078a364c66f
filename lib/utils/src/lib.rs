//! Small helpers shared by the device-tree library and the reset controller.
#![cfg_attr(not(test), no_std)]

pub mod endian;
pub mod num;
