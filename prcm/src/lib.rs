//! Reset-line control for SoC sub-blocks whose resets are single bits in a
//! PRCM control/status register pair.
//!
//! Reset lines are described in the device tree under a `resets` child of
//! the PRCM node. [reset::discovery] turns them into a [reset::ResetController]
//! and registers it with a [reset::ResetFramework], through which peripheral
//! drivers assert, deassert or pulse their reset line.
#![cfg_attr(not(test), no_std)]
extern crate alloc;

#[macro_use]
pub mod logging;
pub mod config;
pub mod dev;
pub mod error;
pub mod reset;

pub use error::ResetError;
