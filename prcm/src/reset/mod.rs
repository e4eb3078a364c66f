//! PRCM reset lines: descriptors, per-controller registry, the
//! reset/assert/deassert operations, reference translation, discovery and
//! the framework consumers go through.

mod controller;
mod descriptor;
pub mod discovery;
mod framework;
mod registry;
pub mod xlate;

pub use controller::{ResetController, XlateFn};
pub use descriptor::RegisterDescriptor;
pub use framework::{ResetControl, ResetFramework};
pub use registry::{RegistryStage, ResetRegistry};
