//! Error type shared by discovery, the reset operations and the framework.

use alloc::boxed::Box;
use core::fmt::{self, Display};
use dt::PropertyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetError {
    /// No reset line with this id is known to the controller.
    NotFound { id: u32 },
    /// A consumer reference could not be translated into a reset id.
    InvalidArgument,
    /// A reset-line node lacks one of its required properties.
    MissingProperty {
        node: Box<str>,
        property: &'static str,
    },
    /// The register window or the controller state could not be set up.
    AllocationFailure,
    /// Two reset lines claim the same id.
    DuplicateId { id: u32 },
    /// A register offset points outside the mapped window.
    OutOfWindow { node: Box<str>, offset: u32 },
    /// A controller for this device-tree node is already registered.
    AlreadyRegistered,
    /// The controller or its register window has been torn down.
    Detached,
    /// Malformed device-tree data.
    Property(PropertyError),
}

impl From<PropertyError> for ResetError {
    fn from(value: PropertyError) -> Self {
        ResetError::Property(value)
    }
}

impl Display for ResetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetError::NotFound { id } => write!(f, "no reset line with id {:#x}", id),
            ResetError::InvalidArgument => f.write_str("invalid reset specifier"),
            ResetError::MissingProperty { node, property } => {
                write!(f, "no entry in {} for {}", node, property)
            }
            ResetError::AllocationFailure => f.write_str("failed to map reset registers"),
            ResetError::DuplicateId { id } => write!(f, "reset id {:#x} is already in use", id),
            ResetError::OutOfWindow { node, offset } => {
                write!(f, "{}: register offset {:#x} is outside the mapped window", node, offset)
            }
            ResetError::AlreadyRegistered => f.write_str("reset controller already registered"),
            ResetError::Detached => f.write_str("reset controller has been torn down"),
            ResetError::Property(err) => write!(f, "malformed device tree: {}", err),
        }
    }
}
