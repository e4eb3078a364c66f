//! Reset framework: where controllers are registered and where consumers
//! look up the reset line they reference in the device tree.
//!
//! Lookups are frequent and registration happens at attach time only, so the
//! controller list sits behind an [RwLock]. Consumers get a [ResetControl]
//! that refers to its controller weakly; once the controller is unregistered
//! and dropped, the control reports [ResetError::Detached].
use super::ResetController;
use crate::{
    ResetError, debug_ex,
    dev::handle::{Handle, HandleRef},
};
use alloc::vec::Vec;
use dt::{DeviceTree, Node, PhandleArgs};
use spin::RwLock;

#[derive(Default)]
pub struct ResetFramework {
    controllers: RwLock<Vec<Handle<ResetController>>>,
}

impl ResetFramework {
    pub const fn new() -> ResetFramework {
        ResetFramework {
            controllers: RwLock::new(Vec::new()),
        }
    }

    /// Register `controller`; at most one controller may serve a device-tree node.
    pub fn register(&self, controller: ResetController) -> Result<Handle<ResetController>, ResetError> {
        let mut guard = self.controllers.write();
        if guard.iter().any(|c| c.of_node == controller.of_node) {
            return Err(ResetError::AlreadyRegistered);
        }
        debug_ex!(
            "Registered reset controller '{}' ({} lines).",
            controller.name(),
            controller.nr_resets
        );
        let handle = Handle::from(controller);
        guard.push(handle.clone());
        Ok(handle)
    }

    /// Remove the controller serving `of_node` and hand it back to the caller.
    ///
    /// The controller and its register window are released once the returned
    /// handle, and any other strong handle to it, is dropped.
    pub fn unregister(&self, of_node: usize) -> Option<Handle<ResetController>> {
        let mut guard = self.controllers.write();
        let idx = guard.iter().position(|c| c.of_node == of_node)?;
        let controller = guard.remove(idx);
        debug_ex!("Unregistered reset controller '{}'.", controller.name());
        Some(controller)
    }

    /// Snapshot of the registered controllers.
    pub fn controllers(&self) -> Vec<Handle<ResetController>> {
        self.controllers.read().clone()
    }

    fn find_controller(&self, of_node: usize) -> Option<Handle<ResetController>> {
        self.controllers
            .read()
            .iter()
            .find(|c| c.of_node == of_node)
            .cloned()
    }

    /// Resolve a phandle reference into a control for one reset line.
    pub fn get(&self, tree: &DeviceTree, spec: &PhandleArgs) -> Result<ResetControl, ResetError> {
        let controller = self
            .find_controller(spec.node_id)
            .ok_or(ResetError::InvalidArgument)?;
        if spec.args.len() != controller.of_reset_n_cells {
            return Err(ResetError::InvalidArgument);
        }
        let id = (controller.of_xlate)(&*controller, tree, spec)?;
        Ok(ResetControl {
            controller: controller.create_ref(),
            id,
        })
    }

    /// Resolve the consumer's `resets` entry called `name` in `reset-names`,
    /// or its first entry when `name` is `None`.
    pub fn get_by_name(
        &self,
        tree: &DeviceTree,
        consumer: &Node,
        name: Option<&str>,
    ) -> Result<ResetControl, ResetError> {
        let index = match name {
            Some(name) => tree.get_string_index(consumer, "reset-names", name)?,
            None => 0,
        };
        let spec = tree.parse_phandle_with_args(consumer, "resets", "#reset-cells", index)?;
        self.get(tree, &spec)
    }
}

/// One reset line as seen by a consumer driver.
#[derive(Debug, Clone)]
pub struct ResetControl {
    controller: HandleRef<ResetController>,
    id: u32,
}

impl ResetControl {
    pub fn id(&self) -> u32 {
        self.id
    }

    fn controller(&self) -> Result<Handle<ResetController>, ResetError> {
        self.controller.get_handle().ok_or(ResetError::Detached)
    }

    pub fn reset(&self) -> Result<(), ResetError> {
        self.controller()?.reset(self.id)
    }

    pub fn assert(&self) -> Result<(), ResetError> {
        self.controller()?.assert(self.id)
    }

    pub fn deassert(&self) -> Result<(), ResetError> {
        self.controller()?.deassert(self.id)
    }

    pub fn status(&self) -> Result<bool, ResetError> {
        self.controller()?.status(self.id)
    }
}
