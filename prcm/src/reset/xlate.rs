//! Consumer reference translation.
//!
//! A consumer points at the controller's `resets` node with one argument
//! cell holding the phandle of the reset-line child it wants, e.g.
//! `resets = <&prm_resets &rst_iva>`. The translation checks the phandle
//! against the children of the referenced node and hands it back as the id.
use super::ResetController;
use crate::ResetError;
use dt::{DeviceTree, PhandleArgs};

pub fn child_phandle_xlate(
    rcdev: &ResetController,
    tree: &DeviceTree,
    spec: &PhandleArgs,
) -> Result<u32, ResetError> {
    if spec.args.len() != rcdev.of_reset_n_cells {
        return Err(ResetError::InvalidArgument);
    }
    let wanted = *spec.args.first().ok_or(ResetError::InvalidArgument)?;
    let node = tree
        .get_node_by_id(spec.node_id)
        .ok_or(ResetError::InvalidArgument)?;
    tree.get_children(node)
        .filter_map(|child| tree.get_phandle(child))
        .find(|phandle| *phandle == wanted)
        .ok_or(ResetError::InvalidArgument)
}
