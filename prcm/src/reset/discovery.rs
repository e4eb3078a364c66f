//! Reset discovery from the device tree.
//!
//! A reset-capable parent (a PRCM instance) carries a `resets` child with one
//! node per reset line:
//!
//! ```text
//! prm@48306000 {
//!     reg = <0x48306000 0x2000>;
//!     prm_resets: resets {
//!         #reset-cells = <1>;
//!         rst_iva: rst_iva {
//!             rstctrl_offs = <0x10>;
//!             ctrl_bit-shift = /bits/ 8 <2>;
//!             rstst_offs = <0x14>;
//!             sts_bit-shift = /bits/ 8 <2>;
//!         };
//!     };
//! };
//! ```
//!
//! The parent's first `reg` region is mapped once and shared by all of its
//! lines; a `resets` node without lines needs no `reg`. Lines are staged and
//! committed together: one malformed line discards the whole parent, leaving
//! it without reset control.
use super::{RegisterDescriptor, RegistryStage, ResetController, ResetFramework, ResetRegistry};
use crate::{
    ResetError,
    config::DiscoveryConfig,
    debug_ex,
    dev::{
        handle::Handle,
        mmio::{IoMapper, IoWindow},
    },
};
use alloc::{boxed::Box, vec::Vec};
use dt::{DeviceTree, Node, Property, PropertyError};
use log::{error, warn};

/// Build the controller for the reset lines under `parent`.
///
/// Returns `Ok(None)` if `parent` has no `resets` child. The reported line
/// count is one more than the number of lines found, matching what existing
/// consumers of this controller have always been given.
pub fn discover(
    tree: &DeviceTree,
    parent: &Node,
    mapper: &dyn IoMapper,
    config: &DiscoveryConfig,
) -> Result<Option<ResetController>, ResetError> {
    discover_inner(tree, parent, mapper, config).inspect_err(|err| {
        error!(
            "{}: reset discovery failed: {}.",
            tree.get_full_path(parent),
            err
        )
    })
}

fn discover_inner(
    tree: &DeviceTree,
    parent: &Node,
    mapper: &dyn IoMapper,
    config: &DiscoveryConfig,
) -> Result<Option<ResetController>, ResetError> {
    let path = tree.get_full_path(parent);
    let Some(resets) = tree.get_child_by_name(parent, config.resets_node) else {
        debug_ex!("{} missing '{}' child node.", path, config.resets_node);
        return Ok(None);
    };

    let lines: Vec<&Node> = tree.get_children(resets).collect();
    let mut stage = RegistryStage::new();
    let window = if lines.is_empty() {
        None
    } else {
        let window = map_window(tree, parent, mapper)?;
        for np in lines {
            debug_ex!("\tInitializing reset: {}.", np.full_name);
            stage.push(read_line(tree, np, &window, config)?);
        }
        Some(window)
    };

    let mut registry = ResetRegistry::new();
    let count = registry.commit(stage)?;
    let mut controller = ResetController::new(&path, resets.node_id, window, registry);
    controller.nr_resets = count + 1;
    debug_ex!("{}: {} reset lines staged and committed.", path, count);
    Ok(Some(controller))
}

/// Map the parent's first `reg` region.
fn map_window(
    tree: &DeviceTree,
    parent: &Node,
    mapper: &dyn IoMapper,
) -> Result<Handle<IoWindow>, ResetError> {
    let range = match tree.get_reg_value(parent) {
        Ok(regs) => regs.into_iter().next(),
        Err(PropertyError::PropNotFound) => None,
        Err(err) => return Err(err.into()),
    }
    .ok_or_else(|| ResetError::MissingProperty {
        node: tree.get_full_path(parent),
        property: "reg",
    })?;
    Ok(Handle::from(IoWindow::map(mapper, range)?))
}

fn read_line(
    tree: &DeviceTree,
    np: &Node,
    window: &Handle<IoWindow>,
    config: &DiscoveryConfig,
) -> Result<RegisterDescriptor, ResetError> {
    let rstctrl_offs = read_prop(tree, np, config.rstctrl_offs, Property::value_as_u32)?;
    let rstctrl_bit = read_prop(tree, np, config.ctrl_bit_shift, Property::value_as_u8)?;
    let rstst_offs = read_prop(tree, np, config.rstst_offs, Property::value_as_u32)?;
    let rstst_bit = read_prop(tree, np, config.sts_bit_shift, Property::value_as_u8)?;
    let id = tree
        .get_phandle(np)
        .ok_or_else(|| missing(np, "phandle"))?;
    for offset in [rstctrl_offs, rstst_offs] {
        if !window.contains(offset) {
            return Err(ResetError::OutOfWindow {
                node: Box::from(np.full_name.as_ref()),
                offset,
            });
        }
    }
    Ok(RegisterDescriptor {
        window: window.create_ref(),
        rstctrl_offs,
        rstst_offs,
        rstctrl_bit,
        rstst_bit,
        id,
        name: Box::from(np.full_name.as_ref()),
    })
}

fn read_prop<T>(
    tree: &DeviceTree,
    np: &Node,
    name: &'static str,
    decode: fn(&Property) -> Result<T, PropertyError>,
) -> Result<T, ResetError> {
    let prop = tree.get_property(np, name).ok_or_else(|| missing(np, name))?;
    Ok(decode(prop)?)
}

fn missing(np: &Node, property: &'static str) -> ResetError {
    ResetError::MissingProperty {
        node: Box::from(np.full_name.as_ref()),
        property,
    }
}

/// Discover the reset lines under `parent` and register the controller.
pub fn init(
    framework: &ResetFramework,
    tree: &DeviceTree,
    parent: &Node,
    mapper: &dyn IoMapper,
    config: &DiscoveryConfig,
) -> Result<Option<Handle<ResetController>>, ResetError> {
    match discover(tree, parent, mapper, config)? {
        Some(controller) => framework.register(controller).map(Some),
        None => Ok(None),
    }
}

/// Run [init] for every node matching `pattern` (see [DeviceTree::get_nodes]).
///
/// A parent that fails is logged and skipped; the others are still registered.
pub fn init_all(
    framework: &ResetFramework,
    tree: &DeviceTree,
    pattern: &str,
    mapper: &dyn IoMapper,
    config: &DiscoveryConfig,
) -> Vec<Handle<ResetController>> {
    let mut res = Vec::new();
    for parent in tree.get_nodes(pattern) {
        match init(framework, tree, parent, mapper, config) {
            Ok(Some(controller)) => res.push(controller),
            Ok(None) => {}
            Err(err) => warn!(
                "Skipped reset lines of {}: {}.",
                tree.get_full_path(parent),
                err
            ),
        }
    }
    res
}
