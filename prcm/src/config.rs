//! Device-tree names used by reset discovery.
//!
//! The defaults are generated at build time from `reset_config.json`;
//! [DiscoveryConfig] lets board code override them at runtime.

mod generated {
    include!(concat!(env!("OUT_DIR"), "/reset_config.rs"));
}

pub use generated::*;

/// Names of the grouping node and of the four per-line properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub resets_node: &'static str,
    pub rstctrl_offs: &'static str,
    pub ctrl_bit_shift: &'static str,
    pub rstst_offs: &'static str,
    pub sts_bit_shift: &'static str,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            resets_node: RESETS_NODE,
            rstctrl_offs: PROP_RSTCTRL_OFFS,
            ctrl_bit_shift: PROP_CTRL_BIT_SHIFT,
            rstst_offs: PROP_RSTST_OFFS,
            sts_bit_shift: PROP_STS_BIT_SHIFT,
        }
    }
}
