use serde::Deserialize;
use std::{env, fs, path::PathBuf};

/// Device-tree naming used by the reset discovery, see `reset_config.json`.
#[derive(Deserialize)]
struct ResetConfig {
    resets_node: String,
    rstctrl_offs: String,
    ctrl_bit_shift: String,
    rstst_offs: String,
    sts_bit_shift: String,
    reset_n_cells: usize,
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let out_dir = env::var("OUT_DIR").unwrap();
    let config_str =
        fs::read_to_string(PathBuf::from(manifest_dir).join("reset_config.json")).unwrap();
    let config: ResetConfig = match serde_json::from_str(&config_str) {
        Ok(value) => value,
        Err(err) => panic!("Invalid reset_config.json: {}", err),
    };
    make_config(&config, PathBuf::from(out_dir).join("reset_config.rs"));
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=reset_config.json");
}

fn make_config(config: &ResetConfig, path: PathBuf) {
    let mut s = String::new();
    let strs = [
        ("RESETS_NODE", &config.resets_node),
        ("PROP_RSTCTRL_OFFS", &config.rstctrl_offs),
        ("PROP_CTRL_BIT_SHIFT", &config.ctrl_bit_shift),
        ("PROP_RSTST_OFFS", &config.rstst_offs),
        ("PROP_STS_BIT_SHIFT", &config.sts_bit_shift),
    ];
    for (key, value) in strs {
        s += format!("pub const {}: &str = {:?};\n", key, value).as_str();
    }
    s += format!("pub const RESET_N_CELLS: usize = {};\n", config.reset_n_cells).as_str();
    fs::write(path, s).unwrap();
}
