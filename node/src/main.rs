//! Single-process Poline node entry point.
//!
//! Loads the protocol state snapshot if one exists at the given path (first
//! argument, default `poline-state.bin`), otherwise bootstraps a freshly
//! wired node, and writes the snapshot back on exit.

use poline_node::PolineNode;
use poline_types::{Address, ProtocolParams};
use std::path::Path;
use tracing::info;

fn main() {
    poline_utils::init_tracing();

    let state_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "poline-state.bin".to_string());
    let admin_raw =
        std::env::var("POLINE_ADMIN").unwrap_or_else(|_| format!("{}admin", Address::PREFIX));
    if !admin_raw.starts_with(Address::PREFIX) {
        eprintln!("POLINE_ADMIN must start with {}", Address::PREFIX);
        std::process::exit(1);
    }
    let admin = Address::new(admin_raw);

    let node = if Path::new(&state_path).exists() {
        let bytes = match std::fs::read(&state_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("failed to read {state_path}: {e}");
                std::process::exit(1);
            }
        };
        match PolineNode::restore_bytes(&bytes) {
            Ok(node) => {
                info!(state = %state_path, "node state restored");
                node
            }
            Err(e) => {
                eprintln!("failed to restore {state_path}: {e}");
                std::process::exit(1);
            }
        }
    } else {
        match PolineNode::new(admin, ProtocolParams::poline_defaults()) {
            Ok(node) => {
                info!("fresh node bootstrapped");
                node
            }
            Err(e) => {
                eprintln!("failed to wire node: {e}");
                std::process::exit(1);
            }
        }
    };

    info!(
        total_staked = node.staking.total_staked(),
        total_supply = node.token.total_supply(),
        "node ready"
    );

    match node.snapshot_bytes() {
        Ok(bytes) => {
            if let Err(e) = std::fs::write(&state_path, bytes) {
                eprintln!("failed to write {state_path}: {e}");
                std::process::exit(1);
            }
            info!(state = %state_path, "node state saved");
        }
        Err(e) => {
            eprintln!("failed to serialize state: {e}");
            std::process::exit(1);
        }
    }
}
