// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! # sgap-observability
//!
//! Logging setup shared by the stability-gap tools, with per-crate debug
//! flag support (`--debug-<crate>`, `--debug-all`, `SGAP_DEBUG`).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "stability-gap",
    "sgap-metrics",
    "sgap-config",
    "sgap-observability",
];
