//! TOML configuration for the engine handle and the demo server.
//!
//! A `serde`-derived struct, `Default` for every field that has a sane
//! built-in value, and a `read_config` helper that loads a file from disk
//! with `toml`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::err::{EngineError, Result};

/// Top-level config file shape. Every field is optional on disk; absent
/// fields fall back to `Default::default()`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// Initial state of the registry's ambient knobs: the savefile directory
/// (§4.2 `set_config_dir`) and the `dbg` meta-table's starting values (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    pub savefile_dir: Option<String>,

    #[serde(default)]
    pub dbg_syserr: bool,
    #[serde(default)]
    pub dbg_internalerr: bool,
    #[serde(default)]
    pub dbg_sqlerr: bool,
    #[serde(default)]
    pub dbg_trace: bool,

    /// 0 = none, 1 = sink, 2 = stderr, 3 = both; see `log::LogTarget`.
    #[serde(default)]
    pub dbg_target: u8,

    /// Syslog priority the original `librta` `Rtadbg` carries (e.g. `LOG_INFO
    /// = 6`); stored for parity with that record and surfaced on `rta_dbg`,
    /// but unused by `tracing`-based logging, which has no priority concept.
    #[serde(default = "default_priority")]
    pub dbg_priority: u8,

    /// Syslog facility (e.g. `LOG_LOCAL0 = 16`); same status as `dbg_priority`.
    #[serde(default)]
    pub dbg_facility: u8,

    #[serde(default = "default_ident")]
    pub dbg_ident: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        EngineSection {
            savefile_dir: None,
            dbg_syserr: false,
            dbg_internalerr: false,
            dbg_sqlerr: false,
            dbg_trace: false,
            dbg_target: 0,
            dbg_priority: default_priority(),
            dbg_facility: 0,
            dbg_ident: default_ident(),
        }
    }
}

fn default_ident() -> String {
    "rta".to_string()
}

fn default_priority() -> u8 {
    6 // LOG_INFO
}

/// Listen address for the demo TCP server binary. Not part of the
/// embeddable core — the host wires its own listener in real deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:5433".to_string()
}

/// Reads and parses a TOML config file from `path`.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let text = fs::read_to_string(path.as_ref())?;
    let cfg = toml::from_str(&text)?;
    Ok(cfg)
}

impl EngineConfig {
    pub fn savefile_dir(&self) -> Option<&str> {
        self.engine.savefile_dir.as_deref()
    }
}
