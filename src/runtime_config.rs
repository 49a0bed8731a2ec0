//! # Runtime Configuration
//!
//! Coroutine runtime tuning read from the environment.
//!
//! ### `FORMS_STACK_SIZE`
//!
//! Stack size for connection coroutines, decimal (`16384`) or hex (`0x4000`).
//! Default: `0x4000` (16 KB).
//!
//! ### `FORMS_WORKERS`
//!
//! Number of `may` worker threads. Default: number of CPUs.
//!
//! ### `FORMS_STORE_THREADS`
//!
//! Number of OS threads running database calls. Default: `16`.
//!
//! ```rust
//! use form_builder::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;
use std::thread;

use crate::storage::DEFAULT_STORE_THREADS;

pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub stack_size: usize,
    pub workers: usize,
    pub store_threads: usize,
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let stack_size = lookup("FORMS_STACK_SIZE")
            .and_then(|v| parse_size(&v))
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = lookup("FORMS_WORKERS")
            .and_then(|v| v.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or_else(default_workers);
        let store_threads = lookup("FORMS_STORE_THREADS")
            .and_then(|v| v.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_STORE_THREADS);
        RuntimeConfig {
            stack_size,
            workers,
            store_threads,
        }
    }

    /// Push these settings into the global `may` configuration. Must run
    /// before the first coroutine is spawned.
    pub fn apply(&self) {
        may::config()
            .set_stack_size(self.stack_size)
            .set_workers(self.workers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(|_| None);
        assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
        assert!(config.workers >= 1);
        assert_eq!(config.store_threads, DEFAULT_STORE_THREADS);
    }

    #[test]
    fn test_hex_and_decimal_stack_size() {
        let hex = RuntimeConfig::from_lookup(|k| {
            (k == "FORMS_STACK_SIZE").then(|| "0x8000".to_string())
        });
        assert_eq!(hex.stack_size, 0x8000);
        let dec = RuntimeConfig::from_lookup(|k| {
            (k == "FORMS_STACK_SIZE").then(|| "32768".to_string())
        });
        assert_eq!(dec.stack_size, 32768);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = RuntimeConfig::from_lookup(|k| match k {
            "FORMS_STACK_SIZE" => Some("0xZZ".to_string()),
            "FORMS_WORKERS" => Some("0".to_string()),
            "FORMS_STORE_THREADS" => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
        assert_eq!(config.workers, default_workers());
        assert_eq!(config.store_threads, DEFAULT_STORE_THREADS);
    }

    #[test]
    fn test_workers_override() {
        let config =
            RuntimeConfig::from_lookup(|k| (k == "FORMS_WORKERS").then(|| "3".to_string()));
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_store_threads_override() {
        let config = RuntimeConfig::from_lookup(|k| {
            (k == "FORMS_STORE_THREADS").then(|| "4".to_string())
        });
        assert_eq!(config.store_threads, 4);
        assert_eq!(config.stack_size, 0x4000);
    }
}
