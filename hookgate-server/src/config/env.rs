//! Environment variable access.
//!
//! The loader reads variables through [`ReadEnv`] so tests can supply a
//! fixed environment instead of mutating the process one.

use std::collections::HashMap;
use std::env::VarError;

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, VarError>;
}

/// Delegates to `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnv {
    vars: HashMap<String, String>,
}

impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.vars.get(key).cloned().ok_or(VarError::NotPresent)
    }
}
