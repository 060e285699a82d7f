//! Core of hookgate: the execution gate, the update runner and the
//! trigger dispatcher, plus the runtime configuration they read.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatcher;
pub mod gate;
pub mod runner;
