//! VEC Core - Shared types and errors
//!
//! This crate defines the vocabulary used across:
//! - vec-simulation-engine (communication, computation and utility models)
//! - vec-sim (episode runner CLI)
//!
//! Key types:
//! - ServerKind / TransitionState (offload targets)
//! - Task (per-UE computation workload)
//! - Error types

pub mod types;
pub mod error;

pub use types::*;
pub use error::*;
