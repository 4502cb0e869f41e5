//! Core types shared across VEC components

use serde::{Deserialize, Serialize};

use crate::error::{Result, VecError};

/// Kind of edge server a UE can offload to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerKind {
    /// Vehicular edge server (VES)
    Vehicular,
    /// Fixed edge server (FES) in a small cell
    Fixed,
}

impl ServerKind {
    pub const ALL: [ServerKind; 2] = [ServerKind::Vehicular, ServerKind::Fixed];

    /// Name used when reporting an unknown server index
    pub fn entity_name(self) -> &'static str {
        match self {
            ServerKind::Vehicular => "vehicular server",
            ServerKind::Fixed => "fixed server",
        }
    }

    /// Transition state that selects this server kind
    pub fn transition_state(self) -> TransitionState {
        match self {
            ServerKind::Vehicular => TransitionState::Vehicular,
            ServerKind::Fixed => TransitionState::Fixed,
        }
    }
}

impl std::fmt::Display for ServerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerKind::Vehicular => write!(f, "vehicular"),
            ServerKind::Fixed => write!(f, "fixed"),
        }
    }
}

/// Per-UE offload decision for one time slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    /// Execute the task on the UE itself
    #[default]
    Local,
    /// Offload to the vehicular edge servers
    Vehicular,
    /// Offload to the fixed edge servers
    Fixed,
}

impl TransitionState {
    /// Number of discrete transition states
    pub const COUNT: u8 = 3;

    /// Server kind this state offloads to, if any
    pub fn server_kind(self) -> Option<ServerKind> {
        match self {
            TransitionState::Local => None,
            TransitionState::Vehicular => Some(ServerKind::Vehicular),
            TransitionState::Fixed => Some(ServerKind::Fixed),
        }
    }

    /// Whether this state offloads to `kind`
    pub fn selects(self, kind: ServerKind) -> bool {
        self.server_kind() == Some(kind)
    }
}

impl TryFrom<u8> for TransitionState {
    type Error = VecError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(TransitionState::Local),
            1 => Ok(TransitionState::Vehicular),
            2 => Ok(TransitionState::Fixed),
            other => Err(VecError::invalid_action(format!(
                "transition state {} is not one of 0=local, 1=vehicular, 2=fixed",
                other
            ))),
        }
    }
}

impl From<TransitionState> for u8 {
    fn from(state: TransitionState) -> u8 {
        match state {
            TransitionState::Local => 0,
            TransitionState::Vehicular => 1,
            TransitionState::Fixed => 2,
        }
    }
}

/// Computation task generated by a UE
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub data_size: f64,        // Input data to upload
    pub resource_cycles: f64,  // CPU cycles required
    pub max_latency: f64,      // Deadline for task execution
}

impl Task {
    pub fn new(data_size: f64, resource_cycles: f64, max_latency: f64) -> Self {
        Task {
            data_size,
            resource_cycles,
            max_latency,
        }
    }
}
