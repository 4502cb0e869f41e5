//! VEC Simulation Engine
//!
//! Discrete-time simulator of a vehicular edge-computing market: UEs offload
//! tasks to vehicular or fixed edge servers and the VEC operator nets the
//! prices it charges against the prices it pays.

pub mod config;
pub mod entities;
pub mod action;
pub mod state;
pub mod communication;
pub mod computation;
pub mod utility;
pub mod policies;
pub mod environment;
pub mod runner;

pub use action::Action;
pub use communication::{CommunicationModel, EfficiencyMatrix};
pub use computation::ComputationModel;
pub use config::SimulationConfig;
pub use entities::{EdgeServer, EntityRegistry, UserEquipment};
pub use environment::{Environment, StepOutcome};
pub use state::State;
pub use utility::{UtilityBreakdown, UtilityModel};
