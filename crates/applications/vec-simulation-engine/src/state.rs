//! Per-step state produced by the communication model
//!
//! Matrices are indexed `[ue][server]`. An entry is zero unless the UE's
//! transition state selects that server kind.

use serde::{Deserialize, Serialize};
use vec_core::{Result, ServerKind, VecError};

/// Observable state after an action has been applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub ves_count: Vec<usize>,  // VESs available to each UE
    pub ves_data_rate: Vec<Vec<f64>>,
    pub ves_resource: Vec<Vec<f64>>,
    pub fes_data_rate: Vec<Vec<f64>>,
    pub fes_resource: Vec<Vec<f64>>,
}

impl State {
    /// All-zero state with `ves_count` populated
    pub fn zeros(ue_count: usize, ves_count: usize, fes_count: usize) -> Self {
        State {
            ves_count: vec![ves_count; ue_count],
            ves_data_rate: vec![vec![0.0; ves_count]; ue_count],
            ves_resource: vec![vec![0.0; ves_count]; ue_count],
            fes_data_rate: vec![vec![0.0; fes_count]; ue_count],
            fes_resource: vec![vec![0.0; fes_count]; ue_count],
        }
    }

    pub fn ue_count(&self) -> usize {
        self.ves_count.len()
    }

    pub fn data_rates(&self, kind: ServerKind) -> &[Vec<f64>] {
        match kind {
            ServerKind::Vehicular => &self.ves_data_rate,
            ServerKind::Fixed => &self.fes_data_rate,
        }
    }

    pub fn allocated_resources(&self, kind: ServerKind) -> &[Vec<f64>] {
        match kind {
            ServerKind::Vehicular => &self.ves_resource,
            ServerKind::Fixed => &self.fes_resource,
        }
    }

    /// Data-rate and resource rows of `ue` for `kind`, mutably
    pub(crate) fn rows_mut(&mut self, kind: ServerKind, ue: usize) -> (&mut [f64], &mut [f64]) {
        match kind {
            ServerKind::Vehicular => (
                self.ves_data_rate[ue].as_mut_slice(),
                self.ves_resource[ue].as_mut_slice(),
            ),
            ServerKind::Fixed => (
                self.fes_data_rate[ue].as_mut_slice(),
                self.fes_resource[ue].as_mut_slice(),
            ),
        }
    }

    /// Data rate of the (ue, server) link
    pub fn data_rate(&self, kind: ServerKind, ue: usize, server: usize) -> Result<f64> {
        lookup(self.data_rates(kind), kind, ue, server)
    }

    /// Compute resource allocated to `ue` on `server`
    pub fn allocated_resource(&self, kind: ServerKind, ue: usize, server: usize) -> Result<f64> {
        lookup(self.allocated_resources(kind), kind, ue, server)
    }
}

fn lookup(rows: &[Vec<f64>], kind: ServerKind, ue: usize, server: usize) -> Result<f64> {
    let row = rows
        .get(ue)
        .ok_or(VecError::UnknownEntity { what: "UE", index: ue })?;
    row.get(server).copied().ok_or(VecError::UnknownEntity {
        what: kind.entity_name(),
        index: server,
    })
}
