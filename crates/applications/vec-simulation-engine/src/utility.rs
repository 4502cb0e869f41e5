//! Utility model: what the VEC operator earns from UEs minus what it pays
//! edge servers
//!
//! Revenue per UE is its unit price times the task size (data for the
//! spectrum ledger, CPU cycles for the resource ledger). Cost is only charged
//! for the server kind the UE offloaded to: the per-UE server price times the
//! data rate (or allocated resource) on every server of that kind.

use serde::{Deserialize, Serialize};
use vec_core::{Result, ServerKind, TransitionState, VecError};

use crate::action::Action;
use crate::entities::{EdgeServer, EntityRegistry, UserEquipment};
use crate::state::State;

/// Which market a utility term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ledger {
    Spectrum,
    Resource,
}

impl Ledger {
    fn revenue(self, ue: &UserEquipment) -> f64 {
        match self {
            Ledger::Spectrum => ue.spectrum_price * ue.task.data_size,
            Ledger::Resource => ue.resource_price * ue.task.resource_cycles,
        }
    }

    fn server_price(self, server: &EdgeServer, ue: usize) -> f64 {
        match self {
            Ledger::Spectrum => server.spectrum_price[ue],
            Ledger::Resource => server.resource_price[ue],
        }
    }

    fn usage(self, state: &State, kind: ServerKind) -> &[Vec<f64>] {
        match self {
            Ledger::Spectrum => state.data_rates(kind),
            Ledger::Resource => state.allocated_resources(kind),
        }
    }
}

/// Utility terms of a single UE
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UeUtility {
    pub communication: f64,
    pub computation: f64,
}

impl UeUtility {
    pub fn total(&self) -> f64 {
        self.communication + self.computation
    }
}

/// Per-UE utilities and their sum for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityBreakdown {
    pub per_ue: Vec<UeUtility>,
    pub total: f64,
}

/// Utility model over a borrowed registry
#[derive(Debug, Clone, Copy)]
pub struct UtilityModel<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> UtilityModel<'a> {
    pub fn new(registry: &'a EntityRegistry) -> Self {
        UtilityModel { registry }
    }

    /// Spectrum revenue minus spectrum cost for `ue`
    pub fn communication_utility(&self, action: &Action, state: &State, ue: usize) -> Result<f64> {
        self.ledger_utility(Ledger::Spectrum, action, state, ue)
    }

    /// Resource revenue minus resource cost for `ue`
    pub fn computation_utility(&self, action: &Action, state: &State, ue: usize) -> Result<f64> {
        self.ledger_utility(Ledger::Resource, action, state, ue)
    }

    pub fn total_utility(&self, action: &Action, state: &State, ue: usize) -> Result<f64> {
        Ok(self.communication_utility(action, state, ue)?
            + self.computation_utility(action, state, ue)?)
    }

    /// Sum of every UE's total utility
    pub fn network_utility(&self, action: &Action, state: &State) -> Result<f64> {
        let mut total = 0.0;
        for ue in 0..self.registry.ue_count() {
            total += self.total_utility(action, state, ue)?;
        }
        Ok(total)
    }

    /// Per-UE utility terms plus the network total
    pub fn breakdown(&self, action: &Action, state: &State) -> Result<UtilityBreakdown> {
        let per_ue = (0..self.registry.ue_count())
            .map(|ue| {
                Ok(UeUtility {
                    communication: self.communication_utility(action, state, ue)?,
                    computation: self.computation_utility(action, state, ue)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let total = per_ue.iter().map(UeUtility::total).sum();

        Ok(UtilityBreakdown { per_ue, total })
    }

    fn ledger_utility(&self, ledger: Ledger, action: &Action, state: &State, ue: usize) -> Result<f64> {
        let record = self.registry.ue(ue)?;
        let transition = action.transition_state.get(ue).copied().ok_or_else(|| {
            VecError::invalid_action(format!("no transition state for UE {}", ue))
        })?;

        let revenue = ledger.revenue(record);
        let cost = match transition {
            TransitionState::Local => 0.0,
            TransitionState::Vehicular => self.cost(ledger, state, ServerKind::Vehicular, ue)?,
            TransitionState::Fixed => self.cost(ledger, state, ServerKind::Fixed, ue)?,
        };

        Ok(revenue - cost)
    }

    fn cost(&self, ledger: Ledger, state: &State, kind: ServerKind, ue: usize) -> Result<f64> {
        let servers = self.registry.servers(kind);
        let usage = ledger.usage(state, kind).get(ue).ok_or_else(|| {
            VecError::invalid_action(format!("state has no {} row for UE {}", kind, ue))
        })?;
        if usage.len() != servers.len() {
            return Err(VecError::invalid_action(format!(
                "state has {} {} entries for UE {}, registry has {} servers",
                usage.len(),
                kind,
                ue,
                servers.len()
            )));
        }

        Ok(servers
            .iter()
            .zip(usage)
            .map(|(server, amount)| ledger.server_price(server, ue) * amount)
            .sum())
    }
}
