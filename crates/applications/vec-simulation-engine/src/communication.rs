//! Communication model
//!
//! Computes the spectral efficiency of every UE -> edge server link and the
//! resulting data rates for a given action.
//!
//! ## Interference
//!
//! The efficiency of link (ue, server) is `log2(1 + S / (I + N))` where
//! `S = p_ue * g[server][ue]` and `I` sums `p_j * g[l][j]` over **all** UEs `j`
//! and every same-kind server `l` other than the serving one. The serving UE
//! itself contributes through the non-serving servers' gains.
//!
//! ## Cache
//!
//! Efficiencies only depend on the registry, so they are computed once per
//! episode and reused. Each entry carries an explicit computed marker; a link
//! whose efficiency is genuinely zero is never recomputed.

use tracing::{debug, trace};
use vec_core::{Result, ServerKind, VecError};

use crate::action::Action;
use crate::config::DEFAULT_NOISE_POWER;
use crate::entities::EntityRegistry;
use crate::state::State;

/// Spectral efficiency of every (server, ue) link of one server kind
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyMatrix {
    servers: usize,
    ues: usize,
    values: Vec<Option<f64>>,  // Row-major [server][ue]
}

impl EfficiencyMatrix {
    /// Matrix with every entry uncomputed
    pub fn new(servers: usize, ues: usize) -> Self {
        EfficiencyMatrix {
            servers,
            ues,
            values: vec![None; servers * ues],
        }
    }

    pub fn servers(&self) -> usize {
        self.servers
    }

    pub fn ues(&self) -> usize {
        self.ues
    }

    /// Cached efficiency of (server, ue), `None` if not computed yet
    pub fn get(&self, server: usize, ue: usize) -> Option<f64> {
        if server >= self.servers || ue >= self.ues {
            return None;
        }
        self.values[server * self.ues + ue]
    }

    fn set(&mut self, server: usize, ue: usize, value: f64) {
        self.values[server * self.ues + ue] = Some(value);
    }

    /// Whether every link has been computed
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

/// Communication model over a borrowed registry
#[derive(Debug, Clone)]
pub struct CommunicationModel<'a> {
    registry: &'a EntityRegistry,
    noise_power: f64,
    vehicular_efficiency: EfficiencyMatrix,
    fixed_efficiency: EfficiencyMatrix,
    builds: usize,
}

impl<'a> CommunicationModel<'a> {
    /// Create a model with the default noise power
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self::with_noise(registry, DEFAULT_NOISE_POWER)
    }

    /// Create a model with a custom noise power
    pub fn with_noise(registry: &'a EntityRegistry, noise_power: f64) -> Self {
        CommunicationModel {
            registry,
            noise_power,
            vehicular_efficiency: Self::empty_matrix(registry, ServerKind::Vehicular),
            fixed_efficiency: Self::empty_matrix(registry, ServerKind::Fixed),
            builds: 0,
        }
    }

    fn empty_matrix(registry: &EntityRegistry, kind: ServerKind) -> EfficiencyMatrix {
        EfficiencyMatrix::new(registry.server_count(kind), registry.ue_count())
    }

    pub fn registry(&self) -> &'a EntityRegistry {
        self.registry
    }

    pub fn noise_power(&self) -> f64 {
        self.noise_power
    }

    /// Cached efficiencies for `kind`
    pub fn efficiency_matrix(&self, kind: ServerKind) -> &EfficiencyMatrix {
        match kind {
            ServerKind::Vehicular => &self.vehicular_efficiency,
            ServerKind::Fixed => &self.fixed_efficiency,
        }
    }

    /// Number of full cache rebuilds since creation
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Drop every cached efficiency
    pub fn invalidate(&mut self) {
        self.vehicular_efficiency = Self::empty_matrix(self.registry, ServerKind::Vehicular);
        self.fixed_efficiency = Self::empty_matrix(self.registry, ServerKind::Fixed);
    }

    /// Spectral efficiency of the link between `ue` and `server`
    pub fn spectral_efficiency(&self, ue: usize, server: usize, kind: ServerKind) -> Result<f64> {
        let ue_record = self.registry.ue(ue)?;
        let serving = self.registry.server(kind, server)?;
        let servers = self.registry.servers(kind);

        let numerator = ue_record.transmitting_power * serving.channel_gain[ue];

        let mut interference = 0.0;
        for (j, other_ue) in self.registry.ues().iter().enumerate() {
            for (l, other) in servers.iter().enumerate() {
                if l != server {
                    interference += other_ue.transmitting_power * other.channel_gain[j];
                }
            }
        }
        let denominator = interference + self.noise_power;

        let argument = 1.0 + numerator / denominator;
        if !(denominator > 0.0) || !argument.is_finite() || argument <= 0.0 {
            return Err(VecError::Domain {
                ue,
                server,
                kind,
                argument,
            });
        }

        Ok(argument.log2())
    }

    /// Recompute the efficiency of every link of both server kinds
    ///
    /// The cache is only replaced when every link succeeds.
    pub fn build_matrix(&mut self) -> Result<()> {
        let vehicular = self.compute_matrix(ServerKind::Vehicular)?;
        let fixed = self.compute_matrix(ServerKind::Fixed)?;

        self.vehicular_efficiency = vehicular;
        self.fixed_efficiency = fixed;
        self.builds += 1;

        debug!(
            ues = self.registry.ue_count(),
            vehicular = self.vehicular_efficiency.servers(),
            fixed = self.fixed_efficiency.servers(),
            builds = self.builds,
            "Rebuilt spectral efficiency matrices"
        );
        Ok(())
    }

    fn compute_matrix(&self, kind: ServerKind) -> Result<EfficiencyMatrix> {
        let mut matrix = Self::empty_matrix(self.registry, kind);
        for ue in 0..matrix.ues() {
            for server in 0..matrix.servers() {
                matrix.set(server, ue, self.spectral_efficiency(ue, server, kind)?);
            }
        }
        Ok(matrix)
    }

    /// Data rate of `ue` served by `server` under `action`
    ///
    /// Rebuilds the whole cache if this link has not been computed yet.
    pub fn data_rate(
        &mut self,
        action: &Action,
        ue: usize,
        server: usize,
        kind: ServerKind,
    ) -> Result<f64> {
        self.registry.ue(ue)?;
        let bandwidth = self.registry.server(kind, server)?.bandwidth;

        let share = action
            .spectrum_share(kind)
            .get(ue)
            .and_then(|row| row.get(server))
            .copied()
            .ok_or_else(|| {
                VecError::invalid_action(format!(
                    "no {} spectrum share for UE {} on server {}",
                    kind, ue, server
                ))
            })?;

        let efficiency = match self.efficiency_matrix(kind).get(server, ue) {
            Some(efficiency) => efficiency,
            None => {
                self.build_matrix()?;
                self.efficiency_matrix(kind)
                    .get(server, ue)
                    .ok_or(VecError::UnknownEntity {
                        what: kind.entity_name(),
                        index: server,
                    })?
            }
        };

        Ok(share * bandwidth * efficiency)
    }

    /// Apply `action` and assemble the resulting state
    ///
    /// Data rates and resources are only filled for the server kind a UE's
    /// transition state selects; every other entry stays zero.
    pub fn get_state(&mut self, action: &Action) -> Result<State> {
        action.validate(self.registry)?;

        let registry = self.registry;
        let mut state = State::zeros(
            registry.ue_count(),
            registry.server_count(ServerKind::Vehicular),
            registry.server_count(ServerKind::Fixed),
        );

        for (ue, transition) in action.transition_state.iter().enumerate() {
            let Some(kind) = transition.server_kind() else {
                continue;
            };

            for (server, record) in registry.servers(kind).iter().enumerate() {
                let rate = self.data_rate(action, ue, server, kind)?;
                let resource = action.resource_share(kind)[ue][server] * record.computation_capability;

                let (rates, resources) = state.rows_mut(kind, ue);
                rates[server] = rate;
                resources[server] = resource;
            }
        }

        trace!(ues = state.ue_count(), "Assembled state");
        Ok(state)
    }
}
