//! Episode environment
//!
//! Wraps the three models around one registry and advances time slot by time
//! slot. A step earns +1 when the network utility reaches the configured
//! threshold and -1 otherwise; the episode ends after `time_slot_max` slots.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use vec_core::{Result, ServerKind};

use crate::action::Action;
use crate::communication::CommunicationModel;
use crate::computation::ComputationModel;
use crate::config::{ChannelConfig, EpisodeConfig};
use crate::entities::EntityRegistry;
use crate::state::State;
use crate::utility::{UtilityBreakdown, UtilityModel};

/// Result of one environment step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: State,
    pub utility: UtilityBreakdown,
    pub reward: i32,
    pub done: bool,
}

/// Discrete-time VEC market environment
pub struct Environment<'a> {
    registry: &'a EntityRegistry,
    communication: CommunicationModel<'a>,
    computation: ComputationModel<'a>,
    utility: UtilityModel<'a>,
    config: EpisodeConfig,

    current_time_slot: u32,
    cumulative_utility: f64,
    state: State,
}

impl<'a> Environment<'a> {
    pub fn new(registry: &'a EntityRegistry, channel: &ChannelConfig, config: EpisodeConfig) -> Self {
        Environment {
            registry,
            communication: CommunicationModel::with_noise(registry, channel.noise_power),
            computation: ComputationModel::new(registry),
            utility: UtilityModel::new(registry),
            config,
            current_time_slot: 0,
            cumulative_utility: 0.0,
            state: Self::initial_state(registry),
        }
    }

    fn initial_state(registry: &EntityRegistry) -> State {
        State::zeros(
            registry.ue_count(),
            registry.server_count(ServerKind::Vehicular),
            registry.server_count(ServerKind::Fixed),
        )
    }

    pub fn registry(&self) -> &'a EntityRegistry {
        self.registry
    }

    pub fn communication(&self) -> &CommunicationModel<'a> {
        &self.communication
    }

    pub fn computation(&self) -> &ComputationModel<'a> {
        &self.computation
    }

    pub fn utility(&self) -> &UtilityModel<'a> {
        &self.utility
    }

    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn current_time_slot(&self) -> u32 {
        self.current_time_slot
    }

    /// Network utility summed over every step of the current episode
    pub fn cumulative_utility(&self) -> f64 {
        self.cumulative_utility
    }

    /// Start a new episode and return its initial state
    pub fn reset(&mut self) -> State {
        self.current_time_slot = 0;
        self.cumulative_utility = 0.0;
        self.communication.invalidate();
        self.state = Self::initial_state(self.registry);

        debug!(
            ues = self.registry.ue_count(),
            ves = self.registry.server_count(ServerKind::Vehicular),
            fes = self.registry.server_count(ServerKind::Fixed),
            "Environment reset"
        );
        self.state.clone()
    }

    /// Apply `action` for the next time slot
    ///
    /// Nothing is committed if the action cannot be evaluated.
    pub fn step(&mut self, action: &Action) -> Result<StepOutcome> {
        let state = self.communication.get_state(action)?;
        let utility = self.utility.breakdown(action, &state)?;

        self.current_time_slot += 1;
        self.cumulative_utility += utility.total;
        self.state = state.clone();

        let reward = if utility.total >= self.config.reward_threshold { 1 } else { -1 };
        let done = self.current_time_slot >= self.config.time_slot_max;

        trace!(
            time_slot = self.current_time_slot,
            utility = utility.total,
            reward,
            done,
            "Step"
        );

        Ok(StepOutcome {
            state,
            utility,
            reward,
            done,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;
    use vec_core::VecError;

    fn registry(ues: usize, ves: usize, fes: usize) -> EntityRegistry {
        EntityRegistry::with_defaults(&TopologyConfig::new(ues, ves, fes)).unwrap()
    }

    #[test]
    fn test_episode_runs_to_horizon() {
        let registry = registry(3, 2, 4);
        let config = EpisodeConfig {
            time_slot_max: 5,
            reward_threshold: 0.0,
        };
        let mut env = Environment::new(&registry, &ChannelConfig::default(), config);
        let action = Action::local_for(&registry);

        let initial = env.reset();
        assert_eq!(initial, State::zeros(3, 2, 4));

        for slot in 1..=5 {
            let outcome = env.step(&action).unwrap();
            assert_eq!(env.current_time_slot(), slot);
            assert_eq!(outcome.reward, 1);
            assert_eq!(outcome.done, slot == 5);
            assert_eq!(outcome.utility.total, 3.0 * 2501.0);
        }
        assert_eq!(env.cumulative_utility(), 5.0 * 3.0 * 2501.0);
    }

    #[test]
    fn test_reward_below_threshold_is_negative() {
        let registry = registry(2, 2, 2);
        let config = EpisodeConfig {
            time_slot_max: 40,
            reward_threshold: 10_000.0,
        };
        let mut env = Environment::new(&registry, &ChannelConfig::default(), config);

        let outcome = env.step(&Action::local_for(&registry)).unwrap();
        assert_eq!(outcome.reward, -1);
        assert!(!outcome.done);
    }

    #[test]
    fn test_reset_clears_episode() {
        let registry = registry(2, 3, 3);
        let mut env = Environment::new(&registry, &ChannelConfig::default(), EpisodeConfig::default());

        let mut action = Action::local_for(&registry);
        action.offload(0, ServerKind::Vehicular, 1.0, 1.0).unwrap();
        let outcome = env.step(&action).unwrap();
        assert!(outcome.state.ves_data_rate[0][0] > 0.0);
        assert_eq!(env.state(), &outcome.state);
        assert!(env.communication().efficiency_matrix(ServerKind::Vehicular).is_complete());

        env.reset();
        assert_eq!(env.current_time_slot(), 0);
        assert_eq!(env.cumulative_utility(), 0.0);
        assert_eq!(env.state(), &State::zeros(2, 3, 3));
        assert!(!env.communication().efficiency_matrix(ServerKind::Vehicular).is_complete());
    }

    #[test]
    fn test_failed_step_commits_nothing() {
        let registry = registry(1, 1, 3);
        let mut env = Environment::new(&registry, &ChannelConfig::default(), EpisodeConfig::default());

        let mut action = Action::local_for(&registry);
        action.offload(0, ServerKind::Vehicular, 1.0, 1.0).unwrap();

        assert!(matches!(env.step(&action), Err(VecError::Domain { .. })));
        assert_eq!(env.current_time_slot(), 0);
        assert_eq!(env.cumulative_utility(), 0.0);
    }

    #[test]
    fn test_noise_power_reaches_communication_model() {
        let registry = registry(1, 1, 1);
        let channel = ChannelConfig { noise_power: 1.0 };
        let mut env = Environment::new(&registry, &channel, EpisodeConfig::default());

        // Only noise in the denominator: log2(1 + 100 / 1)
        let mut action = Action::local_for(&registry);
        action.offload(0, ServerKind::Fixed, 1.0, 1.0).unwrap();
        let outcome = env.step(&action).unwrap();

        let expected = 10.0 * 101.0f64.log2();
        assert!((outcome.state.fes_data_rate[0][0] - expected).abs() < 1e-12);

        let latency = env
            .computation()
            .execution_time(&outcome.state, 0, 0, ServerKind::Fixed)
            .unwrap();
        assert!((latency - (1.0 / expected + 2500.0 / 100.0)).abs() < 1e-12);
    }
}
