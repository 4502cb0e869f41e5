//! Action policies for driving the environment
//!
//! Implements policies to compare:
//! - Random: sample every decision and share uniformly (reference behaviour)
//! - LocalOnly: never offload (revenue-only baseline)
//! - FullOffload: push every UE to one server kind with full shares

use rand::RngCore;
use rand_distr::{Distribution, Uniform};
use vec_core::{ServerKind, TransitionState};

use crate::action::Action;
use crate::entities::EntityRegistry;

/// Action policy trait
pub trait OffloadPolicy {
    /// Choose the action for the next time slot
    fn select_action(&mut self, registry: &EntityRegistry, rng: &mut dyn RngCore) -> Action;

    /// Get policy name
    fn name(&self) -> &str;
}

/// Uniformly random transition states and shares
pub struct RandomPolicy {
    transition: Uniform<u8>,
    share: Uniform<f64>,
}

impl RandomPolicy {
    pub fn new() -> Self {
        RandomPolicy {
            transition: Uniform::new(0, TransitionState::COUNT),
            share: Uniform::new_inclusive(0.0, 1.0),
        }
    }

    fn sample_shares(&self, ue_count: usize, server_count: usize, rng: &mut dyn RngCore) -> Vec<Vec<f64>> {
        (0..ue_count)
            .map(|_| (0..server_count).map(|_| self.share.sample(rng)).collect())
            .collect()
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl OffloadPolicy for RandomPolicy {
    fn select_action(&mut self, registry: &EntityRegistry, rng: &mut dyn RngCore) -> Action {
        let ue_count = registry.ue_count();
        let ves_count = registry.server_count(ServerKind::Vehicular);
        let fes_count = registry.server_count(ServerKind::Fixed);

        let transition_state = (0..ue_count)
            .map(|_| match self.transition.sample(rng) {
                0 => TransitionState::Local,
                1 => TransitionState::Vehicular,
                _ => TransitionState::Fixed,
            })
            .collect();

        Action {
            transition_state,
            ves_spectrum_share: self.sample_shares(ue_count, ves_count, rng),
            fes_spectrum_share: self.sample_shares(ue_count, fes_count, rng),
            ves_resource_share: self.sample_shares(ue_count, ves_count, rng),
            fes_resource_share: self.sample_shares(ue_count, fes_count, rng),
        }
    }

    fn name(&self) -> &str {
        "Random"
    }
}

/// Baseline policy: every task runs on its own UE
pub struct LocalOnlyPolicy;

impl LocalOnlyPolicy {
    pub fn new() -> Self {
        LocalOnlyPolicy
    }
}

impl OffloadPolicy for LocalOnlyPolicy {
    fn select_action(&mut self, registry: &EntityRegistry, _rng: &mut dyn RngCore) -> Action {
        Action::local_for(registry)
    }

    fn name(&self) -> &str {
        "LocalOnly"
    }
}

/// Offload every UE to every server of one kind with full shares
pub struct FullOffloadPolicy {
    kind: ServerKind,
    name: String,
}

impl FullOffloadPolicy {
    pub fn new(kind: ServerKind) -> Self {
        FullOffloadPolicy {
            kind,
            name: format!("FullOffload({})", kind),
        }
    }
}

impl OffloadPolicy for FullOffloadPolicy {
    fn select_action(&mut self, registry: &EntityRegistry, _rng: &mut dyn RngCore) -> Action {
        let ue_count = registry.ue_count();
        let full = vec![vec![1.0; registry.server_count(self.kind)]; ue_count];

        let mut action = Action::local_for(registry);
        action.transition_state = vec![self.kind.transition_state(); ue_count];
        match self.kind {
            ServerKind::Vehicular => {
                action.ves_spectrum_share = full.clone();
                action.ves_resource_share = full;
            }
            ServerKind::Fixed => {
                action.fes_spectrum_share = full.clone();
                action.fes_resource_share = full;
            }
        }
        action
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn registry() -> EntityRegistry {
        EntityRegistry::with_defaults(&TopologyConfig::new(5, 3, 6)).unwrap()
    }

    #[test]
    fn test_random_policy_produces_valid_actions() {
        let registry = registry();
        let mut policy = RandomPolicy::new();
        let mut rng = StdRng::seed_from_u64(3);

        let mut seen = [false; 3];
        for _ in 0..100 {
            let action = policy.select_action(&registry, &mut rng);
            assert!(action.validate(&registry).is_ok());
            for state in &action.transition_state {
                seen[u8::from(*state) as usize] = true;
            }
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_random_policy_is_reproducible() {
        let registry = registry();
        let mut policy = RandomPolicy::new();

        let a = policy.select_action(&registry, &mut StdRng::seed_from_u64(9));
        let b = policy.select_action(&registry, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_local_only_policy() {
        let registry = registry();
        let mut policy = LocalOnlyPolicy::new();

        let action = policy.select_action(&registry, &mut StdRng::seed_from_u64(0));
        assert!(action.transition_state.iter().all(|s| *s == TransitionState::Local));
        assert_eq!(policy.name(), "LocalOnly");
    }

    #[test]
    fn test_full_offload_policy() {
        let registry = registry();
        let mut policy = FullOffloadPolicy::new(ServerKind::Fixed);

        let action = policy.select_action(&registry, &mut StdRng::seed_from_u64(0));
        assert!(action.validate(&registry).is_ok());
        assert!(action.transition_state.iter().all(|s| *s == TransitionState::Fixed));
        assert_eq!(action.fes_resource_share, vec![vec![1.0; 6]; 5]);
        assert_eq!(action.ves_spectrum_share, vec![vec![0.0; 3]; 5]);
        assert_eq!(policy.name(), "FullOffload(fixed)");
    }

    #[test]
    fn test_full_offload_vehicular_fills_only_vehicular_rows() {
        let registry = registry();
        let mut policy = FullOffloadPolicy::new(ServerKind::Vehicular);

        let action = policy.select_action(&registry, &mut StdRng::seed_from_u64(0));
        assert!(action.validate(&registry).is_ok());
        assert_eq!(action.transition_state, vec![TransitionState::Vehicular; 5]);
        assert_eq!(action.ves_spectrum_share, vec![vec![1.0; 3]; 5]);
        assert_eq!(action.ves_resource_share, vec![vec![1.0; 3]; 5]);
        assert_eq!(action.fes_resource_share, vec![vec![0.0; 6]; 5]);
    }
}
