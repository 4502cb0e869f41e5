//! Multi-episode runner
//!
//! Drives an [`Environment`] with an [`OffloadPolicy`] and collects one
//! [`EpisodeResult`] per episode. A step that fails ends its episode; the
//! error is kept in the result and the next episode starts normally.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::environment::Environment;
use crate::policies::OffloadPolicy;

/// Outcome of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub episode: usize,
    pub score: i64,
    pub steps: u32,
    pub total_utility: f64,
    pub mean_utility: f64,
    pub error: Option<String>,
}

impl EpisodeResult {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a full run with one policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub policy_name: String,
    pub episodes: Vec<EpisodeResult>,
    pub mean_score: f64,
    pub failed_episodes: usize,
}

impl RunSummary {
    fn from_episodes(policy_name: String, episodes: Vec<EpisodeResult>) -> Self {
        let mean_score = if episodes.is_empty() {
            0.0
        } else {
            episodes.iter().map(|e| e.score as f64).sum::<f64>() / episodes.len() as f64
        };
        let failed_episodes = episodes.iter().filter(|e| !e.is_complete()).count();

        RunSummary {
            policy_name,
            episodes,
            mean_score,
            failed_episodes,
        }
    }
}

/// Runs episodes of an environment under one policy
pub struct EpisodeRunner<'a> {
    env: Environment<'a>,
    policy: Box<dyn OffloadPolicy>,
}

impl<'a> EpisodeRunner<'a> {
    pub fn new(env: Environment<'a>, policy: Box<dyn OffloadPolicy>) -> Self {
        EpisodeRunner { env, policy }
    }

    pub fn environment(&self) -> &Environment<'a> {
        &self.env
    }

    /// Run a single episode until the horizon or the first failed step
    pub fn run_episode(&mut self, episode: usize, rng: &mut dyn RngCore) -> EpisodeResult {
        self.env.reset();

        let mut score = 0i64;
        let mut steps = 0u32;
        let mut error = None;

        loop {
            let action = self.policy.select_action(self.env.registry(), rng);
            match self.env.step(&action) {
                Ok(outcome) => {
                    score += i64::from(outcome.reward);
                    steps += 1;
                    if outcome.done {
                        break;
                    }
                }
                Err(e) => {
                    warn!(episode, step = steps + 1, error = %e, "Step failed, ending episode");
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let total_utility = self.env.cumulative_utility();
        let mean_utility = if steps > 0 { total_utility / steps as f64 } else { 0.0 };

        info!(
            episode,
            policy = self.policy.name(),
            score,
            steps,
            mean_utility,
            "Episode finished"
        );

        EpisodeResult {
            episode,
            score,
            steps,
            total_utility,
            mean_utility,
            error,
        }
    }

    /// Run `episodes` episodes, numbered from 1
    pub fn run(&mut self, episodes: usize, rng: &mut dyn RngCore) -> RunSummary {
        let results = (1..=episodes)
            .map(|episode| self.run_episode(episode, rng))
            .collect();

        RunSummary::from_episodes(self.policy.name().to_string(), results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, EpisodeConfig, TopologyConfig};
    use crate::entities::EntityRegistry;
    use crate::policies::{FullOffloadPolicy, LocalOnlyPolicy, RandomPolicy};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vec_core::ServerKind;

    fn registry(ues: usize, ves: usize, fes: usize) -> EntityRegistry {
        EntityRegistry::with_defaults(&TopologyConfig::new(ues, ves, fes)).unwrap()
    }

    #[test]
    fn test_local_only_scores_every_step() {
        let registry = registry(4, 3, 6);
        let env = Environment::new(&registry, &ChannelConfig::default(), EpisodeConfig::default());
        let mut runner = EpisodeRunner::new(env, Box::new(LocalOnlyPolicy::new()));

        let summary = runner.run(3, &mut StdRng::seed_from_u64(1));

        assert_eq!(summary.policy_name, "LocalOnly");
        assert_eq!(summary.episodes.len(), 3);
        assert_eq!(summary.failed_episodes, 0);
        for (i, result) in summary.episodes.iter().enumerate() {
            assert_eq!(result.episode, i + 1);
            assert_eq!(result.steps, 40);
            assert_eq!(result.score, 40);
            assert_eq!(result.mean_utility, 4.0 * 2501.0);
        }
        assert_eq!(summary.mean_score, 40.0);
    }

    #[test]
    fn test_random_policy_is_reproducible_per_seed() {
        let registry = registry(5, 4, 8);

        let run = |seed| {
            let env = Environment::new(&registry, &ChannelConfig::default(), EpisodeConfig::default());
            let mut runner = EpisodeRunner::new(env, Box::new(RandomPolicy::new()));
            runner.run(2, &mut StdRng::seed_from_u64(seed))
        };

        let a = run(17);
        let b = run(17);
        assert_eq!(a, b);
        assert_eq!(a.failed_episodes, 0);
        assert!(a.episodes.iter().all(|e| e.steps == 40));
    }

    #[test]
    fn test_failed_step_ends_episode() {
        // A single VES leaves only noise in the denominator
        let registry = registry(4, 1, 6);
        let env = Environment::new(&registry, &ChannelConfig::default(), EpisodeConfig::default());
        let mut runner = EpisodeRunner::new(env, Box::new(FullOffloadPolicy::new(ServerKind::Vehicular)));

        let summary = runner.run(2, &mut StdRng::seed_from_u64(5));

        assert_eq!(summary.failed_episodes, 2);
        for result in &summary.episodes {
            assert_eq!(result.steps, 0);
            assert_eq!(result.score, 0);
            assert!(result.error.as_deref().unwrap().starts_with("Domain error"));
        }
    }

    #[test]
    fn test_summary_serializes() {
        let registry = registry(2, 2, 2);
        let config = EpisodeConfig {
            time_slot_max: 2,
            reward_threshold: 0.0,
        };
        let env = Environment::new(&registry, &ChannelConfig::default(), config);
        let mut runner = EpisodeRunner::new(env, Box::new(LocalOnlyPolicy::new()));

        let summary = runner.run(1, &mut StdRng::seed_from_u64(0));
        let json = serde_json::to_string_pretty(&summary).unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, summary);
        assert!(json.contains("\"policy_name\": \"LocalOnly\""));
    }
}
