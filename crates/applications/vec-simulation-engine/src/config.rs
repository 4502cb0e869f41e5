//! Simulation configuration
//!
//! Every knob has a default matching the reference VEC market: a handful of
//! UEs, a few vehicles and a few dozen small cells, unit prices everywhere and
//! a single homogeneous task profile.

use std::ops::RangeInclusive;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use vec_core::{Result, Task, VecError};

/// Default noise power on every link (same units as transmit power x gain)
pub const DEFAULT_NOISE_POWER: f64 = -100.0;

/// Default number of time slots per episode
pub const DEFAULT_TIME_SLOT_MAX: u32 = 40;

/// Concrete episode topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub ue_count: usize,
    pub ves_count: usize,
    pub fes_count: usize,
}

impl TopologyConfig {
    pub fn new(ue_count: usize, ves_count: usize, fes_count: usize) -> Self {
        TopologyConfig {
            ue_count,
            ves_count,
            fes_count,
        }
    }
}

/// Ranges the topology is sampled from when no explicit counts are given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyRanges {
    pub ue: RangeInclusive<usize>,
    pub vehicles: RangeInclusive<usize>,     // One VES per vehicle
    pub small_cells: RangeInclusive<usize>,  // One FES per small cell
}

impl Default for TopologyRanges {
    fn default() -> Self {
        TopologyRanges {
            ue: 4..=10,
            vehicles: 1..=10,
            small_cells: 5..=50,
        }
    }
}

impl TopologyRanges {
    /// Check that every range is non-empty and starts above zero
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("ue", &self.ue),
            ("vehicles", &self.vehicles),
            ("small_cells", &self.small_cells),
        ] {
            if range.is_empty() || *range.start() == 0 {
                return Err(VecError::config(format!(
                    "topology range '{}' must be non-empty and start at 1 or more, got {:?}",
                    name, range
                )));
            }
        }
        Ok(())
    }

    /// Sample a topology using the caller's generator
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<TopologyConfig> {
        self.validate()?;
        Ok(TopologyConfig {
            ue_count: rng.gen_range(self.ue.clone()),
            ves_count: rng.gen_range(self.vehicles.clone()),
            fes_count: rng.gen_range(self.small_cells.clone()),
        })
    }
}

/// Topology section: either sampled from ranges or pinned to explicit counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySection {
    pub ranges: TopologyRanges,
    pub fixed: Option<TopologyConfig>,
}

impl TopologySection {
    /// Resolve the episode topology, sampling only when nothing is pinned
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> Result<TopologyConfig> {
        match self.fixed {
            Some(topology) => Ok(topology),
            None => self.ranges.sample(rng),
        }
    }
}

/// Default attributes for a user equipment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UeDefaults {
    pub transmitting_power: f64,
    pub computation_capability: f64,
    pub spectrum_price: f64,  // Charged by the VEC operator per unit of data
    pub resource_price: f64,  // Charged by the VEC operator per CPU cycle
}

impl Default for UeDefaults {
    fn default() -> Self {
        UeDefaults {
            transmitting_power: 100.0,
            computation_capability: 0.5,
            spectrum_price: 1.0,
            resource_price: 1.0,
        }
    }
}

/// Default attributes for one kind of edge server
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerDefaults {
    pub computation_capability: f64,
    pub bandwidth: f64,
    pub spectrum_price: f64,  // Paid by the operator per UE, per unit of data rate
    pub resource_price: f64,  // Paid by the operator per UE, per unit of resource
    pub channel_gain: f64,
}

impl ServerDefaults {
    /// Vehicular edge server defaults
    pub fn vehicular() -> Self {
        ServerDefaults {
            computation_capability: 20.0,
            bandwidth: 5.0,
            spectrum_price: 1.0,
            resource_price: 1.0,
            channel_gain: 1.0,
        }
    }

    /// Fixed edge server defaults
    pub fn fixed() -> Self {
        ServerDefaults {
            computation_capability: 100.0,
            bandwidth: 10.0,
            spectrum_price: 1.0,
            resource_price: 1.0,
            channel_gain: 1.0,
        }
    }
}

/// Field-by-field override of a [`ServerDefaults`]
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct ServerOverrides {
    computation_capability: Option<f64>,
    bandwidth: Option<f64>,
    spectrum_price: Option<f64>,
    resource_price: Option<f64>,
    channel_gain: Option<f64>,
}

impl ServerOverrides {
    fn apply(self, base: ServerDefaults) -> ServerDefaults {
        ServerDefaults {
            computation_capability: self.computation_capability.unwrap_or(base.computation_capability),
            bandwidth: self.bandwidth.unwrap_or(base.bandwidth),
            spectrum_price: self.spectrum_price.unwrap_or(base.spectrum_price),
            resource_price: self.resource_price.unwrap_or(base.resource_price),
            channel_gain: self.channel_gain.unwrap_or(base.channel_gain),
        }
    }
}

/// Default attributes for every entity type
///
/// Server sections may be partial; missing fields keep that kind's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntityDefaults {
    pub ue: UeDefaults,
    pub vehicular: ServerDefaults,
    pub fixed: ServerDefaults,
}

impl<'de> Deserialize<'de> for EntityDefaults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Sections {
            ue: UeDefaults,
            vehicular: ServerOverrides,
            fixed: ServerOverrides,
        }

        let sections = Sections::deserialize(deserializer)?;
        Ok(EntityDefaults {
            ue: sections.ue,
            vehicular: sections.vehicular.apply(ServerDefaults::vehicular()),
            fixed: sections.fixed.apply(ServerDefaults::fixed()),
        })
    }
}

impl Default for EntityDefaults {
    fn default() -> Self {
        EntityDefaults {
            ue: UeDefaults::default(),
            vehicular: ServerDefaults::vehicular(),
            fixed: ServerDefaults::fixed(),
        }
    }
}

/// Task every UE generates at the start of an episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskProfile {
    pub data_size: f64,
    pub resource_cycles: f64,
    pub max_latency: f64,
}

impl Default for TaskProfile {
    fn default() -> Self {
        TaskProfile {
            data_size: 1.0,
            resource_cycles: 2500.0,
            max_latency: 10.0,
        }
    }
}

impl TaskProfile {
    /// Generate a task from this profile
    pub fn generate(&self) -> Task {
        Task::new(self.data_size, self.resource_cycles, self.max_latency)
    }
}

/// Wireless channel parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub noise_power: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            noise_power: DEFAULT_NOISE_POWER,
        }
    }
}

/// Episode horizon and reward shaping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    pub time_slot_max: u32,
    /// A step earns +1 when its network utility reaches this value, -1 otherwise
    pub reward_threshold: f64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        EpisodeConfig {
            time_slot_max: DEFAULT_TIME_SLOT_MAX,
            reward_threshold: 0.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub topology: TopologySection,
    pub entities: EntityDefaults,
    pub task: TaskProfile,
    pub channel: ChannelConfig,
    pub episode: EpisodeConfig,
}

impl SimulationConfig {
    /// Load a config from a JSON file; missing fields fall back to defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the parts of the config that are not covered by registry validation
    pub fn validate(&self) -> Result<()> {
        if self.topology.fixed.is_none() {
            self.topology.ranges.validate()?;
        }
        if self.episode.time_slot_max == 0 {
            return Err(VecError::config("episode.time_slot_max must be at least 1"));
        }
        if !self.channel.noise_power.is_finite() {
            return Err(VecError::config("channel.noise_power must be finite"));
        }
        Ok(())
    }
}
