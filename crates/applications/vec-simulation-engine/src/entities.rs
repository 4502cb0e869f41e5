//! Entity registry: user equipments and edge servers for one episode
//!
//! Vehicular and fixed edge servers share one record type tagged with a
//! [`ServerKind`]; they differ only in their default parameters. Every
//! per-UE vector on a server is indexed by UE position.

use serde::{Deserialize, Deserializer, Serialize, de};
use vec_core::{Result, ServerKind, Task, VecError};

use crate::config::{EntityDefaults, ServerDefaults, TaskProfile, TopologyConfig, UeDefaults};

/// A user equipment that generates one task per episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEquipment {
    pub transmitting_power: f64,
    pub computation_capability: f64,
    pub spectrum_price: f64,
    pub resource_price: f64,
    pub task: Task,
}

impl UserEquipment {
    pub fn new(defaults: &UeDefaults, task: Task) -> Self {
        UserEquipment {
            transmitting_power: defaults.transmitting_power,
            computation_capability: defaults.computation_capability,
            spectrum_price: defaults.spectrum_price,
            resource_price: defaults.resource_price,
            task,
        }
    }
}

/// A vehicular or fixed edge server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeServer {
    pub kind: ServerKind,
    pub computation_capability: f64,
    pub bandwidth: f64,
    pub spectrum_price: Vec<f64>,  // Per UE
    pub resource_price: Vec<f64>,  // Per UE
    pub channel_gain: Vec<f64>,    // Per UE
}

impl EdgeServer {
    /// Create a server of `kind` with uniform per-UE vectors
    pub fn new(kind: ServerKind, defaults: &ServerDefaults, ue_count: usize) -> Self {
        EdgeServer {
            kind,
            computation_capability: defaults.computation_capability,
            bandwidth: defaults.bandwidth,
            spectrum_price: vec![defaults.spectrum_price; ue_count],
            resource_price: vec![defaults.resource_price; ue_count],
            channel_gain: vec![defaults.channel_gain; ue_count],
        }
    }

    /// Vehicular edge server with the given defaults
    pub fn vehicular(defaults: &ServerDefaults, ue_count: usize) -> Self {
        Self::new(ServerKind::Vehicular, defaults, ue_count)
    }

    /// Fixed edge server with the given defaults
    pub fn fixed(defaults: &ServerDefaults, ue_count: usize) -> Self {
        Self::new(ServerKind::Fixed, defaults, ue_count)
    }

    fn validate(&self, index: usize, ue_count: usize) -> Result<()> {
        let name = format!("{} server {}", self.kind, index);

        if !(self.computation_capability > 0.0) {
            return Err(VecError::config(format!(
                "{} has non-positive computation capability {}",
                name, self.computation_capability
            )));
        }
        if !(self.bandwidth > 0.0) {
            return Err(VecError::config(format!(
                "{} has non-positive bandwidth {}",
                name, self.bandwidth
            )));
        }

        for (field, values) in [
            ("spectrum_price", &self.spectrum_price),
            ("resource_price", &self.resource_price),
            ("channel_gain", &self.channel_gain),
        ] {
            if values.len() != ue_count {
                return Err(VecError::config(format!(
                    "{} has {} entries in {}, expected one per UE ({})",
                    name,
                    values.len(),
                    field,
                    ue_count
                )));
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(VecError::config(format!("{} has a non-finite {}", name, field)));
            }
            if field == "channel_gain" && values.iter().any(|v| *v < 0.0) {
                return Err(VecError::config(format!("{} has a negative channel gain", name)));
            }
        }

        Ok(())
    }
}

/// Owns every entity of one episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRegistry {
    ues: Vec<UserEquipment>,
    vehicular: Vec<EdgeServer>,
    fixed: Vec<EdgeServer>,
}

// Deserialized registries go through the same checks as `from_parts`
impl<'de> Deserialize<'de> for EntityRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Parts {
            ues: Vec<UserEquipment>,
            vehicular: Vec<EdgeServer>,
            fixed: Vec<EdgeServer>,
        }

        let parts = Parts::deserialize(deserializer)?;
        EntityRegistry::from_parts(parts.ues, parts.vehicular, parts.fixed)
            .map_err(de::Error::custom)
    }
}

impl EntityRegistry {
    /// Build a registry with default parameters for every entity
    pub fn build(
        topology: &TopologyConfig,
        defaults: &EntityDefaults,
        task: &TaskProfile,
    ) -> Result<Self> {
        let ue_count = topology.ue_count;

        let ues = (0..ue_count)
            .map(|_| UserEquipment::new(&defaults.ue, task.generate()))
            .collect();
        let vehicular = (0..topology.ves_count)
            .map(|_| EdgeServer::vehicular(&defaults.vehicular, ue_count))
            .collect();
        let fixed = (0..topology.fes_count)
            .map(|_| EdgeServer::fixed(&defaults.fixed, ue_count))
            .collect();

        Self::from_parts(ues, vehicular, fixed)
    }

    /// Build a registry with the stock defaults and task profile
    pub fn with_defaults(topology: &TopologyConfig) -> Result<Self> {
        Self::build(topology, &EntityDefaults::default(), &TaskProfile::default())
    }

    /// Assemble a registry from explicit records, checking all invariants
    pub fn from_parts(
        ues: Vec<UserEquipment>,
        vehicular: Vec<EdgeServer>,
        fixed: Vec<EdgeServer>,
    ) -> Result<Self> {
        let registry = EntityRegistry {
            ues,
            vehicular,
            fixed,
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Check vector lengths, capabilities and server tags
    pub fn validate(&self) -> Result<()> {
        let ue_count = self.ues.len();

        for (index, ue) in self.ues.iter().enumerate() {
            if !(ue.transmitting_power > 0.0) {
                return Err(VecError::config(format!(
                    "UE {} has non-positive transmitting power {}",
                    index, ue.transmitting_power
                )));
            }
            if !(ue.computation_capability > 0.0) {
                return Err(VecError::config(format!(
                    "UE {} has non-positive computation capability {}",
                    index, ue.computation_capability
                )));
            }
            if !(ue.task.data_size > 0.0) || !(ue.task.resource_cycles > 0.0) {
                return Err(VecError::config(format!(
                    "UE {} has an empty task {:?}",
                    index, ue.task
                )));
            }
        }

        for kind in ServerKind::ALL {
            for (index, server) in self.servers(kind).iter().enumerate() {
                if server.kind != kind {
                    return Err(VecError::config(format!(
                        "{} server {} is listed among {} servers",
                        server.kind, index, kind
                    )));
                }
                server.validate(index, ue_count)?;
            }
        }

        Ok(())
    }

    pub fn ues(&self) -> &[UserEquipment] {
        &self.ues
    }

    pub fn servers(&self, kind: ServerKind) -> &[EdgeServer] {
        match kind {
            ServerKind::Vehicular => &self.vehicular,
            ServerKind::Fixed => &self.fixed,
        }
    }

    pub fn ue_count(&self) -> usize {
        self.ues.len()
    }

    pub fn server_count(&self, kind: ServerKind) -> usize {
        self.servers(kind).len()
    }

    pub fn ue(&self, index: usize) -> Result<&UserEquipment> {
        self.ues
            .get(index)
            .ok_or(VecError::UnknownEntity { what: "UE", index })
    }

    pub fn server(&self, kind: ServerKind, index: usize) -> Result<&EdgeServer> {
        self.servers(kind).get(index).ok_or(VecError::UnknownEntity {
            what: kind.entity_name(),
            index,
        })
    }

    /// Set the channel gain of the (server, ue) link
    pub fn set_channel_gain(
        &mut self,
        kind: ServerKind,
        server: usize,
        ue: usize,
        gain: f64,
    ) -> Result<()> {
        if !gain.is_finite() || gain < 0.0 {
            return Err(VecError::config(format!(
                "channel gain {} must be finite and non-negative",
                gain
            )));
        }
        self.ue(ue)?;
        self.server(kind, server)?;

        let servers = match kind {
            ServerKind::Vehicular => &mut self.vehicular,
            ServerKind::Fixed => &mut self.fixed,
        };
        servers[server].channel_gain[ue] = gain;
        Ok(())
    }

    /// Multiply every server's spectrum and resource price by `factor`
    pub fn scale_prices(&mut self, factor: f64) {
        for server in self.vehicular.iter_mut().chain(self.fixed.iter_mut()) {
            server.spectrum_price.iter_mut().for_each(|p| *p *= factor);
            server.resource_price.iter_mut().for_each(|p| *p *= factor);
        }
    }
}
