//! Computation model
//!
//! Task latency for local execution and for offloading to one edge server.
//! Offload latencies read the state produced by the communication model and
//! are only defined for a server the UE was actually given rate/resource on.

use vec_core::{Result, ServerKind, VecError};

use crate::entities::EntityRegistry;
use crate::state::State;

/// Computation model over a borrowed registry
#[derive(Debug, Clone, Copy)]
pub struct ComputationModel<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> ComputationModel<'a> {
    pub fn new(registry: &'a EntityRegistry) -> Self {
        ComputationModel { registry }
    }

    /// Time to run the UE's task on the UE itself
    pub fn local_time(&self, ue: usize) -> Result<f64> {
        let record = self.registry.ue(ue)?;
        Ok(record.task.resource_cycles / record.computation_capability)
    }

    /// Time to upload the UE's task to `server`
    pub fn communication_time(
        &self,
        state: &State,
        ue: usize,
        server: usize,
        kind: ServerKind,
    ) -> Result<f64> {
        let task = self.registry.ue(ue)?.task;
        let rate = state.data_rate(kind, ue, server)?;
        if rate == 0.0 {
            return Err(VecError::DivisionByZero {
                ue,
                server,
                kind,
                quantity: "data rate",
            });
        }
        Ok(task.data_size / rate)
    }

    /// Time to run the UE's task on `server`
    pub fn computation_time(
        &self,
        state: &State,
        ue: usize,
        server: usize,
        kind: ServerKind,
    ) -> Result<f64> {
        let task = self.registry.ue(ue)?.task;
        let resource = state.allocated_resource(kind, ue, server)?;
        if resource == 0.0 {
            return Err(VecError::DivisionByZero {
                ue,
                server,
                kind,
                quantity: "allocated resource",
            });
        }
        Ok(task.resource_cycles / resource)
    }

    /// Upload time plus remote computation time
    pub fn execution_time(
        &self,
        state: &State,
        ue: usize,
        server: usize,
        kind: ServerKind,
    ) -> Result<f64> {
        Ok(self.communication_time(state, ue, server, kind)?
            + self.computation_time(state, ue, server, kind)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::communication::CommunicationModel;
    use crate::config::TopologyConfig;

    fn registry(ues: usize, ves: usize, fes: usize) -> EntityRegistry {
        EntityRegistry::with_defaults(&TopologyConfig::new(ues, ves, fes)).unwrap()
    }

    #[test]
    fn test_local_time() {
        let registry = registry(2, 2, 2);
        let model = ComputationModel::new(&registry);

        // 2500 cycles on a 0.5 capability UE
        assert_eq!(model.local_time(1).unwrap(), 5000.0);
        assert!(matches!(
            model.local_time(2),
            Err(VecError::UnknownEntity { what: "UE", index: 2 })
        ));
    }

    #[test]
    fn test_execution_time_offload_to_vehicular() {
        // 1 UE x 2 other VESs x 100 - 100 noise = 100, so efficiency is log2(2) = 1
        let registry = registry(1, 3, 3);
        let mut communication = CommunicationModel::new(&registry);
        let model = ComputationModel::new(&registry);

        let mut action = Action::local_for(&registry);
        action.offload(0, ServerKind::Vehicular, 1.0, 1.0).unwrap();
        let state = communication.get_state(&action).unwrap();

        let efficiency = communication
            .spectral_efficiency(0, 0, ServerKind::Vehicular)
            .unwrap();
        assert_eq!(efficiency, 1.0);

        let expected = 1.0 / (5.0 * efficiency) + 2500.0 / (1.0 * 20.0);
        let actual = model.execution_time(&state, 0, 0, ServerKind::Vehicular).unwrap();
        assert!((actual - expected).abs() < 1e-12);
        assert!((actual - 125.2).abs() < 1e-12);
    }

    #[test]
    fn test_execution_time_offload_to_fixed() {
        let registry = registry(2, 2, 3);
        let mut communication = CommunicationModel::new(&registry);
        let model = ComputationModel::new(&registry);

        let mut action = Action::local_for(&registry);
        action.offload(1, ServerKind::Fixed, 0.5, 0.5).unwrap();
        let state = communication.get_state(&action).unwrap();

        // 2 UEs x 2 other FESs x 100 - 100 noise = 300
        let rate = 0.5 * 10.0 * (1.0f64 + 100.0 / 300.0).log2();
        let communication_time = model.communication_time(&state, 1, 2, ServerKind::Fixed).unwrap();
        let computation_time = model.computation_time(&state, 1, 2, ServerKind::Fixed).unwrap();

        assert!((communication_time - 1.0 / rate).abs() < 1e-12);
        assert_eq!(computation_time, 2500.0 / 50.0);
    }

    #[test]
    fn test_zero_share_is_division_by_zero() {
        let registry = registry(2, 3, 2);
        let mut communication = CommunicationModel::new(&registry);
        let model = ComputationModel::new(&registry);

        let mut action = Action::local_for(&registry);
        action.offload(0, ServerKind::Vehicular, 0.0, 0.0).unwrap();
        let state = communication.get_state(&action).unwrap();

        assert!(matches!(
            model.communication_time(&state, 0, 1, ServerKind::Vehicular),
            Err(VecError::DivisionByZero { quantity: "data rate", .. })
        ));
        assert!(matches!(
            model.computation_time(&state, 0, 1, ServerKind::Vehicular),
            Err(VecError::DivisionByZero { quantity: "allocated resource", .. })
        ));
        assert!(model.execution_time(&state, 0, 1, ServerKind::Vehicular).is_err());
    }

    #[test]
    fn test_unselected_server_is_division_by_zero() {
        let registry = registry(2, 3, 2);
        let mut communication = CommunicationModel::new(&registry);
        let model = ComputationModel::new(&registry);

        let mut action = Action::local_for(&registry);
        action.offload(0, ServerKind::Vehicular, 1.0, 1.0).unwrap();
        let state = communication.get_state(&action).unwrap();

        assert!(model.execution_time(&state, 0, 0, ServerKind::Vehicular).is_ok());
        assert!(matches!(
            model.execution_time(&state, 0, 0, ServerKind::Fixed),
            Err(VecError::DivisionByZero { kind: ServerKind::Fixed, .. })
        ));
        assert!(matches!(
            model.execution_time(&state, 1, 0, ServerKind::Vehicular),
            Err(VecError::DivisionByZero { .. })
        ));
    }
}
