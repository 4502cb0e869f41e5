//! Per-step action supplied by the caller
//!
//! Share matrices are indexed `[ue][server]`.

use serde::{Deserialize, Serialize};
use vec_core::{Result, ServerKind, TransitionState, VecError};

use crate::entities::EntityRegistry;

/// Offload decision and resource shares for every UE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub transition_state: Vec<TransitionState>,
    pub ves_spectrum_share: Vec<Vec<f64>>,
    pub fes_spectrum_share: Vec<Vec<f64>>,
    pub ves_resource_share: Vec<Vec<f64>>,
    pub fes_resource_share: Vec<Vec<f64>>,
}

impl Action {
    /// Every UE computes locally and no share is requested
    pub fn local(ue_count: usize, ves_count: usize, fes_count: usize) -> Self {
        Action {
            transition_state: vec![TransitionState::Local; ue_count],
            ves_spectrum_share: vec![vec![0.0; ves_count]; ue_count],
            fes_spectrum_share: vec![vec![0.0; fes_count]; ue_count],
            ves_resource_share: vec![vec![0.0; ves_count]; ue_count],
            fes_resource_share: vec![vec![0.0; fes_count]; ue_count],
        }
    }

    /// All-local action shaped for `registry`
    pub fn local_for(registry: &EntityRegistry) -> Self {
        Self::local(
            registry.ue_count(),
            registry.server_count(ServerKind::Vehicular),
            registry.server_count(ServerKind::Fixed),
        )
    }

    pub fn ue_count(&self) -> usize {
        self.transition_state.len()
    }

    pub fn spectrum_share(&self, kind: ServerKind) -> &[Vec<f64>] {
        match kind {
            ServerKind::Vehicular => &self.ves_spectrum_share,
            ServerKind::Fixed => &self.fes_spectrum_share,
        }
    }

    pub fn resource_share(&self, kind: ServerKind) -> &[Vec<f64>] {
        match kind {
            ServerKind::Vehicular => &self.ves_resource_share,
            ServerKind::Fixed => &self.fes_resource_share,
        }
    }

    /// Offload `ue` to every server of `kind` with uniform shares
    pub fn offload(&mut self, ue: usize, kind: ServerKind, spectrum: f64, resource: f64) -> Result<()> {
        let state = self
            .transition_state
            .get_mut(ue)
            .ok_or(VecError::UnknownEntity { what: "UE", index: ue })?;
        *state = kind.transition_state();

        let (spectrum_rows, resource_rows) = match kind {
            ServerKind::Vehicular => (&mut self.ves_spectrum_share, &mut self.ves_resource_share),
            ServerKind::Fixed => (&mut self.fes_spectrum_share, &mut self.fes_resource_share),
        };
        if let Some(row) = spectrum_rows.get_mut(ue) {
            row.iter_mut().for_each(|s| *s = spectrum);
        }
        if let Some(row) = resource_rows.get_mut(ue) {
            row.iter_mut().for_each(|s| *s = resource);
        }
        Ok(())
    }

    /// Check the action's shape against `registry` and every share is in [0, 1]
    pub fn validate(&self, registry: &EntityRegistry) -> Result<()> {
        let ue_count = registry.ue_count();
        if self.ue_count() != ue_count {
            return Err(VecError::invalid_action(format!(
                "{} transition states for {} UEs",
                self.ue_count(),
                ue_count
            )));
        }

        for kind in ServerKind::ALL {
            let server_count = registry.server_count(kind);
            for (name, rows) in [
                ("spectrum", self.spectrum_share(kind)),
                ("resource", self.resource_share(kind)),
            ] {
                if rows.len() != ue_count {
                    return Err(VecError::invalid_action(format!(
                        "{} {} share has {} rows, expected {}",
                        kind,
                        name,
                        rows.len(),
                        ue_count
                    )));
                }
                for (ue, row) in rows.iter().enumerate() {
                    if row.len() != server_count {
                        return Err(VecError::invalid_action(format!(
                            "{} {} share row for UE {} has {} entries, expected {}",
                            kind,
                            name,
                            ue,
                            row.len(),
                            server_count
                        )));
                    }
                    if let Some(share) = row.iter().find(|s| !(0.0..=1.0).contains(*s)) {
                        return Err(VecError::invalid_action(format!(
                            "{} {} share {} for UE {} is outside [0, 1]",
                            kind, name, share, ue
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;

    fn registry() -> EntityRegistry {
        EntityRegistry::with_defaults(&TopologyConfig::new(3, 2, 4)).unwrap()
    }

    #[test]
    fn test_local_action_is_valid() {
        let registry = registry();
        let action = Action::local_for(&registry);

        assert!(action.validate(&registry).is_ok());
        assert_eq!(action.ves_spectrum_share, vec![vec![0.0; 2]; 3]);
        assert_eq!(action.fes_resource_share, vec![vec![0.0; 4]; 3]);
    }

    #[test]
    fn test_offload_sets_state_and_shares() {
        let mut action = Action::local(3, 2, 4);
        action.offload(1, ServerKind::Fixed, 0.5, 0.25).unwrap();

        assert_eq!(action.transition_state[1], TransitionState::Fixed);
        assert_eq!(action.fes_spectrum_share[1], vec![0.5; 4]);
        assert_eq!(action.fes_resource_share[1], vec![0.25; 4]);
        assert_eq!(action.ves_spectrum_share[1], vec![0.0; 2]);
        assert!(action.offload(3, ServerKind::Fixed, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let registry = registry();

        let action = Action::local(2, 2, 4);
        assert!(matches!(action.validate(&registry), Err(VecError::InvalidAction(_))));

        let mut action = Action::local_for(&registry);
        action.fes_spectrum_share[2].pop();
        assert!(matches!(action.validate(&registry), Err(VecError::InvalidAction(_))));
    }

    #[test]
    fn test_share_out_of_range_rejected() {
        let registry = registry();
        let mut action = Action::local_for(&registry);
        action.ves_resource_share[0][1] = 1.5;

        assert!(matches!(action.validate(&registry), Err(VecError::InvalidAction(_))));

        action.ves_resource_share[0][1] = f64::NAN;
        assert!(action.validate(&registry).is_err());
    }
}
