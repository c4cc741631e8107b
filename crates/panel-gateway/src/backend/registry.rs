//! In-memory upstream registry.
//!
//! Populated once at startup from a validated [`GatewayConfig`]; handlers
//! share it read-only behind an `Arc`, so no locking is involved.

use panel_kernel::gateway::{
    GatewayConfig, GatewayError, ServiceId, UpstreamDescriptor, UpstreamRegistry, UpstreamSlot,
};
use std::collections::BTreeMap;

pub struct InMemoryUpstreamRegistry {
    slots: BTreeMap<ServiceId, UpstreamSlot>,
}

impl InMemoryUpstreamRegistry {
    /// Build from explicit slots. Services without a slot are recorded as
    /// unconfigured.
    pub fn new(slots: impl IntoIterator<Item = UpstreamSlot>) -> Result<Self, GatewayError> {
        let mut map = BTreeMap::new();
        for slot in slots {
            let id = slot.service();
            if map.insert(id, slot).is_some() {
                return Err(GatewayError::DuplicateService(id.to_string()));
            }
        }
        for id in ServiceId::ALL {
            map.entry(id).or_insert(UpstreamSlot::Unconfigured(id));
        }
        Ok(Self { slots: map })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(config.slots()?)
    }

    /// Services whose base URL was not configured.
    pub fn unconfigured(&self) -> impl Iterator<Item = ServiceId> + '_ {
        self.slots.values().filter_map(|slot| match slot {
            UpstreamSlot::Unconfigured(id) => Some(*id),
            UpstreamSlot::Configured(_) => None,
        })
    }
}

impl UpstreamRegistry for InMemoryUpstreamRegistry {
    fn resolve(&self, id: ServiceId) -> Result<&UpstreamDescriptor, GatewayError> {
        match self.slots.get(&id) {
            Some(UpstreamSlot::Configured(descriptor)) => Ok(descriptor),
            _ => Err(GatewayError::MissingBaseUrl {
                service: id.display_name(),
                env_var: id.url_env_var(),
            }),
        }
    }

    fn slots(&self) -> Vec<&UpstreamSlot> {
        self.slots.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_kernel::gateway::UpstreamConfig;

    fn descriptor(id: ServiceId, url: &str) -> UpstreamDescriptor {
        UpstreamDescriptor::parse(id, url).unwrap()
    }

    #[test]
    fn resolves_configured_service() {
        let reg = InMemoryUpstreamRegistry::new([UpstreamSlot::Configured(descriptor(
            ServiceId::SharedVariables,
            "http://sv:4000",
        ))])
        .unwrap();
        let d = reg.resolve(ServiceId::SharedVariables).unwrap();
        assert_eq!(d.base_url.as_str(), "http://sv:4000/");
    }

    #[test]
    fn missing_service_is_config_error() {
        let reg = InMemoryUpstreamRegistry::new([]).unwrap();
        let err = reg.resolve(ServiceId::PlanController).unwrap_err();
        assert_eq!(
            err.to_string(),
            "plan-controller-service URL not configured (PLAN_CONTROLLER_SERVICE_URL)"
        );
        assert_eq!(reg.unconfigured().count(), 2);
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let slot = UpstreamSlot::Unconfigured(ServiceId::PlanController);
        assert!(matches!(
            InMemoryUpstreamRegistry::new([slot.clone(), slot]),
            Err(GatewayError::DuplicateService(_))
        ));
    }

    #[test]
    fn slots_follow_display_order() {
        let config = GatewayConfig::new()
            .with_upstream(UpstreamConfig::new(ServiceId::PlanController).with_base_url("http://pc"))
            .with_upstream(UpstreamConfig::new(ServiceId::SharedVariables));
        let reg = InMemoryUpstreamRegistry::from_config(&config).unwrap();
        let order: Vec<ServiceId> = reg.slots().iter().map(|s| s.service()).collect();
        assert_eq!(order, ServiceId::ALL.to_vec());
        assert_eq!(reg.unconfigured().collect::<Vec<_>>(), vec![ServiceId::SharedVariables]);
    }
}
