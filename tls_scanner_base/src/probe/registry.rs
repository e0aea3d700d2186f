//! Probe registry
//!
//! Holds probe factories in registration order. Probes are stateful, so every
//! scan instantiates a fresh set from the registry.

use super::errors::RegistryError;
use super::traits::Probe;
use crate::api::ScannerConfig;
use crate::logging::codes;
use crate::requirements::Requirement;
use crate::types::{AnalyzedProperty, ProbeType};
use std::collections::HashMap;

type ProbeFactory = Box<dyn Fn(&ScannerConfig) -> Box<dyn Probe> + Send + Sync>;

struct ProbeRegistration {
    probe_type: ProbeType,
    requirement: Requirement,
    factory: ProbeFactory,
}

pub struct ProbeRegistry {
    registrations: Vec<ProbeRegistration>,
    owners: HashMap<AnalyzedProperty, ProbeType>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Register a probe factory
    ///
    /// The factory is invoked once with the default configuration to learn
    /// the probe's type, write-set and requirement. A probe type may only be
    /// registered once and every property has exactly one owner.
    pub fn register<F>(&mut self, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&ScannerConfig) -> Box<dyn Probe> + Send + Sync + 'static,
    {
        let template = factory(&ScannerConfig::default());
        let probe_type = template.probe_type();
        let properties = template.registered_properties();

        if self.contains(probe_type) {
            log_warning!(
                codes::probe::DUPLICATE_REGISTRATION,
                "Rejected duplicate probe registration",
                "probe" => probe_type
            );
            return Err(RegistryError::DuplicateProbeType { probe_type });
        }

        if properties.is_empty() {
            return Err(RegistryError::EmptyWriteSet { probe_type });
        }

        for property in &properties {
            if let Some(owner) = self.owners.get(property) {
                return Err(RegistryError::PropertyAlreadyOwned {
                    property: *property,
                    owner: *owner,
                    probe_type,
                });
            }
        }

        for property in &properties {
            self.owners.insert(*property, probe_type);
        }
        self.registrations.push(ProbeRegistration {
            probe_type,
            requirement: template.requirement(),
            factory: Box::new(factory),
        });

        Ok(())
    }

    /// Fresh probe instances in registration order, minus excluded types
    pub fn instantiate(&self, config: &ScannerConfig) -> Vec<Box<dyn Probe>> {
        self.registrations
            .iter()
            .filter(|registration| !config.excluded_probes.contains(&registration.probe_type))
            .map(|registration| (registration.factory)(config))
            .collect()
    }

    pub fn contains(&self, probe_type: ProbeType) -> bool {
        self.registrations
            .iter()
            .any(|registration| registration.probe_type == probe_type)
    }

    pub fn probe_types(&self) -> Vec<ProbeType> {
        self.registrations
            .iter()
            .map(|registration| registration.probe_type)
            .collect()
    }

    pub fn owner_of(&self, property: AnalyzedProperty) -> Option<ProbeType> {
        self.owners.get(&property).copied()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.registrations.is_empty() {
            return Err(RegistryError::EmptyRegistry);
        }
        Ok(())
    }

    /// Requirements that can never hold with the registered probe set
    pub fn health_check(&self) -> RegistryHealth {
        let mut unowned_references = Vec::new();
        let mut unknown_probe_references = Vec::new();

        for registration in &self.registrations {
            for property in registration.requirement.referenced_properties() {
                if !self.owners.contains_key(&property) {
                    unowned_references.push((registration.probe_type, property));
                }
            }
            for dependency in registration.requirement.referenced_probe_types() {
                if !self.contains(dependency) {
                    unknown_probe_references.push((registration.probe_type, dependency));
                }
            }
        }

        RegistryHealth {
            unowned_references,
            unknown_probe_references,
        }
    }

    pub fn get_statistics(&self) -> RegistryStatistics {
        RegistryStatistics {
            total_probes: self.registrations.len(),
            total_properties: self.owners.len(),
            list_properties: self.owners.keys().filter(|p| p.is_list()).count(),
            unconditional_probes: self
                .registrations
                .iter()
                .filter(|registration| registration.requirement == Requirement::NoRequirement)
                .count(),
            registry_health: self.health_check(),
        }
    }
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRegistry")
            .field("probes", &self.probe_types())
            .field("properties", &self.owners.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryHealth {
    /// (probe, property) where the requirement reads a property no probe writes
    pub unowned_references: Vec<(ProbeType, AnalyzedProperty)>,
    /// (probe, dependency) where the requirement waits on an unregistered probe
    pub unknown_probe_references: Vec<(ProbeType, ProbeType)>,
}

impl RegistryHealth {
    pub fn is_healthy(&self) -> bool {
        self.unowned_references.is_empty() && self.unknown_probe_references.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RegistryStatistics {
    pub total_probes: usize,
    pub total_properties: usize,
    pub list_properties: usize,
    pub unconditional_probes: usize,
    pub registry_health: RegistryHealth,
}

pub struct RegistryBuilder {
    registry: ProbeRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: ProbeRegistry::new(),
        }
    }

    pub fn add_probe<F>(mut self, factory: F) -> Result<Self, RegistryError>
    where
        F: Fn(&ScannerConfig) -> Box<dyn Probe> + Send + Sync + 'static,
    {
        self.registry.register(factory)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ProbeRegistry, RegistryError> {
        self.registry.validate()?;
        Ok(self.registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProtocolEngine;
    use crate::probe::ProbeError;
    use crate::report::{ReportError, ScanReport};
    use crate::types::{ScanTarget, TestResults};
    use assert_matches::assert_matches;

    struct StubProbe {
        probe_type: ProbeType,
        properties: Vec<AnalyzedProperty>,
        requirement: Requirement,
    }

    impl Probe for StubProbe {
        fn probe_type(&self) -> ProbeType {
            self.probe_type
        }

        fn registered_properties(&self) -> Vec<AnalyzedProperty> {
            self.properties.clone()
        }

        fn requirement(&self) -> Requirement {
            self.requirement.clone()
        }

        fn execute_test(
            &mut self,
            _engine: &dyn ProtocolEngine,
            _target: &ScanTarget,
        ) -> Result<(), ProbeError> {
            Ok(())
        }

        fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
            self.merge_could_not_execute(report, TestResults::True)
        }
    }

    fn stub(
        probe_type: ProbeType,
        properties: Vec<AnalyzedProperty>,
        requirement: Requirement,
    ) -> impl Fn(&ScannerConfig) -> Box<dyn Probe> + Send + Sync + 'static {
        move |_: &ScannerConfig| -> Box<dyn Probe> {
            Box::new(StubProbe {
                probe_type,
                properties: properties.clone(),
                requirement: requirement.clone(),
            })
        }
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = RegistryBuilder::new()
            .add_probe(stub(
                ProbeType::Compressions,
                vec![AnalyzedProperty::VulnerableToCrime],
                Requirement::NoRequirement,
            ))
            .unwrap()
            .add_probe(stub(
                ProbeType::EarlyCcs,
                vec![AnalyzedProperty::VulnerableToEarlyCcs],
                Requirement::NoRequirement,
            ))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            registry.probe_types(),
            vec![ProbeType::Compressions, ProbeType::EarlyCcs]
        );
        assert_eq!(
            registry.owner_of(AnalyzedProperty::VulnerableToEarlyCcs),
            Some(ProbeType::EarlyCcs)
        );
    }

    #[test]
    fn test_duplicate_probe_type_rejected() {
        let mut registry = ProbeRegistry::new();
        registry
            .register(stub(
                ProbeType::EarlyCcs,
                vec![AnalyzedProperty::VulnerableToEarlyCcs],
                Requirement::NoRequirement,
            ))
            .unwrap();
        let result = registry.register(stub(
            ProbeType::EarlyCcs,
            vec![AnalyzedProperty::VulnerableToCrime],
            Requirement::NoRequirement,
        ));
        assert_matches!(result, Err(RegistryError::DuplicateProbeType { .. }));
    }

    #[test]
    fn test_shared_property_rejected() {
        let mut registry = ProbeRegistry::new();
        registry
            .register(stub(
                ProbeType::Compressions,
                vec![AnalyzedProperty::VulnerableToCrime],
                Requirement::NoRequirement,
            ))
            .unwrap();
        let result = registry.register(stub(
            ProbeType::EarlyCcs,
            vec![AnalyzedProperty::VulnerableToCrime],
            Requirement::NoRequirement,
        ));
        assert_matches!(
            result,
            Err(RegistryError::PropertyAlreadyOwned {
                owner: ProbeType::Compressions,
                probe_type: ProbeType::EarlyCcs,
                ..
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_registry_fails_build() {
        assert_matches!(
            RegistryBuilder::new().build(),
            Err(RegistryError::EmptyRegistry)
        );
    }

    #[test]
    fn test_instantiate_skips_excluded() {
        let registry = RegistryBuilder::new()
            .add_probe(stub(
                ProbeType::Compressions,
                vec![AnalyzedProperty::VulnerableToCrime],
                Requirement::NoRequirement,
            ))
            .unwrap()
            .add_probe(stub(
                ProbeType::EarlyCcs,
                vec![AnalyzedProperty::VulnerableToEarlyCcs],
                Requirement::NoRequirement,
            ))
            .unwrap()
            .build()
            .unwrap();

        let config = ScannerConfig::default().with_excluded_probe(ProbeType::Compressions);
        let probes = registry.instantiate(&config);
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].probe_type(), ProbeType::EarlyCcs);
    }

    #[test]
    fn test_health_reports_unreachable_requirements() {
        let registry = RegistryBuilder::new()
            .add_probe(stub(
                ProbeType::CipherSuite,
                vec![AnalyzedProperty::SupportedCipherSuites],
                Requirement::probe_executed(ProbeType::ProtocolVersion)
                    .and(Requirement::property_true([AnalyzedProperty::SupportsTls12])),
            ))
            .unwrap()
            .build()
            .unwrap();

        let stats = registry.get_statistics();
        assert_eq!(stats.total_probes, 1);
        assert_eq!(stats.list_properties, 1);
        assert_eq!(stats.unconditional_probes, 0);
        assert!(!stats.registry_health.is_healthy());
        assert_eq!(
            stats.registry_health.unknown_probe_references,
            vec![(ProbeType::CipherSuite, ProbeType::ProtocolVersion)]
        );
        assert_eq!(
            stats.registry_health.unowned_references,
            vec![(ProbeType::CipherSuite, AnalyzedProperty::SupportsTls12)]
        );
    }

    #[test]
    fn test_statistics_cover_registered_write_sets() {
        let registry = RegistryBuilder::new()
            .add_probe(stub(
                ProbeType::ProtocolVersion,
                vec![
                    AnalyzedProperty::SupportsTls12,
                    AnalyzedProperty::SupportedProtocolVersions,
                ],
                Requirement::NoRequirement,
            ))
            .unwrap()
            .add_probe(stub(
                ProbeType::CipherSuite,
                vec![AnalyzedProperty::SupportedCipherSuites],
                Requirement::probe_executed(ProbeType::ProtocolVersion)
                    .and(Requirement::property_true([AnalyzedProperty::SupportsTls12])),
            ))
            .unwrap()
            .build()
            .unwrap();

        let stats = registry.get_statistics();
        assert_eq!(stats.total_probes, 2);
        assert_eq!(stats.total_properties, 3);
        assert_eq!(stats.list_properties, 2);
        assert_eq!(stats.unconditional_probes, 1);
        assert!(stats.registry_health.is_healthy());
    }
}
