//! # TLS Scanner SDK
//!
//! Concrete TLS probes, guideline checks and a profile-driven protocol
//! engine on top of `tls_scanner_base`.

pub mod engine;
pub mod guidelines;
pub mod probes;

use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::log_debug;
use tls_scanner_base::probe::{Probe, ProbeRegistry, RegistryError};
use tls_scanner_base::types::ProbeType;

/// Create a registry with every available probe
///
/// Includes:
/// - Protocol version and cipher suite enumeration
/// - Compression, fallback SCSV, renegotiation and early CCS checks
/// - EC point formats, certificates and key exchange signature algorithms
/// - SNI requirement
/// - DTLS message sequence validation and cookie binding
///
/// Probes listed in `config.excluded_probes` are not registered.
pub fn create_probe_registry(config: &ScannerConfig) -> Result<ProbeRegistry, RegistryError> {
    let mut registry = ProbeRegistry::new();

    register(&mut registry, config, ProbeType::ProtocolVersion, probes::ProtocolVersionProbe::new)?;
    register(&mut registry, config, ProbeType::CipherSuite, probes::CipherSuiteProbe::new)?;
    register(&mut registry, config, ProbeType::Compressions, probes::CompressionsProbe::new)?;
    register(&mut registry, config, ProbeType::TlsFallbackScsv, probes::TlsFallbackScsvProbe::new)?;
    register(&mut registry, config, ProbeType::Renegotiation, probes::RenegotiationProbe::new)?;
    register(&mut registry, config, ProbeType::EcPointFormat, probes::EcPointFormatProbe::new)?;
    register(&mut registry, config, ProbeType::EarlyCcs, probes::EarlyCcsProbe::new)?;
    register(&mut registry, config, ProbeType::Certificate, probes::CertificateProbe::new)?;
    register(
        &mut registry,
        config,
        ProbeType::SignatureAndHash,
        probes::SignatureAndHashAlgorithmProbe::new,
    )?;
    register(
        &mut registry,
        config,
        ProbeType::DtlsMessageSequenceNumber,
        probes::DtlsMessageSequenceProbe::new,
    )?;
    register(
        &mut registry,
        config,
        ProbeType::DtlsIpAddressInCookie,
        probes::DtlsIpAddressInCookieProbe::new,
    )?;
    register(&mut registry, config, ProbeType::Sni, probes::SniProbe::new)?;

    registry.validate()?;
    Ok(registry)
}

fn register<P, F>(
    registry: &mut ProbeRegistry,
    config: &ScannerConfig,
    probe_type: ProbeType,
    factory: F,
) -> Result<(), RegistryError>
where
    P: Probe + 'static,
    F: Fn(&ScannerConfig) -> P + Send + Sync + 'static,
{
    if config.excluded_probes.contains(&probe_type) {
        log_debug!("Skipping excluded probe", "probe" => probe_type);
        return Ok(());
    }
    registry.register(move |config: &ScannerConfig| -> Box<dyn Probe> { Box::new(factory(config)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_registry_creation() {
        let registry = create_probe_registry(&ScannerConfig::default()).unwrap();
        let stats = registry.get_statistics();

        assert_eq!(stats.total_probes, 12);
        assert!(
            stats.registry_health.is_healthy(),
            "Registry should be healthy: {:?}",
            stats.registry_health
        );
        assert_eq!(stats.unconditional_probes, 3);
        assert_eq!(
            registry.owner_of(tls_scanner_base::types::AnalyzedProperty::SupportsEcdhe),
            Some(ProbeType::CipherSuite)
        );
    }

    #[test]
    fn test_excluded_probes_are_skipped() {
        let config = ScannerConfig::default()
            .with_excluded_probe(ProbeType::EarlyCcs)
            .with_excluded_probe(ProbeType::Compressions);
        let registry = create_probe_registry(&config).unwrap();

        assert_eq!(registry.len(), 10);
        assert!(!registry.contains(ProbeType::EarlyCcs));
        assert!(registry.contains(ProbeType::ProtocolVersion));
    }

    #[test]
    fn test_excluding_everything_fails_validation() {
        let config = ScannerConfig {
            excluded_probes: ProbeType::ALL.to_vec(),
            ..ScannerConfig::default()
        };
        assert_matches!(create_probe_registry(&config), Err(RegistryError::EmptyRegistry));
    }
}
