//! Protocol engine that negotiates against a [`ServerProfile`] in memory

use super::profile::ServerProfile;
use tls_scanner_base::engine::{
    AlertDescription, EngineError, ExecutedTrace, HandshakeMessage, NegotiatedParameters,
    ProtocolEngine, WorkflowSpec, WorkflowTraceType,
};
use tls_scanner_base::types::{
    CipherSuite, CompressionMethod, EcPointFormat, ProtocolVersion, ScanTarget,
};

pub struct ProfileEngine {
    profile: ServerProfile,
    engine_id: String,
}

impl ProfileEngine {
    pub fn new(profile: ServerProfile) -> Self {
        let engine_id = format!("profile:{}", profile.name);
        Self { profile, engine_id }
    }

    pub fn profile(&self) -> &ServerProfile {
        &self.profile
    }

    /// Server side of the hello exchange
    fn negotiate(&self, workflow: &WorkflowSpec) -> Result<NegotiatedParameters, AlertDescription> {
        let profile = &self.profile;
        if profile.requires_sni && !workflow.include_server_name {
            return Err(AlertDescription::UnrecognizedName);
        }
        let version = profile
            .select_version(workflow.highest_version)
            .ok_or(AlertDescription::ProtocolVersion)?;

        let cipher_suite = profile
            .cipher_suites_for(version)
            .iter()
            .copied()
            .find(|suite| {
                workflow.offers_suite(*suite)
                    && suite.is_supported_in(version)
                    && profile.can_serve(*suite)
            })
            .ok_or(AlertDescription::HandshakeFailure)?;

        let compression_method = if version.is_tls13() {
            CompressionMethod::Null
        } else {
            *profile
                .compression_methods
                .iter()
                .find(|method| workflow.compression_methods.contains(method))
                .ok_or(AlertDescription::HandshakeFailure)?
        };
        if version.is_tls13() && !workflow.compression_methods.contains(&CompressionMethod::Null) {
            return Err(AlertDescription::IllegalParameter);
        }
        // TLS 1.3 key shares are uncompressed unless the server opted into secp compression
        if version.is_tls13()
            && !workflow.point_formats.contains(&EcPointFormat::Uncompressed)
            && !profile.tls13_secp_compression
        {
            return Err(AlertDescription::IllegalParameter);
        }

        let mut negotiated = NegotiatedParameters {
            version: Some(version),
            cipher_suite: Some(cipher_suite),
            compression_method: Some(compression_method),
            secure_renegotiation: profile.secure_renegotiation && !version.is_tls13(),
            certificate: profile.certificate_for(cipher_suite),
            ..NegotiatedParameters::default()
        };

        if cipher_suite.is_ecdhe() {
            if !profile
                .point_formats
                .iter()
                .any(|format| workflow.point_formats.contains(format))
            {
                return Err(AlertDescription::HandshakeFailure);
            }
            negotiated.point_formats = profile.point_formats.clone();
        }

        if version.is_tls13() {
            let (signature, certificate) = profile
                .tls13_signature_algorithms
                .iter()
                .copied()
                .filter(|alg| workflow.signature_and_hash_algorithms.contains(alg))
                .find_map(|alg| {
                    profile
                        .certificates
                        .iter()
                        .copied()
                        .find(|certificate| certificate.can_sign(alg))
                        .map(|certificate| (alg, certificate))
                })
                .ok_or(AlertDescription::HandshakeFailure)?;
            negotiated.server_key_exchange_signature = Some(signature);
            negotiated.certificate = Some(certificate);
        } else if cipher_suite.is_ephemeral() {
            let signature = if profile.respects_signature_algorithms_extension {
                profile
                    .ske_signature_algorithms
                    .iter()
                    .copied()
                    .find(|alg| workflow.signature_and_hash_algorithms.contains(alg))
                    .ok_or(AlertDescription::HandshakeFailure)?
            } else {
                *profile
                    .ske_signature_algorithms
                    .first()
                    .ok_or(AlertDescription::HandshakeFailure)?
            };
            negotiated.server_key_exchange_signature = Some(signature);
        }

        Ok(negotiated)
    }

    fn hello(&self, workflow: &WorkflowSpec) -> (ExecutedTrace, bool) {
        let trace = ExecutedTrace::new().sent(HandshakeMessage::ClientHello);
        match self.negotiate(workflow) {
            Ok(negotiated) => {
                let mut trace = trace
                    .received(HandshakeMessage::ServerHello)
                    .received(HandshakeMessage::Certificate);
                if negotiated.server_key_exchange_signature.is_some()
                    && negotiated.version.map_or(false, |v| !v.is_tls13())
                {
                    trace = trace.received(HandshakeMessage::ServerKeyExchange);
                }
                (
                    trace
                        .received(HandshakeMessage::ServerHelloDone)
                        .with_negotiated(negotiated),
                    true,
                )
            }
            Err(alert) => (trace.received(HandshakeMessage::Alert(alert)), false),
        }
    }

    fn finish_handshake(trace: ExecutedTrace) -> ExecutedTrace {
        trace
            .sent(HandshakeMessage::ClientKeyExchange)
            .sent(HandshakeMessage::ChangeCipherSpec)
            .sent(HandshakeMessage::Finished)
            .received(HandshakeMessage::ChangeCipherSpec)
            .received(HandshakeMessage::Finished)
    }

    fn renegotiate(&self, workflow: &WorkflowSpec, accepted: bool) -> ExecutedTrace {
        let (trace, completed) = self.hello(workflow);
        if !completed {
            return trace.planned(false);
        }
        let trace = Self::finish_handshake(trace).sent(HandshakeMessage::ClientHello);
        if accepted {
            trace
                .received(HandshakeMessage::ServerHello)
                .received(HandshakeMessage::ServerHelloDone)
                .planned(true)
        } else {
            trace
                .received(HandshakeMessage::Alert(AlertDescription::NoRenegotiation))
                .planned(false)
        }
    }

    fn run(&self, workflow: &WorkflowSpec) -> ExecutedTrace {
        let profile = &self.profile;
        match workflow.trace_type {
            WorkflowTraceType::Hello => {
                let (trace, completed) = self.hello(workflow);
                trace.planned(completed)
            }
            WorkflowTraceType::FullHandshake => {
                let (trace, completed) = self.hello(workflow);
                if completed {
                    Self::finish_handshake(trace).planned(true)
                } else {
                    trace.planned(false)
                }
            }
            WorkflowTraceType::Ssl2Hello => {
                let trace = ExecutedTrace::new().sent(HandshakeMessage::Ssl2ClientHello);
                if profile.supports(ProtocolVersion::Ssl2) {
                    trace
                        .received(HandshakeMessage::Ssl2ServerHello)
                        .with_negotiated(NegotiatedParameters {
                            version: Some(ProtocolVersion::Ssl2),
                            ..NegotiatedParameters::default()
                        })
                        .planned(true)
                } else {
                    trace.planned(false)
                }
            }
            WorkflowTraceType::EarlyChangeCipherSpec => {
                let (trace, completed) = self.hello(workflow);
                if !completed {
                    return trace.planned(false);
                }
                let trace = trace.sent(HandshakeMessage::ChangeCipherSpec);
                if profile.vulnerable_to_early_ccs {
                    trace
                        .sent(HandshakeMessage::ClientKeyExchange)
                        .sent(HandshakeMessage::Finished)
                        .received(HandshakeMessage::ChangeCipherSpec)
                        .received(HandshakeMessage::Finished)
                        .planned(true)
                } else {
                    trace
                        .received(HandshakeMessage::Alert(AlertDescription::UnexpectedMessage))
                        .planned(false)
                }
            }
            WorkflowTraceType::FallbackScsv => {
                let downgraded = profile
                    .highest_version()
                    .map_or(false, |highest| workflow.highest_version < highest);
                if profile.supports_fallback_scsv
                    && downgraded
                    && workflow.offers_suite(CipherSuite::TLS_FALLBACK_SCSV)
                {
                    ExecutedTrace::new()
                        .sent(HandshakeMessage::ClientHello)
                        .received(HandshakeMessage::Alert(AlertDescription::InappropriateFallback))
                        .planned(false)
                } else {
                    let (trace, completed) = self.hello(workflow);
                    trace.planned(completed)
                }
            }
            WorkflowTraceType::SecureRenegotiation => self.renegotiate(
                workflow,
                profile.secure_renegotiation && profile.client_renegotiation,
            ),
            WorkflowTraceType::InsecureRenegotiation => {
                self.renegotiate(workflow, profile.insecure_renegotiation)
            }
            WorkflowTraceType::DtlsMessageSequence(manipulation) => {
                self.cookie_exchange(workflow, profile.dtls_sequence.accepts(manipulation))
            }
            WorkflowTraceType::DtlsCookieReuse => {
                self.cookie_exchange(workflow, profile.dtls_cookie_ip_only)
            }
        }
    }

    /// DTLS ClientHello, HelloVerifyRequest, then a second ClientHello the
    /// server answers only when `accepted`
    fn cookie_exchange(&self, workflow: &WorkflowSpec, accepted: bool) -> ExecutedTrace {
        let trace = ExecutedTrace::new().sent(HandshakeMessage::ClientHello);
        if self.profile.select_version(workflow.highest_version).is_none()
            || !workflow.highest_version.is_dtls()
        {
            return trace
                .received(HandshakeMessage::Alert(AlertDescription::ProtocolVersion))
                .planned(false);
        }
        let trace = trace
            .received(HandshakeMessage::HelloVerifyRequest)
            .sent(HandshakeMessage::ClientHello);
        if !accepted {
            return trace.planned(false);
        }
        match self.negotiate(workflow) {
            Ok(negotiated) => trace
                .received(HandshakeMessage::ServerHello)
                .received(HandshakeMessage::ServerHelloDone)
                .with_negotiated(negotiated)
                .planned(true),
            Err(alert) => trace.received(HandshakeMessage::Alert(alert)).planned(false),
        }
    }
}

impl ProtocolEngine for ProfileEngine {
    fn execute(
        &self,
        target: &ScanTarget,
        workflow: &WorkflowSpec,
    ) -> Result<ExecutedTrace, EngineError> {
        if self.profile.unreachable {
            return Err(EngineError::ConnectionRefused {
                target: target.to_string(),
            });
        }
        if self.profile.failing_workflows.contains(&workflow.trace_type) {
            return Err(EngineError::Timeout {
                target: target.to_string(),
                timeout_ms: workflow.timeout_ms,
            });
        }
        Ok(self.run(workflow))
    }

    fn engine_id(&self) -> &str {
        &self.engine_id
    }
}
