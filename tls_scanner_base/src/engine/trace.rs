//! Executed traces returned by the protocol engine

use crate::types::{
    CipherSuite, CompressionMethod, EcPointFormat, ProtocolVersion, ServerCertificate,
    SignatureAndHashAlgorithm,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertDescription {
    UnexpectedMessage,
    HandshakeFailure,
    ProtocolVersion,
    InappropriateFallback,
    NoRenegotiation,
    DecodeError,
    IllegalParameter,
    UnrecognizedName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandshakeMessage {
    Ssl2ClientHello,
    Ssl2ServerHello,
    ClientHello,
    HelloVerifyRequest,
    ServerHello,
    Certificate,
    ServerKeyExchange,
    ServerHelloDone,
    ClientKeyExchange,
    ChangeCipherSpec,
    Finished,
    HelloRequest,
    Alert(AlertDescription),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub direction: Direction,
    pub message: HandshakeMessage,
}

/// Parameters the server selected during the exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiatedParameters {
    pub version: Option<ProtocolVersion>,
    pub cipher_suite: Option<CipherSuite>,
    pub compression_method: Option<CompressionMethod>,
    pub point_formats: Vec<EcPointFormat>,
    pub secure_renegotiation: bool,
    /// Certificate the server presented, if any
    pub certificate: Option<ServerCertificate>,
    pub server_key_exchange_signature: Option<SignatureAndHashAlgorithm>,
}

/// Record of one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedTrace {
    pub entries: Vec<TraceEntry>,
    /// Every planned message was sent and every expected one received
    pub executed_as_planned: bool,
    pub negotiated: NegotiatedParameters,
}

impl ExecutedTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(mut self, message: HandshakeMessage) -> Self {
        self.entries.push(TraceEntry {
            direction: Direction::Sent,
            message,
        });
        self
    }

    pub fn received(mut self, message: HandshakeMessage) -> Self {
        self.entries.push(TraceEntry {
            direction: Direction::Received,
            message,
        });
        self
    }

    pub fn with_negotiated(mut self, negotiated: NegotiatedParameters) -> Self {
        self.negotiated = negotiated;
        self
    }

    pub fn planned(mut self, executed_as_planned: bool) -> Self {
        self.executed_as_planned = executed_as_planned;
        self
    }

    pub fn did_receive(&self, message: HandshakeMessage) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.direction == Direction::Received && entry.message == message)
    }

    pub fn did_receive_alert(&self, description: AlertDescription) -> bool {
        self.did_receive(HandshakeMessage::Alert(description))
    }

    pub fn received_server_hello(&self) -> bool {
        self.did_receive(HandshakeMessage::ServerHello)
            || self.did_receive(HandshakeMessage::Ssl2ServerHello)
    }

    /// Number of ServerHello messages observed (renegotiation shows two)
    pub fn server_hello_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| {
                entry.direction == Direction::Received
                    && entry.message == HandshakeMessage::ServerHello
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_queries() {
        let trace = ExecutedTrace::new()
            .sent(HandshakeMessage::ClientHello)
            .received(HandshakeMessage::ServerHello)
            .received(HandshakeMessage::ServerHelloDone)
            .sent(HandshakeMessage::ClientHello)
            .received(HandshakeMessage::ServerHello)
            .planned(true);

        assert!(trace.received_server_hello());
        assert_eq!(trace.server_hello_count(), 2);
        assert!(!trace.did_receive(HandshakeMessage::ClientHello));
        assert!(trace.executed_as_planned);
    }

    #[test]
    fn test_alert_lookup() {
        let trace = ExecutedTrace::new()
            .sent(HandshakeMessage::ClientHello)
            .received(HandshakeMessage::Alert(AlertDescription::InappropriateFallback));
        assert!(trace.did_receive_alert(AlertDescription::InappropriateFallback));
        assert!(!trace.did_receive_alert(AlertDescription::HandshakeFailure));
        assert!(!trace.received_server_hello());
    }
}
