use serde::{Deserialize, Serialize};
use std::fmt;

/// Endpoint being scanned
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    pub host: String,
    pub port: u16,
    /// Server name sent in the SNI extension, if different from `host`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
}

impl ScanTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            sni: None,
        }
    }

    pub fn with_sni(mut self, sni: impl Into<String>) -> Self {
        self.sni = Some(sni.into());
        self
    }

    pub fn server_name(&self) -> &str {
        self.sni.as_deref().unwrap_or(&self.host)
    }

    /// Parse `host[:port]`, falling back to `default_port`
    pub fn parse(input: &str, default_port: u16) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("empty target".to_string());
        }
        match input.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && !host.contains(':') => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port in target '{}'", input))?;
                Ok(Self::new(host, port))
            }
            _ => Ok(Self::new(input, default_port)),
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
