use std::fmt;

use crate::error::{PortSide, TunnelError};

/// `user@host` the tunnel connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target(String);

impl Target {
    pub fn parse(raw: Option<&str>) -> Result<Self, TunnelError> {
        let raw = raw.ok_or(TunnelError::MissingTarget)?;

        if raw.matches('@').count() != 1 {
            return Err(TunnelError::InvalidTarget(raw.to_string()));
        }

        Ok(Target(raw.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local port exposed on the remote server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PortForward {
    pub internal: u16,
    pub external: u16,
}

impl PortForward {
    /// Parses an `INTERNAL:EXTERNAL` token.
    pub fn parse(token: &str) -> Result<Self, TunnelError> {
        let (internal, external) = match token.split_once(':') {
            Some((internal, external)) if !external.contains(':') => (internal, external),
            _ => return Err(TunnelError::InvalidPortFormat(token.to_string())),
        };

        Ok(PortForward {
            internal: parse_port(internal, PortSide::Internal, token)?,
            external: parse_port(external, PortSide::External, token)?,
        })
    }

    /// The autossh `-R` argument, remote port first.
    pub fn remote_flag(&self) -> String {
        format!("-R {}:localhost:{}", self.external, self.internal)
    }
}

fn parse_port(value: &str, side: PortSide, token: &str) -> Result<u16, TunnelError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TunnelError::NonNumericPort {
            side,
            token: token.to_string(),
        });
    }

    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(TunnelError::PortOutOfRange {
            side,
            token: token.to_string(),
        }),
    }
}

pub(crate) fn parse_forwards(tokens: &[String]) -> Result<Vec<PortForward>, TunnelError> {
    if tokens.is_empty() {
        return Err(TunnelError::MissingPorts);
    }

    tokens.iter().map(|token| PortForward::parse(token)).collect()
}
