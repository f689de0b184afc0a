use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PortSide {
    Internal,
    External,
}

impl std::fmt::Display for PortSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortSide::Internal => f.write_str("internal"),
            PortSide::External => f.write_str("external"),
        }
    }
}

/// Reasons a switch request is refused before anything on the host is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TunnelError {
    #[error("{service} is already ON - run 'sshtunnel off' first")]
    AlreadyEnabled { service: String },

    #[error("[USER]@[SERVER] missing - use 'sshtunnel -h' for help")]
    MissingTarget,

    #[error("[USER]@[SERVER] wrong '{0}' - use 'sshtunnel -h' for help")]
    InvalidTarget(String),

    #[error("[INTERNAL-PORT]:[EXTERNAL-PORT] missing - use 'sshtunnel -h' for help")]
    MissingPorts,

    #[error("[INTERNAL-PORT]:[EXTERNAL-PORT] wrong format '{0}'")]
    InvalidPortFormat(String),

    #[error("[INTERNAL-PORT]:[EXTERNAL-PORT] {side} not number '{token}'")]
    NonNumericPort { side: PortSide, token: String },

    #[error("[INTERNAL-PORT]:[EXTERNAL-PORT] {side} not in range 1-65535 '{token}'")]
    PortOutOfRange { side: PortSide, token: String },

    #[error("SSH key path is not valid UTF-8 '{0}'")]
    InvalidKeyPath(String),

    #[error("You must run this executable with root permissions")]
    NotRoot,
}
