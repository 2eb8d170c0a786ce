//! External identity codec configuration.

use serde::{Deserialize, Serialize};

/// Programs that translate between login names, account keys, and the
/// encoded identities used as Counter Ledger keys.
///
/// When neither command is set the login name itself is the ledger key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Program mapping a login name to its numeric account key.
    #[serde(default)]
    pub decode: Option<IdentityCommand>,
    /// Program mapping a numeric account key to its encoded identity.
    #[serde(default)]
    pub encode: Option<IdentityCommand>,
    /// Upper bound for a single codec invocation, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// One external program invocation.
///
/// Arguments are passed as given, without shell word splitting; the value
/// being translated is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCommand {
    /// Program path or name looked up on `PATH`.
    pub program: String,
    /// Arguments placed before the value.
    #[serde(default)]
    pub args: Vec<String>,
}

impl IdentityCommand {
    /// Creates a command without leading arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends a leading argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            decode: None,
            encode: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl IdentityConfig {
    /// Returns `true` when external codec programs are configured.
    pub fn uses_commands(&self) -> bool {
        self.decode.is_some() || self.encode.is_some()
    }
}

fn default_timeout() -> u64 {
    10
}
