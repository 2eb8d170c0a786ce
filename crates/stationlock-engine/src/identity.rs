//! Adapters for the external identity codec.
//!
//! stationlock never computes encoded identities itself. It either asks
//! configured external programs or, when none are configured, keys the
//! Counter Ledger by login name.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use stationlock_core::config::AppConfig;
use stationlock_core::config::identity::IdentityCommand;
use stationlock_core::error::{AppError, ErrorKind};
use stationlock_core::traits::IdentityCodec;
use stationlock_core::types::{EncodedIdentity, LoginName, UserKey};

/// Builds the codec selected by the configuration.
pub fn codec_from_config(config: &AppConfig) -> Arc<dyn IdentityCodec> {
    if config.identity.uses_commands() {
        Arc::new(CommandIdentityCodec::new(
            config.identity.decode.clone(),
            config.identity.encode.clone(),
            Duration::from_secs(config.identity.timeout_seconds),
        ))
    } else {
        Arc::new(PassthroughIdentityCodec)
    }
}

/// Uses the text of each identity form unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughIdentityCodec;

#[async_trait]
impl IdentityCodec for PassthroughIdentityCodec {
    async fn decode(&self, login: &LoginName) -> Result<UserKey, AppError> {
        Ok(UserKey::new(login.as_str()))
    }

    async fn encode(&self, key: &UserKey) -> Result<EncodedIdentity, AppError> {
        Ok(EncodedIdentity::new(key.as_str()))
    }
}

/// Runs external programs for each direction of the mapping.
///
/// Each program gets its configured arguments followed by the input value
/// and must print the answer on stdout. A direction without a program
/// passes the value through.
#[derive(Debug, Clone)]
pub struct CommandIdentityCodec {
    /// Program mapping login name → account key.
    decode: Option<IdentityCommand>,
    /// Program mapping account key → encoded identity.
    encode: Option<IdentityCommand>,
    /// Upper bound for one invocation.
    timeout: Duration,
}

impl CommandIdentityCodec {
    /// Creates a codec from configured commands.
    pub fn new(
        decode: Option<IdentityCommand>,
        encode: Option<IdentityCommand>,
        timeout: Duration,
    ) -> Self {
        Self {
            decode,
            encode,
            timeout,
        }
    }

    async fn run(&self, command: &IdentityCommand, input: &str) -> Result<String, AppError> {
        let program = command.program.as_str();
        if program.trim().is_empty() {
            return Err(AppError::configuration("Identity command is empty"));
        }

        let mut cmd = Command::new(program);
        cmd.args(&command.args)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Failed to run identity command '{program}': {e}"),
                    e,
                ));
            }
            Err(_) => {
                return Err(AppError::external_service(format!(
                    "Identity command '{program}' timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::external_service(format!(
                "Identity command '{program}' exited with {}: {}",
                output.status,
                stderr.trim().chars().take(500).collect::<String>()
            )));
        }

        let answer = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        if answer.is_empty() {
            return Err(AppError::external_service(format!(
                "Identity command '{program}' returned nothing for '{input}'"
            )));
        }

        debug!(program = %program, input = %input, answer = %answer, "Identity command answered");
        Ok(answer)
    }
}

#[async_trait]
impl IdentityCodec for CommandIdentityCodec {
    async fn decode(&self, login: &LoginName) -> Result<UserKey, AppError> {
        match &self.decode {
            Some(command) => Ok(UserKey::new(self.run(command, login.as_str()).await?)),
            None => Ok(UserKey::new(login.as_str())),
        }
    }

    async fn encode(&self, key: &UserKey) -> Result<EncodedIdentity, AppError> {
        match &self.encode {
            Some(command) => Ok(EncodedIdentity::new(self.run(command, key.as_str()).await?)),
            None => Ok(EncodedIdentity::new(key.as_str())),
        }
    }
}

/// Fixed lookup tables, for fixtures and dry environments.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityCodec {
    /// Login name → account key.
    keys: HashMap<LoginName, UserKey>,
    /// Account key → encoded identity.
    codes: HashMap<UserKey, EncodedIdentity>,
}

impl StaticIdentityCodec {
    /// Creates an empty codec; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user under all three identity forms.
    pub fn with_user(mut self, login: &str, key: &str, encoded: &str) -> Self {
        self.keys.insert(LoginName::new(login), UserKey::new(key));
        self.codes.insert(UserKey::new(key), EncodedIdentity::new(encoded));
        self
    }
}

#[async_trait]
impl IdentityCodec for StaticIdentityCodec {
    async fn decode(&self, login: &LoginName) -> Result<UserKey, AppError> {
        self.keys
            .get(login)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Unknown login '{login}'")))
    }

    async fn encode(&self, key: &UserKey) -> Result<EncodedIdentity, AppError> {
        self.codes
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Unknown account key '{key}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough() {
        let key = PassthroughIdentityCodec
            .ledger_key(&LoginName::new("MEACIRC"))
            .await
            .unwrap();
        assert_eq!(key.as_str(), "MEACIRC");
    }

    #[tokio::test]
    async fn test_static_codec() {
        let codec = StaticIdentityCodec::new().with_user("MEACIRC", "126", "BV");
        let key = codec.ledger_key(&LoginName::new("MEACIRC")).await.unwrap();
        assert_eq!(key.as_str(), "BV");
        assert!(codec.ledger_key(&LoginName::new("NOBODY")).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_codec_uses_stdout() {
        let codec = CommandIdentityCodec::new(
            Some(IdentityCommand::new("echo").arg("126")),
            None,
            Duration::from_secs(5),
        );
        // `echo 126 MEACIRC` prints both words; the whole first line is the answer.
        let key = codec.decode(&LoginName::new("MEACIRC")).await.unwrap();
        assert_eq!(key.as_str(), "126 MEACIRC");

        let encoded = codec.encode(&UserKey::new("126")).await.unwrap();
        assert_eq!(encoded.as_str(), "126");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_codec_passes_args_verbatim() {
        let codec = CommandIdentityCodec::new(
            None,
            Some(
                IdentityCommand::new("sh")
                    .arg("-c")
                    .arg("printf 'code %s\\n' \"$1\"")
                    .arg("sh"),
            ),
            Duration::from_secs(5),
        );
        let encoded = codec.encode(&UserKey::new("126")).await.unwrap();
        assert_eq!(encoded.as_str(), "code 126");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_codec_failure() {
        let codec = CommandIdentityCodec::new(
            Some(IdentityCommand::new("false")),
            None,
            Duration::from_secs(5),
        );
        let err = codec.decode(&LoginName::new("MEACIRC")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }

    #[tokio::test]
    async fn test_codec_from_config() {
        let config = AppConfig::default();
        let codec = codec_from_config(&config);
        let key = codec.ledger_key(&LoginName::new("ANN")).await.unwrap();
        assert_eq!(key.as_str(), "ANN");
    }
}
