//! Opaque mapping between login names and Counter Ledger keys.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{EncodedIdentity, LoginName, UserKey};

/// Capability owned by the external identity system.
///
/// The encoding scheme is not known to stationlock; implementations only
/// forward to whatever system owns it.
#[async_trait]
pub trait IdentityCodec: Send + Sync + 'static {
    /// Map a login name to the user's numeric account key.
    async fn decode(&self, login: &LoginName) -> AppResult<UserKey>;

    /// Map an account key to the short code that keys the Counter Ledger.
    async fn encode(&self, key: &UserKey) -> AppResult<EncodedIdentity>;

    /// Resolve the ledger key for a login name.
    async fn ledger_key(&self, login: &LoginName) -> AppResult<EncodedIdentity> {
        let key = self.decode(login).await?;
        self.encode(&key).await
    }
}
