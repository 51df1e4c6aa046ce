//! TMTO key oracle trait

use std::sync::Arc;

use crate::Result;
use crate::types::{AttackBurstSet, SessionKey};

/// Time-memory-trade-off key search over one known-plaintext candidate.
///
/// The search is opaque: once submitted it runs to completion. Callers
/// decide between submissions whether to continue.
#[async_trait::async_trait]
pub trait KeyOracle: Send + Sync {
    /// Search for the session key explaining `burst_set`.
    ///
    /// Returns:
    /// - `Ok(Some(key))` - Key recovered and confirmed against the check burst
    /// - `Ok(None)` - No key for this candidate
    /// - `Err(e)` - The oracle could not run the search
    async fn search(&self, burst_set: &AttackBurstSet, verbose: bool) -> Result<Option<SessionKey>>;
}

#[async_trait::async_trait]
impl<T: KeyOracle + ?Sized> KeyOracle for Arc<T> {
    async fn search(
        &self,
        burst_set: &AttackBurstSet,
        verbose: bool,
    ) -> Result<Option<SessionKey>> {
        (**self).search(burst_set, verbose).await
    }
}
