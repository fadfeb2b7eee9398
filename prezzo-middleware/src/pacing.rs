//! Outbound-call pacing: mutual exclusion plus minimum spacing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::debug;

use prezzo_core::PrezzoError;
use prezzo_types::PacingConfig;

struct PacingState {
    last_call: Option<Instant>,
}

/// Guards every outbound provider call behind one mutex and a minimum
/// interval between consecutive calls.
///
/// The guard is single-shot: one [`acquire`](Self::acquire) maps to one
/// bounded lock attempt. Retrying with backoff is the caller's job, which
/// keeps this a primitive rather than a retrying client.
///
/// Clone the surrounding `Arc` to share one guard across every resolver in
/// the process; concurrent callers then serialize on the same `last_call`
/// record instead of racing past the minimum spacing.
pub struct PacingGuard {
    state: Arc<Mutex<PacingState>>,
    min_interval: Duration,
}

/// RAII permit proving the holder owns the outbound-call slot.
///
/// Dropping the permit releases the lock, so release is guaranteed on every
/// exit path: success, provider error, or panic unwind.
pub struct PacingPermit {
    _guard: OwnedMutexGuard<PacingState>,
}

impl std::fmt::Debug for PacingPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacingPermit").finish_non_exhaustive()
    }
}

impl PacingGuard {
    /// Build a fresh guard with no recorded call instant.
    #[must_use]
    pub fn new(cfg: &PacingConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(PacingState { last_call: None })),
            min_interval: cfg.min_interval,
        }
    }

    /// One bounded lock acquisition.
    ///
    /// On grant, the acquirer suspends for whatever remains of the minimum
    /// interval since the previous call, then the call instant is stamped
    /// and the permit returned.
    ///
    /// # Errors
    /// Returns `RateLimitBusy` when the mutex stays held past `max_wait`.
    pub async fn acquire(&self, max_wait: Duration) -> Result<PacingPermit, PrezzoError> {
        let locked = tokio::time::timeout(max_wait, Arc::clone(&self.state).lock_owned()).await;
        let mut guard = locked.map_err(|_| PrezzoError::RateLimitBusy {
            waited_ms: u64::try_from(max_wait.as_millis()).unwrap_or(u64::MAX),
        })?;

        if let Some(last) = guard.last_call {
            let since = last.elapsed();
            if since < self.min_interval {
                let pause = self.min_interval - since;
                debug!(pause_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX),
                    "pacing: honoring minimum call spacing");
                tokio::time::sleep(pause).await;
            }
        }
        guard.last_call = Some(Instant::now());
        Ok(PacingPermit { _guard: guard })
    }
}
