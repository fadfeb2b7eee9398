//! Cross-cutting layers between the price resolver and its connectors: the
//! resolution cache and the outbound-call pacing guard.
//!
//! Both are explicit, injected objects. The resolver owns (or shares) them;
//! nothing in this crate is process-global state.
#![warn(missing_docs)]

mod cache;
mod pacing;

pub use cache::{CacheKey, Lookup, ResolutionCache};
pub use pacing::{PacingGuard, PacingPermit};
