use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use prezzo_core::{Clock, PriceConnector, PrezzoError, SystemClock};
use prezzo_middleware::{PacingGuard, ResolutionCache};
use prezzo_types::{BackoffConfig, CacheConfig, ConnectorKey, PacingConfig, ResolverConfig};

/// Resolver that walks registered providers in priority order.
pub struct Prezzo {
    pub(crate) connectors: Vec<Arc<dyn PriceConnector>>,
    pub(crate) cfg: ResolverConfig,
    pub(crate) cache: ResolutionCache,
    pub(crate) pacing: Arc<PacingGuard>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Prezzo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prezzo")
            .field("connectors", &self.connectors.len())
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

enum PacingChoice {
    Own(PacingConfig),
    Shared(Arc<PacingGuard>),
}

/// Builder for constructing a [`Prezzo`] resolver with custom configuration.
pub struct PrezzoBuilder {
    connectors: Vec<Arc<dyn PriceConnector>>,
    cfg: ResolverConfig,
    cache_cfg: CacheConfig,
    pacing: PacingChoice,
    clock: Arc<dyn Clock>,
}

impl Default for PrezzoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PrezzoBuilder {
    /// Create a new builder with conservative defaults: no connectors, a
    /// five-second provider timeout, 5s/10s/20s acquisition backoff, and the
    /// system wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: ResolverConfig::default(),
            cache_cfg: CacheConfig::default(),
            pacing: PacingChoice::Own(PacingConfig::default()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Register a provider connector.
    ///
    /// Registration order is the fallback order when no explicit priority
    /// list is set. Duplicates are not deduplicated; avoid registering the
    /// same connector twice.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn PriceConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Set the preferred connector ordering by key.
    ///
    /// Listed connectors come first, in list order; unlisted but registered
    /// connectors keep their registration order after them. Unknown keys are
    /// dropped during `build`.
    #[must_use]
    pub fn priority(mut self, keys: &[ConnectorKey]) -> Self {
        self.cfg.priority = keys.to_vec();
        self
    }

    /// Set the per-provider request timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Upper bound on a single pacing-guard acquisition attempt.
    #[must_use]
    pub const fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.acquire_timeout = timeout;
        self
    }

    /// Override the acquisition backoff schedule.
    #[must_use]
    pub const fn backoff(mut self, cfg: BackoffConfig) -> Self {
        self.cfg.backoff = cfg;
        self
    }

    /// Override the cache TTLs and capacity.
    #[must_use]
    pub fn cache(mut self, cfg: CacheConfig) -> Self {
        self.cache_cfg = cfg;
        self
    }

    /// Give this resolver its own pacing guard with the supplied spacing.
    #[must_use]
    pub fn pacing(mut self, cfg: PacingConfig) -> Self {
        self.pacing = PacingChoice::Own(cfg);
        self
    }

    /// Share an existing pacing guard with other resolvers in the process,
    /// serializing their outbound calls against one spacing record.
    #[must_use]
    pub fn shared_pacing(mut self, guard: Arc<PacingGuard>) -> Self {
        self.pacing = PacingChoice::Shared(guard);
        self
    }

    /// Inject a clock; tests pin "now" to make future-date checks
    /// deterministic.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the resolver.
    ///
    /// Priority keys naming no registered connector are dropped, and
    /// duplicates collapse to their first occurrence.
    ///
    /// # Errors
    /// Returns `InvalidInput` if no connectors have been registered.
    pub fn build(mut self) -> Result<Prezzo, PrezzoError> {
        if self.connectors.is_empty() {
            return Err(PrezzoError::argument(
                "no connectors registered; add at least one via with_connector(...)",
            ));
        }

        let known: HashSet<&'static str> = self.connectors.iter().map(|c| c.name()).collect();
        let mut seen: HashSet<&'static str> = HashSet::new();
        self.cfg
            .priority
            .retain(|k| known.contains(k.as_str()) && seen.insert(k.as_str()));

        let pacing = match self.pacing {
            PacingChoice::Own(cfg) => Arc::new(PacingGuard::new(&cfg)),
            PacingChoice::Shared(guard) => guard,
        };

        Ok(Prezzo {
            connectors: self.connectors,
            cache: ResolutionCache::new(&self.cache_cfg),
            pacing,
            clock: self.clock,
            cfg: self.cfg,
        })
    }
}

impl Prezzo {
    /// Start building a new `Prezzo` resolver.
    #[must_use]
    pub fn builder() -> PrezzoBuilder {
        PrezzoBuilder::new()
    }

    /// Registered connectors reordered by the priority list; unlisted ones
    /// keep registration order after the listed block.
    pub(crate) fn ordered(&self) -> Vec<Arc<dyn PriceConnector>> {
        let mut out: Vec<(usize, Arc<dyn PriceConnector>)> =
            self.connectors.iter().cloned().enumerate().collect();
        if self.cfg.priority.is_empty() {
            return out.into_iter().map(|(_, c)| c).collect();
        }
        let pos: HashMap<&'static str, usize> = self
            .cfg
            .priority
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();
        out.sort_by_key(|(orig_i, c)| (pos.get(c.name()).copied().unwrap_or(usize::MAX), *orig_i));
        out.into_iter().map(|(_, c)| c).collect()
    }

    /// Wrap a provider future with the configured timeout and a standardized
    /// timeout error.
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, PrezzoError>
    where
        Fut: std::future::Future<Output = Result<T, PrezzoError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(PrezzoError::provider_timeout(connector_name)))
    }
}
