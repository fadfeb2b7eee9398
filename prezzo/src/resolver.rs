//! The resolution algorithm: normalize, consult the cache, take the pacing
//! guard, walk providers, store the outcome.

use tracing::{debug, warn};

use prezzo_core::{PriceQuery, PrezzoError, UtcInstant, ensure_not_future, normalize};
use prezzo_middleware::{CacheKey, Lookup, PacingPermit};

use crate::Prezzo;
use crate::backoff::delay_for_attempt;

impl Prezzo {
    /// Resolve one historical price query.
    ///
    /// Outcomes:
    /// - `Ok(price)` — a positive finite USD price from the first provider
    ///   that produced one (or from the cache);
    /// - `InvalidInput` / `FutureInstant` — rejected before any cache or
    ///   network activity;
    /// - `RateLimitBusy` — the pacing guard stayed held through the bounded
    ///   retry budget; never cached, retry later;
    /// - `NoData` — every provider exhausted; cached under the negative TTL.
    ///
    /// # Errors
    /// See the outcome list above.
    pub async fn resolve(&self, query: &PriceQuery) -> Result<f64, PrezzoError> {
        let instant = normalize(&query.date, &query.tz_label)?;
        ensure_not_future(instant, self.clock.now_ms())?;

        let key = CacheKey::new(&query.token, instant, &query.tz_label, query.target);
        match self.cache.get(&key).await {
            Lookup::Price(price) => {
                debug!(token = %query.token, price, "resolved from cache");
                return Ok(price);
            }
            Lookup::NegativeHit => {
                debug!(token = %query.token, "cached absence, skipping providers");
                return Err(PrezzoError::no_data(format!(
                    "{} {} at {instant} (cached absence)",
                    query.token,
                    query.target.as_str()
                )));
            }
            Lookup::Miss => {}
        }

        let permit = self.acquire_paced().await?;
        let walked = self.walk_providers(query, instant).await;
        drop(permit);

        match walked? {
            Some(price) => {
                self.cache.put_price(key, price).await;
                Ok(price)
            }
            None => {
                self.cache.put_negative(key).await;
                Err(PrezzoError::no_data(format!(
                    "{} {} at {instant}: every provider exhausted",
                    query.token,
                    query.target.as_str()
                )))
            }
        }
    }

    /// Resolve a batch of queries sequentially, one outcome per query.
    ///
    /// Absence is a per-row outcome, never fatal to the batch; pacing
    /// between successive outbound calls goes through the same guard
    /// `resolve` uses.
    pub async fn resolve_many(&self, queries: &[PriceQuery]) -> Vec<Result<f64, PrezzoError>> {
        let mut out = Vec::with_capacity(queries.len());
        for query in queries {
            out.push(self.resolve(query).await);
        }
        out
    }

    /// Retry single-shot guard acquisition over the bounded backoff
    /// schedule.
    async fn acquire_paced(&self) -> Result<PacingPermit, PrezzoError> {
        let backoff = self.cfg.backoff;
        let mut waited_ms = 0u64;
        let mut attempt = 0u32;
        loop {
            match self.pacing.acquire(self.cfg.acquire_timeout).await {
                Ok(permit) => return Ok(permit),
                Err(PrezzoError::RateLimitBusy { waited_ms: w }) => {
                    waited_ms += w;
                    attempt += 1;
                    if attempt >= backoff.max_attempts.max(1) {
                        return Err(PrezzoError::RateLimitBusy { waited_ms });
                    }
                    let delay = delay_for_attempt(&backoff, attempt - 1);
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "pacing guard busy, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    waited_ms += u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Walk connectors in priority order, trying each advertised capability
    /// (candles, then tickers, then snapshots) until a price lands.
    ///
    /// `Ok(None)` means every provider was exhausted; a terminal error aborts
    /// the walk and is surfaced uncached.
    async fn walk_providers(
        &self,
        query: &PriceQuery,
        instant: UtcInstant,
    ) -> Result<Option<f64>, PrezzoError> {
        for connector in self.ordered() {
            if !connector.supports_token(&query.token) {
                debug!(
                    connector = connector.name(),
                    token = %query.token,
                    "connector skips this token"
                );
                continue;
            }

            if let Some(p) = connector.as_candle_provider()
                && let Some(price) = self
                    .attempt(
                        connector.name(),
                        "candles",
                        p.candle_extreme(&query.token, instant, query.target),
                    )
                    .await?
            {
                return Ok(Some(price));
            }

            if let Some(p) = connector.as_ticker_provider()
                && let Some(price) = self
                    .attempt(connector.name(), "tickers", p.ticker_price(&query.token))
                    .await?
            {
                return Ok(Some(price));
            }

            if let Some(p) = connector.as_snapshot_provider()
                && let Some(price) = self
                    .attempt(
                        connector.name(),
                        "snapshots",
                        p.snapshot_extreme(&query.token, instant, query.target),
                    )
                    .await?
            {
                return Ok(Some(price));
            }
        }
        Ok(None)
    }

    /// One bounded provider call. Walk-continuing failures collapse to
    /// `Ok(None)`; terminal failures propagate.
    async fn attempt<Fut>(
        &self,
        connector: &'static str,
        capability: &'static str,
        fut: Fut,
    ) -> Result<Option<f64>, PrezzoError>
    where
        Fut: std::future::Future<Output = Result<f64, PrezzoError>>,
    {
        match Self::provider_call_with_timeout(connector, self.cfg.provider_timeout, fut).await {
            Ok(price) if price.is_finite() && price > 0.0 => {
                debug!(connector, capability, price, "provider answered");
                Ok(Some(price))
            }
            Ok(price) => {
                warn!(connector, capability, price, "discarding unusable provider answer");
                Ok(None)
            }
            Err(e) if e.continues_fallback() => {
                debug!(connector, capability, error = %e, "provider yielded nothing, walking on");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
