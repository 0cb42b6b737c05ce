use analysis_core::{
    AnalysisError, Bar, CompanyInfo, CompanyInfoProvider, FinancialStatements, Market,
    PriceHistoryProvider, ReferenceRateProvider, ReportingPeriod, StatementProvider,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::hash::Hash;
use tracing::debug;

struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Wraps a provider with per-key TTL caches for company info, statements and
/// price histories. Reference rates always go to the inner provider.
pub struct CachedProvider<P> {
    inner: P,
    ttl_secs: i64,
    company_cache: DashMap<String, CacheEntry<CompanyInfo>>,
    statement_cache: DashMap<(String, ReportingPeriod), CacheEntry<FinancialStatements>>,
    price_cache: DashMap<(String, i64), CacheEntry<Vec<Bar>>>,
}

impl<P> CachedProvider<P> {
    /// A TTL of 0 disables caching.
    pub fn new(inner: P, ttl_secs: u64) -> Self {
        Self {
            inner,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
            company_cache: DashMap::new(),
            statement_cache: DashMap::new(),
            price_cache: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn clear(&self) {
        self.company_cache.clear();
        self.statement_cache.clear();
        self.price_cache.clear();
    }

    /// Number of cached entries across all three caches.
    pub fn len(&self) -> usize {
        self.company_cache.len() + self.statement_cache.len() + self.price_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<K, T>(&self, cache: &DashMap<K, CacheEntry<T>>, key: &K) -> Option<T>
    where
        K: Eq + Hash,
        T: Clone,
    {
        if self.ttl_secs == 0 {
            return None;
        }
        if let Some(entry) = cache.get(key) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < self.ttl_secs {
                return Some(entry.data.clone());
            }
        }
        // stale entries are dropped rather than left to pile up
        cache.remove_if(key, |_, entry| {
            (Utc::now() - entry.cached_at).num_seconds() >= self.ttl_secs
        });
        None
    }

    /// Drops every expired entry.
    pub fn evict_expired(&self) {
        let ttl = self.ttl_secs;
        let now = Utc::now();
        self.company_cache.retain(|_, e| (now - e.cached_at).num_seconds() < ttl);
        self.statement_cache.retain(|_, e| (now - e.cached_at).num_seconds() < ttl);
        self.price_cache.retain(|_, e| (now - e.cached_at).num_seconds() < ttl);
    }

    fn store<K, T>(&self, cache: &DashMap<K, CacheEntry<T>>, key: K, data: T)
    where
        K: Eq + Hash,
    {
        if self.ttl_secs == 0 {
            return;
        }
        cache.insert(
            key,
            CacheEntry {
                data,
                cached_at: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl<P: CompanyInfoProvider> CompanyInfoProvider for CachedProvider<P> {
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, AnalysisError> {
        let key = symbol.to_string();
        if let Some(info) = self.lookup(&self.company_cache, &key) {
            debug!("Company info cache hit for {}", symbol);
            return Ok(info);
        }

        let info = self.inner.company_info(symbol).await?;
        self.store(&self.company_cache, key, info.clone());
        Ok(info)
    }
}

#[async_trait]
impl<P: StatementProvider> StatementProvider for CachedProvider<P> {
    async fn financial_statements(
        &self,
        symbol: &str,
        period: ReportingPeriod,
    ) -> Result<FinancialStatements, AnalysisError> {
        let key = (symbol.to_string(), period);
        if let Some(statements) = self.lookup(&self.statement_cache, &key) {
            debug!("Statement cache hit for {} ({:?})", symbol, period);
            return Ok(statements);
        }

        let statements = self.inner.financial_statements(symbol, period).await?;
        self.store(&self.statement_cache, key, statements.clone());
        Ok(statements)
    }
}

#[async_trait]
impl<P: PriceHistoryProvider> PriceHistoryProvider for CachedProvider<P> {
    async fn price_history(&self, symbol: &str, days: i64) -> Result<Vec<Bar>, AnalysisError> {
        let key = (symbol.to_string(), days);
        if let Some(bars) = self.lookup(&self.price_cache, &key) {
            debug!("Price cache hit for {} ({} days)", symbol, days);
            return Ok(bars);
        }

        let bars = self.inner.price_history(symbol, days).await?;
        self.store(&self.price_cache, key, bars.clone());
        Ok(bars)
    }
}

#[async_trait]
impl<P: ReferenceRateProvider> ReferenceRateProvider for CachedProvider<P> {
    async fn reference_rate(&self, market: Market) -> Result<Option<f64>, AnalysisError> {
        self.inner.reference_rate(market).await
    }
}
