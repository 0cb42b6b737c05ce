use analysis_core::stats::{align, dated_returns};
use analysis_core::{
    valid_closes, AnalysisError, Bar, Market, PriceHistoryProvider, ReferenceRateProvider,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Benchmarks, fallback rates and lookback used by [`QuantAnalysisEngine::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSettings {
    pub domestic_benchmark: String,
    pub international_benchmark: String,
    pub domestic_risk_free_fallback: f64,
    pub international_risk_free_fallback: f64,
    pub lookback_days: i64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            domestic_benchmark: "^KS11".to_string(),
            international_benchmark: "^GSPC".to_string(),
            domestic_risk_free_fallback: 0.035,
            international_risk_free_fallback: 0.045,
            lookback_days: 365,
        }
    }
}

impl RiskSettings {
    pub fn benchmark_for(&self, market: Market) -> &str {
        match market {
            Market::Domestic => &self.domestic_benchmark,
            Market::International => &self.international_benchmark,
        }
    }

    pub fn fallback_rate(&self, market: Market) -> f64 {
        match market {
            Market::Domestic => self.domestic_risk_free_fallback,
            Market::International => self.international_risk_free_fallback,
        }
    }
}

/// Risk and performance statistics of one instrument over the lookback window.
/// Ratios and volatility are annualized fractions (0.25 = 25%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub symbol: String,
    pub benchmark: String,
    pub market: Market,
    pub risk_free_rate: f64,
    pub annualized_volatility: f64,
    pub cagr: f64,
    pub total_return: f64,
    pub beta: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub observations: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Sample standard deviation of daily returns scaled by sqrt(252).
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    returns.std_dev() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Compound annual growth; the raw total return when no time has elapsed.
pub fn cagr(total_return: f64, days_elapsed: i64) -> f64 {
    if days_elapsed <= 0 {
        return total_return;
    }
    (1.0 + total_return).powf(DAYS_PER_YEAR / days_elapsed as f64) - 1.0
}

/// cov(asset, benchmark) / var(benchmark), 1.0 when the benchmark does not move.
pub fn beta(asset_returns: &[f64], benchmark_returns: &[f64]) -> f64 {
    let n = asset_returns.len().min(benchmark_returns.len());
    if n < 2 {
        return 1.0;
    }
    let asset = &asset_returns[..n];
    let bench = &benchmark_returns[..n];

    let bench_variance = bench.variance();
    if !bench_variance.is_finite() || bench_variance == 0.0 {
        return 1.0;
    }
    asset.covariance(bench) / bench_variance
}

pub fn sharpe_ratio(cagr: f64, risk_free_rate: f64, volatility: f64) -> f64 {
    if volatility == 0.0 {
        return 0.0;
    }
    (cagr - risk_free_rate) / volatility
}

/// Like Sharpe, but divided by the annualized deviation of the losing days only.
pub fn sortino_ratio(cagr: f64, risk_free_rate: f64, returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    // a single losing day has no sample deviation
    if downside.len() < 2 {
        return 0.0;
    }
    let downside_dev = downside.std_dev() * TRADING_DAYS_PER_YEAR.sqrt();
    if downside_dev == 0.0 || !downside_dev.is_finite() {
        return 0.0;
    }
    (cagr - risk_free_rate) / downside_dev
}

/// Worst peak-to-trough decline of cumulative growth, as a fraction <= 0.
pub fn max_drawdown(closes: &[f64]) -> f64 {
    let first = match closes.first() {
        Some(first) if *first > 0.0 => *first,
        _ => return 0.0,
    };

    let mut running_max = 1.0_f64;
    let mut worst = 0.0_f64;
    for close in closes {
        let cumulative = close / first;
        running_max = running_max.max(cumulative);
        worst = worst.min(cumulative / running_max - 1.0);
    }
    worst
}

pub struct QuantAnalysisEngine {
    settings: RiskSettings,
}

impl QuantAnalysisEngine {
    pub fn new() -> Self {
        Self::with_settings(RiskSettings::default())
    }

    pub fn with_settings(settings: RiskSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }

    /// Computes every metric from already fetched bars.
    /// Either series with fewer than two usable closes is an error, never a partial result.
    pub fn compute(
        &self,
        symbol: &str,
        benchmark: &str,
        bars: &[Bar],
        benchmark_bars: &[Bar],
        risk_free_rate: f64,
    ) -> Result<RiskMetrics, AnalysisError> {
        let closes = valid_closes(bars);
        let bench_closes = valid_closes(benchmark_bars);

        if closes.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 valid prices for {}, got {}",
                symbol,
                closes.len()
            )));
        }
        if bench_closes.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 valid prices for benchmark {}, got {}",
                benchmark,
                bench_closes.len()
            )));
        }

        let asset_returns = dated_returns(&closes);
        let bench_returns = dated_returns(&bench_closes);
        let returns: Vec<f64> = asset_returns.iter().map(|(_, r)| *r).collect();

        let (start_date, first) = closes[0];
        let (end_date, last) = closes[closes.len() - 1];
        let total_return = last / first - 1.0;
        let days_elapsed = (end_date - start_date).num_days();

        let volatility = annualized_volatility(&returns);
        let growth = cagr(total_return, days_elapsed);

        let (aligned_asset, aligned_bench) = align(&asset_returns, &bench_returns);
        if aligned_asset.len() < 2 {
            warn!(
                "{} and {} share only {} trading days; beta defaults to 1.0",
                symbol,
                benchmark,
                aligned_asset.len()
            );
        }
        let price_only: Vec<f64> = closes.iter().map(|(_, c)| *c).collect();

        let metrics = RiskMetrics {
            symbol: symbol.to_string(),
            benchmark: benchmark.to_string(),
            market: Market::for_symbol(symbol),
            risk_free_rate,
            annualized_volatility: volatility,
            cagr: growth,
            total_return,
            beta: beta(&aligned_asset, &aligned_bench),
            sharpe_ratio: sharpe_ratio(growth, risk_free_rate, volatility),
            sortino_ratio: sortino_ratio(growth, risk_free_rate, &returns),
            max_drawdown: max_drawdown(&price_only),
            observations: closes.len(),
            start_date,
            end_date,
        };

        let all_finite = [
            metrics.annualized_volatility,
            metrics.cagr,
            metrics.beta,
            metrics.sharpe_ratio,
            metrics.sortino_ratio,
            metrics.max_drawdown,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(AnalysisError::InvalidInput(format!(
                "price history for {} produced non-finite statistics",
                symbol
            )));
        }

        Ok(metrics)
    }

    /// Current reference rate for the market, or the configured fallback.
    pub async fn risk_free_rate<P>(&self, provider: &P, market: Market) -> f64
    where
        P: ReferenceRateProvider + ?Sized,
    {
        let fallback = self.settings.fallback_rate(market);
        match provider.reference_rate(market).await {
            Ok(Some(rate)) if rate.is_finite() => rate,
            Ok(_) => {
                warn!(
                    "No {} reference rate available, using fallback {:.4}",
                    market.label(),
                    fallback
                );
                fallback
            }
            Err(e) => {
                warn!(
                    "Reference rate lookup failed for {} market: {}; using fallback {:.4}",
                    market.label(),
                    e,
                    fallback
                );
                fallback
            }
        }
    }

    /// Fetches the instrument, its market's benchmark and the risk-free rate, then computes.
    pub async fn analyze<P>(&self, provider: &P, symbol: &str) -> Result<RiskMetrics, AnalysisError>
    where
        P: PriceHistoryProvider + ReferenceRateProvider + ?Sized,
    {
        let market = Market::for_symbol(symbol);
        let benchmark = self.settings.benchmark_for(market).to_string();
        let days = self.settings.lookback_days;

        debug!("Risk metrics for {} against {}", symbol, benchmark);

        let (bars, benchmark_bars, risk_free_rate) = tokio::join!(
            provider.price_history(symbol, days),
            provider.price_history(&benchmark, days),
            self.risk_free_rate(provider, market),
        );

        self.compute(symbol, &benchmark, &bars?, &benchmark_bars?, risk_free_rate)
    }
}

impl Default for QuantAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
