use analysis_core::Bar;

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average, seeded with the SMA of the first `period` values.
/// `result[j]` lines up with `data[period - 1 + j]`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len() - period + 1);
    let seed = data[..period].iter().sum::<f64>() / period as f64;
    result.push(seed);

    for value in &data[period..] {
        let prev = result[result.len() - 1];
        result.push((value - prev) * multiplier + prev);
    }

    result
}

/// Relative Strength Index (Wilder smoothing).
/// The first value needs `period + 1` prices; `result[j]` lines up with `data[period + j]`.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let changes: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| c.max(0.0);
    let loss = |c: f64| (-c).max(0.0);

    let mut avg_gain = changes[..period].iter().map(|c| gain(*c)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|c| loss(*c)).sum::<f64>() / period as f64;

    let to_rsi = |avg_gain: f64, avg_loss: f64| {
        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    };

    let mut rsi_values = Vec::with_capacity(changes.len() - period + 1);
    rsi_values.push(to_rsi(avg_gain, avg_loss));

    for change in &changes[period..] {
        avg_gain = (avg_gain * (period - 1) as f64 + gain(*change)) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(*change)) / period as f64;
        rsi_values.push(to_rsi(avg_gain, avg_loss));
    }

    rsi_values
}

/// MACD (Moving Average Convergence Divergence)
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// All three series end on the last price. The MACD line starts once the slow EMA
/// exists; the signal line and histogram need `signal_period - 1` more values.
pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    let empty = MacdResult { macd_line: vec![], signal_line: vec![], histogram: vec![] };
    if fast_period == 0 || signal_period == 0 || slow_period <= fast_period {
        return empty;
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);
    if ema_slow.is_empty() {
        return empty;
    }

    let offset = slow_period - fast_period;
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, slow)| ema_fast[i + offset] - slow)
        .collect();

    let signal_line = ema(&macd_line, signal_period);
    let hist_offset = macd_line.len() - signal_line.len();
    let histogram = signal_line
        .iter()
        .enumerate()
        .map(|(i, signal)| macd_line[i + hist_offset] - signal)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bands at `std_dev` population standard deviations around the SMA.
pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    if period == 0 || data.len() < period {
        return BollingerBands { upper: vec![], middle: vec![], lower: vec![] };
    }

    let middle = sma(data, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for i in period - 1..data.len() {
        let slice = &data[i + 1 - period..=i];
        let mean = middle[i + 1 - period];
        let variance: f64 = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        upper.push(mean + std_dev * std);
        lower.push(mean - std_dev * std);
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Stochastic Oscillator
pub struct StochasticResult {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Slow stochastic: raw %K over `k_period`, smoothed with an SMA of `smooth_k`,
/// and %D as the SMA of smoothed %K over `d_period`. A flat range reads as 50.
pub fn stochastic(bars: &[Bar], k_period: usize, d_period: usize, smooth_k: usize) -> StochasticResult {
    if k_period == 0 || bars.len() < k_period {
        return StochasticResult { k: vec![], d: vec![] };
    }

    let mut raw_k = Vec::with_capacity(bars.len() - k_period + 1);
    for i in k_period - 1..bars.len() {
        let slice = &bars[i + 1 - k_period..=i];
        let highest = slice.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = slice.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        let k = if highest == lowest {
            50.0
        } else {
            100.0 * (bars[i].close - lowest) / (highest - lowest)
        };
        raw_k.push(k);
    }

    let k_values = if smooth_k > 1 { sma(&raw_k, smooth_k) } else { raw_k };
    let d_values = sma(&k_values, d_period);

    StochasticResult {
        k: k_values,
        d: d_values,
    }
}

/// On-Balance Volume
pub fn obv(bars: &[Bar]) -> Vec<f64> {
    if bars.is_empty() {
        return vec![];
    }

    let mut obv_values = Vec::with_capacity(bars.len());
    obv_values.push(bars[0].volume);

    for i in 1..bars.len() {
        let prev_obv = obv_values[i - 1];
        let new_obv = if bars[i].close > bars[i - 1].close {
            prev_obv + bars[i].volume
        } else if bars[i].close < bars[i - 1].close {
            prev_obv - bars[i].volume
        } else {
            prev_obv
        };
        obv_values.push(new_obv);
    }

    obv_values
}
