use analysis_core::stats::{dated_returns, pearson};
use analysis_core::{valid_closes, AnalysisError, Bar};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// ticker -> ticker -> Pearson correlation; `None` where a series has no variance.
pub type CorrelationMatrix = BTreeMap<String, BTreeMap<String, Option<f64>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairRisk {
    /// Strong co-movement, little diversification
    High,
    #[serde(rename = "Hedge/Negative")]
    HedgeNegative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificantPair {
    pub pair: [String; 2],
    pub correlation: f64,
    pub risk: PairRisk,
}

/// Daily returns of every ticker restricted to the dates all of them traded.
/// Tickers keep the order given.
pub fn aligned_returns(
    tickers: &[String],
    history: &HashMap<String, Vec<Bar>>,
) -> Result<Vec<Vec<f64>>, AnalysisError> {
    let mut per_ticker: Vec<HashMap<NaiveDate, f64>> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let bars = history
            .get(ticker)
            .filter(|bars| !bars.is_empty())
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no price history for {}", ticker)))?;
        per_ticker.push(dated_returns(&valid_closes(bars)).into_iter().collect());
    }

    let mut common: BTreeSet<NaiveDate> = match per_ticker.first() {
        Some(first) => first.keys().copied().collect(),
        None => BTreeSet::new(),
    };
    for returns in per_ticker.iter().skip(1) {
        common.retain(|date| returns.contains_key(date));
    }

    if common.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "only {} trading days shared by all {} tickers",
            common.len(),
            tickers.len()
        )));
    }

    Ok(per_ticker
        .iter()
        .map(|returns| common.iter().filter_map(|d| returns.get(d).copied()).collect())
        .collect())
}

/// Full symmetric matrix, pairs computed in parallel.
pub fn correlation_matrix(tickers: &[String], returns: &[Vec<f64>]) -> CorrelationMatrix {
    let n = tickers.len().min(returns.len());
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i..n).map(move |j| (i, j)))
        .collect();

    let values: Vec<((usize, usize), Option<f64>)> = pairs
        .par_iter()
        .map(|&(i, j)| ((i, j), pearson(&returns[i], &returns[j])))
        .collect();

    let mut matrix: CorrelationMatrix = BTreeMap::new();
    for ((i, j), value) in values {
        matrix
            .entry(tickers[i].clone())
            .or_default()
            .insert(tickers[j].clone(), value);
        matrix
            .entry(tickers[j].clone())
            .or_default()
            .insert(tickers[i].clone(), value);
    }
    matrix
}

/// Off-diagonal pairs worth acting on: above `threshold` (co-movement risk) or
/// below zero (hedge). Pairs follow the ticker order given; correlations are
/// rounded to 4 decimals.
pub fn significant_pairs(
    tickers: &[String],
    matrix: &CorrelationMatrix,
    threshold: f64,
) -> Vec<SignificantPair> {
    let mut pairs = Vec::new();
    for (i, a) in tickers.iter().enumerate() {
        for b in tickers.iter().skip(i + 1) {
            let value = matrix.get(a).and_then(|row| row.get(b)).copied().flatten();
            let Some(corr) = value else { continue };

            let risk = if corr > threshold {
                PairRisk::High
            } else if corr < 0.0 {
                PairRisk::HedgeNegative
            } else {
                continue;
            };
            pairs.push(SignificantPair {
                pair: [a.clone(), b.clone()],
                correlation: (corr * 10_000.0).round() / 10_000.0,
                risk,
            });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(start_day: i64, closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(start_day + i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let tickers = names(&["A", "B", "C"]);
        let returns = vec![
            vec![0.01, -0.02, 0.03, 0.01],
            vec![0.02, -0.04, 0.06, 0.02],
            vec![-0.01, 0.02, -0.03, -0.01],
        ];
        let m = correlation_matrix(&tickers, &returns);

        assert!((m["A"]["A"].unwrap() - 1.0).abs() < 1e-12);
        assert!((m["A"]["B"].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m["A"]["C"], m["C"]["A"]);
        assert!((m["B"]["C"].unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_significant_pairs_filtering() {
        let tickers = names(&["A", "B", "C", "D"]);
        let returns = vec![
            vec![0.01, -0.02, 0.03, 0.01, 0.0],
            vec![0.02, -0.04, 0.06, 0.02, 0.001],
            vec![-0.01, 0.02, -0.03, -0.01, 0.0],
            vec![0.01, 0.01, -0.01, -0.01, 0.02],
        ];
        let m = correlation_matrix(&tickers, &returns);
        let pairs = significant_pairs(&tickers, &m, 0.7);

        for p in &pairs {
            let corr = m[&p.pair[0]][&p.pair[1]].unwrap();
            match p.risk {
                PairRisk::High => assert!(corr > 0.7),
                PairRisk::HedgeNegative => assert!(corr < 0.0),
            }
        }
        assert!(pairs.iter().any(|p| p.pair == ["A".to_string(), "B".to_string()]));
        assert!(pairs
            .iter()
            .any(|p| p.pair == ["A".to_string(), "C".to_string()] && p.risk == PairRisk::HedgeNegative));
    }

    #[test]
    fn test_flat_series_has_no_correlation() {
        let tickers = names(&["A", "CASH"]);
        let returns = vec![vec![0.01, -0.01, 0.02], vec![0.0, 0.0, 0.0]];
        let m = correlation_matrix(&tickers, &returns);

        assert_eq!(m["A"]["CASH"], None);
        assert!(significant_pairs(&tickers, &m, 0.7).is_empty());
    }

    #[test]
    fn test_alignment_on_shared_dates() {
        let tickers = names(&["A", "B"]);
        let history: HashMap<String, Vec<Bar>> = [
            ("A".to_string(), bars(0, &[10.0, 11.0, 12.0, 13.0, 14.0])),
            ("B".to_string(), bars(2, &[20.0, 21.0, 22.0, 23.0])),
        ]
        .into_iter()
        .collect();

        let aligned = aligned_returns(&tickers, &history).unwrap();
        // B's returns exist for days 3..=5, A's for days 1..=4
        assert_eq!(aligned[0].len(), 2);
        assert_eq!(aligned[1].len(), 2);
        assert!((aligned[0][0] - (13.0 / 12.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_alignment_errors() {
        let tickers = names(&["A", "B"]);
        let only_a: HashMap<String, Vec<Bar>> =
            [("A".to_string(), bars(0, &[1.0, 2.0, 3.0]))].into_iter().collect();
        assert!(matches!(
            aligned_returns(&tickers, &only_a),
            Err(AnalysisError::DataUnavailable(_))
        ));

        let disjoint: HashMap<String, Vec<Bar>> = [
            ("A".to_string(), bars(0, &[1.0, 2.0, 3.0])),
            ("B".to_string(), bars(10, &[1.0, 2.0, 3.0])),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            aligned_returns(&tickers, &disjoint),
            Err(AnalysisError::InsufficientData(_))
        ));
    }
}
