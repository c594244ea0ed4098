use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub p50_seconds: f64,
    pub p90_seconds: f64,
    pub p99_seconds: f64,
    pub mean_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

pub fn summarize_latencies(latencies: &[f64]) -> Option<LatencyMetrics> {
    let sorted = sorted_samples(latencies);
    let min_seconds = *sorted.first()?;
    let max_seconds = *sorted.last()?;

    Some(LatencyMetrics {
        p50_seconds: percentile_sorted(&sorted, 0.50)?,
        p90_seconds: percentile_sorted(&sorted, 0.90)?,
        p99_seconds: percentile_sorted(&sorted, 0.99)?,
        mean_seconds: mean(&sorted)?,
        min_seconds,
        max_seconds,
    })
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 0.50)
}

pub fn percentile(values: &[f64], quantile: f64) -> Option<f64> {
    percentile_sorted(&sorted_samples(values), quantile)
}

/// Exclusive-method quantile: rank `q * (n + 1)` with linear interpolation
/// between neighbouring order statistics. Ranks that land outside the sample
/// clamp to the minimum or maximum rather than extrapolating.
fn percentile_sorted(sorted: &[f64], quantile: f64) -> Option<f64> {
    let (first, last) = (*sorted.first()?, *sorted.last()?);
    if sorted.len() < 2 {
        return Some(first);
    }

    let q = quantile.clamp(0.0, 1.0);
    let rank = q * (sorted.len() as f64 + 1.0);
    if rank <= 1.0 {
        return Some(first);
    }
    if rank >= sorted.len() as f64 {
        return Some(last);
    }

    let lower = rank.floor() as usize;
    let fraction = rank - lower as f64;
    let below = sorted[lower - 1];
    let above = sorted[lower];
    Some(below + (above - below) * fraction)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sorted_samples(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|left, right| left.total_cmp(right));
    sorted
}
