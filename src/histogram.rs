use tracing::debug;

use crate::dataset::{DataSet, Value, FARE_COLUMN};
use crate::error::{PassengerError, Result};

pub const BUCKET_COUNT: usize = 10;

/// Bucket labels are fixed deciles even though the edges follow the observed
/// range of shares.
pub fn bucket_labels() -> Vec<String> {
    (0..BUCKET_COUNT)
        .map(|i| format!("{}-{}%", i * 10, (i + 1) * 10))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FareHistogram {
    pub buckets: Vec<Bucket>,
}

impl FareHistogram {
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Counts passengers by the share of the total fare their own fare makes up.
pub fn fare_histogram(data: &DataSet) -> Result<FareHistogram> {
    let fares = numeric_fares(data)?;
    if fares.is_empty() {
        return Err(PassengerError::EmptyTable("no fares in table"));
    }
    let total: f64 = fares.iter().sum();
    if total == 0.0 {
        return Err(PassengerError::EmptyTable("fares sum to zero"));
    }
    if !total.is_finite() {
        return Err(PassengerError::parse(FARE_COLUMN, "fares sum to a non-finite total"));
    }

    let shares = fares.iter().map(|fare| fare / total * 100.0).collect::<Vec<_>>();
    let edges = bin_edges(&shares);
    let mut counts = [0u64; BUCKET_COUNT];
    for share in &shares {
        counts[bucket_index(&edges, *share)] += 1;
    }
    debug!(?edges, ?counts, "binned fare shares");

    let buckets = bucket_labels()
        .into_iter()
        .zip(counts)
        .map(|(label, count)| Bucket { label, count })
        .collect();
    Ok(FareHistogram { buckets })
}

/// Null and non-finite fares are skipped; text fares are rejected.
fn numeric_fares(data: &DataSet) -> Result<Vec<f64>> {
    let mut fares = Vec::with_capacity(data.len());
    for value in data.column_values(FARE_COLUMN)? {
        match value {
            Value::Null => {}
            Value::Text(text) => {
                return Err(PassengerError::parse(
                    FARE_COLUMN,
                    format!("non-numeric fare {:?}", text),
                ))
            }
            other => fares.extend(other.as_f64().filter(|fare| fare.is_finite())),
        }
    }
    Ok(fares)
}

/// Ten equal-width, right-closed bins over `[min, max]`. The lowest edge is
/// pushed out by 0.1% of the range so the minimum lands in the first bin; a
/// zero-width range is widened by 0.1% of its value on each side.
fn bin_edges(shares: &[f64]) -> [f64; BUCKET_COUNT + 1] {
    let mut min = shares.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = shares.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let degenerate = min == max;
    if degenerate {
        let pad = if min == 0.0 { 0.001 } else { 0.001 * min.abs() };
        min -= pad;
        max += pad;
    }

    let width = (max - min) / BUCKET_COUNT as f64;
    let mut edges = [0f64; BUCKET_COUNT + 1];
    for (i, edge) in edges.iter_mut().enumerate() {
        *edge = min + width * i as f64;
    }
    edges[BUCKET_COUNT] = max;
    if !degenerate {
        edges[0] -= (max - min) * 0.001;
    }
    edges
}

fn bucket_index(edges: &[f64; BUCKET_COUNT + 1], share: f64) -> usize {
    edges[1..]
        .iter()
        .position(|upper| share <= *upper)
        .unwrap_or(BUCKET_COUNT - 1)
}
