//! Points Calculator (§4.5): materializes a cluster's RHS columns
//! into the point representation the chosen metric needs.
//!
//! Grounded on the original engine's `points_calculator.h` family — one
//! materializer per (metric, arity) pair, sharing the q-gram cache for
//! cosine across the whole Execute call (§5: "the q-gram cache is
//! private to one Execute, grown on demand, never shared [across runs]").

use dp_core::Relation;
use std::collections::HashMap;

/// `(row index, value)`, the unit the cluster verifier operates over
/// (§3 "Indexed Point").
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedPoint<T> {
    pub row: usize,
    pub value: T,
}

/// A q-gram vector: multiset of length-q substrings, normalized to a
/// unit vector under the counting measure, so cosine distance reduces to
/// a dot product of these maps.
#[derive(Clone, Debug, PartialEq)]
pub struct QGramVector {
    counts: HashMap<String, f64>,
    norm: f64,
}

impl QGramVector {
    pub fn build(s: &str, q: usize) -> Self {
        let chars: Vec<char> = s.chars().collect();
        let mut counts: HashMap<String, f64> = HashMap::new();
        if chars.len() >= q && q > 0 {
            for window in chars.windows(q) {
                let gram: String = window.iter().collect();
                *counts.entry(gram).or_insert(0.0) += 1.0;
            }
        } else if !s.is_empty() {
            // Shorter than q: treat the whole string as its own single gram,
            // so very short strings still get a (degenerate) vector.
            *counts.entry(s.to_string()).or_insert(0.0) += 1.0;
        }
        let norm = counts.values().map(|c| c * c).sum::<f64>().sqrt();
        Self { counts, norm }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (&self.counts, &other.counts)
        } else {
            (&other.counts, &self.counts)
        };
        small.iter().map(|(k, v)| v * large.get(k).copied().unwrap_or(0.0)).sum()
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }
}

/// Points materialized for one cluster, tagged by the shape the chosen
/// metric needs.
#[derive(Clone, Debug, PartialEq)]
pub enum Points {
    Numeric1D(Vec<IndexedPoint<f64>>),
    EuclideanNd(Vec<IndexedPoint<Vec<f64>>>),
    Strings(Vec<IndexedPoint<String>>),
    QGrams(Vec<IndexedPoint<QGramVector>>),
}

/// Cache mapping each distinct RHS string to its q-gram vector, shared
/// across every cluster within one Execute call (§5).
#[derive(Default)]
pub struct QGramCache {
    q: usize,
    cache: HashMap<String, QGramVector>,
}

impl QGramCache {
    pub fn new(q: usize) -> Self {
        Self { q, cache: HashMap::new() }
    }

    pub fn get_or_build(&mut self, s: &str) -> QGramVector {
        self.cache
            .entry(s.to_string())
            .or_insert_with(|| QGramVector::build(s, self.q))
            .clone()
    }
}

/// Materializes `rows` over `rhs_indices` for the metric implied by
/// `is_string_metric`/`qgram_cache`. Rows with a null RHS cell are simply
/// excluded here — the null policy itself (§4.7) is decided by the
/// caller before this is invoked, since it needs row-level detail for
/// highlight construction.
pub fn materialize_cluster(
    relation: &Relation,
    rhs_indices: &[usize],
    rows: &[usize],
    is_string_metric: bool,
    qgram_cache: Option<&mut QGramCache>,
) -> Points {
    if is_string_metric {
        let col = relation.column(rhs_indices[0]).expect("validated rhs index");
        let strings: Vec<IndexedPoint<String>> = rows
            .iter()
            .filter(|&&row| !col.is_null(row))
            .map(|&row| IndexedPoint { row, value: col.as_str(row).unwrap_or("").to_string() })
            .collect();

        if let Some(cache) = qgram_cache {
            let qgrams = strings
                .into_iter()
                .map(|p| IndexedPoint { row: p.row, value: cache.get_or_build(&p.value) })
                .collect();
            return Points::QGrams(qgrams);
        }
        return Points::Strings(strings);
    }

    if rhs_indices.len() == 1 {
        let col = relation.column(rhs_indices[0]).expect("validated rhs index");
        let points = rows
            .iter()
            .filter_map(|&row| col.as_f64(row).map(|v| IndexedPoint { row, value: v }))
            .collect();
        return Points::Numeric1D(points);
    }

    let cols: Vec<_> = rhs_indices
        .iter()
        .map(|&i| relation.column(i).expect("validated rhs index"))
        .collect();
    let points = rows
        .iter()
        .filter_map(|&row| {
            let vals: Option<Vec<f64>> = cols.iter().map(|c| c.as_f64(row)).collect();
            vals.map(|value| IndexedPoint { row, value })
        })
        .collect();
    Points::EuclideanNd(points)
}
