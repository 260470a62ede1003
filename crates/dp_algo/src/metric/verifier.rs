//! `MetricVerifier`: the `Primitive` wiring for the MFD verifier (spec
//! §4.2, §4.6, §4.7). Grounded on the original engine's
//! `metric_verifier.h`: `lhs_indices`/`rhs_indices` only become settable
//! after `Fit` (they need the column count to validate against), and
//! `Execute` builds one cluster function for the whole run rather than
//! re-dispatching per cluster.

use crate::errors::{AlgoError, AlgoResult};
use crate::metric::distance::validate_combination;
use crate::metric::highlight::{sort_highlights, Highlight, SortDirection, SortKey};
use crate::metric::points::{materialize_cluster, QGramCache};
use crate::metric::verify::{null_policy_violation, verify_points};
use crate::metric::{Metric, MetricAlgo};
use crate::primitive::Primitive;
use dp_core::options::{OptionPhase, OptionSpec, OptionValue, OptionsRegistry};
use dp_core::{DataType, Relation};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const OPT_EQUAL_NULLS: &str = "equal_nulls";
const OPT_LHS_INDICES: &str = "lhs_indices";
const OPT_RHS_INDICES: &str = "rhs_indices";
const OPT_METRIC: &str = "metric";
const OPT_METRIC_ALGORITHM: &str = "metric_algorithm";
const OPT_PARAMETER: &str = "parameter";
const OPT_DIST_NULL_INF: &str = "dist_from_null_is_infinity";
const OPT_Q: &str = "q";

pub struct MetricVerifier {
    options: OptionsRegistry,
    relation: Option<Relation>,
    clusters: Vec<Vec<usize>>,
    metric_fd_holds: bool,
    highlights: Vec<Highlight>,
}

impl Default for MetricVerifier {
    fn default() -> Self {
        let mut options = OptionsRegistry::new();
        options.register(
            OptionSpec::new(OPT_EQUAL_NULLS, "treat nulls in LHS as equal", OptionPhase::PreFit)
                .with_default(OptionValue::Bool(true)),
        );
        options.register(
            OptionSpec::new(OPT_METRIC, "distance family: euclidean|levenshtein|cosine", OptionPhase::PreFit)
                .with_default(OptionValue::Enum("euclidean".to_string())),
        );
        options.register(
            OptionSpec::new(OPT_METRIC_ALGORITHM, "verification strategy: brute|approx|calipers", OptionPhase::PreFit)
                .with_default(OptionValue::Enum("brute".to_string())),
        );
        options.register(
            OptionSpec::new(OPT_PARAMETER, "maximum allowed cluster diameter", OptionPhase::PreFit)
                .with_default(OptionValue::Float(0.0)),
        );
        options.register(
            OptionSpec::new(OPT_DIST_NULL_INF, "treat any RHS null as infinite distance", OptionPhase::PreFit)
                .with_default(OptionValue::Bool(true)),
        );
        options.register(
            OptionSpec::new(OPT_Q, "q-gram length for the cosine metric", OptionPhase::PreFit)
                .with_default(OptionValue::UInt(2)),
        );
        options.register(OptionSpec::new(OPT_LHS_INDICES, "LHS column indices", OptionPhase::PostFit));
        options.register(OptionSpec::new(OPT_RHS_INDICES, "RHS column indices", OptionPhase::PostFit));
        Self {
            options,
            relation: None,
            clusters: Vec::new(),
            metric_fd_holds: false,
            highlights: Vec::new(),
        }
    }
}

impl MetricVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holds(&self) -> bool {
        self.metric_fd_holds
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn sort_highlights_by(&mut self, key: SortKey, direction: SortDirection) {
        sort_highlights(&mut self.highlights, key, direction);
    }

    fn uint_list_opt(&self, name: &str) -> AlgoResult<Vec<usize>> {
        self.options
            .get(name)
            .and_then(|v| v.as_uint_list())
            .map(|v| v.iter().map(|&x| x as usize).collect())
            .ok_or_else(|| AlgoError::Core(dp_core::CoreError::InvalidValue {
                name: name.to_string(),
                reason: "must be set before execute".to_string(),
            }))
    }

    fn metric(&self) -> AlgoResult<Metric> {
        let raw = self.options.get(OPT_METRIC).and_then(|v| v.as_str()).unwrap_or("euclidean");
        Metric::parse(raw).ok_or_else(|| AlgoError::Core(dp_core::CoreError::InvalidValue {
            name: OPT_METRIC.to_string(),
            reason: format!("unknown metric {raw}"),
        }))
    }

    fn algo(&self) -> AlgoResult<MetricAlgo> {
        let raw = self.options.get(OPT_METRIC_ALGORITHM).and_then(|v| v.as_str()).unwrap_or("brute");
        MetricAlgo::parse(raw).ok_or_else(|| AlgoError::Core(dp_core::CoreError::InvalidValue {
            name: OPT_METRIC_ALGORITHM.to_string(),
            reason: format!("unknown metric algorithm {raw}"),
        }))
    }

    fn parameter(&self) -> f64 {
        self.options.get(OPT_PARAMETER).and_then(|v| v.as_float()).unwrap_or(0.0)
    }

    fn dist_from_null_is_infinity(&self) -> bool {
        self.options.get(OPT_DIST_NULL_INF).and_then(|v| v.as_bool()).unwrap_or(true)
    }

    fn q(&self) -> usize {
        self.options.get(OPT_Q).and_then(|v| v.as_uint()).unwrap_or(2) as usize
    }

    fn equal_nulls(&self) -> bool {
        self.options.get(OPT_EQUAL_NULLS).and_then(|v| v.as_bool()).unwrap_or(true)
    }

    /// Groups row indices into equivalence classes over `lhs_indices`
    /// (§3 "Cluster"). When `equal_nulls` is false, any row with a
    /// null LHS cell gets its own singleton cluster.
    fn build_clusters(&self, lhs_indices: &[usize]) -> Vec<Vec<usize>> {
        let relation = self.relation.as_ref().expect("fit called before cluster build");
        let equal_nulls = self.equal_nulls();
        let mut groups: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        let mut singletons: Vec<Vec<usize>> = Vec::new();

        for row in 0..relation.num_rows() {
            let has_null = lhs_indices.iter().any(|&c| {
                relation.column(c).map(|col| col.is_null(row)).unwrap_or(true)
            });
            if has_null && !equal_nulls {
                singletons.push(vec![row]);
                continue;
            }
            let key: Vec<String> = lhs_indices
                .iter()
                .map(|&c| {
                    let col = relation.column(c).expect("validated lhs index");
                    if col.is_null(row) {
                        "\u{0}NULL".to_string()
                    } else {
                        format!("{:?}", col.value(row))
                    }
                })
                .collect();
            groups.entry(key).or_default().push(row);
        }

        let mut clusters: Vec<Vec<usize>> = groups.into_values().collect();
        clusters.extend(singletons);
        clusters
    }

    fn rhs_data_type(&self, rhs_indices: &[usize]) -> AlgoResult<DataType> {
        let relation = self.relation.as_ref().expect("fit called before execute");
        let types: Vec<DataType> = rhs_indices
            .iter()
            .map(|&i| relation.column(i).map(|c| c.data_type()))
            .collect::<Result<_, _>>()
            .map_err(AlgoError::from)?;
        Ok(types.first().copied().unwrap_or(DataType::Undefined))
    }

    /// Bounds-checks `lhs_indices` against the fitted relation, mirroring
    /// `rhs_data_type`'s validation so a bad CLI/caller-supplied index
    /// surfaces as `CoreError::ColumnIndexOutOfRange` instead of a panic
    /// in `build_clusters`.
    fn validate_lhs_indices(&self, lhs_indices: &[usize]) -> AlgoResult<()> {
        let relation = self.relation.as_ref().expect("fit called before execute");
        for &i in lhs_indices {
            relation.column(i).map_err(AlgoError::from)?;
        }
        Ok(())
    }
}

impl Primitive for MetricVerifier {
    fn set_option(&mut self, name: &str, value: OptionValue) -> AlgoResult<()> {
        self.options.set(name, value).map_err(AlgoError::from)
    }

    fn options(&self) -> &OptionsRegistry {
        &self.options
    }

    fn fit(&mut self, relation: &Relation) -> AlgoResult<()> {
        self.relation = Some(relation.clone());
        self.options.make_available(OPT_LHS_INDICES);
        self.options.make_available(OPT_RHS_INDICES);
        Ok(())
    }

    fn execute(&mut self) -> AlgoResult<Duration> {
        if self.relation.is_none() {
            return Err(AlgoError::NotFit);
        }
        let lhs_indices = self.uint_list_opt(OPT_LHS_INDICES)?;
        let rhs_indices = self.uint_list_opt(OPT_RHS_INDICES)?;
        let metric = self.metric()?;
        let algo = self.algo()?;
        let parameter = self.parameter();
        let dist_from_null_is_infinity = self.dist_from_null_is_infinity();
        let q = self.q();
        let data_type = self.rhs_data_type(&rhs_indices)?;
        self.validate_lhs_indices(&lhs_indices)?;

        validate_combination(metric, rhs_indices.len(), data_type, algo, q)?;

        self.clusters = self.build_clusters(&lhs_indices);
        let relation = self.relation.as_ref().expect("checked above").clone();
        let is_string_metric = matches!(metric, Metric::Levenshtein | Metric::Cosine);
        let mut qgram_cache = if metric == Metric::Cosine { Some(QGramCache::new(q)) } else { None };

        let (holds, highlights, elapsed) = crate::primitive::timed(|| {
            let mut holds = true;
            let mut highlights = Vec::new();
            for (cluster_id, rows) in self.clusters.iter().enumerate() {
                if let Some((data_index, furthest_data_index)) =
                    null_policy_violation(&relation, &rhs_indices, rows, dist_from_null_is_infinity)
                {
                    holds = false;
                    highlights.push(Highlight {
                        cluster_id,
                        data_index,
                        furthest_data_index,
                        max_distance: f64::INFINITY,
                        furthest_data_index_for_sorting: furthest_data_index,
                    });
                    continue;
                }

                let points = materialize_cluster(
                    &relation,
                    &rhs_indices,
                    rows,
                    is_string_metric,
                    qgram_cache.as_mut(),
                );
                let diameter = verify_points(&points, algo);
                if !diameter.holds(parameter) {
                    holds = false;
                    if let Some((a, b)) = diameter.farthest_pair {
                        highlights.push(Highlight {
                            cluster_id,
                            data_index: a,
                            furthest_data_index: b,
                            max_distance: diameter.max_distance,
                            furthest_data_index_for_sorting: b,
                        });
                    }
                }
            }
            (holds, highlights)
        });

        debug!(holds, highlights = highlights.len(), clusters = self.clusters.len(), "metric fd execute");
        self.metric_fd_holds = holds;
        self.highlights = highlights;
        Ok(elapsed)
    }

    fn reset_state(&mut self) {
        self.metric_fd_holds = false;
        self.highlights.clear();
        self.clusters.clear();
    }

    fn phase_names(&self) -> &[&'static str] {
        &["cluster", "verify"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_io::csv_source::{load_csv_reader, CsvOptions};

    fn load(csv: &str) -> Relation {
        load_csv_reader(csv.as_bytes(), "t", CsvOptions::default()).unwrap()
    }

    fn set_indices(v: &mut MetricVerifier, name: &str, indices: &[u64]) {
        v.set_option(name, OptionValue::UIntList(indices.to_vec())).unwrap();
    }

    #[test]
    fn one_d_mfd_holds_within_parameter() {
        let rel = load("lhs,rhs\n0,3.0\n0,4.5\n0,5.0\n");
        let mut v = MetricVerifier::new();
        v.set_option("parameter", OptionValue::Float(2.0)).unwrap();
        v.fit(&rel).unwrap();
        set_indices(&mut v, "lhs_indices", &[0]);
        set_indices(&mut v, "rhs_indices", &[1]);
        v.execute().unwrap();
        assert!(v.holds());
        assert!(v.highlights().is_empty());
    }

    #[test]
    fn one_d_mfd_fails_outside_parameter() {
        let rel = load("lhs,rhs\n0,3.0\n0,4.5\n0,6.0\n");
        let mut v = MetricVerifier::new();
        v.set_option("parameter", OptionValue::Float(2.0)).unwrap();
        v.fit(&rel).unwrap();
        set_indices(&mut v, "lhs_indices", &[0]);
        set_indices(&mut v, "rhs_indices", &[1]);
        v.execute().unwrap();
        assert!(!v.holds());
        assert_eq!(v.highlights().len(), 1);
        assert_eq!(v.highlights()[0].max_distance, 3.0);
    }

    #[test]
    fn levenshtein_mfd_holds_at_parameter_one() {
        // kitten/sitten/bitten are all exactly one substitution apart, so
        // the true diameter is 1.0 and the MFD holds at parameter=1.0.
        let rel = load("lhs,rhs\n0,kitten\n0,sitten\n0,bitten\n");
        let mut v = MetricVerifier::new();
        v.set_option("metric", OptionValue::Enum("levenshtein".to_string())).unwrap();
        v.set_option("parameter", OptionValue::Float(1.0)).unwrap();
        v.fit(&rel).unwrap();
        set_indices(&mut v, "lhs_indices", &[0]);
        set_indices(&mut v, "rhs_indices", &[1]);
        v.execute().unwrap();
        assert!(v.holds());
    }

    #[test]
    fn levenshtein_mfd_fails_below_true_diameter() {
        let rel = load("lhs,rhs\n0,kitten\n0,sitten\n0,bitten\n");
        let mut v = MetricVerifier::new();
        v.set_option("metric", OptionValue::Enum("levenshtein".to_string())).unwrap();
        v.set_option("parameter", OptionValue::Float(0.0)).unwrap();
        v.fit(&rel).unwrap();
        set_indices(&mut v, "lhs_indices", &[0]);
        set_indices(&mut v, "rhs_indices", &[1]);
        v.execute().unwrap();
        assert!(!v.holds());
    }

    #[test]
    fn out_of_range_lhs_index_is_an_error_not_a_panic() {
        let rel = load("lhs,rhs\n0,3.0\n0,4.5\n");
        let mut v = MetricVerifier::new();
        v.set_option("parameter", OptionValue::Float(2.0)).unwrap();
        v.fit(&rel).unwrap();
        set_indices(&mut v, "lhs_indices", &[99]);
        set_indices(&mut v, "rhs_indices", &[1]);
        let err = v.execute().unwrap_err();
        assert!(matches!(err, AlgoError::Core(dp_core::CoreError::ColumnIndexOutOfRange { .. })));
    }

    #[test]
    fn null_infinity_fails_cluster() {
        let rel = load("lhs,rhs\n0,3.0\n0,\n");
        let mut v = MetricVerifier::new();
        v.set_option("parameter", OptionValue::Float(100.0)).unwrap();
        v.fit(&rel).unwrap();
        set_indices(&mut v, "lhs_indices", &[0]);
        set_indices(&mut v, "rhs_indices", &[1]);
        v.execute().unwrap();
        assert!(!v.holds());
        assert_eq!(v.highlights()[0].max_distance, f64::INFINITY);
    }

    #[test]
    fn euclidean_with_string_rhs_rejected_at_execute() {
        let rel = load("lhs,rhs\n0,a\n0,b\n");
        let mut v = MetricVerifier::new();
        v.fit(&rel).unwrap();
        set_indices(&mut v, "lhs_indices", &[0]);
        set_indices(&mut v, "rhs_indices", &[1]);
        let err = v.execute().unwrap_err();
        assert!(matches!(err, AlgoError::NonNumericRhsForEuclidean));
    }
}
