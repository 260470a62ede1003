//! dp_pipeline — orchestration: load a dataset, construct a registered
//! `Primitive` by tag, wire caller-supplied options onto it, drive
//! `Fit`/`Execute`, and hand back a typed result. No parsing or algorithm
//! logic lives here; this crate only sequences `dp_io` and `dp_algo`.

#![forbid(unsafe_code)]

use dp_algo::fd::Fd;
use dp_algo::metric::highlight::Highlight;
use dp_algo::registry::{create_primitive_instance, AlgorithmTag};
use dp_algo::Primitive;
use dp_core::options::OptionValue;
use dp_io::csv_source::{load_csv_file, CsvOptions};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] dp_io::IoError),

    #[error(transparent)]
    Algo(#[from] dp_algo::errors::AlgoError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Options for `run_fd_discovery`, mirroring the option vocabulary in
/// §6: `equal_nulls`, `max_lhs`.
#[derive(Clone, Debug)]
pub struct FdDiscoveryConfig {
    pub equal_nulls: bool,
    pub max_lhs_arity: u64,
}

impl Default for FdDiscoveryConfig {
    fn default() -> Self {
        Self { equal_nulls: true, max_lhs_arity: 0 }
    }
}

#[derive(Debug)]
pub struct FdDiscoveryResult {
    pub fds: Vec<Fd>,
    pub json: String,
    pub fletcher16: u32,
    pub keys: Vec<usize>,
    pub column_names: Vec<String>,
    pub elapsed: Duration,
}

pub fn run_fd_discovery(
    csv_path: impl AsRef<Path>,
    csv_opts: CsvOptions,
    config: FdDiscoveryConfig,
) -> PipelineResult<FdDiscoveryResult> {
    let relation = load_csv_file(csv_path, csv_opts)?;
    let column_names: Vec<String> = relation.column_names().into_iter().map(str::to_string).collect();

    let mut instance = create_primitive_instance(AlgorithmTag::NaiveFd);
    instance.set_option("equal_nulls", OptionValue::Bool(config.equal_nulls))?;
    instance.set_option("max_lhs", OptionValue::UInt(config.max_lhs_arity))?;
    instance.fit(&relation)?;
    let elapsed = instance.execute()?;

    let algo = instance.as_fd_capable()?;
    let fds = algo.fds().to_vec();
    let json = algo.get_json_fds();
    let fletcher16 = algo.fletcher16();
    let keys = algo.get_keys();

    info!(fds = fds.len(), keys = keys.len(), ?elapsed, "fd discovery complete");
    Ok(FdDiscoveryResult { fds, json, fletcher16, keys, column_names, elapsed })
}

/// Options for `run_mfd_verification`, mirroring §6's
/// `lhs_indices`/`rhs_indices`/`metric`/`metric_algorithm`/`parameter`/
/// `dist_from_null_is_infinity`/`q`/`equal_nulls`.
#[derive(Clone, Debug)]
pub struct MfdVerificationConfig {
    pub lhs_indices: Vec<u64>,
    pub rhs_indices: Vec<u64>,
    pub metric: String,
    pub metric_algorithm: String,
    pub parameter: f64,
    pub dist_from_null_is_infinity: bool,
    pub q: u64,
    pub equal_nulls: bool,
}

#[derive(Debug)]
pub struct MfdVerificationResult {
    pub holds: bool,
    pub highlights: Vec<Highlight>,
    pub column_names: Vec<String>,
    pub elapsed: Duration,
}

pub fn run_mfd_verification(
    csv_path: impl AsRef<Path>,
    csv_opts: CsvOptions,
    config: MfdVerificationConfig,
) -> PipelineResult<MfdVerificationResult> {
    let relation = load_csv_file(csv_path, csv_opts)?;
    let column_names: Vec<String> = relation.column_names().into_iter().map(str::to_string).collect();

    let mut instance = create_primitive_instance(AlgorithmTag::MetricVerifier);
    instance.set_option("equal_nulls", OptionValue::Bool(config.equal_nulls))?;
    instance.set_option("metric", OptionValue::Enum(config.metric))?;
    instance.set_option("metric_algorithm", OptionValue::Enum(config.metric_algorithm))?;
    instance.set_option("parameter", OptionValue::Float(config.parameter))?;
    instance.set_option(
        "dist_from_null_is_infinity",
        OptionValue::Bool(config.dist_from_null_is_infinity),
    )?;
    instance.set_option("q", OptionValue::UInt(config.q))?;
    instance.fit(&relation)?;
    instance.set_option("lhs_indices", OptionValue::UIntList(config.lhs_indices))?;
    instance.set_option("rhs_indices", OptionValue::UIntList(config.rhs_indices))?;
    let elapsed = instance.execute()?;

    let verifier = instance.as_metric_capable()?;
    let holds = verifier.holds();
    let highlights = verifier.highlights().to_vec();

    info!(holds, highlights = highlights.len(), ?elapsed, "mfd verification complete");
    Ok(MfdVerificationResult { holds, highlights, column_names, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn fd_discovery_end_to_end() {
        let file = write_csv("id,name\n1,alice\n2,bob\n3,carol\n");
        let result = run_fd_discovery(file.path(), CsvOptions::default(), FdDiscoveryConfig::default()).unwrap();
        assert_eq!(result.keys, vec![0]);
        assert!(result.fds.iter().any(|fd| fd.rhs == 1));
    }

    #[test]
    fn mfd_verification_end_to_end() {
        let file = write_csv("lhs,rhs\n0,3.0\n0,4.5\n0,5.0\n");
        let config = MfdVerificationConfig {
            lhs_indices: vec![0],
            rhs_indices: vec![1],
            metric: "euclidean".to_string(),
            metric_algorithm: "brute".to_string(),
            parameter: 2.0,
            dist_from_null_is_infinity: true,
            q: 2,
            equal_nulls: true,
        };
        let result = run_mfd_verification(file.path(), CsvOptions::default(), config).unwrap();
        assert!(result.holds);
        assert!(result.highlights.is_empty());
    }
}
