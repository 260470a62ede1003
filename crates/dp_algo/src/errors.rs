//! Shared error type for `dp_algo`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlgoError {
    #[error(transparent)]
    Core(#[from] dp_core::CoreError),

    #[error("primitive has not been fit yet")]
    NotFit,

    #[error("algorithm {tag} does not support {capability}")]
    CapabilityMismatch { tag: &'static str, capability: &'static str },

    #[error("no legal (metric, arity, type, strategy) combination for {metric:?} over arity {arity} on {data_type:?}")]
    IllegalMetricCombination {
        metric: &'static str,
        arity: usize,
        data_type: &'static str,
    },

    #[error("rhs columns must be numeric for the euclidean metric")]
    NonNumericRhsForEuclidean,
}

pub type AlgoResult<T> = Result<T, AlgoError>;
