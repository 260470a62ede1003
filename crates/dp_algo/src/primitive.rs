//! The `Primitive` lifecycle (§4.1): every algorithm in this crate —
//! FD discovery and MFD verification alike — is `SetOption* -> Fit ->
//! Execute -> [ResetState]`. Grounded on the original engine's
//! `Primitive`/`FDAlgorithm` base: options are registered up front, some
//! become available only after others are set, `fit` consumes a data
//! stream once, and `execute` returns elapsed time while leaving results
//! queryable through algorithm-specific accessors.

use crate::errors::AlgoResult;
use dp_core::options::{OptionValue, OptionsRegistry};
use dp_core::Relation;
use std::time::{Duration, Instant};

/// Named, orderable progress phases an algorithm reports through while
/// `execute` runs (§4.1 `PhaseNames`). Kept as owned strings rather
/// than `&'static str` so composite algorithms can name phases
/// dynamically (e.g. one phase per candidate arity).
pub trait Primitive {
    fn set_option(&mut self, name: &str, value: OptionValue) -> AlgoResult<()>;

    fn options(&self) -> &OptionsRegistry;

    /// Consume the relation once, establishing whatever per-column caches
    /// the algorithm needs before `execute` runs.
    fn fit(&mut self, relation: &Relation) -> AlgoResult<()>;

    /// Run the algorithm to completion, returning wall-clock elapsed time.
    /// Must be callable only after `fit`.
    fn execute(&mut self) -> AlgoResult<Duration>;

    /// Drop all results accumulated by `execute`, but keep the fitted
    /// relation and options so `execute` can be called again.
    fn reset_state(&mut self);

    fn phase_names(&self) -> &[&'static str];
}

/// Helper for implementors: runs `body`, returning its result alongside
/// the elapsed wall time, matching the original engine's `Execute()`
/// return convention.
pub fn timed<F, T>(body: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = body();
    (result, start.elapsed())
}
