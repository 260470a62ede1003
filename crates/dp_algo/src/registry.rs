//! Algorithm Registry (§4.4): a closed, tagged enumeration of every
//! profiler variant, with construction-by-tag and capability-filtered
//! listing.
//!
//! The original engine expresses this with a compile-time tuple
//! (`PrimitiveTypes`) plus `mp11::mp_with_index` to dispatch by runtime
//! index, checking `is_convertible`/`is_base_of` against the requested
//! base at each tuple slot. Rust has no direct equivalent without heavy
//! macro machinery, so this models the same idea as an explicit sum type
//! (`AlgorithmInstance`) plus one accessor function per capability trait
//! — the capability check becomes a `match` arm instead of a
//! compile-time trait-bound probe, but the set of tags and the
//! fail-closed behavior on a capability mismatch are the same.

use crate::errors::AlgoError;
use crate::fd::naive::NaiveFdAlgorithm;
use crate::fd::Fd;
use crate::metric::highlight::Highlight;
use crate::metric::verifier::MetricVerifier;
use crate::primitive::Primitive;
use dp_core::options::{OptionValue, OptionsRegistry};
use dp_core::Relation;
use std::time::Duration;

/// Every profiler variant this crate knows how to construct. New
/// variants require an entry here (§6 "Algorithm tags").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmTag {
    NaiveFd,
    MetricVerifier,
}

impl AlgorithmTag {
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmTag::NaiveFd => "naive_fd",
            AlgorithmTag::MetricVerifier => "metric_verifier",
        }
    }

    pub fn all() -> &'static [AlgorithmTag] {
        &[AlgorithmTag::NaiveFd, AlgorithmTag::MetricVerifier]
    }
}

/// Capability implemented by every FD-producing algorithm (§4.3).
pub trait FdCapable: Primitive {
    fn fds(&self) -> &[Fd];
    fn get_json_fds(&self) -> String;
    fn fletcher16(&self) -> u32;
    fn get_keys(&self) -> Vec<usize>;
}

impl FdCapable for NaiveFdAlgorithm {
    fn fds(&self) -> &[Fd] {
        NaiveFdAlgorithm::fds(self)
    }
    fn get_json_fds(&self) -> String {
        NaiveFdAlgorithm::get_json_fds(self)
    }
    fn fletcher16(&self) -> u32 {
        NaiveFdAlgorithm::fletcher16(self)
    }
    fn get_keys(&self) -> Vec<usize> {
        NaiveFdAlgorithm::get_keys(self)
    }
}

/// Capability implemented by the MFD verifier (§4.7).
pub trait MetricCapable: Primitive {
    fn holds(&self) -> bool;
    fn highlights(&self) -> &[Highlight];
}

impl MetricCapable for MetricVerifier {
    fn holds(&self) -> bool {
        MetricVerifier::holds(self)
    }
    fn highlights(&self) -> &[Highlight] {
        MetricVerifier::highlights(self)
    }
}

/// A constructed profiler instance, tagged by variant.
pub enum AlgorithmInstance {
    NaiveFd(NaiveFdAlgorithm),
    MetricVerifier(MetricVerifier),
}

impl AlgorithmInstance {
    pub fn tag(&self) -> AlgorithmTag {
        match self {
            AlgorithmInstance::NaiveFd(_) => AlgorithmTag::NaiveFd,
            AlgorithmInstance::MetricVerifier(_) => AlgorithmTag::MetricVerifier,
        }
    }

    pub fn as_fd_capable(&mut self) -> Result<&mut dyn FdCapable, AlgoError> {
        match self {
            AlgorithmInstance::NaiveFd(a) => Ok(a),
            other => Err(AlgoError::CapabilityMismatch { tag: other.tag().name(), capability: "FdCapable" }),
        }
    }

    pub fn as_metric_capable(&mut self) -> Result<&mut dyn MetricCapable, AlgoError> {
        match self {
            AlgorithmInstance::MetricVerifier(a) => Ok(a),
            other => Err(AlgoError::CapabilityMismatch { tag: other.tag().name(), capability: "MetricCapable" }),
        }
    }
}

impl Primitive for AlgorithmInstance {
    fn set_option(&mut self, name: &str, value: OptionValue) -> crate::errors::AlgoResult<()> {
        match self {
            AlgorithmInstance::NaiveFd(a) => a.set_option(name, value),
            AlgorithmInstance::MetricVerifier(a) => a.set_option(name, value),
        }
    }

    fn options(&self) -> &OptionsRegistry {
        match self {
            AlgorithmInstance::NaiveFd(a) => a.options(),
            AlgorithmInstance::MetricVerifier(a) => a.options(),
        }
    }

    fn fit(&mut self, relation: &Relation) -> crate::errors::AlgoResult<()> {
        match self {
            AlgorithmInstance::NaiveFd(a) => a.fit(relation),
            AlgorithmInstance::MetricVerifier(a) => a.fit(relation),
        }
    }

    fn execute(&mut self) -> crate::errors::AlgoResult<Duration> {
        match self {
            AlgorithmInstance::NaiveFd(a) => a.execute(),
            AlgorithmInstance::MetricVerifier(a) => a.execute(),
        }
    }

    fn reset_state(&mut self) {
        match self {
            AlgorithmInstance::NaiveFd(a) => a.reset_state(),
            AlgorithmInstance::MetricVerifier(a) => a.reset_state(),
        }
    }

    fn phase_names(&self) -> &[&'static str] {
        match self {
            AlgorithmInstance::NaiveFd(a) => a.phase_names(),
            AlgorithmInstance::MetricVerifier(a) => a.phase_names(),
        }
    }
}

/// Constructs the variant named by `tag`. Unlike the capability accessors,
/// this never fails — every tag in `AlgorithmTag` has exactly one
/// constructor.
pub fn create_primitive_instance(tag: AlgorithmTag) -> AlgorithmInstance {
    match tag {
        AlgorithmTag::NaiveFd => AlgorithmInstance::NaiveFd(NaiveFdAlgorithm::new()),
        AlgorithmTag::MetricVerifier => AlgorithmInstance::MetricVerifier(MetricVerifier::new()),
    }
}

/// Tags whose variant implements `FdCapable` (§4.4 `GetAllDerived`).
pub fn get_all_derived_fd() -> Vec<AlgorithmTag> {
    vec![AlgorithmTag::NaiveFd]
}

/// Tags whose variant implements `MetricCapable`.
pub fn get_all_derived_metric() -> Vec<AlgorithmTag> {
    vec![AlgorithmTag::MetricVerifier]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_each_tag() {
        for &tag in AlgorithmTag::all() {
            let instance = create_primitive_instance(tag);
            assert_eq!(instance.tag(), tag);
        }
    }

    #[test]
    fn fd_capability_mismatch_on_metric_verifier() {
        let mut instance = create_primitive_instance(AlgorithmTag::MetricVerifier);
        let err = instance.as_fd_capable().unwrap_err();
        assert!(matches!(err, AlgoError::CapabilityMismatch { .. }));
    }

    #[test]
    fn metric_capability_mismatch_on_naive_fd() {
        let mut instance = create_primitive_instance(AlgorithmTag::NaiveFd);
        let err = instance.as_metric_capable().unwrap_err();
        assert!(matches!(err, AlgoError::CapabilityMismatch { .. }));
    }

    #[test]
    fn get_all_derived_partitions_by_capability() {
        assert_eq!(get_all_derived_fd(), vec![AlgorithmTag::NaiveFd]);
        assert_eq!(get_all_derived_metric(), vec![AlgorithmTag::MetricVerifier]);
    }
}
