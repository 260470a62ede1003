//! Functional dependency discovery: the `Fd` type, canonical JSON emission,
//! the Fletcher16 fingerprint, and key discovery (§4.1, §4.2).
//!
//! Grounded directly on the original engine's `algorithms/fd_algorithm.cpp`:
//! `GetJsonFDs`/`Fletcher16`/`GetKeys` are transliterated faithfully (same
//! additive-checksum constants, same "count arity-1 FDs per column plus
//! arity-0 constant-column FDs" key rule) rather than redesigned.

pub mod naive;

use dp_core::Vertical;
use serde::Serialize;
use std::collections::BTreeMap;

/// One discovered (or verified) functional dependency `lhs -> rhs`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fd {
    pub lhs: Vertical,
    pub rhs: usize,
}

impl Fd {
    pub fn new(lhs: Vertical, rhs: usize) -> Self {
        Self { lhs, rhs }
    }
}

#[derive(Serialize)]
struct FdJson {
    lhs: Vec<usize>,
    rhs: usize,
}

/// Canonical JSON array of `{"lhs":[...],"rhs":N}`, ordered lexicographically
/// by `(rhs, lhs-tuple)` so that two runs over the same relation always emit
/// byte-identical output (§4.3 — the property `Fletcher16` depends on).
pub fn get_json_fds(fds: &[Fd]) -> String {
    let mut sorted: Vec<&Fd> = fds.iter().collect();
    sorted.sort_by(|a, b| (a.rhs, a.lhs.indices()).cmp(&(b.rhs, b.lhs.indices())));
    let as_json: Vec<FdJson> = sorted
        .into_iter()
        .map(|fd| FdJson { lhs: fd.lhs.indices(), rhs: fd.rhs })
        .collect();
    serde_json::to_string(&as_json).expect("Vec<FdJson> is always serializable")
}

/// 16-bit Fletcher checksum over the canonical JSON bytes, bit-for-bit the
/// original engine's additive algorithm (`sum1`/`sum2` mod 255, combined as
/// `sum2 << 8 | sum1`).
pub fn fletcher16(bytes: &[u8]) -> u32 {
    let mut sum1: u32 = 0;
    let mut sum2: u32 = 0;
    let modulus = 255;
    for &byte in bytes {
        sum1 = (sum1 + byte as u32) % modulus;
        sum2 = (sum2 + sum1) % modulus;
    }
    (sum2 << 8) | sum1
}

/// A column is a key iff `{A} -> B` holds for every other attribute `B`.
/// Counting: for each column, how many arity-1 FDs have it as the sole LHS
/// column, plus how many arity-0 (constant-column) FDs exist overall — a
/// constant column's `∅ -> B` implies `{A} -> B` for any `A`, so it must be
/// added to every column's count before comparing against
/// `num_columns - 1`.
pub fn get_keys(fds: &[Fd], num_columns: usize) -> Vec<usize> {
    let mut fds_count_per_col: BTreeMap<usize, usize> = BTreeMap::new();
    let mut cols_of_equal_values = 0usize;

    for fd in fds {
        match fd.lhs.arity() {
            0 => cols_of_equal_values += 1,
            1 => {
                let col = fd.lhs.indices()[0];
                *fds_count_per_col.entry(col).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    fds_count_per_col
        .into_iter()
        .filter(|(_, count)| count + 1 + cols_of_equal_values == num_columns)
        .map(|(col, _)| col)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_orders_by_rhs_then_lhs_tuple() {
        let fds = vec![
            Fd::new(Vertical::from_indices([1]), 2),
            Fd::new(Vertical::from_indices([0]), 2),
            Fd::new(Vertical::from_indices([0]), 1),
        ];
        let json = get_json_fds(&fds);
        assert_eq!(
            json,
            r#"[{"lhs":[0],"rhs":1},{"lhs":[0],"rhs":2},{"lhs":[1],"rhs":2}]"#
        );
    }

    #[test]
    fn fletcher16_is_deterministic() {
        let a = fletcher16(b"abcde");
        let b = fletcher16(b"abcde");
        assert_eq!(a, b);
        assert_ne!(a, fletcher16(b"abcdf"));
    }

    #[test]
    fn get_keys_counts_constant_columns_into_every_candidate() {
        // 3 columns: {0}->1 and ∅->2 (column 2 is constant, so {0}->2 is implied).
        let fds = vec![
            Fd::new(Vertical::from_indices([0]), 1),
            Fd::new(Vertical::empty(), 2),
        ];
        // column 0: 1 direct fd + 1 constant-column credit == num_columns - 1.
        assert_eq!(get_keys(&fds, 3), vec![0]);
    }
}
