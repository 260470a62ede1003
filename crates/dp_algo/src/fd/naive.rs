//! A brute-force (partition-based) FD discovery algorithm: for every RHS
//! column, tests candidate LHS verticals in increasing arity, skipping any
//! candidate that is a superset of an already-accepted minimal LHS for that
//! RHS. Not the fastest possible search (no TANE-style pruning lattice),
//! but its correctness is easy to see end to end — the reference
//! implementation the rest of the crate is tested against.

use crate::errors::{AlgoError, AlgoResult};
use crate::fd::Fd;
use crate::primitive::Primitive;
use dp_core::options::{OptionPhase, OptionSpec, OptionValue, OptionsRegistry};
use dp_core::relation::{Column, TypedValue};
use dp_core::{Relation, Vertical};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const OPT_EQUAL_NULLS: &str = "equal_nulls";
const OPT_MAX_LHS_ARITY: &str = "max_lhs";

pub struct NaiveFdAlgorithm {
    options: OptionsRegistry,
    relation: Option<Relation>,
    fds: Vec<Fd>,
    num_columns: usize,
}

impl Default for NaiveFdAlgorithm {
    fn default() -> Self {
        let mut options = OptionsRegistry::new();
        options.register(
            OptionSpec::new(
                OPT_EQUAL_NULLS,
                "treat two nulls in the same column as equal for FD checking",
                OptionPhase::PreFit,
            )
            .with_default(OptionValue::Bool(true)),
        );
        options.register(
            OptionSpec::new(
                OPT_MAX_LHS_ARITY,
                "largest LHS arity to search (0 = unbounded)",
                OptionPhase::PreFit,
            )
            .with_default(OptionValue::UInt(0)),
        );
        Self { options, relation: None, fds: Vec::new(), num_columns: 0 }
    }
}

impl NaiveFdAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fds(&self) -> &[Fd] {
        &self.fds
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn get_json_fds(&self) -> String {
        crate::fd::get_json_fds(&self.fds)
    }

    pub fn fletcher16(&self) -> u32 {
        crate::fd::fletcher16(self.get_json_fds().as_bytes())
    }

    pub fn get_keys(&self) -> Vec<usize> {
        crate::fd::get_keys(&self.fds, self.num_columns)
    }

    fn equal_nulls(&self) -> bool {
        self.options.get(OPT_EQUAL_NULLS).and_then(|v| v.as_bool()).unwrap_or(true)
    }

    fn max_lhs_arity(&self) -> usize {
        self.options
            .get(OPT_MAX_LHS_ARITY)
            .and_then(|v| v.as_uint())
            .filter(|&n| n != 0)
            .map(|n| n as usize)
            .unwrap_or(self.num_columns.saturating_sub(1))
    }

    fn discover(&mut self) {
        let relation = self.relation.as_ref().expect("fit called before execute");
        let equal_nulls = self.equal_nulls();
        let max_arity = self.max_lhs_arity();
        let all_cols: Vec<usize> = (0..self.num_columns).collect();

        let mut fds = Vec::new();
        for &rhs in &all_cols {
            let universe: Vec<usize> = all_cols.iter().copied().filter(|&c| c != rhs).collect();
            let mut accepted_for_rhs: Vec<Vertical> = Vec::new();

            'arity: for arity in 0..=max_arity.min(universe.len()) {
                for combo in combinations(&universe, arity) {
                    let lhs = Vertical::from_indices(combo);
                    if accepted_for_rhs.iter().any(|a| a.is_subset_of(&lhs)) {
                        continue;
                    }
                    if fd_holds(relation, &lhs, rhs, equal_nulls) {
                        accepted_for_rhs.push(lhs.clone());
                        fds.push(Fd::new(lhs, rhs));
                    }
                }
                if arity == 0 && !accepted_for_rhs.is_empty() {
                    // rhs is constant: every other FD to it is implied, stop searching.
                    break 'arity;
                }
            }
        }
        debug!(count = fds.len(), "discovered functional dependencies");
        self.fds = fds;
    }
}

impl Primitive for NaiveFdAlgorithm {
    fn set_option(&mut self, name: &str, value: OptionValue) -> AlgoResult<()> {
        self.options.set(name, value).map_err(AlgoError::from)
    }

    fn options(&self) -> &OptionsRegistry {
        &self.options
    }

    fn fit(&mut self, relation: &Relation) -> AlgoResult<()> {
        self.num_columns = relation.num_columns();
        self.relation = Some(relation.clone());
        Ok(())
    }

    fn execute(&mut self) -> AlgoResult<Duration> {
        if self.relation.is_none() {
            return Err(AlgoError::NotFit);
        }
        let (_, elapsed) = crate::primitive::timed(|| self.discover());
        Ok(elapsed)
    }

    fn reset_state(&mut self) {
        self.fds.clear();
    }

    fn phase_names(&self) -> &[&'static str] {
        &["discover"]
    }
}

#[derive(PartialEq, Eq, Hash, Clone)]
enum CellKey {
    Int(i64),
    DoubleBits(u64),
    Decimal(i128, u32),
    Str(String),
    Null,
    NullUnique(usize),
}

fn cell_key(column: &Column, row: usize, equal_nulls: bool) -> CellKey {
    if column.is_null(row) {
        return if equal_nulls { CellKey::Null } else { CellKey::NullUnique(row) };
    }
    match column.value(row).expect("checked not-null above") {
        TypedValue::Integer(i) => CellKey::Int(i),
        TypedValue::Double(d) => CellKey::DoubleBits(d.to_bits()),
        TypedValue::BigDecimal(d) => CellKey::Decimal(d.mantissa, d.scale),
        TypedValue::Str(s) => CellKey::Str(s.to_string()),
    }
}

fn group_key(relation: &Relation, vertical: &Vertical, row: usize, equal_nulls: bool) -> Vec<CellKey> {
    vertical
        .indices()
        .into_iter()
        .map(|idx| {
            let column = relation.column(idx).expect("index drawn from relation's own columns");
            cell_key(column, row, equal_nulls)
        })
        .collect()
}

/// `lhs -> rhs` holds iff every group of rows sharing the same `lhs` values
/// also shares the same `rhs` value (the lhs-partition refines the
/// lhs∪rhs-partition).
fn fd_holds(relation: &Relation, lhs: &Vertical, rhs: usize, equal_nulls: bool) -> bool {
    let rhs_col = relation.column(rhs).expect("rhs index is in range");
    let mut seen: HashMap<Vec<CellKey>, CellKey> = HashMap::new();
    for row in 0..relation.num_rows() {
        let key = group_key(relation, lhs, row, equal_nulls);
        let rhs_key = cell_key(rhs_col, row, equal_nulls);
        match seen.get(&key) {
            Some(expected) if *expected != rhs_key => return false,
            Some(_) => {}
            None => {
                seen.insert(key, rhs_key);
            }
        }
    }
    true
}

fn combinations(universe: &[usize], k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > universe.len() {
        return Vec::new();
    }
    let mut results = Vec::new();
    let mut current = Vec::with_capacity(k);
    combinations_helper(universe, k, 0, &mut current, &mut results);
    results
}

fn combinations_helper(
    universe: &[usize],
    k: usize,
    start: usize,
    current: &mut Vec<usize>,
    results: &mut Vec<Vec<usize>>,
) {
    if current.len() == k {
        results.push(current.clone());
        return;
    }
    for i in start..universe.len() {
        current.push(universe[i]);
        combinations_helper(universe, k, i + 1, current, results);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_io::csv_source::{load_csv_reader, CsvOptions};

    fn load(csv: &str) -> Relation {
        load_csv_reader(csv.as_bytes(), "t", CsvOptions::default()).unwrap()
    }

    #[test]
    fn discovers_key_determined_fd() {
        // id -> name, id is a key.
        let rel = load("id,name\n1,alice\n2,bob\n3,carol\n");
        let mut algo = NaiveFdAlgorithm::new();
        algo.fit(&rel).unwrap();
        algo.execute().unwrap();
        assert!(algo.fds().iter().any(|fd| fd.lhs == Vertical::from_indices([0]) && fd.rhs == 1));
        assert_eq!(algo.get_keys(), vec![0]);
    }

    #[test]
    fn constant_column_yields_empty_lhs_fd() {
        let rel = load("a,b\n1,x\n2,x\n3,x\n");
        let mut algo = NaiveFdAlgorithm::new();
        algo.fit(&rel).unwrap();
        algo.execute().unwrap();
        assert!(algo.fds().iter().any(|fd| fd.lhs.is_empty() && fd.rhs == 1));
    }

    #[test]
    fn minimality_drops_superset_lhs() {
        // a -> b should block {a,c} -> b from being reported.
        let rel = load("a,b,c\n1,10,100\n2,20,200\n3,30,300\n");
        let mut algo = NaiveFdAlgorithm::new();
        algo.fit(&rel).unwrap();
        algo.execute().unwrap();
        let has_minimal = algo.fds().iter().any(|fd| fd.lhs == Vertical::from_indices([0]) && fd.rhs == 1);
        let has_superset = algo
            .fds()
            .iter()
            .any(|fd| fd.lhs == Vertical::from_indices([0, 2]) && fd.rhs == 1);
        assert!(has_minimal);
        assert!(!has_superset);
    }

    #[test]
    fn max_lhs_option_is_settable_by_its_documented_name() {
        let mut algo = NaiveFdAlgorithm::new();
        assert!(algo.set_option("max_lhs", OptionValue::UInt(1)).is_ok());
    }

    #[test]
    fn fletcher16_matches_manual_computation() {
        let rel = load("a,b\n1,x\n2,x\n");
        let mut algo = NaiveFdAlgorithm::new();
        algo.fit(&rel).unwrap();
        algo.execute().unwrap();
        let expected = crate::fd::fletcher16(algo.get_json_fds().as_bytes());
        assert_eq!(algo.fletcher16(), expected);
    }
}
