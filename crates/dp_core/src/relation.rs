//! The typed column store (§3 "Relation", §4.1).
//!
//! A `Relation` owns its data column-major: each `Column` carries its
//! parsed, typed values plus a parallel null mask. Nothing here parses
//! raw bytes — that's `dp_io`'s job during `Fit`; this module only knows
//! how to hold and query already-typed data.

use crate::bitset::BitSet;
use crate::errors::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Double,
    BigDecimal,
    String,
    Undefined,
}

/// A fixed-point decimal: `mantissa * 10^(-scale)`. Kept integer-exact so
/// equality/ordering never suffer float rounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BigDecimal {
    pub mantissa: i128,
    pub scale: u32,
}

impl BigDecimal {
    pub fn parse(s: &str) -> Option<Self> {
        let (sign, rest) = match s.strip_prefix('-') {
            Some(r) => (-1i128, r),
            None => (1i128, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let digits: String = format!("{int_part}{frac_part}");
        let mantissa: i128 = if digits.is_empty() { 0 } else { digits.parse().ok()? };
        Some(BigDecimal { mantissa: sign * mantissa, scale: frac_part.len() as u32 })
    }

    /// Compare two decimals exactly by aligning scales (cross-multiply
    /// the smaller-scale mantissa up before comparing).
    fn aligned(&self, other: &Self) -> (i128, i128) {
        if self.scale == other.scale {
            (self.mantissa, other.mantissa)
        } else if self.scale < other.scale {
            let factor = 10i128.pow(other.scale - self.scale);
            (self.mantissa * factor, other.mantissa)
        } else {
            let factor = 10i128.pow(self.scale - other.scale);
            (self.mantissa, other.mantissa * factor)
        }
    }

    pub fn to_f64(self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }
}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let (a, b) = self.aligned(other);
        a.cmp(&b)
    }
}

/// A single typed value read from the relation (never a null — nulls are
/// represented by the column's mask, per §3).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TypedValue<'a> {
    Integer(i64),
    Double(f64),
    BigDecimal(BigDecimal),
    Str(&'a str),
}

#[derive(Clone, Debug, PartialEq)]
enum ColumnValues {
    Integer(Vec<i64>),
    Double(Vec<f64>),
    BigDecimal(Vec<BigDecimal>),
    String(Vec<String>),
    Undefined(usize),
}

/// One column of the relation: name, position, declared type, typed
/// values, and a null mask parallel to the row indices (§3).
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    index: usize,
    data_type: DataType,
    values: ColumnValues,
    nulls: BitSet,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::BigDecimal(v) => v.len(),
            ColumnValues::String(v) => v.len(),
            ColumnValues::Undefined(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, row: usize) -> bool {
        self.nulls.contains(row)
    }

    pub fn value(&self, row: usize) -> Option<TypedValue<'_>> {
        if self.is_null(row) {
            return None;
        }
        match &self.values {
            ColumnValues::Integer(v) => v.get(row).map(|&x| TypedValue::Integer(x)),
            ColumnValues::Double(v) => v.get(row).map(|&x| TypedValue::Double(x)),
            ColumnValues::BigDecimal(v) => v.get(row).map(|&x| TypedValue::BigDecimal(x)),
            ColumnValues::String(v) => v.get(row).map(|s| TypedValue::Str(s.as_str())),
            ColumnValues::Undefined(_) => None,
        }
    }

    pub fn as_f64(&self, row: usize) -> Option<f64> {
        match self.value(row)? {
            TypedValue::Integer(i) => Some(i as f64),
            TypedValue::Double(d) => Some(d),
            TypedValue::BigDecimal(d) => Some(d.to_f64()),
            TypedValue::Str(_) => None,
        }
    }

    pub fn as_str(&self, row: usize) -> Option<&str> {
        match self.value(row)? {
            TypedValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Builder used by `dp_io` while streaming rows; kept separate from
/// `Column` so the public, read-only accessors above stay simple.
pub struct ColumnBuilder {
    name: String,
    index: usize,
    ints: Vec<i64>,
    doubles: Vec<f64>,
    decimals: Vec<BigDecimal>,
    strings: Vec<String>,
    nulls: BitSet,
    row: usize,
    inferred: Option<DataType>,
}

impl ColumnBuilder {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            ints: Vec::new(),
            doubles: Vec::new(),
            decimals: Vec::new(),
            strings: Vec::new(),
            nulls: BitSet::new(),
            row: 0,
            inferred: None,
        }
    }

    /// Feed one raw cell. `None` marks a null. Type inference narrows from
    /// `Integer` to `Double` to `String` the first time a value doesn't fit
    /// the current guess — matching the engine's "parse, don't guess twice"
    /// approach: once we've fallen back to `String` we stay there.
    pub fn push(&mut self, raw: Option<&str>) {
        let row = self.row;
        self.row += 1;
        let raw = match raw {
            Some(r) if !r.is_empty() => r,
            _ => {
                self.nulls.insert(row);
                self.strings.push(String::new());
                self.ints.push(0);
                self.doubles.push(0.0);
                self.decimals.push(BigDecimal { mantissa: 0, scale: 0 });
                return;
            }
        };
        self.strings.push(raw.to_string());
        match self.inferred.unwrap_or(DataType::Integer) {
            DataType::Integer => match raw.parse::<i64>() {
                Ok(v) => {
                    self.ints.push(v);
                    self.doubles.push(v as f64);
                    self.decimals.push(BigDecimal { mantissa: v as i128, scale: 0 });
                    self.inferred = Some(DataType::Integer);
                }
                Err(_) => {
                    self.downgrade_to_double(row, raw);
                }
            },
            DataType::Double => match raw.parse::<f64>() {
                Ok(v) => {
                    self.doubles.push(v);
                    self.ints.push(0);
                    self.decimals.push(BigDecimal::parse(raw).unwrap_or(BigDecimal { mantissa: 0, scale: 0 }));
                    self.inferred = Some(DataType::Double);
                }
                Err(_) => {
                    self.inferred = Some(DataType::String);
                }
            },
            DataType::String | DataType::BigDecimal | DataType::Undefined => {
                self.inferred = Some(DataType::String);
            }
        }
    }

    fn downgrade_to_double(&mut self, row: usize, raw: &str) {
        // Re-synthesize the double vector from everything parsed so far as
        // integers, then this row.
        self.doubles = self.ints.iter().map(|&i| i as f64).collect();
        self.decimals = self.ints.iter().map(|&i| BigDecimal { mantissa: i as i128, scale: 0 }).collect();
        self.ints.clear();
        match raw.parse::<f64>() {
            Ok(v) => {
                self.doubles.push(v);
                self.decimals.push(BigDecimal::parse(raw).unwrap_or(BigDecimal { mantissa: 0, scale: 0 }));
                self.inferred = Some(DataType::Double);
            }
            Err(_) => {
                self.inferred = Some(DataType::String);
            }
        }
        let _ = row;
    }

    pub fn finish(self) -> Column {
        let n = self.strings.len();
        let (data_type, values) = match self.inferred {
            None => (DataType::Undefined, ColumnValues::Undefined(n)),
            Some(DataType::Integer) => (DataType::Integer, ColumnValues::Integer(self.ints)),
            Some(DataType::Double) => (DataType::Double, ColumnValues::Double(self.doubles)),
            Some(DataType::String) | Some(DataType::BigDecimal) | Some(DataType::Undefined) => {
                (DataType::String, ColumnValues::String(self.strings))
            }
        };
        Column { name: self.name, index: self.index, data_type, values, nulls: self.nulls }
    }
}

/// An ordered sequence of typed columns drawn from one dataset (§3).
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    name: String,
    columns: Vec<Column>,
}

impl Relation {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, CoreError> {
        if columns.is_empty() {
            return Err(CoreError::EmptyDataset);
        }
        Ok(Self { name: name.into(), columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Result<&Column, CoreError> {
        self.columns.get(index).ok_or(CoreError::ColumnIndexOutOfRange {
            index,
            num_columns: self.columns.len(),
        })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_integer_then_widens_to_double() {
        let mut b = ColumnBuilder::new("a", 0);
        b.push(Some("1"));
        b.push(Some("2"));
        b.push(Some("3.5"));
        let col = b.finish();
        assert_eq!(col.data_type(), DataType::Double);
        assert_eq!(col.as_f64(0), Some(1.0));
        assert_eq!(col.as_f64(2), Some(3.5));
    }

    #[test]
    fn nulls_tracked_independently_of_type() {
        let mut b = ColumnBuilder::new("a", 0);
        b.push(Some("1"));
        b.push(None);
        b.push(Some("3"));
        let col = b.finish();
        assert!(col.is_null(1));
        assert!(col.value(1).is_none());
        assert_eq!(col.as_f64(0), Some(1.0));
    }

    #[test]
    fn big_decimal_compares_across_scales() {
        let a = BigDecimal::parse("1.50").unwrap();
        let b = BigDecimal::parse("1.5").unwrap();
        assert_eq!(a, b);
        let c = BigDecimal::parse("1.49").unwrap();
        assert!(c < a);
    }

    #[test]
    fn relation_rejects_zero_columns() {
        assert!(matches!(Relation::new("r", vec![]), Err(CoreError::EmptyDataset)));
    }
}
