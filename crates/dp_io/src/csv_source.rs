//! CSV-backed dataset loading (§3, §4.1: `Relation` construction).
//!
//! Streams rows through `csv::Reader` directly into `dp_core::relation::ColumnBuilder`s,
//! one per header column, so the whole file is only ever held as typed
//! columns — never as an intermediate `Vec<Vec<String>>`.

use crate::{IoError, IoResult};
use dp_core::relation::ColumnBuilder;
use dp_core::Relation;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

#[derive(Clone, Copy, Debug)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',', has_headers: true }
    }
}

#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv_file(path: impl AsRef<Path>, opts: CsvOptions) -> IoResult<Relation> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IoError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "relation".to_string());
    load_csv_reader(file, &name, opts).map_err(|e| match e {
        IoError::Csv { source, .. } => IoError::Csv { path: path.display().to_string(), source },
        other => other,
    })
}

pub fn load_csv_reader<R: Read>(reader: R, name: &str, opts: CsvOptions) -> IoResult<Relation> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .has_headers(opts.has_headers)
        .flexible(false)
        .from_reader(reader);

    // With headers, the column names and the builder count come from the
    // header row up front. Without headers, csv::Reader's `records()`
    // iterator yields every row (there is no row to skip), so the builders
    // are synthesized lazily from the width of the first record seen.
    let mut builders: Vec<ColumnBuilder> = if opts.has_headers {
        rdr.headers()
            .map_err(|source| IoError::Csv { path: name.to_string(), source })?
            .iter()
            .enumerate()
            .map(|(i, h)| ColumnBuilder::new(h.to_string(), i))
            .collect()
    } else {
        Vec::new()
    };

    let mut num_rows = 0usize;
    for result in rdr.records() {
        let record = result.map_err(|source| IoError::Csv { path: name.to_string(), source })?;
        if builders.is_empty() && !opts.has_headers {
            builders = (0..record.len()).map(|i| ColumnBuilder::new(format!("col{i}"), i)).collect();
        }
        for (i, builder) in builders.iter_mut().enumerate() {
            let raw = record.get(i);
            builder.push(raw);
        }
        num_rows += 1;
    }

    debug!(rows = num_rows, columns = builders.len(), "loaded csv relation");

    let columns = builders.into_iter().map(ColumnBuilder::finish).collect();
    Relation::new(name.to_string(), columns).map_err(IoError::Core)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv_text: &str) -> Relation {
        load_csv_reader(csv_text.as_bytes(), "t", CsvOptions::default()).unwrap()
    }

    #[test]
    fn loads_simple_integer_table() {
        let rel = load("a,b\n1,2\n3,4\n");
        assert_eq!(rel.num_columns(), 2);
        assert_eq!(rel.num_rows(), 2);
        assert_eq!(rel.column(0).unwrap().as_f64(0), Some(1.0));
        assert_eq!(rel.column(1).unwrap().as_f64(1), Some(4.0));
    }

    #[test]
    fn mixed_types_widen_to_string() {
        let rel = load("a,b\n1,x\n2,y\n");
        let b = rel.column(1).unwrap();
        assert_eq!(b.as_str(0), Some("x"));
    }

    #[test]
    fn empty_cell_is_null() {
        let rel = load("a,b\n1,\n,3\n");
        assert!(rel.column(1).unwrap().is_null(0));
        assert!(rel.column(0).unwrap().is_null(1));
    }

    #[test]
    fn column_names_preserved_in_order() {
        let rel = load("id,name,score\n1,alice,9\n");
        assert_eq!(rel.column_names(), vec!["id", "name", "score"]);
    }

    #[test]
    fn headerless_csv_synthesizes_column_names_and_keeps_first_row() {
        let rel = load_csv_reader(
            "1,2\n3,4\n".as_bytes(),
            "t",
            CsvOptions { delimiter: b',', has_headers: false },
        )
        .unwrap();
        assert_eq!(rel.column_names(), vec!["col0", "col1"]);
        assert_eq!(rel.num_rows(), 2);
        assert_eq!(rel.column(0).unwrap().as_f64(0), Some(1.0));
        assert_eq!(rel.column(1).unwrap().as_f64(1), Some(4.0));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = load_csv_file("/nonexistent/path/does-not-exist.csv", CsvOptions::default())
            .unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
    }
}
