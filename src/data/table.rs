// ============================================================
// Layer 4 — Combined Table
// ============================================================
// Row-wise union of several loaded tables, plus the comma-
// separated snapshot written after loading:
//
//   index,sentence,label,source
//   0,Wow... Loved this place.,1,yelp
//   1,Crust is not good.,0,yelp
//   0,So there is no way for me to plug it in...,0,amazon
//
// `index` is the row's position inside its own source table;
// concatenation keeps the per-table numbering.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs, path::Path};

use crate::domain::example::LabeledExample;

#[derive(Serialize)]
struct CombinedRow<'a> {
    index:    usize,
    sentence: &'a str,
    label:    u8,
    source:   &'a str,
}

/// Concatenate tables in order. Row count is the sum of the inputs.
pub fn combine(tables: Vec<Vec<LabeledExample>>) -> Vec<LabeledExample> {
    tables.into_iter().flatten().collect()
}

/// Serialise the tables to `path`, overwriting any previous file.
/// Returns the number of data rows written.
pub fn write_combined_csv(path: &Path, tables: &[Vec<LabeledExample>]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;

    let mut written = 0usize;
    for table in tables {
        for (index, row) in table.iter().enumerate() {
            writer.serialize(CombinedRow {
                index,
                sentence: &row.text,
                label:    row.label.as_u8(),
                source:   &row.source,
            })?;
            written += 1;
        }
    }
    writer.flush()
        .with_context(|| format!("Cannot flush '{}'", path.display()))?;

    tracing::info!("Wrote {} combined rows to '{}'", written, path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::Sentiment;

    fn table(source: &str, n: usize) -> Vec<LabeledExample> {
        (0..n)
            .map(|i| LabeledExample::new(format!("{source} sentence {i}"), Sentiment::Positive, source))
            .collect()
    }

    #[test]
    fn test_combine_preserves_row_count_and_order() {
        let combined = combine(vec![table("yelp", 3), table("amazon", 2), table("imdb", 4)]);
        assert_eq!(combined.len(), 3 + 2 + 4);
        assert_eq!(combined[0].source, "yelp");
        assert_eq!(combined[3].source, "amazon");
        assert_eq!(combined[8].source, "imdb");
    }

    #[test]
    fn test_csv_has_header_and_per_source_index() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("combined.csv");
        let tables = vec![
            table("yelp", 2),
            vec![LabeledExample::new("Bad, really \"bad\"", Sentiment::Negative, "amazon")],
        ];

        let written = write_combined_csv(&path, &tables).unwrap();
        assert_eq!(written, 3);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), ["index", "sentence", "label", "source"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[2][0], "0");
        assert_eq!(&rows[2][1], "Bad, really \"bad\"");
        assert_eq!(&rows[2][2], "0");
        assert_eq!(&rows[2][3], "amazon");
    }

    #[test]
    fn test_csv_is_overwritten() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.csv");
        write_combined_csv(&path, &[table("yelp", 5)]).unwrap();
        write_combined_csv(&path, &[table("yelp", 1)]).unwrap();

        let rows = csv::Reader::from_path(&path).unwrap().records().count();
        assert_eq!(rows, 1);
    }
}
