// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Loads every labelled-sentence file and writes the combined
// table (index, sentence, label, source) as one CSV. The same
// loading step feeds the sentences experiment.

use anyhow::Result;
use std::path::PathBuf;

use crate::application::experiment::SourceFile;
use crate::data::{loader::TsvLoader, table::write_combined_csv};
use crate::domain::{example::LabeledExample, traits::ExampleSource};

/// Load one table per file, in configuration order.
pub fn load_tables(files: &[SourceFile]) -> Result<Vec<Vec<LabeledExample>>> {
    files
        .iter()
        .map(|file| {
            let rows = TsvLoader::new(&file.path, &file.source).load_all()?;
            tracing::info!("Loaded {} rows from '{}' ({})", rows.len(), file.path.display(), file.source);
            Ok(rows)
        })
        .collect()
}

pub struct PrepareUseCase {
    files:  Vec<SourceFile>,
    output: PathBuf,
}

impl PrepareUseCase {
    pub fn new(files: Vec<SourceFile>, output: impl Into<PathBuf>) -> Self {
        Self { files, output: output.into() }
    }

    /// Returns the number of rows written.
    pub fn execute(&self) -> Result<usize> {
        let tables = load_tables(&self.files)?;
        let rows   = write_combined_csv(&self.output, &tables)?;
        tracing::info!("Wrote {} combined rows to '{}'", rows, self.output.display());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_prepare_writes_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let yelp   = dir.path().join("yelp.txt");
        let amazon = dir.path().join("amazon.txt");
        fs::write(&yelp, "Wow... Loved this place.\t1\nCrust is not good.\t0\n").unwrap();
        fs::write(&amazon, "Great for the jawbone.\t1\n").unwrap();

        let output = dir.path().join("out").join("combined.csv");
        let use_case = PrepareUseCase::new(
            vec![SourceFile::new(&yelp, "yelp"), SourceFile::new(&amazon, "amazon")],
            &output,
        );

        assert_eq!(use_case.execute().unwrap(), 3);
        let csv = fs::read_to_string(&output).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.lines().last().unwrap().ends_with(",amazon"));
    }

    #[test]
    fn test_prepare_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let use_case = PrepareUseCase::new(
            vec![SourceFile::new(dir.path().join("missing.txt"), "yelp")],
            dir.path().join("combined.csv"),
        );
        assert!(use_case.execute().is_err());
    }
}
