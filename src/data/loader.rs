// ============================================================
// Layer 4 - Sequence Loader
// ============================================================
// Reads the three pre-serialized sequence splits from a fixed
// directory layout:
//
//   <dir>/train_seqs.pkl
//   <dir>/val_seqs.pkl
//   <dir>/test_seqs.pkl
//
// Each file is a Python pickle holding a list of lists of item
// ids, which serde-pickle deserializes straight into
// Vec<Vec<u32>>. The vocabulary size is the maximum item id
// observed across the union of all three splits, excluding the
// padding sentinel 0.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::domain::error::DataError;
use crate::domain::sequence::{ItemSeq, SequenceData, PAD_ID};
use crate::domain::traits::SequenceSource;

const TRAIN_FILE: &str = "train_seqs.pkl";
const VAL_FILE:   &str = "val_seqs.pkl";
const TEST_FILE:  &str = "test_seqs.pkl";

/// Loads the pickled sequence splits from a directory.
/// Implements the SequenceSource trait from Layer 3.
pub struct PickleLoader {
    dir: PathBuf,
}

impl PickleLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SequenceSource for PickleLoader {
    fn load(&self) -> Result<SequenceData> {
        let train = read_split(&self.dir.join(TRAIN_FILE))?;
        let val   = read_split(&self.dir.join(VAL_FILE))?;
        let test  = read_split(&self.dir.join(TEST_FILE))?;

        let num_items = derive_num_items(&[&train, &val, &test])?;

        tracing::info!(
            "Loaded {} train / {} val / {} test sequences, {} items",
            train.len(),
            val.len(),
            test.len(),
            num_items,
        );

        Ok(SequenceData { train, val, test, num_items })
    }
}

/// Read one pickled split. A missing file is a DataError rather
/// than a bare I/O error so startup can report which of the three
/// expected files is absent.
fn read_split(path: &Path) -> Result<Vec<ItemSeq>> {
    if !path.exists() {
        return Err(DataError::MissingFile { path: path.to_path_buf() }.into());
    }

    let file = File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    let seqs: Vec<ItemSeq> =
        serde_pickle::from_reader(BufReader::new(file), serde_pickle::DeOptions::new())
            .map_err(|e| DataError::Corrupt {
                path:    path.to_path_buf(),
                message: e.to_string(),
            })?;

    Ok(seqs)
}

/// Maximum item id over every split, excluding padding.
/// Errors if no split contains a single item.
fn derive_num_items(splits: &[&Vec<ItemSeq>]) -> Result<usize, DataError> {
    splits
        .iter()
        .flat_map(|split| split.iter())
        .flat_map(|seq| seq.iter())
        .filter(|&&item| item != PAD_ID)
        .max()
        .map(|&max| max as usize)
        .ok_or(DataError::EmptyVocabulary)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_items_is_max_over_all_splits() {
        let train = vec![vec![1, 2, 3]];
        let val   = vec![vec![9]];
        let test  = vec![vec![4, 5]];
        assert_eq!(derive_num_items(&[&train, &val, &test]).unwrap(), 9);
    }

    #[test]
    fn test_num_items_ignores_padding_zeros() {
        let train = vec![vec![0, 0, 2]];
        let val:  Vec<ItemSeq> = vec![];
        let test: Vec<ItemSeq> = vec![vec![]];
        assert_eq!(derive_num_items(&[&train, &val, &test]).unwrap(), 2);
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let train: Vec<ItemSeq> = vec![vec![], vec![]];
        let val:   Vec<ItemSeq> = vec![];
        let test:  Vec<ItemSeq> = vec![vec![0]];
        assert!(matches!(
            derive_num_items(&[&train, &val, &test]),
            Err(DataError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_missing_file_reports_data_error() {
        let loader = PickleLoader::new("definitely/not/a/real/dir");
        let err = loader.load().unwrap_err();
        assert!(err.downcast_ref::<DataError>().is_some());
    }
}
