use std::fs::{self, File};
use std::io::{self, BufReader};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
struct CounterState {
    prefix: String,
    next: NonZeroU32,
}

pub struct CounterStore {
    path: PathBuf,
    state: CounterState,
}

impl CounterStore {
    pub fn load(
        data_dir: &Path,
        default_prefix: &str,
    ) -> Result<Self, StoreError> {
        let path = data_dir.join("invoice-counter.json");
        let state = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader).map_err(|source| {
                StoreError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?
        } else {
            // Nothing is written until a number is actually handed out.
            CounterState {
                prefix: default_prefix.to_string(),
                next: NonZeroU32::MIN,
            }
        };
        Ok(Self { path, state })
    }

    /// The number the next invoice would get, without reserving it.
    pub fn peek_formatted(&self) -> String {
        format!("{}{:03}", self.state.prefix, self.state.next)
    }

    pub fn assign_next(&mut self) -> Result<String, StoreError> {
        let number = self.peek_formatted();
        self.state.next = self.state.next.saturating_add(1);
        self.persist()?;
        Ok(number)
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let updated_path = self.path.with_extension("updated");
        let f = File::create(&updated_path)?;

        serde_json::to_writer_pretty(f, &self.state)
            .map_err(io::Error::from)?;
        fs::rename(updated_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fresh_store_counts_from_one() -> Result<(), StoreError> {
        let dir = TempDir::new().unwrap();
        let mut counter = CounterStore::load(dir.path(), "INV-")?;

        assert_eq!(counter.assign_next()?, "INV-001");
        assert_eq!(counter.assign_next()?, "INV-002");

        let reloaded = CounterStore::load(dir.path(), "INV-")?;
        assert_eq!(reloaded.peek_formatted(), "INV-003");
        Ok(())
    }

    #[test]
    fn peek_reserves_nothing() -> Result<(), StoreError> {
        let dir = TempDir::new().unwrap();
        let counter = CounterStore::load(dir.path(), "INV-")?;

        assert_eq!(counter.peek_formatted(), "INV-001");
        assert_eq!(counter.peek_formatted(), "INV-001");
        assert!(!dir.path().join("invoice-counter.json").exists());
        Ok(())
    }

    #[test]
    fn numbers_outgrow_the_padding() -> Result<(), StoreError> {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("invoice-counter.json"),
            r#"{ "prefix": "INV-", "next": 1000 }"#,
        )?;

        let mut counter = CounterStore::load(dir.path(), "INV-")?;
        assert_eq!(counter.assign_next()?, "INV-1000");
        assert_eq!(counter.peek_formatted(), "INV-1001");
        Ok(())
    }

    #[test]
    fn stored_prefix_wins_over_the_default() -> Result<(), StoreError> {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("invoice-counter.json"),
            r#"{ "prefix": "ACME-", "next": 7 }"#,
        )?;

        let counter = CounterStore::load(dir.path(), "INV-")?;
        assert_eq!(counter.peek_formatted(), "ACME-007");
        Ok(())
    }

    #[test]
    fn unreadable_file_is_refused() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("invoice-counter.json"), "{ nope").unwrap();

        assert!(matches!(
            CounterStore::load(dir.path(), "INV-"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn a_zero_next_number_is_refused() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("invoice-counter.json"),
            r#"{ "prefix": "INV-", "next": 0 }"#,
        )
        .unwrap();

        assert!(matches!(
            CounterStore::load(dir.path(), "INV-"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn unknown_fields_are_refused() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("invoice-counter.json"),
            r#"{ "last_number": 5 }"#,
        )
        .unwrap();

        assert!(matches!(
            CounterStore::load(dir.path(), "INV-"),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
