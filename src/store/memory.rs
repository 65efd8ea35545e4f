//! In-memory case store and result log.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{CaseStore, CellUpdate, LogEntry, ResultLog, StoreError};
use crate::dataset::{Dataset, Variable, VariableKind};
use crate::statistics::Statistic;

/// Case store holding the dataset in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Dataset,
    /// Metadata for variables created through the store, keyed by column
    created: HashMap<usize, (VariableKind, BTreeMap<u32, String>)>,
}

impl MemoryStore {
    /// Wrap a dataset.
    #[must_use]
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            created: HashMap::new(),
        }
    }
}

impl CaseStore for MemoryStore {
    fn dataset(&self) -> &Dataset {
        &self.data
    }

    fn variables(&self) -> Vec<Variable> {
        self.data
            .variables()
            .into_iter()
            .map(|var| match self.created.get(&var.index) {
                Some((kind, labels)) => Variable {
                    kind: *kind,
                    value_labels: labels.clone(),
                    ..var
                },
                None => var,
            })
            .collect()
    }

    fn create_variable(
        &mut self,
        name: &str,
        kind: VariableKind,
        value_labels: BTreeMap<u32, String>,
    ) -> Result<usize, StoreError> {
        if self.data.column_index(name).is_some() {
            return Err(StoreError::DuplicateVariable(name.to_string()));
        }
        let index = self.data.push_column(name);
        self.created.insert(index, (kind, value_labels));
        log::debug!("Created variable {} at column {}", name, index);
        Ok(index)
    }

    fn update_cells(&mut self, updates: Vec<CellUpdate>) -> Result<(), StoreError> {
        if let Some(bad) = updates
            .iter()
            .find(|u| self.data.cell(u.row, u.column).is_none())
        {
            return Err(StoreError::CellOutOfRange {
                row: bad.row,
                column: bad.column,
            });
        }
        let count = updates.len();
        for update in updates {
            self.data.set_cell(update.row, update.column, update.value);
        }
        log::trace!("Applied {} cell update(s)", count);
        Ok(())
    }

    fn replace_dataset(&mut self, data: Dataset) -> Result<(), StoreError> {
        if data.len() != self.data.len() || data.width() != self.data.width() {
            return Err(StoreError::ShapeMismatch {
                expected_rows: self.data.len(),
                expected_width: self.data.width(),
                found_rows: data.len(),
                found_width: data.width(),
            });
        }
        self.data = data;
        Ok(())
    }
}

/// Result log collecting entries in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryLog {
    entries: Vec<LogEntry>,
}

impl MemoryLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in recording order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded frequency tables.
    pub fn statistics(&self) -> impl Iterator<Item = &Statistic> {
        self.entries.iter().filter_map(|e| match e {
            LogEntry::Statistic { statistic, .. } => Some(statistic),
            _ => None,
        })
    }
}

impl ResultLog for MemoryLog {
    fn add_log(&mut self, text: &str) {
        self.entries.push(LogEntry::Log {
            text: text.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn add_analytic(&mut self, title: &str, note: &str) {
        self.entries.push(LogEntry::Analytic {
            title: title.to_string(),
            note: note.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn add_statistic(&mut self, statistic: Statistic) {
        self.entries.push(LogEntry::Statistic {
            statistic,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;
    use crate::statistics::{generate_statistics, StatisticsOptions};

    fn store() -> MemoryStore {
        MemoryStore::new(Dataset::from_parts(
            vec!["Name".to_string()],
            vec![vec![Cell::from("Ann")], vec![Cell::from("Bob")]],
        ))
    }

    #[test]
    fn test_create_variable_appends_column() {
        let mut store = store();
        let labels = BTreeMap::from([(0, "No".to_string()), (1, "Yes".to_string())]);
        let index = store
            .create_variable("Flag", VariableKind::Numeric, labels.clone())
            .unwrap();
        assert_eq!(index, 1);
        assert_eq!(store.dataset().width(), 2);
        assert_eq!(store.dataset().cell(0, 1), Some(&Cell::Empty));

        let var = store.variable("Flag").unwrap();
        assert_eq!(var.kind, VariableKind::Numeric);
        assert_eq!(var.value_labels, labels);
    }

    #[test]
    fn test_create_duplicate_variable_fails() {
        let mut store = store();
        let err = store
            .create_variable("Name", VariableKind::Numeric, BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateVariable(ref n) if n == "Name"));
        assert_eq!(store.dataset().width(), 1);
    }

    #[test]
    fn test_update_cells_is_all_or_nothing() {
        let mut store = store();
        let err = store
            .update_cells(vec![
                CellUpdate::new(0, 0, "Zed"),
                CellUpdate::new(5, 0, "Out"),
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::CellOutOfRange { row: 5, column: 0 }));
        assert_eq!(store.dataset().cell(0, 0), Some(&Cell::from("Ann")));

        store.update_cells(vec![CellUpdate::new(1, 0, "Cy")]).unwrap();
        assert_eq!(store.dataset().cell(1, 0), Some(&Cell::from("Cy")));
    }

    #[test]
    fn test_replace_dataset_checks_shape() {
        let mut store = store();
        let swapped = Dataset::from_parts(
            vec!["Name".to_string()],
            vec![vec![Cell::from("Bob")], vec![Cell::from("Ann")]],
        );
        store.replace_dataset(swapped.clone()).unwrap();
        assert_eq!(store.dataset(), &swapped);

        let short = Dataset::from_parts(vec!["Name".to_string()], vec![]);
        assert!(matches!(
            store.replace_dataset(short),
            Err(StoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_memory_log_records_in_order() {
        let mut log = MemoryLog::new();
        log.add_log("IDENTIFY");
        log.add_analytic("Title", "Note");
        for stat in generate_statistics(&[1, 0], &[1, 2], &StatisticsOptions::default()) {
            log.add_statistic(stat);
        }

        assert_eq!(log.len(), 3);
        assert!(matches!(log.entries()[0], LogEntry::Log { ref text, .. } if text == "IDENTIFY"));
        assert!(matches!(log.entries()[1], LogEntry::Analytic { ref title, .. } if title == "Title"));
        assert_eq!(log.statistics().count(), 1);
        assert!(log.entries()[0].timestamp() <= log.entries()[2].timestamp());

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["type"], serde_json::json!("log"));
        assert_eq!(json[2]["type"], serde_json::json!("statistic"));
    }
}
