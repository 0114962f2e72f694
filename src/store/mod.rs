//! Persistence for the payroll dataset.
//!
//! A [`DataStore`] loads and saves the whole [`Dataset`]. The [`Repository`]
//! wraps a store behind one async mutex so that every operation runs as a
//! single load, change, save unit and writers never interleave.

mod dataset;
mod json_store;
mod memory;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::EngineResult;

pub use dataset::{
    AccrualReport, AdjustmentSaveSummary, AttendanceSaveSummary, Dataset, Statistics,
};
pub use json_store::JsonStore;
pub use memory::MemoryStore;

/// Whole-dataset storage.
pub trait DataStore: Send + Sync {
    /// Loads every collection. Missing collections load empty.
    fn load(&self) -> EngineResult<Dataset>;

    /// Replaces every collection with the contents of `dataset`.
    fn save(&self, dataset: &Dataset) -> EngineResult<()>;
}

/// Serializes access to a [`DataStore`].
///
/// # Example
///
/// ```
/// use payroll_engine::models::Employee;
/// use payroll_engine::store::{MemoryStore, Repository};
/// use rust_decimal::Decimal;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let repository = Repository::new(MemoryStore::new());
///     repository
///         .transaction(|dataset| {
///             dataset.add_employee(Employee::new("M1", Decimal::ZERO, None))?;
///             Ok(())
///         })
///         .await
///         .unwrap();
///
///     let count = repository.read(|dataset| Ok(dataset.employees.len())).await.unwrap();
///     assert_eq!(count, 1);
/// });
/// ```
pub struct Repository {
    store: Arc<dyn DataStore>,
    lock: Mutex<()>,
}

impl Repository {
    /// Wraps `store`.
    pub fn new<S: DataStore + 'static>(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Wraps a store that is also held elsewhere.
    pub fn from_shared(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Runs `operation` against a freshly loaded dataset without saving.
    pub async fn read<T, F>(&self, operation: F) -> EngineResult<T>
    where
        F: FnOnce(&Dataset) -> EngineResult<T>,
    {
        let _guard = self.lock.lock().await;
        let dataset = self.store.load()?;
        operation(&dataset)
    }

    /// Runs `operation` against a freshly loaded dataset and saves the result.
    ///
    /// Nothing is saved if `operation` fails.
    pub async fn transaction<T, F>(&self, operation: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Dataset) -> EngineResult<T>,
    {
        let _guard = self.lock.lock().await;
        let mut dataset = self.store.load()?;
        let output = operation(&mut dataset)?;
        self.store.save(&dataset)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::Employee;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_transaction_saves_on_success() {
        let store = Arc::new(MemoryStore::new());
        let repository = Repository::from_shared(store.clone());

        repository
            .transaction(|dataset| {
                dataset.add_employee(Employee::new("M1", Decimal::ONE, None))?;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(store.load().unwrap().employees.len(), 1);
    }

    #[tokio::test]
    async fn test_transaction_discards_on_failure() {
        let store = Arc::new(MemoryStore::new());
        let repository = Repository::from_shared(store.clone());

        let result: EngineResult<()> = repository
            .transaction(|dataset| {
                dataset.add_employee(Employee::new("M1", Decimal::ONE, None))?;
                Err(EngineError::EmployeeNotFound {
                    matricule: "M2".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert!(store.load().unwrap().employees.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_transactions_do_not_lose_writes() {
        let repository = Arc::new(Repository::new(MemoryStore::new()));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .transaction(move |dataset| {
                            dataset.add_employee(Employee::new(
                                format!("M{i}"),
                                Decimal::ONE,
                                None,
                            ))?;
                            Ok(())
                        })
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let count = repository.read(|dataset| Ok(dataset.employees.len())).await.unwrap();
        assert_eq!(count, 20);
    }
}
