use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use idir_data::Payment;

use crate::{persist, SortOrder};

/// Persisted cache of the payment rounds.
#[derive(Debug)]
pub struct PaymentStore {
    path: PathBuf,
    capacity: usize,
    items: Vec<Payment>,
    backup: Vec<Payment>,
}

impl PaymentStore {
    pub fn open(path: PathBuf, capacity: usize) -> Result<Self> {
        let items: Vec<Payment> = persist::load(&path)?;
        Ok(Self {
            path,
            capacity,
            backup: items.clone(),
            items,
        })
    }

    pub fn items(&self) -> &[Payment] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set(&mut self, mut data: Vec<Payment>) -> Result<()> {
        if data.len() > self.capacity {
            warn!(
                size = data.len(),
                capacity = self.capacity,
                "payment cache exceeds capacity, truncating"
            );
            data.truncate(self.capacity);
        }
        self.items = data.clone();
        self.backup = data;
        persist::save(&self.path, &self.items)?;
        Ok(())
    }

    pub fn sort(&mut self, order: SortOrder) {
        self.items.sort_by(|a, b| match order {
            SortOrder::Asc => a.number.cmp(&b.number),
            SortOrder::Desc => b.number.cmp(&a.number),
        });
    }

    /// Narrow to rounds whose number contains the query digits.
    pub fn search(&mut self, query: &str) {
        if query.is_empty() {
            self.items = self.backup.clone();
            return;
        }
        self.items = self
            .backup
            .iter()
            .filter(|p| p.number.to_string().contains(query))
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn rounds(numbers: &[u32]) -> Vec<Payment> {
        numbers
            .iter()
            .map(|n| Payment {
                number: *n,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_sort_and_search() {
        let dir = TempDir::new().unwrap();
        let mut store =
            PaymentStore::open(dir.path().join(crate::PAYMENTS_FILE), 100).unwrap();
        store.set(rounds(&[12, 3, 21])).unwrap();

        store.sort(SortOrder::Desc);
        let numbers: Vec<u32> = store.items().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![21, 12, 3]);

        store.search("2");
        let numbers: Vec<u32> = store.items().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![12, 21]);

        store.search("");
        assert_eq!(store.items().len(), 3);
    }

    #[test]
    fn test_rehydrate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(crate::PAYMENTS_FILE);
        {
            let mut store = PaymentStore::open(path.clone(), 100).unwrap();
            store.set(rounds(&[1, 2])).unwrap();
        }
        let store = PaymentStore::open(path, 100).unwrap();
        assert_eq!(store.items().len(), 2);
    }
}
