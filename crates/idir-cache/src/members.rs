use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use idir_data::Member;

use crate::{persist, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberSortField {
    Id,
    Name,
    RegisteredAt,
}

/// A persisted roster cache. Holds the live array next to a backup
/// of the full roster; searches narrow the live array from the
/// backup so an emptied query restores the whole roster. Both the
/// legacy roster and the added-data roster are instances of this,
/// pointed at different files.
#[derive(Debug)]
pub struct MemberStore {
    path: PathBuf,
    capacity: usize,
    items: Vec<Member>,
    backup: Vec<Member>,
}

impl MemberStore {
    /// Open a store, rehydrating from its file if present.
    pub fn open(path: PathBuf, capacity: usize) -> Result<Self> {
        let items: Vec<Member> = persist::load(&path)?;
        Ok(Self {
            path,
            capacity,
            backup: items.clone(),
            items,
        })
    }

    pub fn items(&self) -> &[Member] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the roster and persist it. Rosters beyond the
    /// capacity bound are truncated rather than growing the
    /// cache file without limit.
    pub fn set(&mut self, mut data: Vec<Member>) -> Result<()> {
        if data.len() > self.capacity {
            warn!(
                size = data.len(),
                capacity = self.capacity,
                "roster exceeds cache capacity, truncating"
            );
            data.truncate(self.capacity);
        }
        self.items = data.clone();
        self.backup = data;
        persist::save(&self.path, &self.items)?;
        Ok(())
    }

    /// Sort the live array. Stable, so re-sorting a sorted roster
    /// leaves it unchanged.
    pub fn sort(&mut self, field: MemberSortField, order: SortOrder) {
        self.items.sort_by(|a, b| {
            let ordering = match field {
                MemberSortField::Id => a.id.to_lowercase().cmp(&b.id.to_lowercase()),
                MemberSortField::Name => a
                    .full_name()
                    .to_lowercase()
                    .cmp(&b.full_name().to_lowercase()),
                MemberSortField::RegisteredAt => a.registered_at.cmp(&b.registered_at),
            };
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    /// Narrow the live array to backup rows matching the query.
    /// The empty query restores the full backup.
    pub fn search(&mut self, query: &str) {
        if query.is_empty() {
            self.items = self.backup.clone();
            return;
        }
        self.items = self
            .backup
            .iter()
            .filter(|m| m.matches(query))
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn member(id: &str, first: &str, last: &str) -> Member {
        Member {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.org", first.to_lowercase()),
            date_of_birth: NaiveDate::from_ymd_opt(1970, 1, 1),
            ..Default::default()
        }
    }

    fn roster() -> Vec<Member> {
        vec![
            member("ED-0002", "Worku", "Alemu"),
            member("ED-0001", "Abebe", "Kebede"),
            member("ED-0003", "Almaz", "Tadesse"),
        ]
    }

    fn open_store(dir: &TempDir) -> MemberStore {
        MemberStore::open(dir.path().join(crate::OLD_MEMBERS_FILE), 100).unwrap()
    }

    #[test]
    fn test_set_and_rehydrate() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = open_store(&dir);
            store.set(roster()).unwrap();
        }
        let store = open_store(&dir);
        assert_eq!(store.items().len(), 3);
        assert_eq!(store.items()[1].id, "ED-0001");
    }

    #[test]
    fn test_search_empty_query_restores_backup() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.set(roster()).unwrap();

        store.search("almaz");
        assert_eq!(store.items().len(), 1);

        store.search("");
        let ids: Vec<&str> = store.items().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["ED-0002", "ED-0001", "ED-0003"]);
    }

    #[test]
    fn test_search_results_all_match() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.set(roster()).unwrap();

        store.search("al");
        assert!(!store.items().is_empty());
        assert!(store.items().iter().all(|m| m.matches("al")));
    }

    #[test]
    fn test_search_does_not_shrink_backup() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.set(roster()).unwrap();

        // Consecutive searches always filter the full roster
        store.search("almaz");
        store.search("worku");
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].id, "ED-0002");
    }

    #[test]
    fn test_sort_by_name_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.set(roster()).unwrap();

        store.sort(MemberSortField::Name, SortOrder::Asc);
        let first: Vec<String> =
            store.items().iter().map(|m| m.id.clone()).collect();
        assert_eq!(first, vec!["ED-0001", "ED-0003", "ED-0002"]);

        store.sort(MemberSortField::Name, SortOrder::Asc);
        let second: Vec<String> =
            store.items().iter().map(|m| m.id.clone()).collect();
        assert_eq!(first, second);

        store.sort(MemberSortField::Name, SortOrder::Desc);
        let reversed: Vec<String> =
            store.items().iter().map(|m| m.id.clone()).collect();
        assert_eq!(reversed, vec!["ED-0002", "ED-0003", "ED-0001"]);
    }

    #[test]
    fn test_capacity_truncates() {
        let dir = TempDir::new().unwrap();
        let mut store =
            MemberStore::open(dir.path().join("tiny.json"), 2).unwrap();
        store.set(roster()).unwrap();
        assert_eq!(store.items().len(), 2);
    }
}
