mod persist;

mod members;
pub use members::{MemberSortField, MemberStore};

mod payments;
pub use payments::PaymentStore;

/// File names of the persisted stores, one per roster.
pub const OLD_MEMBERS_FILE: &str = "old-members-store.json";
pub const ADDED_DATA_FILE: &str = "added-data-store.json";
pub const PAYMENTS_FILE: &str = "payments-store.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}
