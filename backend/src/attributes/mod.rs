//! # Attribute Store
//!
//! Read-only access to the subscriber attribute data the placeholders are
//! resolved against. Two lookups are needed:
//!
//! - the attribute directory (every attribute name currently defined), read
//!   once at the start of each campaign, never cached across campaigns;
//! - the attribute values of a single recipient, read once per recipient.
//!
//! Both are fallible. Retry policy belongs to whoever owns the store, so a
//! failure here is returned as-is and the campaign hooks decide how to degrade.

mod sqlite;

pub use sqlite::SqliteAttributeStore;

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("attribute store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("attribute store unavailable: {0}")]
    Unavailable(String),
}

/// Attribute name -> value for one recipient. `None` means the recipient has
/// a row for the attribute but no value stored.
pub type RecipientValues = HashMap<String, Option<String>>;

/// The seam between the placeholder engine and wherever subscriber data lives.
pub trait AttributeStore: Send + Sync {
    /// All defined attribute names in the store's display order.
    fn fetch_attribute_names(&self) -> Result<Vec<String>, StoreError>;

    /// Values for one recipient, keyed by attribute name as the directory spells it.
    fn fetch_recipient_values(&self, recipient_id: &str) -> Result<RecipientValues, StoreError>;

    /// Every recipient the store knows about; used by the subject preview job.
    fn fetch_recipient_ids(&self) -> Result<Vec<String>, StoreError>;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store for exercising the hooks without SQLite.

    use super::{AttributeStore, RecipientValues, StoreError};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct MemoryStore {
        pub names: Vec<String>,
        pub recipients: BTreeMap<String, RecipientValues>,
        pub directory_down: bool,
        pub values_down: bool,
        pub value_lookups: AtomicUsize,
    }

    impl MemoryStore {
        pub fn with_names(names: &[&str]) -> Self {
            Self {
                names: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn recipient(mut self, id: &str, values: &[(&str, &str)]) -> Self {
            let values = values
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect();
            self.recipients.insert(id.to_string(), values);
            self
        }

        pub fn lookups(&self) -> usize {
            self.value_lookups.load(Ordering::SeqCst)
        }
    }

    impl AttributeStore for MemoryStore {
        fn fetch_attribute_names(&self) -> Result<Vec<String>, StoreError> {
            if self.directory_down {
                return Err(StoreError::Unavailable("directory offline".to_string()));
            }
            Ok(self.names.clone())
        }

        fn fetch_recipient_values(&self, recipient_id: &str) -> Result<RecipientValues, StoreError> {
            self.value_lookups.fetch_add(1, Ordering::SeqCst);
            if self.values_down {
                return Err(StoreError::Unavailable("values offline".to_string()));
            }
            Ok(self.recipients.get(recipient_id).cloned().unwrap_or_default())
        }

        fn fetch_recipient_ids(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.recipients.keys().cloned().collect())
        }
    }
}
