//! Machine owner registry.
//!
//! Maps a machine identifier (as found in alert payloads) to the display
//! name of the person responsible for it. The mapping lives in memory and is
//! snapshotted to a single JSON file after every durable mutation.

mod store;

use std::sync::Arc;

pub use store::{OwnerStore, OwnerStoreError, OwnerStoreResult};

/// Create an Arc-wrapped owner store
pub fn create_owner_store() -> Arc<OwnerStore> {
    Arc::new(OwnerStore::new())
}
