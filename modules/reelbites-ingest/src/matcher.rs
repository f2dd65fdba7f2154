//! Two-stage entity matching.
//!
//! Exact-string, user-scoped: (1) by restaurant name, (2) by final formatted
//! address only when the name query came back empty. First hit wins. No
//! fuzzy or semantic matching — a renamed or re-spelled restaurant is a new
//! entity by design.

use tracing::info;

use reelbites_common::{IngestError, RestaurantRecord};

use crate::traits::RestaurantStore;

pub async fn find_existing(
    store: &dyn RestaurantStore,
    user_id: &str,
    name: &str,
    address: &str,
) -> Result<Option<RestaurantRecord>, IngestError> {
    if let Some(record) = store.find_by_name(user_id, name).await? {
        info!(name, record_id = record.id.as_str(), "Matched existing restaurant by name");
        return Ok(Some(record));
    }

    if let Some(record) = store.find_by_address(user_id, address).await? {
        info!(
            address,
            record_id = record.id.as_str(),
            "Matched existing restaurant by address"
        );
        return Ok(Some(record));
    }

    Ok(None)
}
