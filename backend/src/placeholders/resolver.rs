use crate::attributes::{AttributeStore, RecipientValues};
use common::model::place_holder::CampaignPlaceholderSet;

/// Returns a copy of `set` with every binding carrying the recipient's value
/// for its attribute, or `None` when the recipient has none. Every binding is
/// overwritten, so nothing from a previous recipient can survive.
pub fn bind_values(set: &CampaignPlaceholderSet, values: &RecipientValues) -> CampaignPlaceholderSet {
    let mut bound = set.clone();
    for binding in bound.bindings_mut() {
        binding.resolved_value = values.get(&binding.attribute_name).cloned().flatten();
    }
    bound
}

/// Looks up the recipient in the store and binds their values.
///
/// An empty table short-circuits without touching the store. A failed lookup
/// is logged and treated as a recipient with no values at all, so fallbacks
/// (or empty strings) are used instead of holding the message back.
pub fn resolve_for_recipient(
    set: &CampaignPlaceholderSet,
    store: &dyn AttributeStore,
    recipient_id: &str,
) -> CampaignPlaceholderSet {
    if set.is_empty() {
        return set.clone();
    }
    let values = store.fetch_recipient_values(recipient_id).unwrap_or_else(|e| {
        log::warn!("Attribute lookup for recipient {recipient_id} failed, using empty values: {e}");
        RecipientValues::new()
    });
    bind_values(set, &values)
}
