use super::api::AirtableBase;
use linkhub::IntegrationItem;

/// Transform an Airtable base into an integration item.
pub fn base_to_item(base: &AirtableBase) -> IntegrationItem {
    IntegrationItem::new(base.id.as_str(), base.name.as_deref(), "Base")
        .with_metadata("permissionLevel", base.permission_level.as_deref())
}
