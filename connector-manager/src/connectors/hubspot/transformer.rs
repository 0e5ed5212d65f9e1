use super::api::HubSpotContact;
use linkhub::IntegrationItem;

/// Transform a HubSpot contact into an integration item.
///
/// Name is `firstname lastname`; contacts with neither get the placeholder.
pub fn contact_to_item(contact: &HubSpotContact) -> IntegrationItem {
    let name = format!(
        "{} {}",
        contact.property("firstname").unwrap_or(""),
        contact.property("lastname").unwrap_or("")
    );

    IntegrationItem::new(contact.id.as_str(), Some(name.as_str()), "Contact")
        .with_metadata("email", contact.property("email"))
        .with_metadata("phone", contact.property("phone"))
        .with_metadata("company", contact.property("company"))
        .with_metadata("lifecycle_stage", contact.property("lifecycle_stage"))
        .with_metadata("jobtitle", contact.property("jobtitle"))
        .with_metadata("createdAt", contact.created_at.as_deref())
        .with_metadata("updatedAt", contact.updated_at.as_deref())
}
