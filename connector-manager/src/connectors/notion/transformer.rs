use super::api::{NotionObject, RichText};
use linkhub::IntegrationItem;
use serde_json::Value;

/// Transform a Notion page or database into an integration item.
pub fn object_to_item(object: &NotionObject) -> IntegrationItem {
    let item_type = match object.object.as_str() {
        "database" => "Database",
        _ => "Page",
    };

    let name = title_of(object);
    let (parent_type, parent_id) = parent_of(object);

    IntegrationItem::new(object.id.as_str(), name.as_deref(), item_type)
        .with_parent(parent_id, parent_type)
        .with_metadata("url", object.url.as_deref())
        .with_metadata("created_time", object.created_time.as_deref())
        .with_metadata("last_edited_time", object.last_edited_time.as_deref())
}

/// Plain-text title: the database title, or the page's title property.
fn title_of(object: &NotionObject) -> Option<String> {
    if !object.title.is_empty() {
        return Some(join_plain_text(&object.title));
    }

    object
        .properties
        .values()
        .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
        .and_then(|prop| prop.get("title"))
        .and_then(|fragments| serde_json::from_value::<Vec<RichText>>(fragments.clone()).ok())
        .map(|fragments| join_plain_text(&fragments))
}

fn join_plain_text(fragments: &[RichText]) -> String {
    fragments.iter().map(|f| f.plain_text.as_str()).collect()
}

/// Parent type and id. Workspace-level objects have no parent id.
fn parent_of(object: &NotionObject) -> (Option<String>, Option<String>) {
    let Some(parent) = &object.parent else {
        return (None, None);
    };

    let parent_type = parent.get("type").and_then(Value::as_str);
    let parent_id = parent_type
        .and_then(|t| parent.get(t))
        .and_then(Value::as_str)
        .map(str::to_string);

    (parent_type.map(str::to_string), parent_id)
}
