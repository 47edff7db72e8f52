//! Chat dialog endpoints

use anyhow::Result;

use super::client::ConferenceClient;
use super::users::urlencode;
use crate::models::{Dialog, DialogPage, DialogType};

/// Fetch the dialogs the current user occupies, most recently active first.
pub async fn fetch_dialogs(client: &ConferenceClient, limit: usize) -> Result<Vec<Dialog>> {
    let path = format!(
        "/chat/Dialog.json?limit={}&sort_desc=last_message_date_sent",
        limit
    );
    let page: DialogPage = client.get_json(&path).await?;
    tracing::debug!(
        "Fetched {} of {} dialogs",
        page.items.len(),
        page.total_entries
    );
    Ok(page.items)
}

/// Create a group dialog with the given occupants.
pub async fn create_dialog(
    client: &ConferenceClient,
    name: &str,
    occupants: &[u64],
) -> Result<Dialog> {
    let occupants_ids = occupants
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let body = serde_json::json!({
        "type": u8::from(DialogType::Group),
        "name": name,
        "occupants_ids": occupants_ids,
    });
    client.post_json("/chat/Dialog.json", &body).await
}

/// Delete a dialog for the current user only.
pub async fn delete_dialog(client: &ConferenceClient, dialog_id: &str) -> Result<()> {
    client.delete(&dialog_path(dialog_id)).await
}

/// Path of a single dialog, with the ID encoded as one path segment.
fn dialog_path(dialog_id: &str) -> String {
    // Form encoding turns spaces into '+', which a path does not decode.
    let id = urlencode(dialog_id).replace('+', "%20");
    format!("/chat/Dialog/{}.json?force=0", id)
}
