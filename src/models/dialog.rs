//! Dialog-related models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dialog type as encoded by the chat API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DialogType {
    PublicGroup,
    Group,
    Private,
}

impl TryFrom<u8> for DialogType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DialogType::PublicGroup),
            2 => Ok(DialogType::Group),
            3 => Ok(DialogType::Private),
            other => Err(format!("unknown dialog type {}", other)),
        }
    }
}

impl From<DialogType> for u8 {
    fn from(value: DialogType) -> Self {
        match value {
            DialogType::PublicGroup => 1,
            DialogType::Group => 2,
            DialogType::Private => 3,
        }
    }
}

/// Conference dialog (a room participants can call into)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialog {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub dialog_type: DialogType,
    #[serde(default)]
    pub occupants_ids: Vec<u64>,
    /// Owner of the dialog
    pub user_id: Option<u64>,
    pub last_message: Option<String>,
    /// Unix seconds
    pub last_message_date_sent: Option<i64>,
    #[serde(default)]
    pub unread_messages_count: u32,
}

impl Dialog {
    /// Display name, falling back to the dialog ID.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.id,
        }
    }

    pub fn last_message_time(&self) -> Option<DateTime<Utc>> {
        self.last_message_date_sent
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Paged list envelope returned by the dialog endpoint.
#[derive(Debug, Deserialize)]
pub struct DialogPage {
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default)]
    pub items: Vec<Dialog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialog_page() {
        let json = r#"{
            "total_entries": 1,
            "skip": 0,
            "limit": 100,
            "items": [{
                "_id": "5b8e2f6aa28f9a3b7b3e1c01",
                "name": "Standup",
                "type": 2,
                "occupants_ids": [101, 102, 103],
                "user_id": 101,
                "last_message": "see you",
                "last_message_date_sent": 1539264000,
                "unread_messages_count": 4,
                "xmpp_room_jid": "ignored@muc.chat.quickblox.com"
            }]
        }"#;

        let page: DialogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_entries, 1);
        let dialog = &page.items[0];
        assert_eq!(dialog.dialog_type, DialogType::Group);
        assert_eq!(dialog.occupants_ids, vec![101, 102, 103]);
        assert_eq!(dialog.display_name(), "Standup");
        assert_eq!(
            dialog.last_message_time().unwrap().to_rfc3339(),
            "2018-10-11T13:20:00+00:00"
        );
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let json = r#"{"_id": "abc", "name": "  ", "type": 3}"#;
        let dialog: Dialog = serde_json::from_str(json).unwrap();
        assert_eq!(dialog.display_name(), "abc");
        assert!(dialog.occupants_ids.is_empty());
        assert!(dialog.last_message_time().is_none());
    }

    #[test]
    fn test_unknown_dialog_type_rejected() {
        let json = r#"{"_id": "abc", "type": 9}"#;
        assert!(serde_json::from_str::<Dialog>(json).is_err());
    }
}
