//! User-related models

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub full_name: Option<String>,
    pub login: Option<String>,
    /// Tags are a comma-separated string on the wire.
    #[serde(
        rename = "user_tags",
        default,
        deserialize_with = "tags_from_csv",
        serialize_with = "tags_to_csv"
    )]
    pub tags: Vec<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .or(self.login.as_deref())
            .map(String::from)
            .unwrap_or_else(|| format!("user {}", self.id))
    }
}

fn tags_from_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect())
}

fn tags_to_csv<S>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&tags.join(","))
}

/// `{"user": {...}}` wrapper used by the user endpoints.
#[derive(Debug, Deserialize)]
pub struct UserEntry {
    pub user: User,
}

/// Paged list envelope returned by the user endpoints.
#[derive(Debug, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default)]
    pub items: Vec<UserEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_page_with_tags() {
        let json = r#"{
            "current_page": 1,
            "per_page": 100,
            "total_entries": 2,
            "items": [
                {"user": {"id": 101, "full_name": "Ann", "login": "ann", "user_tags": "dev, ops"}},
                {"user": {"id": 102, "full_name": null, "login": "bob", "user_tags": null}}
            ]
        }"#;

        let page: UserPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_entries, 2);
        assert_eq!(page.items[0].user.tags, vec!["dev", "ops"]);
        assert!(page.items[1].user.tags.is_empty());
        assert_eq!(page.items[1].user.display_name(), "bob");
    }

    #[test]
    fn test_missing_tags_and_names() {
        let user: User = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert!(user.tags.is_empty());
        assert_eq!(user.display_name(), "user 7");
    }
}
