//! User endpoints

use anyhow::Result;

use super::client::ConferenceClient;
use crate::models::{User, UserEntry, UserPage};

/// Fetch users sharing `tag`, or all users of the application without one.
pub async fn fetch_users(
    client: &ConferenceClient,
    tag: Option<&str>,
    per_page: usize,
) -> Result<Vec<User>> {
    let path = match tag {
        Some(tag) => format!(
            "/users/by_tags.json?tags={}&per_page={}",
            urlencode(tag),
            per_page
        ),
        None => format!("/users.json?per_page={}", per_page),
    };
    let page: UserPage = client.get_json(&path).await?;
    tracing::debug!(
        "Fetched {} of {} users",
        page.items.len(),
        page.total_entries
    );
    Ok(page.items.into_iter().map(|e| e.user).collect())
}

pub async fn fetch_user(client: &ConferenceClient, id: u64) -> Result<User> {
    let entry: UserEntry = client.get_json(&format!("/users/{}.json", id)).await?;
    Ok(entry.user)
}

pub(super) fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencode_tag() {
        assert_eq!(urlencode("daily standup"), "daily+standup");
        assert_eq!(urlencode("r&d"), "r%26d");
    }
}
