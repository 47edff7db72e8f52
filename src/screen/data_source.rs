//! In-memory table data sources for dialogs and users.

use crate::models::{Dialog, User};

/// Rows that carry a stable identity.
pub trait Keyed {
    type Key: PartialEq + ?Sized;

    fn key(&self) -> &Self::Key;
}

impl Keyed for Dialog {
    type Key = str;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for User {
    type Key = u64;

    fn key(&self) -> &u64 {
        &self.id
    }
}

/// Ordered list of rows backing a table.
#[derive(Debug, Clone)]
pub struct DataSource<T> {
    objects: Vec<T>,
}

pub type DialogsDataSource = DataSource<Dialog>;
pub type UsersDataSource = DataSource<User>;

impl<T> Default for DataSource<T> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
        }
    }
}

impl<T: Keyed + Clone> DataSource<T> {
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Replace all rows.
    pub fn update_objects(&mut self, objects: Vec<T>) {
        self.objects = objects;
    }

    /// Append rows, skipping any whose key is already present.
    pub fn add_objects(&mut self, objects: Vec<T>) {
        for object in objects {
            if self.get(object.key()).is_none() {
                self.objects.push(object);
            }
        }
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.objects.iter().find(|o| o.key() == key)
    }

    /// Remove the row with `key`, returning it.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let index = self.objects.iter().position(|o| o.key() == key)?;
        Some(self.objects.remove(index))
    }
}

impl UsersDataSource {
    /// Users for the given IDs, in ID order, skipping unknown ones.
    pub fn users_with_ids(&self, ids: &[u64]) -> Vec<User> {
        ids.iter().filter_map(|id| self.get(id)).cloned().collect()
    }
}

#[cfg(test)]
impl<T> DataSource<T> {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DialogType;

    fn dialog(id: &str) -> Dialog {
        Dialog {
            id: id.to_string(),
            name: Some(format!("room {}", id)),
            dialog_type: DialogType::Group,
            occupants_ids: vec![1, 2],
            user_id: Some(1),
            last_message: None,
            last_message_date_sent: None,
            unread_messages_count: 0,
        }
    }

    fn user(id: u64) -> User {
        User {
            id,
            full_name: Some(format!("User {}", id)),
            login: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_update_replaces_rows() {
        let mut source = DialogsDataSource::default();
        source.update_objects(vec![dialog("a"), dialog("b")]);
        source.update_objects(vec![dialog("c")]);
        assert_eq!(source.len(), 1);
        assert_eq!(source.objects()[0].id, "c");
    }

    #[test]
    fn test_add_skips_duplicates() {
        let mut source = DialogsDataSource::default();
        source.update_objects(vec![dialog("a")]);
        source.add_objects(vec![dialog("a"), dialog("b")]);
        let ids: Vec<_> = source.objects().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_remove_by_key() {
        let mut source = DialogsDataSource::default();
        source.update_objects(vec![dialog("a"), dialog("b")]);
        assert_eq!(source.remove("a").unwrap().id, "a");
        assert!(source.remove("a").is_none());
        assert!(source.get("b").is_some());
    }

    #[test]
    fn test_users_with_ids_skips_unknown() {
        let mut source = UsersDataSource::default();
        source.update_objects(vec![user(1), user(2), user(3)]);
        let found = source.users_with_ids(&[3, 9, 1]);
        let ids: Vec<_> = found.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
