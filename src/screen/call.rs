//! Call join hand-off

use std::fmt;

use crate::models::{Dialog, User};

/// Media the user publishes when joining. `None` joins as a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConferenceType {
    Audio,
    Video,
}

/// Everything the call screen needs to join a dialog's conference.
#[derive(Debug, Clone)]
pub struct CallSettings {
    pub conference_type: Option<ConferenceType>,
    pub dialog: Dialog,
    /// Occupants resolved from the users data source
    pub occupants: Vec<User>,
}

impl CallSettings {
    pub fn is_listener(&self) -> bool {
        self.conference_type.is_none()
    }

    pub fn role(&self) -> &'static str {
        match self.conference_type {
            None => "listener",
            Some(ConferenceType::Audio) => "audio",
            Some(ConferenceType::Video) => "video",
        }
    }
}

impl fmt::Display for CallSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} as {} ({} occupants)",
            self.dialog.display_name(),
            self.role(),
            self.dialog.occupants_ids.len()
        )
    }
}
