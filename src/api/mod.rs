//! REST API client module

pub mod client;
mod dialogs;
pub mod reachability;
mod users;

use std::future::Future;

use anyhow::Result;

pub use client::ConferenceClient;
pub use reachability::NetworkStatus;
pub use users::fetch_user;

use crate::models::{Dialog, User};
use crate::screen::ChatService;

impl ChatService for ConferenceClient {
    fn fetch_dialogs(&self, limit: usize) -> impl Future<Output = Result<Vec<Dialog>>> + Send {
        dialogs::fetch_dialogs(self, limit)
    }

    fn fetch_users(
        &self,
        room: Option<&str>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<User>>> + Send {
        users::fetch_users(self, room, limit)
    }

    fn create_dialog(
        &self,
        name: &str,
        occupants: &[u64],
    ) -> impl Future<Output = Result<Dialog>> + Send {
        dialogs::create_dialog(self, name, occupants)
    }

    fn delete_dialog(&self, dialog_id: &str) -> impl Future<Output = Result<()>> + Send {
        dialogs::delete_dialog(self, dialog_id)
    }

    fn network_status(&self) -> impl Future<Output = NetworkStatus> + Send {
        reachability::probe(self.endpoint())
    }
}
