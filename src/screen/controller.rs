//! Dialog list controller: refresh, delete, create and join.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};

use super::call::{CallSettings, ConferenceType};
use super::data_source::{DialogsDataSource, UsersDataSource};
use crate::api::NetworkStatus;
use crate::config::RefreshSettings;
use crate::join::{
    CompletionContext, FetchError, FetchSource, FetchTask, JoinBarrier, ParallelFetchJoin,
};
use crate::models::{Dialog, User};

pub const CHECK_INTERNET: &str = "Please check your Internet connection";

/// Backend operations the dialog list depends on.
pub trait ChatService: Send + Sync + 'static {
    fn fetch_dialogs(&self, limit: usize) -> impl Future<Output = Result<Vec<Dialog>>> + Send;

    fn fetch_users(
        &self,
        room: Option<&str>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<User>>> + Send;

    fn create_dialog(
        &self,
        name: &str,
        occupants: &[u64],
    ) -> impl Future<Output = Result<Dialog>> + Send;

    fn delete_dialog(&self, dialog_id: &str) -> impl Future<Output = Result<()>> + Send;

    fn network_status(&self) -> impl Future<Output = NetworkStatus> + Send;
}

/// Surfaces user-visible messages. One call per message.
pub trait AlertPresenter: Send + Sync {
    fn show_alert(&self, message: &str);
}

/// Pull-to-refresh style loading indicator.
#[derive(Debug, Default)]
pub struct RefreshIndicator {
    refreshing: AtomicBool,
    completed: AtomicU64,
}

impl RefreshIndicator {
    pub fn begin(&self) {
        self.refreshing.store(true, Ordering::Release);
    }

    pub fn end(&self) {
        self.refreshing.store(false, Ordering::Release);
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Number of refresh cycles that have ended.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Two-line title: room name, then who is logged in.
pub fn header_title(user: &User) -> String {
    match (user.full_name.as_deref(), user.tags.first()) {
        (Some(full_name), Some(room)) => format!("{}\nLogged in as {}", room, full_name),
        _ => String::new(),
    }
}

/// State and actions behind the dialog list.
pub struct DialogsScreen<S> {
    service: Arc<S>,
    alerts: Arc<dyn AlertPresenter>,
    dialogs: Arc<Mutex<DialogsDataSource>>,
    users: Arc<Mutex<UsersDataSource>>,
    refresh: Arc<RefreshIndicator>,
    settings: RefreshSettings,
    room: Option<String>,
    last_status: Mutex<NetworkStatus>,
}

impl<S: ChatService> DialogsScreen<S> {
    pub fn new(
        service: Arc<S>,
        alerts: Arc<dyn AlertPresenter>,
        settings: RefreshSettings,
        room: Option<String>,
    ) -> Self {
        Self {
            service,
            alerts,
            dialogs: Arc::default(),
            users: Arc::default(),
            refresh: Arc::default(),
            settings,
            room,
            last_status: Mutex::new(NetworkStatus::Connected),
        }
    }

    pub fn dialogs(&self) -> Vec<Dialog> {
        lock(&self.dialogs).objects().to_vec()
    }

    pub fn users(&self) -> Vec<User> {
        lock(&self.users).objects().to_vec()
    }

    pub fn refresh_indicator(&self) -> &RefreshIndicator {
        &self.refresh
    }

    /// Reachability seen by the last [`DialogsScreen::refresh_if_reachable`].
    pub fn last_status(&self) -> NetworkStatus {
        *lock(&self.last_status)
    }

    /// Refresh dialogs and users concurrently.
    ///
    /// Each list is updated as soon as its fetch lands. Each failure raises
    /// its own alert. Once both fetches have terminated the refresh indicator
    /// is ended and `on_refreshed` runs, both on `context`.
    pub fn fetch_data<C, F>(&self, context: C, on_refreshed: F) -> Arc<JoinBarrier>
    where
        C: CompletionContext + 'static,
        F: FnOnce() + Send + 'static,
    {
        self.refresh.begin();

        let refresh = Arc::clone(&self.refresh);
        self.join().run(context, move || {
            refresh.end();
            on_refreshed();
        })
    }

    /// Refresh both lists and return once both fetches have terminated.
    pub async fn reload(&self) {
        self.refresh.begin();
        self.join().run_to_completion().await;
        self.refresh.end();
    }

    /// Periodic refresh that stays quiet while the backend is unreachable.
    ///
    /// Returns `None` without fetching when the backend is unreachable or a
    /// refresh is still running. The first reachable call after an outage
    /// refreshes.
    pub async fn refresh_if_reachable<C, F>(
        &self,
        context: C,
        on_refreshed: F,
    ) -> Option<Arc<JoinBarrier>>
    where
        C: CompletionContext + 'static,
        F: FnOnce() + Send + 'static,
    {
        let status = self.service.network_status().await;
        let previous = std::mem::replace(&mut *lock(&self.last_status), status);

        match (previous, status) {
            (NetworkStatus::Connected, NetworkStatus::NotConnected) => {
                tracing::warn!("Backend unreachable, pausing refresh");
                return None;
            }
            (_, NetworkStatus::NotConnected) => return None,
            (NetworkStatus::NotConnected, NetworkStatus::Connected) => {
                tracing::info!("Connection restored, refreshing");
            }
            _ => {}
        }

        if self.refresh.is_refreshing() {
            tracing::debug!("Refresh still running, skipping");
            return None;
        }
        Some(self.fetch_data(context, on_refreshed))
    }

    /// Join over the dialogs and users fetches, alerting once per failure.
    fn join(&self) -> ParallelFetchJoin {
        let dialogs_task = {
            let service = Arc::clone(&self.service);
            let dialogs = Arc::clone(&self.dialogs);
            let limit = self.settings.page_limit;
            let keep_on_empty = self.settings.keep_dialogs_on_empty;
            FetchTask::new(
                FetchSource::DIALOGS,
                async move { service.fetch_dialogs(limit).await },
                move |items: Vec<Dialog>| {
                    if items.is_empty() && keep_on_empty {
                        tracing::debug!("Empty dialog list, keeping current rows");
                        return;
                    }
                    lock(&dialogs).update_objects(items);
                },
            )
        };

        let users_task = {
            let service = Arc::clone(&self.service);
            let users = Arc::clone(&self.users);
            let limit = self.settings.page_limit;
            let room = self.room.clone();
            FetchTask::new(
                FetchSource::USERS,
                async move { service.fetch_users(room.as_deref(), limit).await },
                move |items: Vec<User>| lock(&users).update_objects(items),
            )
        };

        let alerts = Arc::clone(&self.alerts);
        let sink = move |e: FetchError| alerts.show_alert(e.message());

        ParallelFetchJoin::new(Arc::new(sink))
            .push(dialogs_task)
            .push(users_task)
    }

    /// Alert and return false when the backend is unreachable.
    async fn has_connectivity(&self) -> bool {
        if self.service.network_status().await == NetworkStatus::NotConnected {
            self.alerts.show_alert(CHECK_INTERNET);
            return false;
        }
        true
    }

    /// Delete a dialog for the current user. Returns false when offline.
    pub async fn delete_dialog(&self, dialog_id: &str) -> Result<bool> {
        if !self.has_connectivity().await {
            return Ok(false);
        }
        if lock(&self.dialogs).get(dialog_id).is_none() {
            anyhow::bail!("No dialog with ID {}", dialog_id);
        }

        self.service
            .delete_dialog(dialog_id)
            .await
            .with_context(|| format!("Failed to delete dialog {}", dialog_id))?;
        lock(&self.dialogs).remove(dialog_id);
        tracing::info!("Deleted dialog {}", dialog_id);
        Ok(true)
    }

    /// Create a dialog and append it to the list.
    pub async fn create_dialog(&self, name: &str, occupants: &[u64]) -> Result<Dialog> {
        let dialog = self
            .service
            .create_dialog(name, occupants)
            .await
            .context("Failed to create dialog")?;
        lock(&self.dialogs).add_objects(vec![dialog.clone()]);
        Ok(dialog)
    }

    /// Prepare the call hand-off for a dialog. Returns `None` when offline.
    pub async fn join_dialog(
        &self,
        dialog_id: &str,
        conference_type: Option<ConferenceType>,
    ) -> Result<Option<CallSettings>> {
        if !self.has_connectivity().await {
            return Ok(None);
        }

        let dialog = lock(&self.dialogs)
            .get(dialog_id)
            .cloned()
            .with_context(|| format!("No dialog with ID {}", dialog_id))?;
        let occupants = lock(&self.users).users_with_ids(&dialog.occupants_ids);

        Ok(Some(CallSettings {
            conference_type,
            dialog,
            occupants,
        }))
    }
}
