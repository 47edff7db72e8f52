//! Dialog list screen
//!
//! Terminal front end for the dialog list: loads dialogs and users through a
//! parallel fetch join, prints them, and drives delete, create and join.

mod call;
mod controller;
mod data_source;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time;

pub use call::ConferenceType;
pub use controller::{header_title, AlertPresenter, ChatService, DialogsScreen};

use crate::api::{ConferenceClient, NetworkStatus};
use crate::config::Config;
use crate::join::{JoinBarrier, MainQueue};
use crate::models::{Dialog, User};

/// How often `--watch` rechecks reachability while the backend is down.
const RECONNECT_POLL: Duration = Duration::from_secs(5);

/// Prints alerts to stderr as they arrive.
struct ConsoleAlerts;

impl AlertPresenter for ConsoleAlerts {
    fn show_alert(&self, message: &str) {
        tracing::debug!("Alert: {}", message);
        eprintln!("! {}", message);
    }
}

/// Build the screen from stored config and session.
fn open_screen(config: &Config) -> Result<DialogsScreen<ConferenceClient>> {
    let client = ConferenceClient::from_config(config)?;
    Ok(DialogsScreen::new(
        Arc::new(client),
        Arc::new(ConsoleAlerts),
        config.refresh.clone(),
        config.room().map(String::from),
    ))
}

/// Drain the main queue until the refresh behind `barrier` has completed.
async fn wait_for_refresh(barrier: &JoinBarrier, queue: &mut MainQueue) {
    if !barrier.is_complete() {
        tracing::debug!("Waiting on {} fetches", barrier.outstanding());
    }
    // The refresh completion is the only job posted to this queue.
    queue.run_next().await;
}

/// Open the screen and load it once, like a first appearance.
async fn load_screen() -> Result<DialogsScreen<ConferenceClient>> {
    let config = Config::load()?;
    let screen = open_screen(&config)?;
    screen.reload().await;
    Ok(screen)
}

fn print_dialogs(dialogs: &[Dialog]) {
    println!("\nDialogs:");
    println!("{:-<60}", "");

    if dialogs.is_empty() {
        println!("  (no dialogs found)");
        return;
    }

    for dialog in dialogs {
        println!("{}", dialog.display_name());
        println!("  ID: {}", dialog.id);
        println!("  Occupants: {}", dialog.occupants_ids.len());

        if let Some(time) = dialog.last_message_time() {
            println!("  Last: {}", time.format("%Y-%m-%d %H:%M"));
        }
        if let Some(ref preview) = dialog.last_message {
            if !preview.trim().is_empty() {
                println!("  > {}", preview.trim());
            }
        }
        if dialog.unread_messages_count > 0 {
            println!("  Unread: {}", dialog.unread_messages_count);
        }

        println!();
    }
}

fn print_users(users: &[User]) {
    println!("\nUsers:");
    println!("{:-<60}", "");

    if users.is_empty() {
        println!("  (no users found)");
        return;
    }

    for user in users {
        println!("  {:<30} {}", user.display_name(), user.id);
    }
}

/// List dialogs, optionally refreshing every `watch` seconds until Ctrl+C.
pub async fn show_dialogs(watch: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let screen = open_screen(&config)?;

    if let Some(user) = &config.current_user {
        let title = header_title(user);
        if !title.is_empty() {
            println!("{}", title);
        }
    }

    let mut queue = MainQueue::new();
    let barrier = screen.fetch_data(queue.handle(), || tracing::debug!("Refresh finished"));
    wait_for_refresh(&barrier, &mut queue).await;
    print_dialogs(&screen.dialogs());

    let Some(interval) = watch else {
        return Ok(());
    };
    let period = Duration::from_secs(interval.max(1));

    loop {
        // Poll faster while offline so a reconnect refreshes promptly.
        let wait = match screen.last_status() {
            NetworkStatus::NotConnected => period.min(RECONNECT_POLL),
            NetworkStatus::Connected => period,
        };

        tokio::select! {
            _ = time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Shutting down...");
                return Ok(());
            }
        }

        let Some(barrier) = screen
            .refresh_if_reachable(queue.handle(), || tracing::debug!("Refresh finished"))
            .await
        else {
            continue;
        };
        wait_for_refresh(&barrier, &mut queue).await;
        tracing::info!(
            "Refresh #{} complete",
            screen.refresh_indicator().completed()
        );
        print_dialogs(&screen.dialogs());
    }
}

/// List users in the current room.
pub async fn show_users() -> Result<()> {
    let screen = load_screen().await?;
    print_users(&screen.users());
    Ok(())
}

/// Delete a dialog for the current user.
pub async fn delete_dialog(dialog_id: &str) -> Result<()> {
    let screen = load_screen().await?;
    if screen.delete_dialog(dialog_id).await? {
        println!("Dialog deleted.");
        print_dialogs(&screen.dialogs());
    }
    Ok(())
}

/// Create a group dialog with the given occupants.
pub async fn create_dialog(name: &str, occupants: &[u64]) -> Result<()> {
    let screen = load_screen().await?;
    let dialog = screen.create_dialog(name, occupants).await?;
    println!("Created dialog {} ({}).", dialog.display_name(), dialog.id);
    print_dialogs(&screen.dialogs());
    Ok(())
}

/// Prepare joining a dialog's conference and print the hand-off.
pub async fn join_dialog(dialog_id: &str, conference_type: Option<ConferenceType>) -> Result<()> {
    let screen = load_screen().await?;
    let Some(settings) = screen.join_dialog(dialog_id, conference_type).await? else {
        return Ok(());
    };

    tracing::info!("Joining {}", settings);
    println!("Joining {}", settings);
    for occupant in &settings.occupants {
        println!("  {:<30} {}", occupant.display_name(), occupant.id);
    }
    if settings.is_listener() {
        println!("Listening only; pass --audio or --video to publish.");
    }
    Ok(())
}
