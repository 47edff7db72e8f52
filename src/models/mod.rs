//! Data models for conference entities

mod dialog;
mod user;

pub use dialog::*;
pub use user::*;
