//! Core types for sharecal.
//!
//! This crate is shared by the sharecal server and CLI:
//! - `Event`, `Viewer` and the access rules deciding who may see or change what
//! - the month grid builder used by every calendar view
//! - the directory-backed event, attachment, user and session stores
//! - ICS generation and parsing

pub mod access;
pub mod attachments;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod grid;
pub mod ics;
pub mod session;
pub mod store;
pub mod users;
pub mod viewer;

pub use access::{ColorToken, EditPolicy, Permissions};
pub use error::{SharecalError, SharecalResult};
pub use event::{AccessLevel, Attachment, Event, EventId};
pub use grid::{CalendarCell, Month, MonthGrid, build_month_grid};
pub use viewer::{Role, Viewer};
