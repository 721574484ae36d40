//! Access control over events.
//!
//! Every decision is a pure function of a [`Viewer`] snapshot and the event in
//! question. Nothing here touches storage or session state.
//!
//! ## Rules
//!
//! ```text
//! view:   anonymous -> only `readonly` and `edit` events
//!         any role  -> everything
//! edit:   needs identity and role
//!         `admin` events -> admin only
//!         otherwise      -> admin, or user per EditPolicy
//! delete: admin only
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharecalError;
use crate::event::{AccessLevel, Event};
use crate::viewer::{Role, Viewer};

/// How the `user` role is allowed to edit events it did not create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// Users may edit only the events they created.
    #[default]
    CreatorOnly,
    /// Any user may edit any non-admin event.
    AnyUser,
}

impl EditPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditPolicy::CreatorOnly => "creator_only",
            EditPolicy::AnyUser => "any_user",
        }
    }
}

impl fmt::Display for EditPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditPolicy {
    type Err = SharecalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").as_str() {
            "creator_only" => Ok(EditPolicy::CreatorOnly),
            "any_user" => Ok(EditPolicy::AnyUser),
            other => Err(SharecalError::InvalidInput(format!(
                "Unknown edit policy '{}'. Expected creator_only or any_user",
                other
            ))),
        }
    }
}

/// Visual category for an event, derived from its access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Danger,
    Success,
    Info,
    Neutral,
}

impl ColorToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorToken::Danger => "danger",
            ColorToken::Success => "success",
            ColorToken::Info => "info",
            ColorToken::Neutral => "neutral",
        }
    }
}

pub fn can_view(viewer: &Viewer, event: &Event) -> bool {
    match viewer.role {
        Some(_) => true,
        None => matches!(
            event.access_level,
            Some(AccessLevel::ReadOnly) | Some(AccessLevel::Edit)
        ),
    }
}

pub fn can_edit(viewer: &Viewer, event: &Event, policy: EditPolicy) -> bool {
    let Some(role) = viewer.role else {
        return false;
    };
    if viewer.identity.is_none() {
        return false;
    }

    if event.access_level == Some(AccessLevel::Admin) {
        return role == Role::Admin;
    }

    match role {
        Role::Admin => true,
        Role::User => match policy {
            EditPolicy::AnyUser => true,
            EditPolicy::CreatorOnly => viewer.is(event.created_by.as_deref()),
        },
    }
}

/// Any signed-in viewer may add events.
pub fn can_create(viewer: &Viewer) -> bool {
    viewer.is_authenticated()
}

pub fn can_delete(viewer: &Viewer) -> bool {
    viewer.is_admin()
}

/// Only admins may change other users' roles.
pub fn can_manage_users(viewer: &Viewer) -> bool {
    viewer.is_admin()
}

/// Whether `viewer` may tag an event with `level`. Only admins hand out the
/// `admin` level.
pub fn can_assign_level(viewer: &Viewer, level: Option<AccessLevel>) -> bool {
    level != Some(AccessLevel::Admin) || viewer.is_admin()
}

pub fn color_for_access_level(event: &Event) -> ColorToken {
    match event.access_level {
        Some(AccessLevel::Admin) => ColorToken::Danger,
        Some(AccessLevel::Edit) => ColorToken::Success,
        Some(AccessLevel::ReadOnly) => ColorToken::Info,
        None => ColorToken::Neutral,
    }
}

/// All decisions for one viewer/event pair, as handed to presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Permissions {
    pub fn evaluate(viewer: &Viewer, event: &Event, policy: EditPolicy) -> Self {
        Permissions {
            can_view: can_view(viewer, event),
            can_edit: can_edit(viewer, event, policy),
            can_delete: can_delete(viewer),
        }
    }
}
