//! User directory stored in `<data_dir>/users.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::access::can_manage_users;
use crate::error::{SharecalError, SharecalResult};
use crate::viewer::{Role, Viewer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<User>,
}

/// Known users and their roles.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    path: PathBuf,
    users: Vec<User>,
}

impl UserDirectory {
    /// Load users.toml, or start empty if it does not exist yet.
    pub fn load(path: &Path) -> SharecalResult<Self> {
        let users = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let file: UsersFile =
                toml::from_str(&content).map_err(|e| SharecalError::Config(e.to_string()))?;
            file.users
        } else {
            Vec::new()
        };

        Ok(UserDirectory {
            path: path.to_path_buf(),
            users,
        })
    }

    /// Re-read users.toml, picking up changes made by other processes.
    pub fn reload(&mut self) -> SharecalResult<()> {
        *self = UserDirectory::load(&self.path)?;
        Ok(())
    }

    pub fn save(&self) -> SharecalResult<()> {
        self.write(&self.users)
    }

    /// Persist `users`. Callers commit to memory only once this succeeded.
    fn write(&self, users: &[User]) -> SharecalResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = UsersFile {
            users: users.to_vec(),
        };
        let content =
            toml::to_string_pretty(&file).map_err(|e| SharecalError::Serialization(e.to_string()))?;

        let temp = self.path.with_extension("toml.tmp");
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn role_of(&self, id: &str) -> Option<Role> {
        self.get(id).map(|u| u.role)
    }

    /// The viewer for an identity. Unknown identities get no role and are
    /// therefore unauthenticated.
    pub fn viewer_for(&self, identity: Option<&str>) -> Viewer {
        match identity {
            None => Viewer::anonymous(),
            Some(id) => match self.get(id) {
                Some(user) => Viewer::new(&user.id, user.role),
                None => Viewer {
                    identity: Some(id.to_string()),
                    role: None,
                },
            },
        }
    }

    /// Register a user if unknown. The very first user becomes an admin so a
    /// fresh install can be managed at all.
    pub fn register(&mut self, id: &str, email: Option<&str>) -> SharecalResult<&User> {
        let id = id.trim();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(SharecalError::InvalidInput(format!(
                "Invalid user id '{}'",
                id
            )));
        }

        let index = match self.users.iter().position(|u| u.id == id) {
            Some(index) => index,
            None => {
                let role = if self.users.is_empty() {
                    Role::Admin
                } else {
                    Role::User
                };
                let mut users = self.users.clone();
                users.push(User {
                    id: id.to_string(),
                    email: email.map(str::to_string),
                    role,
                });
                self.write(&users)?;
                self.users = users;
                tracing::info!(user = %id, role = %role, "Registered user");
                self.users.len() - 1
            }
        };

        Ok(&self.users[index])
    }

    /// Change a user's role. Only admins may do this, and the last admin
    /// cannot be demoted.
    pub fn set_role(&mut self, actor: &Viewer, id: &str, role: Role) -> SharecalResult<()> {
        if !can_manage_users(actor) {
            return Err(SharecalError::PermissionDenied(format!(
                "{} may not change roles",
                actor
            )));
        }

        let mut users = self.users.clone();
        let admins = users.iter().filter(|u| u.role == Role::Admin).count();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| SharecalError::UserNotFound(id.to_string()))?;

        if user.role == Role::Admin && role != Role::Admin && admins == 1 {
            return Err(SharecalError::InvalidInput(format!(
                "'{}' is the last admin",
                id
            )));
        }

        user.role = role;
        self.write(&users)?;
        self.users = users;
        tracing::info!(user = %id, role = %role, by = %actor, "Changed role");
        Ok(())
    }
}
