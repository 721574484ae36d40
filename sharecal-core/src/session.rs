//! The signed-in user of the local CLI, kept in `<data_dir>/session.toml`.
//!
//! Only the identity is stored; the role is looked up in the user directory
//! each time so role changes apply immediately.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SharecalError, SharecalResult};
use crate::users::UserDirectory;
use crate::viewer::Viewer;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    user_id: Option<String>,
}

impl Session {
    pub fn load(path: &Path) -> SharecalResult<Self> {
        let user_id = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let file: SessionFile =
                toml::from_str(&content).map_err(|e| SharecalError::Config(e.to_string()))?;
            file.user_id
        } else {
            None
        };

        Ok(Session {
            path: path.to_path_buf(),
            user_id,
        })
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn sign_in(&mut self, user_id: &str) -> SharecalResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = SessionFile {
            user_id: Some(user_id.to_string()),
        };
        let content =
            toml::to_string_pretty(&file).map_err(|e| SharecalError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, content)?;

        self.user_id = Some(user_id.to_string());
        tracing::debug!(user = %user_id, "Signed in");
        Ok(())
    }

    pub fn sign_out(&mut self) -> SharecalResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        self.user_id = None;
        Ok(())
    }

    /// The current viewer, anonymous when nobody is signed in.
    pub fn viewer(&self, users: &UserDirectory) -> Viewer {
        users.viewer_for(self.user_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::Role;

    #[test]
    fn test_sign_in_and_out() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.toml");
        let mut users = UserDirectory::load(&dir.path().join("users.toml")).unwrap();
        users.register("alice", None).unwrap();

        let mut session = Session::load(&session_path).unwrap();
        assert_eq!(session.viewer(&users), Viewer::anonymous());

        session.sign_in("alice").unwrap();
        let reloaded = Session::load(&session_path).unwrap();
        assert_eq!(reloaded.user_id(), Some("alice"));
        assert_eq!(reloaded.viewer(&users), Viewer::new("alice", Role::Admin));

        session.sign_out().unwrap();
        assert!(!session_path.exists());
        assert_eq!(Session::load(&session_path).unwrap().user_id(), None);
    }

    #[test]
    fn test_role_is_read_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut users = UserDirectory::load(&dir.path().join("users.toml")).unwrap();
        users.register("alice", None).unwrap();
        users.register("bob", None).unwrap();

        let mut session = Session::load(&dir.path().join("session.toml")).unwrap();
        session.sign_in("bob").unwrap();
        assert!(!session.viewer(&users).is_admin());

        let alice = users.viewer_for(Some("alice"));
        users.set_role(&alice, "bob", Role::Admin).unwrap();
        assert!(session.viewer(&users).is_admin());
    }
}
