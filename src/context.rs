//! Everything a command needs: configuration, stores and the signed-in viewer.

use anyhow::Result;
use sharecal_core::Viewer;
use sharecal_core::config::SharecalConfig;
use sharecal_core::session::Session;
use sharecal_core::store::EventStore;
use sharecal_core::users::UserDirectory;

pub struct Context {
    pub config: SharecalConfig,
    pub store: EventStore,
    pub users: UserDirectory,
    pub session: Session,
}

impl Context {
    pub fn load(config: SharecalConfig) -> Result<Self> {
        let store = EventStore::open(&config)?;
        let users = UserDirectory::load(&config.users_path())?;
        let session = Session::load(&config.session_path())?;

        Ok(Context {
            config,
            store,
            users,
            session,
        })
    }

    /// The signed-in user with their current role, or anonymous.
    pub fn viewer(&self) -> Viewer {
        self.session.viewer(&self.users)
    }

    /// Like [`Context::viewer`], but fails when nobody is signed in.
    pub fn require_viewer(&self) -> Result<Viewer> {
        let viewer = self.viewer();
        if !viewer.is_authenticated() {
            anyhow::bail!(
                "Not signed in.\n\n\
                Sign in with:\n  \
                sharecal login <user>"
            );
        }
        Ok(viewer)
    }
}
