use std::path::Path;

use anyhow::Context;
use tracing::instrument;
use vms::{
    domain::{Session, SessionStore},
    Directory, Profile,
};

use crate::cli::{load_session, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Login {
    /// Protocol identifier of the profile
    #[arg(long)]
    id: String,

    /// Handle of the profile
    #[arg(long)]
    handle: String,

    /// Wallet address that owns the profile
    #[arg(long)]
    owner: String,

    /// Agree to the session being stored on disk
    #[arg(long)]
    accept_cookies: bool,
}

impl Login {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        if !Profile::is_valid_id(&self.id) {
            anyhow::bail!(
                "Invalid profile id '{}': expected 0x followed by hex digits",
                self.id
            );
        }

        let mut store = load_session(root)?;
        if self.accept_cookies {
            store.set_has_cookies(true);
        }

        let profile = Profile {
            id: self.id,
            handle: self.handle,
            owned_by: self.owner,
        };
        let handle = profile.handle.clone();

        if !store.login(Session::new(profile)) {
            anyhow::bail!("Cookie consent is required to stay signed in (pass --accept-cookies)");
        }
        save(&store, root)?;

        println!("{}", format!("Signed in as {handle}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Logout {
    /// Also withdraw cookie consent
    #[arg(long)]
    withdraw_consent: bool,
}

impl Logout {
    #[instrument]
    pub fn run(&self, root: &Path) -> anyhow::Result<()> {
        let mut store = load_session(root)?;
        let session = store.logout();
        if self.withdraw_consent {
            store.set_has_cookies(false);
        }
        save(&store, root)?;

        match session {
            Some(session) => println!("Signed out {}", session.profile.handle),
            None => println!("{}", "Not signed in".dim()),
        }
        Ok(())
    }
}

fn save(store: &SessionStore, root: &Path) -> anyhow::Result<()> {
    let path = Directory::new(root.to_path_buf()).session_path();
    store
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
