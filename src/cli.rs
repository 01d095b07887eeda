use std::path::{Path, PathBuf};

mod bookmark;
mod decode;
mod delete;
mod edit;
mod init;
mod list;
mod login;
mod progress;
mod publish;
mod show;
mod terminal;
mod validate;

use anyhow::Context;
use bookmark::Bookmark;
use clap::{ArgAction, ValueEnum};
use decode::Decode;
use delete::Delete;
use edit::Edit;
use init::Init;
use list::List;
use login::{Login, Logout};
use progress::Progress;
use publish::Publish;
use show::Show;
use validate::Validate;
use vms::{
    client::SessionAuth,
    domain::{Profile, SessionStore},
    storage::{directory::Loaded, Directory},
    Publisher,
};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the post store
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Initialize a new post store
    Init(Init),

    /// Sign in as a profile
    Login(Login),

    /// Sign out
    Logout(Logout),

    /// Publish a new cause, opportunity, goal or VHR log request
    #[command(subcommand)]
    Publish(Publish),

    /// Publish a new revision of a cause or opportunity
    #[command(subcommand)]
    Edit(Edit),

    /// Delete a record by hiding every revision of it
    Delete(Delete),

    /// Bookmark a cause or opportunity post
    Bookmark(Bookmark),

    /// List current records
    #[command(subcommand)]
    List(List),

    /// Show a record and its revisions
    Show(Show),

    /// Decode a single post file
    Decode(Decode),

    /// Check that every post in the store decodes
    Validate(Validate),

    /// Show VHR progress towards a goal
    Progress(Progress),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::Login(command) => command.run(&root)?,
            Self::Logout(command) => command.run(&root)?,
            Self::Publish(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::Bookmark(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Decode(command) => command.run()?,
            Self::Validate(command) => command.run(root)?,
            Self::Progress(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Output formats for commands that print records.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn load_directory(root: PathBuf) -> anyhow::Result<Directory<Loaded>> {
    Directory::new(root)
        .load_all()
        .context("failed to load post store")
}

fn load_session(root: &Path) -> anyhow::Result<SessionStore> {
    let directory = Directory::new(root.to_path_buf());
    directory
        .session()
        .with_context(|| format!("failed to read {}", directory.session_path().display()))
}

/// The profile of the active session, or an error telling the user to sign in.
fn signed_in(root: &Path) -> anyhow::Result<(Profile, SessionAuth)> {
    let store = load_session(root)?;
    let session = store
        .current()
        .cloned()
        .context("not signed in, run `vms login` first")?;
    Ok((session.profile.clone(), SessionAuth::new(Some(session))))
}

/// A publisher writing into the store at `root` for the signed-in profile.
fn publisher(
    root: PathBuf,
) -> anyhow::Result<(Profile, Publisher<Directory<Loaded>, SessionAuth>)> {
    let (profile, auth) = signed_in(&root)?;
    let directory = load_directory(root)?;
    let config = directory.config().clone();
    Ok((profile, Publisher::new(directory, auth, &config)))
}

fn prompt_to_proceed(prompt: &str) -> anyhow::Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("failed to read confirmation")
}
