//! A filesystem backed store of posts
//!
//! The [`Directory`] stands in for the social protocol: every post is a JSON
//! file under `posts/`, and uploaded images are content-addressed blobs
//! under `blobs/`. A loaded directory implements [`PostClient`] and
//! [`FileUpload`], so the publishing flows run against it unchanged.

use std::{
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::{
    client::{ClientError, FileUpload, PostClient, PostFilter, PostId, PostRequest},
    domain::{Config, Post, Profile, SessionStore},
    storage::Timeline,
};

/// Workspace metadata directory, relative to the root.
pub const META_DIR: &str = ".vms";
/// Posts directory, relative to the root.
pub const POSTS_DIR: &str = "posts";
/// Blob directory, relative to the root.
pub const BLOBS_DIR: &str = "blobs";

/// State of a [`Directory`] whose posts are in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    posts: Vec<Post>,
    config: Config,
}

/// State of a [`Directory`] that has only been opened.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed store of posts.
#[derive(Debug)]
pub struct Directory<S> {
    /// The root of the directory posts are stored in.
    root: PathBuf,
    state: S,
}

impl<S> Directory<S> {
    /// The root of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(META_DIR).join("config.toml")
    }

    /// Path of the session file.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.root.join(META_DIR).join("session.json")
    }

    /// Load the persisted session state, or an empty one.
    ///
    /// # Errors
    ///
    /// Fails if the session file exists but cannot be read.
    pub fn session(&self) -> Result<SessionStore, crate::domain::SessionError> {
        SessionStore::load(&self.session_path())
    }

    fn post_path(&self, post_id: &str) -> PathBuf {
        self.root.join(POSTS_DIR).join(format!("{post_id}.json"))
    }
}

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Create the directory layout and a default configuration.
    ///
    /// An existing configuration is left untouched.
    ///
    /// # Errors
    ///
    /// Fails if the directories or the configuration cannot be written.
    pub fn init(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.root.join(META_DIR))?;
        std::fs::create_dir_all(self.root.join(POSTS_DIR))?;
        std::fs::create_dir_all(self.root.join(BLOBS_DIR))?;

        let config_path = self.config_path();
        if !config_path.exists() {
            Config::default()
                .save(&config_path)
                .map_err(io::Error::other)?;
        }
        Ok(())
    }

    /// Load all posts from disk
    ///
    /// # Errors
    ///
    /// This method has different behaviour depending on the configuration
    /// file. If `allow_unrecognised` is `true`, then any files that cannot be
    /// parsed as posts are skipped. If `allow_unrecognised` is `false` (the
    /// default), then any unparseable JSON file under `posts/` returns an
    /// error.
    pub fn load_all(self) -> Result<Directory<Loaded>, DirectoryLoadError> {
        let config = load_config(&self.config_path());
        let paths = collect_post_paths(&self.root.join(POSTS_DIR));

        let (posts, unrecognised_paths): (Vec<_>, Vec<_>) = paths
            .par_iter()
            .map(|path| try_load_post(path))
            .partition(Result::is_ok);

        let mut posts: Vec<Post> = posts.into_iter().filter_map(Result::ok).collect();
        let unrecognised_paths: Vec<PathBuf> =
            unrecognised_paths.into_iter().filter_map(Result::err).collect();

        if !config.allow_unrecognised && !unrecognised_paths.is_empty() {
            return Err(DirectoryLoadError::UnrecognisedFiles(unrecognised_paths));
        }

        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        tracing::debug!("Loaded {} posts from {}", posts.len(), self.root.display());

        Ok(Directory {
            root: self.root,
            state: Loaded { posts, config },
        })
    }
}

/// Error loading a [`Directory`].
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// Files under `posts/` that are not posts.
    UnrecognisedFiles(Vec<PathBuf>),
}

impl fmt::Display for DirectoryLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognisedFiles(paths) => {
                write!(f, "Unrecognised files: ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
        }
    }
}

fn load_config(path: &Path) -> Config {
    Config::load(path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_post_paths(posts_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(posts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("json")))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn try_load_post(path: &Path) -> Result<Post, PathBuf> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        tracing::debug!("Failed to read {}: {e}", path.display());
        path.to_path_buf()
    })?;
    serde_json::from_str(&content).map_err(|e| {
        tracing::debug!("Skipping file that is not a post at {}: {e}", path.display());
        path.to_path_buf()
    })
}

impl Directory<Loaded> {
    /// Every post in the store, oldest first.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.state.posts
    }

    /// A post by id.
    #[must_use]
    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.state.posts.iter().find(|post| post.id == post_id)
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// Decode every post into a [`Timeline`].
    #[must_use]
    pub fn timeline(&self) -> Timeline {
        Timeline::from_posts(self.state.posts.iter().cloned())
    }

    fn save_post(&self, post: &Post) -> io::Result<()> {
        let path = self.post_path(&post.id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(post).expect("this must never fail");
        std::fs::write(path, json)
    }

    /// The first `<profile>-0x<n>` id with no loaded post and no file.
    fn next_post_id(&self, profile_id: &str) -> PostId {
        let count = self
            .state
            .posts
            .iter()
            .filter(|post| post.profile.id == profile_id)
            .count();
        let mut n = count + 1;
        loop {
            let id = format!("{profile_id}-0x{n:02x}");
            if self.post(&id).is_none() && !self.post_path(&id).exists() {
                return id;
            }
            n += 1;
        }
    }
}

impl PostClient for Directory<Loaded> {
    fn create_post(&mut self, request: PostRequest) -> Result<PostId, ClientError> {
        if !Profile::is_valid_id(&request.profile.id) {
            return Err(ClientError::new(format!(
                "invalid profile id '{}'",
                request.profile.id
            )));
        }
        let post = Post {
            id: self.next_post_id(&request.profile.id),
            profile: request.profile,
            created_at: Utc::now(),
            is_hidden: false,
            tags: request.tags,
            attributes: request.attributes,
            comment_on: request.comment_on,
        };
        self.save_post(&post)?;
        tracing::debug!("Wrote post {}", post.id);

        let id = post.id.clone();
        self.state.posts.push(post);
        Ok(id)
    }

    fn fetch_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ClientError> {
        Ok(self
            .state
            .posts
            .iter()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect())
    }

    fn hide_post(&mut self, post_id: &str) -> Result<(), ClientError> {
        let index = self
            .state
            .posts
            .iter()
            .position(|post| post.id == post_id)
            .ok_or_else(|| ClientError::new(format!("post {post_id} not found")))?;

        let mut post = self.state.posts[index].clone();
        post.is_hidden = true;
        self.save_post(&post)?;
        self.state.posts[index] = post;
        Ok(())
    }
}

impl FileUpload for Directory<Loaded> {
    fn upload(&self, bytes: &[u8]) -> Result<String, ClientError> {
        let hash = format!("{:x}", Sha256::digest(bytes));
        let dir = self.root.join(BLOBS_DIR);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(&hash), bytes)?;
        Ok(format!("ipfs://{hash}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        client::PostFilter,
        domain::{
            post::tests::profile,
            record::tests::{cause, goal},
            CauseVersion, DomainRecord, PostTag,
        },
    };

    fn setup_temp_directory() -> (TempDir, Directory<Loaded>) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let path = tmp.path().to_path_buf();
        Directory::new(path.clone()).init().unwrap();
        (tmp, Directory::new(path).load_all().unwrap())
    }

    fn request(record: &DomainRecord) -> PostRequest {
        PostRequest {
            profile: profile(),
            content: format!("#{}", record.tag()),
            name: format!("{} by redcross.lens", record.tag()),
            tags: vec![record.tag().to_string()],
            locale: "en".to_string(),
            app_id: "BCharity".to_string(),
            attributes: record.to_attributes(),
            comment_on: None,
        }
    }

    #[test]
    fn init_writes_default_config() {
        let (_tmp, dir) = setup_temp_directory();
        assert!(dir.config_path().exists());
        assert_eq!(dir.config(), &Config::default());
    }

    #[test]
    fn created_posts_survive_reload() {
        let (tmp, mut dir) = setup_temp_directory();
        let record: DomainRecord = cause(CauseVersion::V1_0_1).into();
        let first = dir.create_post(request(&record)).unwrap();
        let second = dir.create_post(request(&goal().into())).unwrap();
        assert_eq!(first, "0x01-0x01");
        assert_eq!(second, "0x01-0x02");

        let reloaded = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        assert_eq!(reloaded.posts(), dir.posts());
        assert_eq!(reloaded.timeline().current().len(), 2);
    }

    #[test]
    fn create_never_overwrites_unloaded_files() {
        let (tmp, _dir) = setup_temp_directory();
        let corrupt = tmp.path().join(POSTS_DIR).join("0x01-0x01.json");
        std::fs::write(&corrupt, "not json").unwrap();

        let mut config = Config::default();
        config.allow_unrecognised = true;
        config.save(&tmp.path().join(META_DIR).join("config.toml")).unwrap();

        let mut dir = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        let id = dir.create_post(request(&goal().into())).unwrap();
        assert_eq!(id, "0x01-0x02");
        assert_eq!(std::fs::read_to_string(&corrupt).unwrap(), "not json");
    }

    #[test]
    fn create_rejects_malformed_profile_ids() {
        let (tmp, mut dir) = setup_temp_directory();
        let mut request = request(&goal().into());
        request.profile.id = "../escape".to_string();

        assert!(dir.create_post(request).is_err());
        assert!(!tmp.path().join("escape-0x01.json").exists());
        assert!(dir.posts().is_empty());
    }

    #[test]
    fn hide_is_persisted() {
        let (tmp, mut dir) = setup_temp_directory();
        let id = dir
            .create_post(request(&cause(CauseVersion::V1_0_1).into()))
            .unwrap();
        dir.hide_post(&id).unwrap();

        let reloaded = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        assert!(reloaded.post(&id).unwrap().is_hidden);
        assert!(reloaded.fetch_posts(&PostFilter::default()).unwrap().is_empty());
        assert!(dir.hide_post("0x09-0x09").is_err());
    }

    #[test]
    fn fetch_filters_by_tag() {
        let (_tmp, mut dir) = setup_temp_directory();
        dir.create_post(request(&cause(CauseVersion::V1_0_1).into()))
            .unwrap();
        dir.create_post(request(&goal().into())).unwrap();

        let filter = PostFilter::by("0x01").tagged([PostTag::OrgPublishGoal]);
        let posts = dir.fetch_posts(&filter).unwrap();
        assert_eq!(posts.len(), 1);
        assert!(crate::is_goal(&posts[0]));
    }

    #[test]
    fn unrecognised_files_fail_load_unless_allowed() {
        let (tmp, _dir) = setup_temp_directory();
        std::fs::write(tmp.path().join(POSTS_DIR).join("junk.json"), "not json").unwrap();

        let result = Directory::new(tmp.path().to_path_buf()).load_all();
        assert!(matches!(
            result,
            Err(DirectoryLoadError::UnrecognisedFiles(ref paths)) if paths.len() == 1
        ));

        let mut config = Config::default();
        config.allow_unrecognised = true;
        config.save(&tmp.path().join(META_DIR).join("config.toml")).unwrap();
        let dir = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        assert!(dir.posts().is_empty());
    }

    #[test]
    fn upload_is_content_addressed() {
        let (tmp, dir) = setup_temp_directory();
        let url = dir.upload(b"png bytes").unwrap();
        let hash = url.strip_prefix("ipfs://").unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(std::fs::read(tmp.path().join(BLOBS_DIR).join(hash)).unwrap(), b"png bytes");
        assert_eq!(dir.upload(b"png bytes").unwrap(), url);
    }
}
