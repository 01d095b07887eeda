pub mod directory;
mod timeline;

pub use directory::{Directory, DirectoryLoadError, Loaded, Unloaded};
pub use timeline::{Entry, Revision, Skipped, Timeline};
