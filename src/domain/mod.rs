//! Domain logic - pure version rules independent of files, git and prompts

pub mod pattern;
pub mod template;
pub mod version;

pub use pattern::{PatternMatch, VersionPattern};
pub use template::VersionTemplate;
pub use version::VersionValue;
