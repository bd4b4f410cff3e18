//! Locating and rewriting version lines inside files.
//!
//! - `locator` - first matching line, with indent and terminator
//! - `rewriter` - single-line replacement computed in memory
//! - `batch` - several writes staged and persisted together

pub mod batch;
pub mod locator;
pub mod rewriter;

pub use batch::RewriteBatch;
pub use locator::{locate, Located};
pub use rewriter::{rewrite, FileRewrite, VersionFile};
