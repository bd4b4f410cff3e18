pub mod boundary;
pub mod cli;
pub mod command;
pub mod config;
pub mod deploy;
pub mod domain;
pub mod error;
pub mod formats;
pub mod git;
pub mod policy;
pub mod rewrite;
pub mod ui;

pub use error::{ReleaseError, Result};
