pub mod cache;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod git;
pub mod increment;
pub mod resolver;
pub mod selector;
pub mod strategy;
pub mod ui;

pub use engine::{compute, VersionEngine};
pub use error::{NextVerError, Result};
