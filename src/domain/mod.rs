//! Domain types - pure values independent of git access

pub mod branch;
pub mod candidate;
pub mod commit;
pub mod result;
pub mod tag;
pub mod version;

pub use branch::{BranchConfig, BranchContext, IncrementMode};
pub use candidate::BaseVersionCandidate;
pub use commit::{Commit, CommitId};
pub use result::VersionResult;
pub use tag::Tag;
pub use version::{SemanticVersion, VersionBump};
