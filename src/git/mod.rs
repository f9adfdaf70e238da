//! Repository access abstraction layer
//!
//! The engine never talks to git directly. It works on an immutable
//! [RepositorySnapshot], produced by a [SnapshotSource]:
//!
//! - [repository::Git2Repository]: reads a real repository with the `git2` crate
//! - [mock::MockRepository]: builds commit graphs in memory for tests
//!
//! # Usage
//!
//! ```rust
//! # use git_nextver::git::{MockRepository, SnapshotSource};
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut repo = MockRepository::new("main");
//! let first = repo.commit("initial commit");
//! repo.tag("v1.0.0", &first);
//! repo.commit("fix: typo");
//!
//! let snapshot = repo.snapshot()?;
//! assert_eq!(snapshot.commits_since(&first).len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;
pub mod snapshot;

pub use mock::MockRepository;
pub use repository::Git2Repository;
pub use snapshot::{BranchRef, RepositorySnapshot};

use crate::error::Result;

/// Anything able to produce a repository snapshot
///
/// ## Thread Safety
///
/// Implementors must be `Send + Sync`; the snapshot itself is plain data and
/// is shared read-only between strategy workers.
///
/// ## Error Handling
///
/// Failures are reported as [crate::error::NextVerError::Git] or
/// [crate::error::NextVerError::Repository] and are fatal to the computation.
pub trait SnapshotSource: Send + Sync {
    /// Read HEAD, branches, tags and the commits reachable from them
    fn snapshot(&self) -> Result<RepositorySnapshot>;
}
