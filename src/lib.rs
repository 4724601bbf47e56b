//! Parsing core for an Alpine-style binary package ecosystem.
//!
//! Three kinds of untyped input go in: per-package key/value records from
//! a repository index, dependency tokens like `curl>=7.0`, and the raw
//! byte stream of a package archive. Typed, immutable values come out,
//! ready for a resolver or installer to consume. No I/O happens in here;
//! callers hand us strings, records and byte cursors.

pub mod archive;
pub mod index;
pub mod types;

pub use index::{Package, PackageError, PackageIndex};
pub use types::{Checksum, ConstraintOp, Dependency, RequirementError, VersionSpec};
