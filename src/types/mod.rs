mod checksum;
mod requirement;

pub use checksum::{Checksum, ChecksumKind, ChecksumValidator};
pub use requirement::{ConstraintOp, Dependency, RequirementError, VersionSpec};
