//! Read-only build metadata supplied by the host for each notification.

mod context;
mod culprits;
mod result;

pub use context::{BuildContext, BuildSummary};
pub use culprits::responsible_parties;
pub use result::BuildResult;
