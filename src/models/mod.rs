pub mod block;
pub mod usage;
pub mod violation;

pub use block::{BlockStatus, PermanentBlocklist, TempBlocklist, TimedBlock};
pub use usage::{DailyUsage, SiteUsage, UsageData};
pub use violation::{ViolationKind, ViolationLog, ViolationLogEntry};
