//! Token usage recording boundary

mod recorder;

pub use recorder::{KeyKind, TokenUsage, UsageRecorder, UsageSource};

#[cfg(test)]
pub use recorder::mock::MockUsageRecorder;
