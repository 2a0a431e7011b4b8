//! Usage recorder implementations

mod in_memory;

pub use in_memory::{DailyUsage, DailyUsageKey, InMemoryUsageRecorder};
