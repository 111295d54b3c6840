//! Test doubles and socket helpers shared by the behavioural suites.

mod client;
mod reporter;

pub use client::{ClientOutcome, exchange, exchange_after};
pub use reporter::{LifecycleEvent, RecordingLifecycleReporter};
