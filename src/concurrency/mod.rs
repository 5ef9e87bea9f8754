//! Concurrency primitives
//!
//! Bounded task execution, retry with exponential backoff, and a
//! non-preemptive timeout. Tasks are spawned onto the tokio runtime, so a
//! task that loses a timeout race keeps running detached and its result is
//! discarded; work passed through these helpers must be idempotent.

pub mod bounded;
pub mod retry;
pub mod timeout;

pub use bounded::{run_bounded, BoundedOptions, BoundedOutcome, TaskFailure};
pub use retry::{retry, RetryOptions};
pub use timeout::with_timeout;
