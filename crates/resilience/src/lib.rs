//! Retry with exponential backoff for calls to remote services.
//!
//! Both the embedding client and the vector store gateway talk to managed
//! services that occasionally throttle or drop requests. Instead of each call
//! site carrying its own loop, they share one [`RetryPolicy`]:
//!
//! - a bounded number of attempts (default 3),
//! - a base delay that doubles before every retry (1s, 2s, 4s, ...),
//! - a per-error decision via [`Retryable`], so terminal faults such as a
//!   missing index surface after exactly one attempt.
//!
//! Waiting goes through a [`Sleeper`]. Production code uses [`TokioSleeper`];
//! tests plug in [`RecordingSleeper`] to assert the backoff schedule without
//! actually waiting.
//!
//! ```
//! use resilience::{RecordingSleeper, RetryPolicy, Retryable};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Flaky;
//! impl std::fmt::Display for Flaky {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str("flaky")
//!     }
//! }
//! impl Retryable for Flaky {
//!     fn is_retryable(&self) -> bool {
//!         true
//!     }
//! }
//!
//! # tokio_test_block(async {
//! let sleeper = RecordingSleeper::default();
//! let policy = RetryPolicy::default();
//! let result = policy
//!     .run_with(&sleeper, "demo", |attempt| async move {
//!         if attempt < 3 { Err(Flaky) } else { Ok(attempt) }
//!     })
//!     .await;
//! assert_eq!(result.unwrap(), 3);
//! assert_eq!(sleeper.delays(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
//! # }
//! ```

mod retry;
mod serde_millis;
mod sleeper;

pub use crate::retry::{RetryPolicy, Retryable};
pub use crate::sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
