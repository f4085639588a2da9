//! ModGuard Engine
//!
//! The moderation orchestrator and the machinery that runs it in the
//! background.
//!
//! - [`Orchestrator`]: `submit` persists and schedules, `process` drives one
//!   request to a terminal verdict
//! - [`WorkQueue`] / [`WorkerPool`]: bounded queue of request ids drained by
//!   a fixed number of workers
//! - [`RecoverySweeper`]: re-enqueues requests left pending
//! - [`ModerationEngine`]: all of the above, started and stopped together

pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod queue;
pub mod recovery;
pub mod worker;

pub use config::EngineConfig;
pub use engine::ModerationEngine;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{Orchestrator, ProcessOutcome, Submission};
pub use queue::{Enqueue, WorkQueue};
pub use recovery::RecoverySweeper;
pub use worker::WorkerPool;
