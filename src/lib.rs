pub mod config;
pub mod driver;
pub mod engine;
mod error;
pub mod report;
pub mod samples;
pub mod signal;
pub mod types;

pub use config::HarnessConfig;
pub use driver::{ClassificationDriver, RunOptions, RunSummary, StopReason};
pub use engine::{create_engine, EngineConfig, ImpulseEngine, ImpulseStatus, ReplayEngine};
pub use error::{HarnessError, SignalError};
pub use signal::{CancelToken, SampleSource, SignalView, SlidingWindow};
pub use types::{ClassificationResult, ImpulseParameters};
