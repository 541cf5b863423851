//! Sequential batch processing of handover forms.

pub mod progress;
pub mod runner;
pub mod state;

pub use progress::{BatchProgressEvent, NoopProgress, ProgressBroadcaster, ProgressReporter};
pub use runner::{BatchRunner, PACING_DELAY};
pub use state::{BatchState, SourceFile};
