//! UI state boundary: regions, transcript and chart surfaces

pub mod regions;
pub mod surface;
pub mod transcript;

pub use regions::{Alerts, BatchRegion, BatchView, PredictionPhase, ResultRegion, ResultView};
pub use surface::{LogSurface, MemorySurface};
pub use transcript::{Role, Transcript, TranscriptEntry};
