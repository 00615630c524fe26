//! Object detector adapter.
//!
//! The pipeline depends on the [`Detector`] capability, never on a concrete
//! model. Two backends exist:
//! - [`SidecarDetector`]: HTTP client for a YOLO inference sidecar
//! - [`NullDetector`]: the "unavailable" variant, selected when the sidecar
//!   cannot be reached at process start
//!
//! Backend selection happens exactly once, in [`init_detector`]; it is never
//! re-probed per call.

pub mod detector;
pub mod error;
pub mod sidecar;

pub use detector::{Detector, NullDetector};
pub use error::{DetectError, DetectResult};
pub use sidecar::{init_detector, DetectorConfig, SidecarDetector};
