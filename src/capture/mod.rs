//! Frame capture
//!
//! This module provides:
//! - The [`Frame`] snapshot type and the latest-wins [`FrameSlot`]
//! - The [`VideoSource`] abstraction and its implementations
//! - Label/timestamp overlay rendering
//! - The per-camera [`CaptureWorker`] loop

pub mod error;
pub mod frame;
pub mod overlay;
pub mod slot;
pub mod source;
#[cfg(feature = "webcam")]
pub mod webcam;
pub mod worker;

pub use error::CaptureError;
pub use frame::Frame;
pub use overlay::OverlayStyle;
pub use slot::FrameSlot;
pub use source::{SourceSpec, TestPatternSource, VideoSource};
#[cfg(feature = "webcam")]
pub use webcam::WebcamSource;
pub use worker::{CaptureConfig, CaptureWorker, WorkerHandle, WorkerState};
