//! Camera registry
//!
//! The registry is the static table of configured cameras. Each entry wires
//! one camera descriptor to one [`FrameSlot`](crate::capture::FrameSlot) and
//! one capture worker.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<CameraRegistry>
//!                   ┌──────────────────────────┐
//!                   │ cameras: Vec<Entry {     │
//!                   │   descriptor,            │
//!                   │   slot: Arc<FrameSlot>,  │
//!                   │   worker: WorkerHandle,  │
//!                   │ }>  (config order)       │
//!                   └────────────┬─────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!  [CaptureWorker]          [Viewer task]           [Viewer task]
//!  slot.publish()           slot.snapshot()         slot.snapshot()
//!   (own thread)                 │                       │
//!                                └──► multipart part ──► HTTP
//! ```
//!
//! The table is built before the server starts and never changes shape
//! afterwards, so it is shared without a lock.

pub mod camera;
pub mod entry;
pub mod error;
pub mod store;

pub use camera::{CameraDescriptor, CameraId, ParseCameraIdError};
pub use entry::CameraEntry;
pub use error::RegistryError;
pub use store::CameraRegistry;
