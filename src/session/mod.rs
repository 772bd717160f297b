//! Viewer session state
//!
//! One [`StreamSession`] exists per connected viewer, for as long as that
//! viewer's stream is alive.

pub mod state;

pub use state::StreamSession;
