pub mod canvas;
pub mod capture;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod sync;

// Re-export commonly used types and functions
pub use canvas::Viewport;
pub use capture::{CaptureSession, DrawMode, TapOutcome};
pub use config::Config;
pub use error::{GatewayError, StorageError, SyncError, ValidationError};
pub use models::{Markup, PhotoRef, Pin};
pub use storage::OfflineQueue;
pub use sync::{ConnectivityProbe, Gateway, SyncEngine};
