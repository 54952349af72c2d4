//! Operator side of the scan-to-record workflow.
//!
//! [`AppContext`] owns the signed-in session and hands out a [`HttpBackend`];
//! [`CaptureController`] drives one capture session on top of any [`Backend`].

pub mod backend;
pub mod cache;
pub mod capture;
pub mod context;
pub mod error;
pub mod events;
pub mod resolver;
pub mod scanner;

pub use backend::{Backend, HttpBackend};
pub use cache::{CachedReading, LatestReadingCache};
pub use capture::{
    CaptureController, CaptureMachine, CaptureState, ReadingDraft, ScanOutcome, SubmittedRecord,
};
pub use context::{AppContext, Session};
pub use error::{CameraError, ClientError, Result};
pub use events::ChangeSubscription;
pub use resolver::IdentifierResolver;
pub use scanner::{CameraFacing, ScanConstraints, ScanDevice, ScannerGuard, scan_once};

#[cfg(test)]
pub(crate) mod tests;
