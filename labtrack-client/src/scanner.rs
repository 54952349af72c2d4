//! Camera scanning as a scoped resource.
//!
//! A [`ScanDevice`] is only ever driven through a [`ScannerGuard`], which stops the
//! device when it is dropped: after a decode, on error, on timeout, or when the view
//! owning it goes away.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{CameraError, ClientError, Result};

const DECODED_BUFFER: usize = 8;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    /// Rear camera, pointed at the asset label.
    #[default]
    Environment,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConstraints {
    pub facing: CameraFacing,
    pub fps: u32,
    /// Side of the square decode region relative to the shorter viewfinder edge.
    pub scan_box_ratio: f32,
}

impl Default for ScanConstraints {
    fn default() -> Self {
        Self {
            facing: CameraFacing::Environment,
            fps: 10,
            scan_box_ratio: 0.7,
        }
    }
}

impl ScanConstraints {
    /// Decode region side in pixels for a viewfinder of the given size.
    pub fn scan_box(&self, width: u32, height: u32) -> u32 {
        (width.min(height) as f32 * self.scan_box_ratio.clamp(0.0, 1.0)).round() as u32
    }
}

/// Platform camera plus decoder.
///
/// Frames that fail to decode are dropped by the device; only decoded payloads are sent.
/// `stop` must be safe to call on a device that is not running.
pub trait ScanDevice: Send {
    fn start(
        &mut self,
        constraints: &ScanConstraints,
        decoded: mpsc::Sender<String>,
    ) -> std::result::Result<(), CameraError>;

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    fn torch_supported(&self) -> bool {
        false
    }

    fn set_torch(&mut self, _on: bool) -> std::result::Result<(), CameraError> {
        Err(CameraError::Unsupported)
    }
}

/// A running scan session. Dropping it releases the camera.
pub struct ScannerGuard<'a, D: ScanDevice + ?Sized> {
    device: &'a mut D,
    decoded: mpsc::Receiver<String>,
}

impl<'a, D: ScanDevice + ?Sized> ScannerGuard<'a, D> {
    pub fn start(
        device: &'a mut D,
        constraints: &ScanConstraints,
    ) -> std::result::Result<Self, CameraError> {
        let (sender, decoded) = mpsc::channel(DECODED_BUFFER);

        if let Err(e) = device.start(constraints, sender) {
            log::warn!("camera failed to start: {e}");
            device.stop();
            return Err(e);
        }

        log::debug!("camera started at {} fps", constraints.fps);
        Ok(Self { device, decoded })
    }

    /// Next non-blank decoded payload, trimmed. `None` once the device stops sending.
    pub async fn next_code(&mut self) -> Option<String> {
        while let Some(payload) = self.decoded.recv().await {
            let code = payload.trim();
            if !code.is_empty() {
                return Some(code.to_string());
            }
        }
        None
    }

    pub fn torch_supported(&self) -> bool {
        self.device.torch_supported()
    }

    pub fn set_torch(&mut self, on: bool) -> std::result::Result<(), CameraError> {
        if !self.device.torch_supported() {
            return Err(CameraError::Unsupported);
        }
        self.device.set_torch(on)
    }

    pub fn stop(self) {}
}

impl<D: ScanDevice + ?Sized> Drop for ScannerGuard<'_, D> {
    fn drop(&mut self) {
        self.decoded.close();
        if self.device.is_running() {
            self.device.stop();
            log::debug!("camera released");
        }
    }
}

/// Scans until one code is decoded or `timeout` passes, releasing the camera either way.
pub async fn scan_once<D: ScanDevice + ?Sized>(
    device: &mut D,
    constraints: &ScanConstraints,
    timeout: Duration,
) -> Result<String> {
    let mut guard = ScannerGuard::start(device, constraints)?;

    match tokio::time::timeout(timeout, guard.next_code()).await {
        Ok(Some(code)) => Ok(code),
        Ok(None) => Err(CameraError::Failed(String::from("camera stopped unexpectedly")).into()),
        Err(_) => Err(ClientError::Transient(String::from("no code decoded in time"))),
    }
}
