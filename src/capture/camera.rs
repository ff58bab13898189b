//! Camera stream lifecycle and facing-mode switching.
//!
//! The actual frame pixels are consumed by the face-sensor backend; this
//! module owns the device lifecycle. A [`CameraSession`] holds exactly one
//! live source at a time: switching facing stops the prior source before
//! requesting the opposite one, and a failed acquisition is logged while the
//! previous facing is restored, so the session keeps working on whatever
//! camera it had.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Requested camera orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user.
    #[default]
    User,
    /// Rear camera, facing the environment.
    Environment,
}

impl FacingMode {
    pub fn opposite(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Device-capture configuration for opening a stream.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    pub facing: FacingMode,
    pub width: u32,
    pub height: u32,
}

/// A live capture stream. Dropping a source must release the device.
pub trait FrameSource {
    fn facing(&self) -> FacingMode;

    /// Releases the device. Idempotent.
    fn stop(&mut self);
}

/// Opens capture streams. The seam between the session and the host's
/// camera plumbing.
pub trait CameraProvider {
    fn open(&mut self, request: &CaptureRequest) -> Result<Box<dyn FrameSource>>;
}

/// Owns the single live frame source for an overlay session.
pub struct CameraSession {
    provider: Box<dyn CameraProvider>,
    source: Option<Box<dyn FrameSource>>,
    request: CaptureRequest,
}

impl CameraSession {
    /// Opens the initial stream with the requested facing.
    pub fn open(mut provider: Box<dyn CameraProvider>, request: CaptureRequest) -> Result<Self> {
        let source = provider.open(&request)?;
        tracing::info!(
            "Camera opened: facing={}, {}x{}",
            request.facing,
            request.width,
            request.height
        );
        Ok(Self {
            provider,
            source: Some(source),
            request,
        })
    }

    pub fn facing(&self) -> FacingMode {
        self.request.facing
    }

    /// Switches to the opposite facing mode.
    ///
    /// The prior stream is stopped first. If the opposite facing cannot be
    /// acquired the failure is logged, the previous facing is re-opened, and
    /// the session continues uninterrupted.
    pub fn switch_facing(&mut self) -> Result<()> {
        let previous = self.request;
        self.stop_source();

        let mut attempt = previous;
        attempt.facing = previous.facing.opposite();

        match self.provider.open(&attempt) {
            Ok(source) => {
                tracing::info!("Camera facing switched to {}", attempt.facing);
                self.source = Some(source);
                self.request = attempt;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Camera facing {} unavailable: {e}. Keeping {}.",
                    attempt.facing,
                    previous.facing
                );
                self.source = Some(self.provider.open(&previous)?);
                Ok(())
            }
        }
    }

    /// Tears the session down explicitly, releasing the device.
    pub fn close(&mut self) {
        self.stop_source();
        tracing::debug!("Camera session closed");
    }

    fn stop_source(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop_source();
    }
}

/// Provider used by the overlay demo. Every facing is available and frames
/// are produced by the face-sensor backend, so the source only tracks the
/// device lifecycle.
pub struct DemoCamera;

struct DemoSource {
    facing: FacingMode,
    live: bool,
}

impl FrameSource for DemoSource {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            tracing::debug!("Stopped {} camera source", self.facing);
        }
    }
}

impl CameraProvider for DemoCamera {
    fn open(&mut self, request: &CaptureRequest) -> Result<Box<dyn FrameSource>> {
        Ok(Box::new(DemoSource {
            facing: request.facing,
            live: true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Counts live sources and can refuse a facing, for leak/fallback tests.
    struct CountingProvider {
        live: Rc<RefCell<usize>>,
        unavailable: Option<FacingMode>,
    }

    struct CountedSource {
        facing: FacingMode,
        live: Rc<RefCell<usize>>,
        stopped: bool,
    }

    impl FrameSource for CountedSource {
        fn facing(&self) -> FacingMode {
            self.facing
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                *self.live.borrow_mut() -= 1;
            }
        }
    }

    impl Drop for CountedSource {
        fn drop(&mut self) {
            self.stop();
        }
    }

    impl CameraProvider for CountingProvider {
        fn open(&mut self, request: &CaptureRequest) -> Result<Box<dyn FrameSource>> {
            if self.unavailable == Some(request.facing) {
                return Err(anyhow!("facing {} unavailable", request.facing));
            }
            *self.live.borrow_mut() += 1;
            Ok(Box::new(CountedSource {
                facing: request.facing,
                live: Rc::clone(&self.live),
                stopped: false,
            }))
        }
    }

    fn request() -> CaptureRequest {
        CaptureRequest {
            facing: FacingMode::User,
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn opposite_flips_both_ways() {
        assert_eq!(FacingMode::User.opposite(), FacingMode::Environment);
        assert_eq!(FacingMode::Environment.opposite(), FacingMode::User);
    }

    #[test]
    fn switching_does_not_leak_streams() {
        let live = Rc::new(RefCell::new(0));
        let provider = CountingProvider {
            live: Rc::clone(&live),
            unavailable: None,
        };
        let mut session = CameraSession::open(Box::new(provider), request()).unwrap();
        assert_eq!(*live.borrow(), 1);

        for _ in 0..5 {
            session.switch_facing().unwrap();
            assert_eq!(*live.borrow(), 1);
        }
        assert_eq!(session.facing(), FacingMode::Environment);

        session.close();
        assert_eq!(*live.borrow(), 0);
    }

    #[test]
    fn unavailable_facing_falls_back_to_previous() {
        let live = Rc::new(RefCell::new(0));
        let provider = CountingProvider {
            live: Rc::clone(&live),
            unavailable: Some(FacingMode::Environment),
        };
        let mut session = CameraSession::open(Box::new(provider), request()).unwrap();

        session.switch_facing().unwrap();
        assert_eq!(session.facing(), FacingMode::User);
        assert_eq!(*live.borrow(), 1);
    }

    #[test]
    fn drop_releases_the_device() {
        let live = Rc::new(RefCell::new(0));
        let provider = CountingProvider {
            live: Rc::clone(&live),
            unavailable: None,
        };
        {
            let _session = CameraSession::open(Box::new(provider), request()).unwrap();
            assert_eq!(*live.borrow(), 1);
        }
        assert_eq!(*live.borrow(), 0);
    }
}
