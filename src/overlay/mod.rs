//! Face overlay demo: session, frame loop, and terminal renderer.

pub mod frame_loop;
pub mod session;
pub mod ui;

pub use frame_loop::{FaceReadout, OverlayFrame, OverlayLoop};
pub use session::OverlaySession;
pub use ui::{OverlayCommand, OverlayTui};
