//! Webcam preview with periodic face age, gender and emotion overlays.
//!
//! Frames are downscaled before being sent to the analyzer, so regions it
//! returns are rescaled onto the full frame before drawing.

pub mod analysis;
pub mod app;
pub mod camera;
pub mod config;
pub mod deepface;
pub mod display;
pub mod error;
pub mod interrupt;
pub mod overlay;
pub mod throttle;

pub use analysis::{Action, FaceAnalysis, FaceAnalyzer, Region, OVERLAY_ACTIONS};
pub use app::{ExitReason, LoopSettings, OverlayLoop, RunSummary};
pub use camera::{downscale, CameraSource, FrameSource, ScaleFactors};
pub use deepface::{DeepFaceClient, DeepFaceConfig};
pub use display::{Display, HighguiWindow};
pub use error::{AnalysisError, Error};
pub use interrupt::{install_ctrl_c, StopFlag};
