use crate::app::LoopSettings;
use crate::camera::check_resize_factor;
use crate::deepface::DeepFaceConfig;
use crate::error::{Error, Result};
use clap::Args;
use std::time::Duration;

/// Analyzer service options shared by every binary.
#[derive(Args, Debug, Clone)]
pub struct AnalyzerArgs {
    /// Base URL of the DeepFace compatible analysis service.
    #[clap(long, default_value = "http://127.0.0.1:5005")]
    pub analyzer_url: String,

    /// Face detector the service should use.
    #[clap(long, default_value = "opencv")]
    pub detector_backend: String,

    /// Fail the analysis when no face is detected.
    #[clap(long)]
    pub enforce_detection: bool,

    /// Request timeout in seconds.
    #[clap(long, default_value_t = 10.0)]
    pub timeout: f64,
}

impl AnalyzerArgs {
    pub fn deepface_config(&self) -> Result<DeepFaceConfig> {
        Ok(DeepFaceConfig {
            url: self.analyzer_url.clone(),
            detector_backend: self.detector_backend.clone(),
            enforce_detection: self.enforce_detection,
            timeout: positive_seconds("timeout", self.timeout)?,
        })
    }
}

/// Realtime overlay options. The defaults reproduce the plain run.
#[derive(Args, Debug, Clone)]
pub struct OverlayArgs {
    /// Camera index.
    #[clap(short, long, default_value_t = 0)]
    pub camera: i32,

    /// Scale applied to frames before analysis, in (0, 1].
    #[clap(long, default_value_t = 0.5)]
    pub resize_factor: f64,

    /// Minimum seconds between analysis calls.
    #[clap(long, default_value_t = 0.8)]
    pub analysis_interval: f64,

    /// Key that closes the preview.
    #[clap(long, default_value_t = 'q')]
    pub quit_key: char,

    /// Preview window title.
    #[clap(long, default_value = "face-insight")]
    pub window: String,
}

impl OverlayArgs {
    pub fn loop_settings(&self) -> Result<LoopSettings> {
        check_resize_factor(self.resize_factor)?;
        let analysis_interval =
            Duration::try_from_secs_f64(self.analysis_interval).map_err(|_| {
                Error::InvalidConfig(format!(
                    "analysis interval must be a non-negative number of seconds, got {}",
                    self.analysis_interval
                ))
            })?;
        Ok(LoopSettings {
            resize_factor: self.resize_factor,
            analysis_interval,
            quit_key: self.quit_key,
        })
    }
}

fn positive_seconds(name: &str, seconds: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(Error::InvalidConfig(format!(
            "{name} must be a positive number of seconds, got {seconds}"
        ))),
    }
}
