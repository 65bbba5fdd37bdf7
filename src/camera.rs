use crate::analysis::Region;
use crate::error::{Error, Result};
use log::{debug, info};
use opencv::core::{Rect, Size};
use opencv::prelude::*;
use opencv::{imgproc, videoio};

/// Anything that yields frames until it runs dry.
pub trait FrameSource {
    /// `Ok(None)` means the stream ended.
    fn next_frame(&mut self) -> Result<Option<Mat>>;

    fn release(&mut self) -> Result<()>;
}

pub struct CameraSource {
    index: i32,
    capture: videoio::VideoCapture,
    released: bool,
}

impl CameraSource {
    pub fn open(index: i32) -> Result<Self> {
        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)?;
        if !videoio::VideoCapture::is_opened(&capture)? {
            return Err(Error::CameraUnavailable { index });
        }
        info!("Opened camera {}", index);
        Ok(Self {
            index,
            capture,
            released: false,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self.capture.read(&mut frame)?;
        if !grabbed || frame.size()?.width == 0 {
            debug!("Camera {} returned no frame", self.index);
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.capture.release()?;
        info!("Released camera {}", self.index);
        Ok(())
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        _ = self.release();
    }
}

pub fn check_resize_factor(factor: f64) -> Result<()> {
    if !(factor > 0.0 && factor <= 1.0) {
        return Err(Error::InvalidConfig(format!(
            "resize factor must be in (0, 1], got {factor}"
        )));
    }
    Ok(())
}

/// Shrinks a frame by `factor` on both axes.
pub fn downscale(frame: &Mat, factor: f64) -> Result<Mat> {
    check_resize_factor(factor)?;
    let mut small = Mat::default();
    imgproc::resize(
        frame,
        &mut small,
        Size {
            width: 0,
            height: 0,
        },
        factor,
        factor,
        imgproc::INTER_LINEAR,
    )?;
    Ok(small)
}

/// Ratio between the full frame and the copy that was analyzed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub fx: f64,
    pub fy: f64,
}

impl ScaleFactors {
    pub fn between(original: Size, scaled: Size) -> Self {
        Self {
            fx: original.width as f64 / scaled.width.max(1) as f64,
            fy: original.height as f64 / scaled.height.max(1) as f64,
        }
    }

    pub fn of(original: &Mat, scaled: &Mat) -> Result<Self> {
        Ok(Self::between(original.size()?, scaled.size()?))
    }

    /// Maps a region found on the scaled frame back onto the full frame.
    /// Coordinates are truncated toward zero.
    pub fn rescale(&self, region: &Region) -> Rect {
        Rect::new(
            (region.x as f64 * self.fx) as i32,
            (region.y as f64 * self.fy) as i32,
            (region.w as f64 * self.fx) as i32,
            (region.h as f64 * self.fy) as i32,
        )
    }
}
