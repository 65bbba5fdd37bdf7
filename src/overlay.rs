use crate::analysis::FaceAnalysis;
use crate::camera::ScaleFactors;
use crate::error::Result;
use opencv::core::{Point, Rect};
use opencv::imgproc;
use opencv::prelude::*;
use std::time::Instant;

pub const FACE_BOX_COLOR: (i32, i32, i32) = (30, 144, 255);
const FACE_BOX_THICKNESS: i32 = 2;
const LABEL_BACKGROUND: (i32, i32, i32) = (0, 0, 0);
const LABEL_TEXT: (i32, i32, i32) = (255, 255, 255);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle {
    pub font_scale: f64,
    pub thickness: i32,
    pub padding: i32,
}

impl LabelStyle {
    pub const FACE: LabelStyle = LabelStyle {
        font_scale: 0.6,
        thickness: 1,
        padding: 6,
    };

    pub const FOOTER: LabelStyle = LabelStyle {
        font_scale: 0.5,
        thickness: 1,
        padding: 8,
    };
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self::FACE
    }
}

/// Text on a filled black panel. `origin` is the text baseline start.
pub fn draw_label(img: &mut Mat, text: &str, origin: Point, style: LabelStyle) -> Result<()> {
    let mut baseline = 0;
    let size = imgproc::get_text_size(
        text,
        imgproc::FONT_HERSHEY_SIMPLEX,
        style.font_scale,
        style.thickness,
        &mut baseline,
    )?;

    imgproc::rectangle_points(
        img,
        Point::new(
            origin.x - style.padding,
            origin.y - style.padding - size.height,
        ),
        Point::new(
            origin.x + size.width + style.padding,
            origin.y + style.padding,
        ),
        LABEL_BACKGROUND.into(),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        img,
        text,
        origin,
        imgproc::FONT_HERSHEY_SIMPLEX,
        style.font_scale,
        LABEL_TEXT.into(),
        style.thickness,
        imgproc::LINE_AA,
        false,
    )?;
    Ok(())
}

/// Box plus labels for one face. Returns the drawn box, or `None` when the
/// analysis carried no region.
pub fn draw_face(
    img: &mut Mat,
    analysis: &FaceAnalysis,
    scale: ScaleFactors,
) -> Result<Option<Rect>> {
    let Some(region) = &analysis.region else {
        return Ok(None);
    };
    let face = scale.rescale(region);

    imgproc::rectangle(
        img,
        face,
        FACE_BOX_COLOR.into(),
        FACE_BOX_THICKNESS,
        imgproc::LINE_8,
        0,
    )?;

    let identity = format!("{} | {}", analysis.gender_label(), analysis.age_label());
    draw_label(
        img,
        &identity,
        Point::new(face.x, face.y - 10),
        LabelStyle::FACE,
    )?;
    draw_label(
        img,
        analysis.emotion_label(),
        Point::new(face.x, face.y + face.height + 25),
        LabelStyle::FACE,
    )?;

    Ok(Some(face))
}

pub fn footer_text(fps: f64, quit_key: char) -> String {
    format!("face-insight - Press '{quit_key}' to quit | FPS: {fps:.1}")
}

pub fn draw_footer(img: &mut Mat, fps: f64, quit_key: char) -> Result<()> {
    let origin = Point::new(10, img.rows() - 10);
    draw_label(img, &footer_text(fps, quit_key), origin, LabelStyle::FOOTER)
}

/// Instantaneous frame rate from the gap between consecutive ticks.
#[derive(Clone, Debug)]
pub struct FpsCounter {
    last: Instant,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    pub fn tick(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = now;
        1.0 / elapsed.max(1e-6)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Region;
    use approx::assert_relative_eq;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};
    use std::time::Duration;

    fn blank() -> Mat {
        Mat::new_rows_cols_with_default(240, 320, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    fn total_intensity(img: &Mat) -> f64 {
        let sum = opencv::core::sum_elems(img).unwrap();
        sum.0.iter().sum()
    }

    fn analysis_with_region() -> FaceAnalysis {
        FaceAnalysis {
            age: Some(29.0),
            gender: Some("Man".to_owned()),
            dominant_emotion: Some("neutral".to_owned()),
            region: Some(Region {
                x: 20,
                y: 30,
                w: 40,
                h: 40,
            }),
            face_confidence: Some(0.9),
        }
    }

    #[test]
    fn test_draw_label_writes_text() {
        let mut img = blank();
        draw_label(&mut img, "happy", Point::new(50, 50), LabelStyle::FACE).unwrap();
        assert!(total_intensity(&img) > 0.0);
    }

    #[test]
    fn test_draw_label_background_is_black() {
        let mut img =
            Mat::new_rows_cols_with_default(100, 200, CV_8UC3, Scalar::all(90.0)).unwrap();
        draw_label(&mut img, "x", Point::new(50, 50), LabelStyle::FACE).unwrap();
        // inside the padding, left of the text
        let pixel = img.at_2d::<Vec3b>(50, 46).unwrap();
        assert_eq!(pixel.0, [0, 0, 0]);
    }

    #[test]
    fn test_draw_face_without_region_draws_nothing() {
        let mut img = blank();
        let analysis = FaceAnalysis {
            region: None,
            ..analysis_with_region()
        };
        let drawn = draw_face(&mut img, &analysis, ScaleFactors { fx: 2.0, fy: 2.0 }).unwrap();
        assert!(drawn.is_none());
        assert_relative_eq!(total_intensity(&img), 0.0);
    }

    #[test]
    fn test_draw_face_box_is_rescaled() {
        let mut img = blank();
        let drawn = draw_face(
            &mut img,
            &analysis_with_region(),
            ScaleFactors { fx: 2.0, fy: 2.0 },
        )
        .unwrap();
        assert_eq!(drawn, Some(Rect::new(40, 60, 80, 80)));
        // middle of the left edge
        let pixel = img.at_2d::<Vec3b>(100, 40).unwrap();
        assert_eq!(pixel.0, [30, 144, 255]);
    }

    #[test]
    fn test_footer_text_format() {
        assert_eq!(
            footer_text(29.97, 'q'),
            "face-insight - Press 'q' to quit | FPS: 30.0"
        );
    }

    #[test]
    fn test_draw_footer_near_bottom() {
        let mut img =
            Mat::new_rows_cols_with_default(240, 320, CV_8UC3, Scalar::all(90.0)).unwrap();
        draw_footer(&mut img, 12.0, 'q').unwrap();
        // panel padding at the bottom left corner
        assert_eq!(img.at_2d::<Vec3b>(236, 4).unwrap().0, [0, 0, 0]);
        assert_eq!(img.at_2d::<Vec3b>(10, 10).unwrap().0, [90, 90, 90]);
    }

    #[test]
    fn test_fps_counter() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        assert_relative_eq!(fps.tick(start + Duration::from_millis(50)), 20.0, epsilon = 1e-9);
        assert_relative_eq!(fps.tick(start + Duration::from_millis(150)), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fps_counter_caps_zero_gap() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        assert_relative_eq!(fps.tick(start), 1e6, epsilon = 1e-3);
    }
}
