use crate::config::{Configuration, MarkerStyle};
use crate::error::Result;
use crate::shape::Shape;
use opencv::{
    core::{self, Mat},
    highgui, imgproc,
    prelude::*,
};

pub const ESCAPE_KEY: i32 = 27;

/// Whether the run continues after an interactive pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Cancelled,
}

pub trait Viewer {
    /// Shows `image` with `shape` drawn over it and waits for the operator.
    fn show(&mut self, image: &Mat, shape: &Shape) -> Result<Flow>;
}

/// Marker colour for the pixel layout of `image`: red on colour, white otherwise.
pub fn marker_colour(image: &Mat) -> core::Scalar {
    if image.typ() == core::CV_8UC3 {
        core::Scalar::new(0.0, 0.0, 255.0, 0.0)
    } else {
        core::Scalar::all(255.0)
    }
}

/// Fixed-point centre for `imgproc::circle` with `shift` fractional bits.
#[inline]
pub fn marker_centre(x: f64, y: f64, shift: i32) -> core::Point {
    let scale = f64::from(1 << shift.clamp(0, 16));

    core::Point::new((x * scale).round() as i32, (y * scale).round() as i32)
}

/// Copy of `image` with a circle at every landmark.
pub fn draw_markers(image: &Mat, shape: &Shape, style: &MarkerStyle) -> Result<Mat> {
    let mut canvas = image.try_clone()?;
    let colour = marker_colour(image);

    for p in shape.iter() {
        imgproc::circle(
            &mut canvas,
            marker_centre(p.x, p.y, style.shift),
            style.radius,
            colour,
            style.thickness,
            style.line_type,
            style.shift,
        )?;
    }

    Ok(canvas)
}

/// OpenCV window that blocks on `highgui::wait_key`.
pub struct HighguiViewer {
    title: String,
    wait_millis: i32,
    marker: MarkerStyle,
}

impl HighguiViewer {
    pub fn new(cfg: &Configuration) -> Self {
        Self {
            title: cfg.window_title.clone(),
            wait_millis: cfg.wait_millis(),
            marker: cfg.marker,
        }
    }
}

impl Viewer for HighguiViewer {
    fn show(&mut self, image: &Mat, shape: &Shape) -> Result<Flow> {
        let canvas = draw_markers(image, shape, &self.marker)?;
        highgui::imshow(&self.title, &canvas)?;

        if self.wait_millis == 0 {
            println!("Press any key to continue.");
        }

        let key = highgui::wait_key(self.wait_millis)?;
        if key >= 0 && key & 0xff == ESCAPE_KEY {
            Ok(Flow::Cancelled)
        } else {
            Ok(Flow::Continue)
        }
    }
}

impl Drop for HighguiViewer {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}
