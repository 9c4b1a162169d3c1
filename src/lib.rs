//! Landmark fitting over single images, image lists and video streams.
//!
//! A run resolves a [`Configuration`], builds a [`TrackingSession`] around a
//! [`Tracker`], and feeds it the items of a [`FrameSource`]. Every result is
//! routed by [`output::dispatch`] to a landmark file, to the interactive
//! [`Viewer`], or to both.

pub mod app;
pub mod bbox;
pub mod cli;
pub mod config;
pub mod error;
pub mod facemark;
pub mod frame;
pub mod input;
pub mod output;
pub mod session;
pub mod shape;
pub mod template;
pub mod viewer;

pub use app::{Outcome, Run};
pub use config::{Configuration, MarkerStyle, Mode};
pub use error::{Error, Result};
pub use facemark::{FaceTracker, FaceTrackerParams};
pub use frame::Frame;
pub use input::{FrameSource, Item, OutputTarget};
pub use session::{Discipline, Fit, TrackingSession};
pub use shape::Shape;
pub use viewer::{Flow, Viewer};

use opencv::core::Mat;

/// A landmark fitter driven one grayscale frame at a time.
///
/// Both calls return a confidence score; the fitted shape is read back with
/// [`Tracker::shape`] when the score is good enough.
pub trait Tracker {
    type Params;

    /// Detects from scratch, ignoring anything seen before.
    fn new_frame(&mut self, gray: &Mat, params: &Self::Params) -> Result<i32>;

    /// Follows the previous fit when there is one.
    fn track(&mut self, gray: &Mat, params: &Self::Params) -> Result<i32>;

    fn shape(&self) -> Shape;

    /// Drops any state carried over from earlier frames.
    fn reset(&mut self);
}
