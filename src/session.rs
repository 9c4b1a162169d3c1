use crate::error::Result;
use crate::frame::Frame;
use crate::shape::Shape;
use crate::Tracker;

/// How consecutive frames relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Unrelated images: detect from scratch every time.
    Fresh,
    /// Frames of one stream: follow the previous fit when there is one.
    Continuity,
}

/// Outcome of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub score: i32,
    /// Empty when the score fell below the threshold.
    pub shape: Shape,
}

impl Fit {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        !self.shape.is_empty()
    }
}

/// The tracker and its parameters for the lifetime of one run.
pub struct TrackingSession<T: Tracker> {
    tracker: T,
    params: T::Params,
    threshold: i32,
    resets: usize,
}

impl<T: Tracker> TrackingSession<T> {
    pub fn new(tracker: T, params: T::Params, threshold: i32) -> Self {
        Self {
            tracker,
            params,
            threshold,
            resets: 0,
        }
    }

    pub fn process(&mut self, frame: &Frame, discipline: Discipline) -> Result<Fit> {
        let gray = frame.gray();
        let score = match discipline {
            Discipline::Fresh => self.tracker.new_frame(gray, &self.params)?,
            Discipline::Continuity => self.tracker.track(gray, &self.params)?,
        };

        if score >= self.threshold {
            let shape = self.tracker.shape();
            tracing::debug!(score, points = shape.len(), "fit accepted");

            Ok(Fit { score, shape })
        } else {
            tracing::debug!(score, threshold = self.threshold, "fit rejected, resetting tracker");
            self.tracker.reset();
            self.resets += 1;

            Ok(Fit {
                score,
                shape: Shape::empty(),
            })
        }
    }

    /// Number of times a rejected fit reset the tracker.
    #[inline]
    pub fn resets(&self) -> usize {
        self.resets
    }

    #[inline]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra as na;
    use opencv::core::{self, Mat};

    #[derive(Default)]
    struct Scripted {
        scores: Vec<i32>,
        calls: Vec<(&'static str, f64)>,
        resets: usize,
    }

    impl Tracker for Scripted {
        type Params = f64;

        fn new_frame(&mut self, _gray: &Mat, params: &f64) -> Result<i32> {
            self.calls.push(("new_frame", *params));
            Ok(self.scores.remove(0))
        }

        fn track(&mut self, _gray: &Mat, params: &f64) -> Result<i32> {
            self.calls.push(("track", *params));
            Ok(self.scores.remove(0))
        }

        fn shape(&self) -> Shape {
            Shape::new(vec![na::Point2::new(1.0, 2.0); 68])
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn frame() -> Frame {
        let image =
            Mat::new_rows_cols_with_default(8, 8, core::CV_8UC1, core::Scalar::all(0.0)).unwrap();
        Frame::new(image).unwrap()
    }

    fn session(scores: Vec<i32>) -> TrackingSession<Scripted> {
        let tracker = Scripted {
            scores,
            ..Default::default()
        };
        TrackingSession::new(tracker, 0.5, 5)
    }

    #[test]
    fn score_at_threshold_is_accepted() {
        let mut s = session(vec![5]);
        let fit = s.process(&frame(), Discipline::Fresh).unwrap();

        assert!(fit.is_accepted());
        assert_eq!(fit.shape.len(), 68);
        assert_eq!(s.resets(), 0);
        assert_eq!(s.tracker().resets, 0);
    }

    #[test]
    fn score_below_threshold_resets() {
        let mut s = session(vec![4]);
        let fit = s.process(&frame(), Discipline::Fresh).unwrap();

        assert_eq!(fit.score, 4);
        assert!(!fit.is_accepted());
        assert_eq!(s.resets(), 1);
        assert_eq!(s.tracker().resets, 1);
    }

    #[test]
    fn discipline_selects_tracker_call() {
        let mut s = session(vec![9, 9, 9]);
        let f = frame();

        s.process(&f, Discipline::Fresh).unwrap();
        s.process(&f, Discipline::Continuity).unwrap();
        s.process(&f, Discipline::Continuity).unwrap();

        assert_eq!(
            s.tracker().calls,
            vec![("new_frame", 0.5), ("track", 0.5), ("track", 0.5)]
        );
    }

    #[test]
    fn recovers_after_reset() {
        let mut s = session(vec![8, 2, 8]);
        let f = frame();

        let results: Vec<bool> = (0..3)
            .map(|_| s.process(&f, Discipline::Continuity).unwrap().is_accepted())
            .collect();

        assert_eq!(results, vec![true, false, true]);
        assert_eq!(s.resets(), 1);
    }
}
