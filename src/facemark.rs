use crate::bbox::BBox;
use crate::error::{Error, Result};
use crate::shape::Shape;
use crate::Tracker;
use nalgebra as na;
use opencv::{
    core::{self, Mat, Point2f, Rect, Size, Vector},
    face, objdetect,
    prelude::*,
};
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fitting parameters, read from a JSON file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FaceTrackerParams {
    /// Haar/LBP cascade used to find the face; relative paths are resolved
    /// against the directory of the params file.
    pub detector: PathBuf,
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub min_face_size: i32,
    /// Growth of the previous face box, per side and relative to its size,
    /// when searching the next frame of a stream.
    pub search_margin: f32,
    pub max_score: i32,
}

impl Default for FaceTrackerParams {
    fn default() -> Self {
        Self {
            detector: PathBuf::from("haarcascade_frontalface_alt2.xml"),
            scale_factor: 1.1,
            min_neighbors: 2,
            min_face_size: 30,
            search_margin: 0.5,
            max_score: 10,
        }
    }
}

impl FaceTrackerParams {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::resource(format!(
                "Unable to read tracker params '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut params: Self = serde_json::from_str(&text)?;
        if params.detector.is_relative() {
            if let Some(dir) = path.parent() {
                params.detector = dir.join(&params.detector);
            }
        }

        params.validate()?;
        tracing::info!(path = %path.display(), "tracker params loaded");

        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale_factor > 1.0) {
            return Err(Error::config(format!(
                "scale_factor must be greater than 1, got {}",
                self.scale_factor
            )));
        }

        if self.min_neighbors < 0 || self.min_face_size < 0 || self.max_score < 0 {
            return Err(Error::config(
                "min_neighbors, min_face_size and max_score must not be negative",
            ));
        }

        if !(self.search_margin >= 0.0) {
            return Err(Error::config(format!(
                "search_margin must not be negative, got {}",
                self.search_margin
            )));
        }

        Ok(())
    }
}

/// A detected face and its detector score.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    rect: Rect,
    score: i32,
}

/// Picks the largest box; its neighbour count, capped at `max_score`, is the score.
fn best_candidate(rects: &[Rect], neighbours: &[i32], max_score: i32) -> Option<Candidate> {
    rects
        .iter()
        .zip(neighbours.iter())
        .max_by_key(|(r, _)| r.width * r.height)
        .map(|(&rect, &n)| Candidate {
            rect,
            score: n.clamp(0, max_score),
        })
}

/// Landmark tracker built from an OpenCV cascade detector and a Facemark LBF model.
pub struct FaceTracker {
    facemark: core::Ptr<face::Facemark>,
    detector: objdetect::CascadeClassifier,
    shape: Shape,
}

impl FaceTracker {
    pub fn load<P: AsRef<Path>>(model: P, params: &FaceTrackerParams) -> Result<Self> {
        let model = model.as_ref();
        let model_name = model
            .to_str()
            .ok_or_else(|| Error::resource(format!("Invalid model pathname {:?}", model)))?;
        if !model.is_file() {
            return Err(Error::resource(format!(
                "Unable to open tracker model '{}'",
                model_name
            )));
        }

        let detector_name = params.detector.to_str().ok_or_else(|| {
            Error::resource(format!("Invalid detector pathname {:?}", params.detector))
        })?;
        if !params.detector.is_file() {
            return Err(Error::resource(format!(
                "Unable to open face detector '{}'",
                detector_name
            )));
        }

        let detector = objdetect::CascadeClassifier::new(detector_name)?;
        if detector.empty()? {
            return Err(Error::resource(format!(
                "Unable to load face detector '{}'",
                detector_name
            )));
        }

        let mut facemark = face::create_facemark_lbf()?;
        facemark.load_model(model_name)?;
        tracing::info!(model = model_name, detector = detector_name, "tracker loaded");

        Ok(Self {
            facemark,
            detector,
            shape: Shape::empty(),
        })
    }

    fn detect(&mut self, gray: &Mat, params: &FaceTrackerParams) -> Result<Option<Candidate>> {
        let mut rects = Vector::<Rect>::new();
        let mut neighbours = Vector::<i32>::new();
        let min_size = Size::new(params.min_face_size, params.min_face_size);

        self.detector.detect_multi_scale2(
            gray,
            &mut rects,
            &mut neighbours,
            params.scale_factor,
            params.min_neighbors,
            0,
            min_size,
            Size::default(),
        )?;

        Ok(best_candidate(
            &rects.to_vec(),
            &neighbours.to_vec(),
            params.max_score,
        ))
    }

    /// Searches only the neighbourhood of the last fitted shape.
    fn detect_near(
        &mut self,
        gray: &Mat,
        previous: &Shape,
        params: &FaceTrackerParams,
    ) -> Result<Option<Candidate>> {
        let window = match BBox::around(previous)
            .and_then(|b| b.grow(params.search_margin).clamp(gray.cols(), gray.rows()))
        {
            Some(w) => w.as_ltwh().to_rect(),
            None => return Ok(None),
        };

        let roi = Mat::roi(gray, window)?.try_clone()?;
        let found = self.detect(&roi, params)?;

        Ok(found.map(|c| Candidate {
            rect: Rect::new(
                c.rect.x + window.x,
                c.rect.y + window.y,
                c.rect.width,
                c.rect.height,
            ),
            score: c.score,
        }))
    }

    fn fit(&mut self, gray: &Mat, face: Rect) -> Result<Option<Shape>> {
        let mut faces = Vector::<Rect>::new();
        faces.push(face);
        let mut landmarks = Vector::<Vector<Point2f>>::new();

        if !self.facemark.fit(gray, &faces, &mut landmarks)? || landmarks.is_empty() {
            return Ok(None);
        }

        let points = landmarks.get(0)?;
        if points.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            points
                .iter()
                .map(|p| na::Point2::new(p.x as f64, p.y as f64))
                .collect(),
        ))
    }

    fn fit_candidate(&mut self, gray: &Mat, candidate: Option<Candidate>) -> Result<i32> {
        let candidate = match candidate {
            Some(c) => c,
            None => {
                self.shape = Shape::empty();
                return Ok(0);
            }
        };

        tracing::trace!(
            rect = ?candidate.rect,
            score = candidate.score,
            "face candidate"
        );

        match self.fit(gray, candidate.rect)? {
            Some(shape) => {
                self.shape = shape;
                Ok(candidate.score)
            }
            None => {
                self.shape = Shape::empty();
                Ok(0)
            }
        }
    }
}

impl Tracker for FaceTracker {
    type Params = FaceTrackerParams;

    fn new_frame(&mut self, gray: &Mat, params: &FaceTrackerParams) -> Result<i32> {
        let candidate = self.detect(gray, params)?;

        self.fit_candidate(gray, candidate)
    }

    fn track(&mut self, gray: &Mat, params: &FaceTrackerParams) -> Result<i32> {
        if self.shape.is_empty() {
            return self.new_frame(gray, params);
        }

        let previous = std::mem::take(&mut self.shape);
        let candidate = match self.detect_near(gray, &previous, params)? {
            Some(c) => Some(c),
            None => self.detect(gray, params)?,
        };

        self.fit_candidate(gray, candidate)
    }

    fn shape(&self) -> Shape {
        self.shape.clone()
    }

    fn reset(&mut self) {
        self.shape = Shape::empty();
    }
}
