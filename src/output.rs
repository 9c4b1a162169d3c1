use crate::error::{Error, Result};
use crate::input::OutputTarget;
use crate::shape::{self, Shape};
use std::path::Path;

/// What to do with the result of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action<'a> {
    pub persist: Option<&'a Path>,
    pub display: bool,
}

impl Action<'_> {
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.persist.is_none() && !self.display
    }
}

/// Routing table shared by every mode:
///
/// | target  | shape     | action                          |
/// |---------|-----------|---------------------------------|
/// | display | any       | display                         |
/// | path    | non-empty | persist, display when verbose   |
/// | path    | empty     | display when verbose            |
pub fn dispatch<'a>(target: &'a OutputTarget, shape: &Shape, verbose: bool) -> Action<'a> {
    match target.path() {
        None => Action {
            persist: None,
            display: true,
        },
        Some(path) if !shape.is_empty() => Action {
            persist: Some(path),
            display: verbose,
        },
        Some(_) => Action {
            persist: None,
            display: verbose,
        },
    }
}

pub trait LandmarkWriter {
    fn save(&mut self, path: &Path, shape: &Shape) -> Result<()>;
}

/// Writes IBUG `.pts` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PtsWriter;

impl LandmarkWriter for PtsWriter {
    fn save(&mut self, path: &Path, shape: &Shape) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| {
            Error::resource(format!(
                "Unable to write landmarks to '{}': {}",
                path.display(),
                e
            ))
        })?;

        shape::write_pts(std::io::BufWriter::new(file), shape)?;
        tracing::debug!(path = %path.display(), points = shape.len(), "landmarks saved");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra as na;
    use std::path::PathBuf;

    fn some_shape() -> Shape {
        Shape::new(vec![na::Point2::new(4.0, 5.0), na::Point2::new(6.0, 7.0)])
    }

    #[test]
    fn display_only_target_always_displays() {
        let target = OutputTarget::Display;

        for verbose in [false, true] {
            for shape in [Shape::empty(), some_shape()] {
                let action = dispatch(&target, &shape, verbose);
                assert_eq!(
                    action,
                    Action {
                        persist: None,
                        display: true
                    }
                );
            }
        }
    }

    #[test]
    fn path_target_with_shape_persists() {
        let target = OutputTarget::Path(PathBuf::from("out.pts"));

        let quiet = dispatch(&target, &some_shape(), false);
        assert_eq!(quiet.persist, Some(Path::new("out.pts")));
        assert!(!quiet.display);

        let verbose = dispatch(&target, &some_shape(), true);
        assert_eq!(verbose.persist, Some(Path::new("out.pts")));
        assert!(verbose.display);
    }

    #[test]
    fn empty_shape_is_never_persisted() {
        let target = OutputTarget::Path(PathBuf::from("out.pts"));

        assert!(dispatch(&target, &Shape::empty(), false).is_noop());

        let verbose = dispatch(&target, &Shape::empty(), true);
        assert_eq!(verbose.persist, None);
        assert!(verbose.display);
    }

    #[test]
    fn pts_writer_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.pts");

        PtsWriter.save(&path, &some_shape()).unwrap();

        let file = std::io::BufReader::new(std::fs::File::open(&path).unwrap());
        assert_eq!(shape::read_pts(file).unwrap(), some_shape());
    }

    #[test]
    fn pts_writer_unwritable_path() {
        let err = PtsWriter
            .save(Path::new("/nonexistent/facefit/face.pts"), &some_shape())
            .unwrap_err();
        assert!(matches!(err, Error::Resource(_)));
    }
}
