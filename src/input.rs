use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::session::Discipline;
use crate::template::PathTemplate;
use opencv::{core::Mat, prelude::*, videoio};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Where the result of one item goes.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    Display,
    Path(PathBuf),
}

impl OutputTarget {
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputTarget::Display => None,
            OutputTarget::Path(p) => Some(p),
        }
    }
}

pub struct Item {
    /// 1-based position in the source.
    pub index: usize,
    pub frame: Frame,
    pub target: OutputTarget,
}

/// Lazy, finite sequence of items for one run.
pub trait FrameSource: Iterator<Item = Result<Item>> {
    fn discipline(&self) -> Discipline;

    /// Progress line printed in verbose mode before item `index` is processed,
    /// `None` for sources that report no progress.
    fn progress(&self, index: usize) -> Option<String>;
}

/// Reads a newline-delimited list of pathnames, ignoring blank lines.
pub fn read_list<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::resource(format!("Unable to open list '{}': {}", path.display(), e)))?;

    let mut entries = Vec::new();
    for line in std::io::BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);

        if !line.trim().is_empty() {
            entries.push(PathBuf::from(line));
        }
    }

    Ok(entries)
}

pub struct ImageSource {
    path: Option<PathBuf>,
    target: OutputTarget,
}

impl ImageSource {
    pub fn new<P: Into<PathBuf>>(path: P, output: Option<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            target: output.map_or(OutputTarget::Display, OutputTarget::Path),
        }
    }
}

impl Iterator for ImageSource {
    type Item = Result<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.path.take()?;

        Some(Frame::load(&path).map(|frame| Item {
            index: 1,
            frame,
            target: self.target.clone(),
        }))
    }
}

impl FrameSource for ImageSource {
    #[inline]
    fn discipline(&self) -> Discipline {
        Discipline::Fresh
    }

    fn progress(&self, _index: usize) -> Option<String> {
        None
    }
}

pub struct ListSource {
    images: std::vec::IntoIter<PathBuf>,
    outputs: Option<std::vec::IntoIter<PathBuf>>,
    total: usize,
    index: usize,
}

impl ListSource {
    /// Both lists are read and checked before any image is decoded.
    pub fn open<P: AsRef<Path>>(images: P, outputs: Option<P>) -> Result<Self> {
        let image_paths = read_list(images.as_ref())?;

        let outputs = match outputs {
            Some(list) => {
                let output_paths = read_list(list.as_ref())?;
                if output_paths.len() != image_paths.len() {
                    return Err(Error::resource(format!(
                        "Number of pathnames in list '{}' ({}) does not match the number in '{}' ({})",
                        images.as_ref().display(),
                        image_paths.len(),
                        list.as_ref().display(),
                        output_paths.len()
                    )));
                }

                Some(output_paths.into_iter())
            }
            None => None,
        };

        Ok(Self::from_paths(image_paths, outputs))
    }

    fn from_paths(images: Vec<PathBuf>, outputs: Option<std::vec::IntoIter<PathBuf>>) -> Self {
        Self {
            total: images.len(),
            images: images.into_iter(),
            outputs,
            index: 0,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for ListSource {
    type Item = Result<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.images.next()?;
        let target = match self.outputs.as_mut().and_then(|o| o.next()) {
            Some(out) => OutputTarget::Path(out),
            None => OutputTarget::Display,
        };
        self.index += 1;

        Some(Frame::load(&path).map(|frame| Item {
            index: self.index,
            frame,
            target,
        }))
    }
}

impl FrameSource for ListSource {
    #[inline]
    fn discipline(&self) -> Discipline {
        Discipline::Fresh
    }

    fn progress(&self, index: usize) -> Option<String> {
        Some(format!(" Image {}/{}", index, self.total))
    }
}

pub struct VideoSource {
    capture: videoio::VideoCapture,
    template: Option<PathTemplate>,
    frame_number: usize,
    finished: bool,
}

impl VideoSource {
    pub fn open<P: AsRef<Path>>(path: P, template: Option<&str>) -> Result<Self> {
        let template = template.map(PathTemplate::parse).transpose()?;

        let path = path.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| Error::resource(format!("Invalid video pathname {:?}", path)))?;

        let capture = videoio::VideoCapture::from_file(name, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::resource(format!(
                "Unable to open video file '{}'",
                name
            )));
        }

        Ok(Self {
            capture,
            template,
            frame_number: 0,
            finished: false,
        })
    }

    fn target(&self, frame_number: usize) -> OutputTarget {
        match &self.template {
            Some(t) => OutputTarget::Path(PathBuf::from(t.render(frame_number as u64))),
            None => OutputTarget::Display,
        }
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            if let Err(err) = self.capture.release() {
                tracing::warn!("failed to release video capture: {}", err);
            }
        }
    }
}

impl Iterator for VideoSource {
    type Item = Result<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut image = Mat::default();
        match self.capture.read(&mut image) {
            Ok(true) if image.rows() > 0 && image.cols() > 0 => {}
            Ok(_) => {
                tracing::debug!("end of stream after {} frames", self.frame_number);
                self.finish();
                return None;
            }
            Err(err) => {
                tracing::debug!(
                    "frame decoding failed after {} frames: {}",
                    self.frame_number,
                    err
                );
                self.finish();
                return None;
            }
        }

        self.frame_number += 1;
        let index = self.frame_number;

        Some(Frame::new(image).map(|frame| Item {
            index,
            frame,
            target: self.target(index),
        }))
    }
}

impl FrameSource for VideoSource {
    #[inline]
    fn discipline(&self) -> Discipline {
        Discipline::Continuity
    }

    fn progress(&self, index: usize) -> Option<String> {
        Some(format!(" Frame number {}", index))
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_list(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn list_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let list = write_list(dir.path(), "images.txt", &["a.png", "", "b.png\r", "  "]);

        let entries = read_list(&list).unwrap();
        assert_eq!(entries, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
    }

    #[test]
    fn missing_list() {
        let err = read_list("/nonexistent/facefit/list.txt").unwrap_err();
        assert!(matches!(err, Error::Resource(_)));
    }

    #[test]
    fn list_length_mismatch_fails_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        // the image files do not exist, so any decode attempt would fail differently
        let images = write_list(dir.path(), "images.txt", &["1.png", "2.png", "3.png"]);
        let outputs = write_list(dir.path(), "out.txt", &["1.pts", "2.pts"]);

        let err = ListSource::open(&images, Some(&outputs)).err().unwrap();
        match err {
            Error::Resource(msg) => assert!(msg.contains("does not match")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn list_pairs_outputs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let images = write_list(dir.path(), "images.txt", &["1.png", "2.png"]);
        let outputs = write_list(dir.path(), "out.txt", &["1.pts", "2.pts"]);

        let source = ListSource::open(&images, Some(&outputs)).unwrap();
        assert_eq!(source.total(), 2);
        assert_eq!(source.discipline(), Discipline::Fresh);
        assert_eq!(source.progress(2).as_deref(), Some(" Image 2/2"));

        // decoding the missing images surfaces as per-item errors
        let items: Vec<_> = source.collect();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.is_err()));
    }

    #[test]
    fn single_image_reports_no_progress() {
        let source = ImageSource::new("face.png", None);

        assert_eq!(source.discipline(), Discipline::Fresh);
        assert_eq!(source.progress(1), None);
    }

    #[test]
    fn video_template_checked_before_open() {
        let err = VideoSource::open("/nonexistent/facefit/video.avi", Some("no-conversion.pts"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unopenable_video() {
        let err = VideoSource::open("/nonexistent/facefit/video.avi", None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Resource(_) | Error::OpenCv(_)));
    }

    #[test]
    fn output_target_path() {
        assert_eq!(OutputTarget::Display.path(), None);
        assert_eq!(
            OutputTarget::Path(PathBuf::from("a.pts")).path(),
            Some(Path::new("a.pts"))
        );
    }
}
