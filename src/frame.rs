use crate::error::{Error, Result};
use opencv::{
    core::{self, Mat},
    imgcodecs, imgproc,
    prelude::*,
};
use std::path::Path;

/// A decoded image together with the single-channel form handed to the tracker.
pub struct Frame {
    pub image: Mat,
    converted: Option<Mat>,
}

impl Frame {
    pub fn new(image: Mat) -> Result<Self> {
        let converted = to_grayscale(&image)?;

        Ok(Self { image, converted })
    }

    /// Decodes the image at `path`, keeping colour when the file has it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| Error::resource(format!("Invalid image pathname {:?}", path)))?;

        let image = imgcodecs::imread(name, imgcodecs::IMREAD_ANYCOLOR)?;
        if image.empty() {
            return Err(Error::resource(format!("Unable to load image '{}'", name)));
        }

        Self::new(image)
    }

    #[inline]
    pub fn gray(&self) -> &Mat {
        self.converted.as_ref().unwrap_or(&self.image)
    }
}

/// Grayscale conversion policy.
///
/// BGR input is converted, 8-bit single-channel input needs no conversion and
/// yields `None`, anything else is rejected.
pub fn to_grayscale(image: &Mat) -> Result<Option<Mat>> {
    let typ = image.typ();

    if typ == core::CV_8UC3 {
        let mut gray = Mat::default();
        imgproc::cvt_color(
            image,
            &mut gray,
            imgproc::COLOR_BGR2GRAY,
            0,
            core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )?;

        Ok(Some(gray))
    } else if typ == core::CV_8UC1 {
        Ok(None)
    } else {
        Err(Error::resource(format!(
            "Do not know how to convert an image with {} channel(s) of depth {} to grayscale",
            image.channels(),
            image.depth()
        )))
    }
}
