use std::path::PathBuf;

pub const DEFAULT_MODEL_PATHNAME: &str = "models/lbfmodel.yaml";
pub const DEFAULT_PARAMS_PATHNAME: &str = "models/face-tracker.params.json";
pub const DEFAULT_THRESHOLD: i32 = 5;
pub const DEFAULT_WINDOW_TITLE: &str = "CSIRO Face Fit";

/// Wait-time used by list and video modes when none is given.
pub const BATCH_WAIT_TIME: f64 = 1.0 / 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Image,
    Lists,
    Video,
}

impl Mode {
    pub fn default_wait_time(&self) -> f64 {
        match self {
            Mode::Image => 0.0,
            Mode::Lists | Mode::Video => BATCH_WAIT_TIME,
        }
    }
}

/// Marker styling passed straight to `imgproc::circle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: i32,
    pub thickness: i32,
    pub line_type: i32,
    pub shift: i32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 2,
            thickness: 1,
            line_type: opencv::imgproc::LINE_8,
            shift: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Seconds to block after showing a result, `0.0` blocks until a key press.
    pub wait_time: f64,
    pub model_pathname: PathBuf,
    pub params_pathname: PathBuf,
    pub threshold: i32,
    pub window_title: String,
    pub verbose: bool,
    pub marker: MarkerStyle,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            wait_time: 0.0,
            model_pathname: PathBuf::from(DEFAULT_MODEL_PATHNAME),
            params_pathname: PathBuf::from(DEFAULT_PARAMS_PATHNAME),
            threshold: DEFAULT_THRESHOLD,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            verbose: false,
            marker: MarkerStyle::default(),
        }
    }
}

impl Configuration {
    /// Wait-time in the milliseconds `highgui::wait_key` expects.
    pub fn wait_millis(&self) -> i32 {
        if self.wait_time <= 0.0 {
            0
        } else {
            // a positive wait must not round down to the "forever" value
            ((self.wait_time * 1000.0).round() as i32).max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_time_defaults_by_mode() {
        assert_eq!(Mode::Image.default_wait_time(), 0.0);
        assert_eq!(Mode::Lists.default_wait_time(), 1.0 / 30.0);
        assert_eq!(Mode::Video.default_wait_time(), 1.0 / 30.0);
    }

    #[test]
    fn wait_millis() {
        let mut cfg = Configuration::default();
        assert_eq!(cfg.wait_millis(), 0);

        cfg.wait_time = 1.0 / 30.0;
        assert_eq!(cfg.wait_millis(), 33);

        cfg.wait_time = 0.0001;
        assert_eq!(cfg.wait_millis(), 1);
    }
}
