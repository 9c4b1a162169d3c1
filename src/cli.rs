use crate::app::Run;
use crate::config::{
    Configuration, MarkerStyle, Mode, DEFAULT_MODEL_PATHNAME, DEFAULT_PARAMS_PATHNAME,
    DEFAULT_THRESHOLD, DEFAULT_WINDOW_TITLE,
};
use crate::error::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

const MODES_HELP: &str = "\
Default mode:
  Perform fitting on the image at <IMAGE-ARGUMENT> and save the results to
  [LANDMARKS-ARGUMENT] if given, otherwise display the results.

List mode:
  Perform fitting on the list of image pathnames contained in <IMAGE-ARGUMENT>.
  If [LANDMARKS-ARGUMENT] is given, it must be a list of the same length
  holding the pathnames the tracked points are written to.

Video mode:
  Perform fitting on the video at <IMAGE-ARGUMENT>. If [LANDMARKS-ARGUMENT] is
  given, it is a printf-style template with one unsigned integer conversion
  (d, i, u, o, x or X, with optional flags, width and precision) taking the
  1-based frame number, for example 'frames/%05d.pts'. Otherwise the
  tracking is displayed.

Exit status: 0 on success, 1 when stopped with the escape key, 2 on failure.";

#[derive(Parser, Debug, Clone)]
#[command(name = "facefit")]
#[command(about = "Fit facial landmarks to an image, a list of images or a video", long_about = None)]
#[command(after_help = MODES_HELP)]
pub struct Args {
    /// Image, list of images, or video to process
    #[arg(value_name = "IMAGE-ARGUMENT")]
    pub input: Option<PathBuf>,

    /// Landmarks pathname, list of pathnames, or per-frame template
    #[arg(value_name = "LANDMARKS-ARGUMENT")]
    pub output: Option<String>,

    /// Switch to list processing mode
    #[arg(long, conflicts_with = "video")]
    pub lists: bool,

    /// Switch to video processing mode
    #[arg(long)]
    pub video: bool,

    /// Seconds to wait when displaying results; 0 waits for a key press.
    /// Defaults to 0 for a single image and 1/30 otherwise
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub wait_time: Option<f64>,

    /// Tracker model pathname
    #[arg(long, value_name = "PATHNAME", default_value = DEFAULT_MODEL_PATHNAME)]
    pub model: PathBuf,

    /// Tracker parameters pathname
    #[arg(long, value_name = "PATHNAME", default_value = DEFAULT_PARAMS_PATHNAME)]
    pub params: PathBuf,

    /// Minimum fit confidence, from 0 to 10 where 10 is extremely picky
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    pub threshold: i32,

    /// Window title
    #[arg(long, default_value = DEFAULT_WINDOW_TITLE)]
    pub title: String,

    /// Display information whilst processing
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.lists {
            Mode::Lists
        } else if self.video {
            Mode::Video
        } else {
            Mode::Image
        }
    }

    /// Builds the run, or `None` when there is no input to process.
    pub fn resolve(self) -> Result<Option<Run>> {
        // clap rejects the pair already; this guards `Args` built by hand
        if self.lists && self.video {
            return Err(Error::config(
                "The switches --lists and --video cannot be used together",
            ));
        }

        let mode = self.mode();
        let input = match self.input {
            Some(input) => input,
            None => return Ok(None),
        };

        let wait_time = match self.wait_time {
            Some(w) if !w.is_finite() || w < 0.0 => {
                return Err(Error::config(format!(
                    "--wait-time must be a non-negative number of seconds, got {}",
                    w
                )))
            }
            Some(w) => w,
            None => mode.default_wait_time(),
        };

        if !(0..=10).contains(&self.threshold) {
            tracing::warn!(
                threshold = self.threshold,
                "threshold is outside the documented range 0..=10"
            );
        }

        let config = Configuration {
            wait_time,
            model_pathname: self.model,
            params_pathname: self.params,
            threshold: self.threshold,
            window_title: self.title,
            verbose: self.verbose,
            marker: MarkerStyle::default(),
        };

        Ok(Some(Run {
            mode,
            config,
            input,
            output: self.output,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("facefit").chain(args.iter().copied()))
    }

    #[test]
    fn image_mode_defaults() {
        let run = parse(&["face.png"]).unwrap().resolve().unwrap().unwrap();

        assert_eq!(run.mode, Mode::Image);
        assert_eq!(run.input, PathBuf::from("face.png"));
        assert_eq!(run.output, None);
        assert_eq!(run.config.wait_time, 0.0);
        assert_eq!(run.config.threshold, 5);
        assert_eq!(run.config.window_title, "CSIRO Face Fit");
        assert!(!run.config.verbose);
    }

    #[test]
    fn batch_modes_default_wait_time() {
        let lists = parse(&["--lists", "in.txt", "out.txt"]).unwrap().resolve().unwrap().unwrap();
        assert_eq!(lists.mode, Mode::Lists);
        assert_eq!(lists.config.wait_time, 1.0 / 30.0);
        assert_eq!(lists.output.as_deref(), Some("out.txt"));

        let video = parse(&["--video", "clip.avi"]).unwrap().resolve().unwrap().unwrap();
        assert_eq!(video.mode, Mode::Video);
        assert_eq!(video.config.wait_time, 1.0 / 30.0);
    }

    #[test]
    fn explicit_options() {
        let run = parse(&[
            "--video",
            "--wait-time",
            "0",
            "--model",
            "m.yaml",
            "--params",
            "p.json",
            "--threshold",
            "7",
            "--title",
            "Fit",
            "--verbose",
            "clip.avi",
            "out/%d.pts",
        ])
        .unwrap()
        .resolve()
        .unwrap()
        .unwrap();

        assert_eq!(run.config.wait_time, 0.0);
        assert_eq!(run.config.model_pathname, PathBuf::from("m.yaml"));
        assert_eq!(run.config.params_pathname, PathBuf::from("p.json"));
        assert_eq!(run.config.threshold, 7);
        assert_eq!(run.config.window_title, "Fit");
        assert!(run.config.verbose);
        assert_eq!(run.output.as_deref(), Some("out/%d.pts"));
    }

    #[test]
    fn lists_and_video_conflict() {
        let err = parse(&["--lists", "--video", "in.txt"]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn conflict_guard_on_hand_built_args() {
        let mut args = parse(&["in.txt"]).unwrap();
        args.lists = true;
        args.video = true;

        assert!(matches!(args.resolve(), Err(Error::Config(_))));
    }

    #[test]
    fn extra_positional_rejected() {
        let err = parse(&["a.png", "b.pts", "c.pts"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unparsable_threshold() {
        let err = parse(&["--threshold", "high", "a.png"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_input_is_not_an_error() {
        assert!(parse(&[]).unwrap().resolve().unwrap().is_none());
        assert!(parse(&["--verbose"]).unwrap().resolve().unwrap().is_none());
    }

    #[test]
    fn help_exits_successfully() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);

        let err = parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn negative_wait_time_rejected() {
        let args = parse(&["--wait-time", "-1", "a.png"]).unwrap();
        assert!(matches!(args.resolve(), Err(Error::Config(_))));
    }
}
