use crate::config::{Configuration, Mode};
use crate::error::Result;
use crate::facemark::{FaceTracker, FaceTrackerParams};
use crate::input::{FrameSource, ImageSource, ListSource, VideoSource};
use crate::output::{self, LandmarkWriter, PtsWriter};
use crate::session::TrackingSession;
use crate::viewer::{Flow, HighguiViewer, Viewer};
use crate::Tracker;
use std::io::Write;
use std::path::PathBuf;

/// How a run ended when nothing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The operator pressed escape in the viewer.
    Cancelled,
}

impl Outcome {
    #[inline]
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::Cancelled => 1,
        }
    }
}

/// Everything needed to start processing.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub mode: Mode,
    pub config: Configuration,
    pub input: PathBuf,
    /// Landmark pathname, list of pathnames, or per-frame template.
    pub output: Option<String>,
}

impl Run {
    pub fn execute(&self) -> Result<Outcome> {
        let cfg = &self.config;

        match self.mode {
            Mode::Image => {
                let source = ImageSource::new(&self.input, self.output.as_ref().map(PathBuf::from));
                execute_with(cfg, source)
            }
            Mode::Lists => {
                let outputs = self.output.as_ref().map(PathBuf::from);
                let source = ListSource::open(self.input.as_path(), outputs.as_deref())?;
                execute_with(cfg, source)
            }
            Mode::Video => {
                let source = VideoSource::open(&self.input, self.output.as_deref())?;
                execute_with(cfg, source)
            }
        }
    }
}

fn execute_with<S: FrameSource>(cfg: &Configuration, source: S) -> Result<Outcome> {
    let params = FaceTrackerParams::load(&cfg.params_pathname)?;
    let tracker = FaceTracker::load(&cfg.model_pathname, &params)?;
    let mut session = TrackingSession::new(tracker, params, cfg.threshold);

    let mut viewer = HighguiViewer::new(cfg);
    let mut writer = PtsWriter;

    process(cfg, source, &mut session, &mut viewer, &mut writer)
}

/// The processing loop shared by every mode.
///
/// Items are pulled one at a time; the first error or an operator
/// cancellation stops the run.
pub fn process<S, T, V, W>(
    cfg: &Configuration,
    mut source: S,
    session: &mut TrackingSession<T>,
    viewer: &mut V,
    writer: &mut W,
) -> Result<Outcome>
where
    S: FrameSource,
    T: Tracker,
    V: Viewer,
    W: LandmarkWriter,
{
    let discipline = source.discipline();
    let mut processed = 0usize;
    let mut progressed = false;

    let outcome = loop {
        let item = match source.next() {
            Some(item) => item?,
            None => break Outcome::Completed,
        };

        if cfg.verbose {
            if let Some(line) = source.progress(item.index) {
                print!("{}\r", line);
                let _ = std::io::stdout().flush();
                progressed = true;
            }
        }

        let fit = session.process(&item.frame, discipline)?;
        tracing::debug!(
            item = item.index,
            score = fit.score,
            accepted = fit.is_accepted(),
            "item processed"
        );
        processed += 1;

        let action = output::dispatch(&item.target, &fit.shape, cfg.verbose);
        if let Some(path) = action.persist {
            writer.save(path, &fit.shape)?;
        }

        if action.display && viewer.show(&item.frame.image, &fit.shape)? == Flow::Cancelled {
            break Outcome::Cancelled;
        }
    };

    if progressed {
        println!();
    }

    tracing::debug!(
        processed,
        resets = session.resets(),
        ?outcome,
        "run finished"
    );

    Ok(outcome)
}
