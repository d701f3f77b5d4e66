//! Batch controller: drives a list of images through an edit session.
//!
//! For every image the controller loads the pixels, opens the session and
//! then runs the tick loop: present the current frame, poll one event and
//! apply it. The image is finalized only on [`Action::NextImage`]; its
//! rendered copy is written to the output directory and its record appended
//! to the outcome. [`Action::Terminate`] stops the run and keeps every record
//! finalized so far.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::error::EditError;
use crate::format::{
    self, FormatError, ImageRecord, display_name_for, load_image, output_path_for, save_image,
};
use crate::input::{EventSource, InputEvent, PointerEvent, Poll};
use crate::keybindings::Action;
use crate::model::{Annotation, Color};
use crate::render::Renderer;
use crate::session::EditSession;
use crate::undo::UndoConfig;

/// Default time the controller waits for an event on each tick, in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 10;

/// Default time the controller waits for an event on each tick.
pub const DEFAULT_TICK: Duration = Duration::from_millis(DEFAULT_TICK_MS);

/// Errors that abort a batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Reading or writing the metadata file or output directory failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The session rejected a lifecycle step the controller relies on
    #[error("Session error: {0}")]
    Session(#[from] EditError),
}

/// Settings for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Longest wait for an event on each tick
    pub tick: Duration,
    /// Undo history settings for every opened image
    pub undo: UndoConfig,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            undo: UndoConfig::default(),
        }
    }
}

/// An image that could not be loaded or written.
#[derive(Debug)]
pub struct ImageFailure {
    /// The input image
    pub path: PathBuf,
    /// What went wrong
    pub error: FormatError,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// One record per finalized image, in input order
    pub records: Vec<ImageRecord>,
    /// Rendered files that were written
    pub rendered: Vec<PathBuf>,
    /// Images skipped on load or whose rendered copy could not be written
    pub failures: Vec<ImageFailure>,
    /// Whether the run stopped before the last image
    pub terminated: bool,
}

impl BatchOutcome {
    fn fail(&mut self, path: &Path, error: FormatError) {
        log::warn!("{:?}: {}", path, error);
        self.failures.push(ImageFailure {
            path: path.to_path_buf(),
            error,
        });
    }
}

/// How editing of the current image ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Finish,
    Terminate,
}

/// Drives images through an [`EditSession`], one at a time.
pub struct BatchController<R: Renderer, S: EventSource> {
    renderer: R,
    source: S,
    options: BatchOptions,
}

impl<R: Renderer, S: EventSource> BatchController<R, S> {
    /// Create a controller presenting frames to `renderer` and reading events
    /// from `source`.
    pub fn new(renderer: R, source: S, options: BatchOptions) -> Self {
        Self {
            renderer,
            source,
            options,
        }
    }

    /// Give back the renderer and event source.
    pub fn into_parts(self) -> (R, S) {
        (self.renderer, self.source)
    }

    /// Process `image_paths` in the given order.
    ///
    /// Images that fail to load are recorded in the outcome and skipped.
    /// Rectangles are drawn in `color`; rendered copies go to `output_dir`,
    /// which is created if missing.
    pub fn run(
        &mut self,
        image_paths: &[PathBuf],
        color: Color,
        output_dir: &Path,
    ) -> Result<BatchOutcome, BatchError> {
        let mut outcome = BatchOutcome::default();
        let mut session = EditSession::new(color).with_undo_config(self.options.undo.clone());
        log::info!("Starting batch of {} image(s)", image_paths.len());

        for (index, path) in image_paths.iter().enumerate() {
            let pixels = match load_image(path) {
                Ok(pixels) => pixels,
                Err(e) => {
                    outcome.fail(path, e);
                    continue;
                }
            };

            log::info!("[{}/{}] Editing {:?}", index + 1, image_paths.len(), path);
            session.open(path.clone(), display_name_for(path), pixels)?;

            if self.edit(&mut session) == Step::Terminate {
                session.abandon()?;
                outcome.terminated = true;
                log::info!("Batch terminated at {:?}", path);
                break;
            }

            let metadata = session.close()?;
            let record = metadata.to_record(color);
            match write_rendered(&metadata.pixels, path, output_dir) {
                Ok(rendered) => outcome.rendered.push(rendered),
                Err(e) => outcome.fail(path, e),
            }
            outcome.records.push(record);
        }

        log::info!(
            "Batch finished: {} record(s), {} failure(s)",
            outcome.records.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    /// Tick loop for the open image. Returns how editing ended.
    fn edit(&mut self, session: &mut EditSession) -> Step {
        loop {
            if let Some(frame) = session.refresh() {
                self.renderer.present(&frame);
            }

            let event = match self.source.poll(self.options.tick) {
                Poll::Event(event) => event,
                Poll::Idle => continue,
                Poll::Closed => {
                    log::info!("Input closed");
                    return Step::Terminate;
                }
            };

            match apply(session, event) {
                Ok(Step::Continue) => {}
                Ok(step) => return step,
                Err(e) => self.renderer.notify(&e.to_string()),
            }
        }
    }
}

/// Apply one event to the session.
fn apply(session: &mut EditSession, event: InputEvent) -> Result<Step, EditError> {
    match event {
        InputEvent::Pointer(PointerEvent::Down(vertex)) => {
            session.begin_vertex(vertex.x, vertex.y)?;
        }
        InputEvent::Pointer(PointerEvent::Up(vertex)) => {
            session.end_vertex(vertex.x, vertex.y)?;
        }
        InputEvent::Action(Action::Undo) => session.undo()?,
        InputEvent::Action(Action::NextImage) => return Ok(Step::Finish),
        InputEvent::Action(Action::Terminate) => return Ok(Step::Terminate),
    }
    Ok(Step::Continue)
}

fn write_rendered(
    pixels: &image::RgbImage,
    source: &Path,
    output_dir: &Path,
) -> Result<PathBuf, FormatError> {
    fs::create_dir_all(output_dir)?;
    let output = output_path_for(source, output_dir)?;
    save_image(pixels, &output)?;
    Ok(output)
}

// ============================================================================
// Metadata file
// ============================================================================

/// Write the batch metadata file atomically.
pub fn save_all(records: &[ImageRecord], json_path: &Path) -> Result<(), BatchError> {
    format::write_records(records, json_path)?;
    Ok(())
}

/// Read a batch metadata file.
pub fn load_all(json_path: &Path) -> Result<Vec<ImageRecord>, BatchError> {
    Ok(format::read_records(json_path)?)
}

/// Regenerate rendered images from saved records.
///
/// Each source image is decoded again and its rectangles painted with the
/// record colour. Records whose image cannot be read or written are reported
/// in the outcome's failures.
pub fn render_records(
    records: &[ImageRecord],
    output_dir: &Path,
) -> Result<BatchOutcome, BatchError> {
    fs::create_dir_all(output_dir).map_err(FormatError::from)?;

    let mut outcome = BatchOutcome::default();
    for record in records {
        let pixels = match load_image(&record.image) {
            Ok(pixels) => pixels,
            Err(e) => {
                outcome.fail(&record.image, e);
                continue;
            }
        };

        let annotation = Annotation::from_record(record, display_name_for(&record.image), pixels);
        match write_rendered(annotation.pixels(), &record.image, output_dir) {
            Ok(rendered) => {
                log::debug!(
                    "Rendered {} rectangle(s) to {:?}",
                    annotation.rectangles().len(),
                    rendered
                );
                outcome.rendered.push(rendered);
                outcome.records.push(record.clone());
            }
            Err(e) => outcome.fail(&record.image, e),
        }
    }

    log::info!(
        "Rendered {} of {} record(s) to {:?}",
        outcome.rendered.len(),
        records.len(),
        output_dir
    );
    Ok(outcome)
}
