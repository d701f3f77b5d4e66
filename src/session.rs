//! Edit session: the state machine that drives one image at a time.
//!
//! ```text
//! Empty ──open──▶ Open ──commit/undo/redo──▶ Editing ⇄ Editing
//!                   │                           │
//!                   └──────────close────────────┴──▶ Closed ──open──▶ Open
//! ```
//!
//! Rectangles are drawn with two pointer events. [`EditSession::begin_vertex`]
//! records the first corner and [`EditSession::end_vertex`] the second, which
//! commits the rectangle. The in-progress rectangle belongs to the session and
//! never reaches the annotation until it is complete.

use std::fmt;
use std::path::PathBuf;

use image::RgbImage;

use crate::error::EditError;
use crate::format::Metadata;
use crate::model::{Annotation, Color, Rectangle, Vertex};
use crate::undo::UndoConfig;

/// Lifecycle state of an [`EditSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image has been opened yet
    Empty,
    /// An image is open and unedited
    Open,
    /// At least one commit, undo or redo has been applied
    Editing,
    /// The last image was finalized
    Closed,
}

impl SessionState {
    /// Whether edits can be applied in this state.
    pub fn is_editable(&self) -> bool {
        matches!(self, SessionState::Open | SessionState::Editing)
    }

    /// Get the display name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Empty => "empty",
            SessionState::Open => "open",
            SessionState::Editing => "editing",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of feeding a vertex to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexOutcome {
    /// The vertex started a new rectangle
    Started,
    /// The vertex completed a rectangle, which was committed
    Committed,
}

/// Read-only view of the session handed to the renderer on every tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Name of the open image
    pub display_name: &'a str,
    /// Pixel buffer with every committed rectangle painted
    pub pixels: &'a RgbImage,
    /// Number of committed rectangles
    pub rectangle_count: usize,
    /// First corner of a rectangle being drawn, if any
    pub pending_vertex: Option<Vertex>,
    /// Session state
    pub state: SessionState,
}

/// Orchestrates the life cycle of one image at a time.
#[derive(Debug)]
pub struct EditSession {
    state: SessionState,
    color: Color,
    undo_config: UndoConfig,
    annotation: Option<Annotation>,
    in_progress: Rectangle,
}

impl EditSession {
    /// Create an empty session drawing rectangles in `color`.
    pub fn new(color: Color) -> Self {
        Self {
            state: SessionState::Empty,
            color,
            undo_config: UndoConfig::default(),
            annotation: None,
            in_progress: Rectangle::new(color),
        }
    }

    /// Use a custom undo configuration for every image opened from now on.
    pub fn with_undo_config(mut self, config: UndoConfig) -> Self {
        self.undo_config = config;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Rectangle colour.
    pub fn color(&self) -> Color {
        self.color
    }

    /// The open annotation, if any.
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// First corner of the rectangle being drawn, if any.
    pub fn pending_vertex(&self) -> Option<Vertex> {
        self.in_progress.vertices().first().copied()
    }

    /// Open an image. Resets rectangles, history and the in-progress rectangle.
    pub fn open(
        &mut self,
        path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        pixels: RgbImage,
    ) -> Result<(), EditError> {
        if self.state.is_editable() {
            return Err(EditError::invalid_state("open", self.state));
        }

        let annotation = Annotation::new(path, display_name, pixels)
            .with_undo_config(self.undo_config.clone());
        log::debug!("Session opened {:?}", annotation.source_path());

        self.annotation = Some(annotation);
        self.in_progress = Rectangle::new(self.color);
        self.state = SessionState::Open;
        Ok(())
    }

    /// Record the first corner of a new rectangle.
    ///
    /// Fails with [`EditError::Overflow`] if a first corner is already pending;
    /// the pending corner is kept so the rectangle can still be completed.
    pub fn begin_vertex(&mut self, x: u32, y: u32) -> Result<(), EditError> {
        self.check_editable("begin a rectangle")?;
        if !self.in_progress.is_empty() {
            return Err(EditError::Overflow {
                max: crate::model::MAX_VERTICES,
            });
        }
        self.in_progress.add_vertex(x, y)?;
        log::trace!("Rectangle started at ({}, {})", x, y);
        Ok(())
    }

    /// Record the second corner and commit the rectangle.
    ///
    /// With no first corner pending this records the first corner instead,
    /// as happens when the pointer was pressed outside the image.
    pub fn end_vertex(&mut self, x: u32, y: u32) -> Result<VertexOutcome, EditError> {
        self.check_editable("end a rectangle")?;
        if self.in_progress.is_empty() {
            self.in_progress.add_vertex(x, y)?;
            return Ok(VertexOutcome::Started);
        }

        let state = self.state;
        let Some(annotation) = self.annotation.as_mut() else {
            return Err(EditError::invalid_state("end a rectangle", state));
        };

        let mut rectangle = std::mem::replace(&mut self.in_progress, Rectangle::new(self.color));
        if let Err(e) = rectangle.add_vertex(x, y) {
            self.in_progress = rectangle;
            return Err(e);
        }
        annotation.commit(rectangle)?;
        self.state = SessionState::Editing;
        Ok(VertexOutcome::Committed)
    }

    /// Undo the most recent commit.
    ///
    /// Fails with [`EditError::EmptyHistory`] and changes nothing when there
    /// is nothing to undo. A pending first corner is left in place.
    pub fn undo(&mut self) -> Result<(), EditError> {
        let state = self.state;
        let annotation = self.editable_annotation("undo", state)?;
        annotation.undo()?;
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Re-apply the most recently undone commit.
    ///
    /// Library API only: no action token or input line maps to redo, so an
    /// interactive batch never calls it.
    pub fn redo(&mut self) -> Result<(), EditError> {
        let state = self.state;
        let annotation = self.editable_annotation("redo", state)?;
        annotation.redo()?;
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Finalize the open image and return its metadata.
    ///
    /// A rectangle still being drawn is discarded.
    pub fn close(&mut self) -> Result<Metadata, EditError> {
        let annotation = self.release("close")?;
        log::debug!(
            "Session closed {:?} with {} rectangle(s)",
            annotation.source_path(),
            annotation.rectangles().len()
        );
        Ok(annotation.into_metadata())
    }

    /// Release the open image without producing metadata.
    ///
    /// Used when the batch is terminated mid-edit.
    pub fn abandon(&mut self) -> Result<(), EditError> {
        let annotation = self.release("abandon")?;
        log::debug!("Session abandoned {:?}", annotation.source_path());
        Ok(())
    }

    /// Read-only view for the render loop. Never mutates the session.
    pub fn refresh(&self) -> Option<Frame<'_>> {
        let annotation = self.annotation.as_ref()?;
        Some(Frame {
            display_name: annotation.display_name(),
            pixels: annotation.pixels(),
            rectangle_count: annotation.rectangles().len(),
            pending_vertex: self.pending_vertex(),
            state: self.state,
        })
    }

    fn check_editable(&self, operation: &'static str) -> Result<(), EditError> {
        if self.state.is_editable() && self.annotation.is_some() {
            Ok(())
        } else {
            Err(EditError::invalid_state(operation, self.state))
        }
    }

    fn editable_annotation(
        &mut self,
        operation: &'static str,
        state: SessionState,
    ) -> Result<&mut Annotation, EditError> {
        if !state.is_editable() {
            return Err(EditError::invalid_state(operation, state));
        }
        self.annotation
            .as_mut()
            .ok_or(EditError::invalid_state(operation, state))
    }

    fn release(&mut self, operation: &'static str) -> Result<Annotation, EditError> {
        self.check_editable(operation)?;
        let annotation = self
            .annotation
            .take()
            .ok_or(EditError::invalid_state(operation, self.state))?;

        if !self.in_progress.is_empty() {
            log::debug!(
                "Discarding unfinished rectangle at {:?}",
                self.in_progress.vertices()
            );
        }
        self.in_progress.clear();
        self.state = SessionState::Closed;
        Ok(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARK_RED: Color = Color::new(85, 0, 0);

    fn open_session(width: u32, height: u32) -> EditSession {
        let mut session = EditSession::new(DARK_RED);
        session
            .open("images/sample.jpg", "sample", RgbImage::new(width, height))
            .unwrap();
        session
    }

    fn draw(session: &mut EditSession, a: (u32, u32), b: (u32, u32)) {
        session.begin_vertex(a.0, a.1).unwrap();
        assert_eq!(session.end_vertex(b.0, b.1).unwrap(), VertexOutcome::Committed);
    }

    #[test]
    fn test_state_transitions() {
        let mut session = EditSession::new(DARK_RED);
        assert_eq!(session.state(), SessionState::Empty);

        session.open("a.jpg", "a", RgbImage::new(10, 10)).unwrap();
        assert_eq!(session.state(), SessionState::Open);

        draw(&mut session, (1, 1), (2, 2));
        assert_eq!(session.state(), SessionState::Editing);

        session.undo().unwrap();
        assert_eq!(session.state(), SessionState::Editing);

        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);

        session.open("b.jpg", "b", RgbImage::new(10, 10)).unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert!(session.annotation().unwrap().rectangles().is_empty());
        assert_eq!(session.annotation().unwrap().history_len(), 0);
    }

    #[test]
    fn test_open_twice_is_rejected() {
        let mut session = open_session(10, 10);
        let err = session.open("b.jpg", "b", RgbImage::new(1, 1)).unwrap_err();
        assert_eq!(err, EditError::invalid_state("open", SessionState::Open));
        assert_eq!(session.annotation().unwrap().display_name(), "sample");
    }

    #[test]
    fn test_mutators_rejected_before_open_and_after_close() {
        let mut session = EditSession::new(DARK_RED);
        assert!(matches!(session.begin_vertex(1, 1), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.end_vertex(1, 1), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.undo(), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.close(), Err(EditError::InvalidState { .. })));

        let mut session = open_session(10, 10);
        session.close().unwrap();
        assert!(matches!(session.begin_vertex(1, 1), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.end_vertex(1, 1), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.undo(), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.redo(), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.close(), Err(EditError::InvalidState { .. })));
        assert!(matches!(session.abandon(), Err(EditError::InvalidState { .. })));
    }

    #[test]
    fn test_n_pairs_give_n_rectangles_and_n_snapshots() {
        let mut session = open_session(100, 100);
        for i in 0..7 {
            draw(&mut session, (i, i), (i + 10, i + 5));
        }
        let annotation = session.annotation().unwrap();
        assert_eq!(annotation.rectangles().len(), 7);
        assert_eq!(annotation.history_len(), 7);

        session.undo().unwrap();
        session.undo().unwrap();
        let annotation = session.annotation().unwrap();
        assert_eq!(annotation.rectangles().len(), 5);
        assert_eq!(annotation.history_len(), 5);
    }

    #[test]
    fn test_redact_and_undo_scenario() {
        let mut session = open_session(300, 200);
        assert_eq!(session.color(), Color::from_hex("#550000").unwrap());

        draw(&mut session, (10, 10), (50, 40));

        let annotation = session.annotation().unwrap();
        assert_eq!(annotation.rectangles().len(), 1);
        assert_eq!(
            annotation.rectangles()[0].vertices(),
            &[Vertex::new(10, 10), Vertex::new(50, 40)]
        );
        for (x, y, pixel) in annotation.pixels().enumerate_pixels() {
            let inside = (10..=50).contains(&x) && (10..=40).contains(&y);
            let expected = if inside { [85, 0, 0] } else { [0, 0, 0] };
            assert_eq!(pixel.0, expected, "pixel ({x}, {y})");
        }

        session.undo().unwrap();
        let annotation = session.annotation().unwrap();
        assert!(annotation.rectangles().is_empty());
        assert!(annotation.pixels().pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_undo_on_empty_history_is_reported_and_harmless() {
        let mut session = open_session(10, 10);
        assert_eq!(session.undo(), Err(EditError::EmptyHistory));
        assert_eq!(session.state(), SessionState::Open);
        assert!(session.annotation().unwrap().rectangles().is_empty());
    }

    #[test]
    fn test_extra_begin_overflows_and_pair_still_completes() {
        let mut session = open_session(100, 100);
        session.begin_vertex(10, 10).unwrap();

        let err = session.begin_vertex(20, 20).unwrap_err();
        assert_eq!(err, EditError::Overflow { max: 2 });
        assert_eq!(session.pending_vertex(), Some(Vertex::new(10, 10)));
        assert!(session.annotation().unwrap().rectangles().is_empty());

        assert_eq!(session.end_vertex(30, 30).unwrap(), VertexOutcome::Committed);
        let annotation = session.annotation().unwrap();
        assert_eq!(
            annotation.rectangles()[0].vertices(),
            &[Vertex::new(10, 10), Vertex::new(30, 30)]
        );
        assert_eq!(session.pending_vertex(), None);
    }

    #[test]
    fn test_end_without_begin_starts_rectangle() {
        let mut session = open_session(50, 50);
        assert_eq!(session.end_vertex(5, 5).unwrap(), VertexOutcome::Started);
        assert_eq!(session.pending_vertex(), Some(Vertex::new(5, 5)));
        assert_eq!(session.end_vertex(9, 9).unwrap(), VertexOutcome::Committed);
        assert_eq!(session.annotation().unwrap().rectangles().len(), 1);
    }

    #[test]
    fn test_close_discards_unfinished_rectangle() {
        let mut session = open_session(50, 50);
        draw(&mut session, (1, 1), (5, 5));
        session.begin_vertex(20, 20).unwrap();

        let metadata = session.close().unwrap();
        assert_eq!(metadata.rectangles.len(), 1);
        assert_eq!(session.pending_vertex(), None);

        session.open("next.jpg", "next", RgbImage::new(50, 50)).unwrap();
        assert_eq!(session.pending_vertex(), None);
    }

    #[test]
    fn test_undo_keeps_pending_vertex() {
        let mut session = open_session(50, 50);
        draw(&mut session, (1, 1), (5, 5));
        session.begin_vertex(20, 20).unwrap();
        session.undo().unwrap();
        assert_eq!(session.pending_vertex(), Some(Vertex::new(20, 20)));
        assert!(session.annotation().unwrap().rectangles().is_empty());
    }

    #[test]
    fn test_refresh_does_not_mutate() {
        let mut session = open_session(50, 50);
        draw(&mut session, (1, 1), (5, 5));
        session.begin_vertex(7, 7).unwrap();

        let before = session.annotation().unwrap().to_metadata();
        for _ in 0..3 {
            let frame = session.refresh().unwrap();
            assert_eq!(frame.rectangle_count, 1);
            assert_eq!(frame.pending_vertex, Some(Vertex::new(7, 7)));
            assert_eq!(frame.display_name, "sample");
        }
        assert_eq!(session.annotation().unwrap().to_metadata(), before);
        assert_eq!(session.annotation().unwrap().history_len(), 1);
    }

    #[test]
    fn test_refresh_without_image() {
        let session = EditSession::new(DARK_RED);
        assert!(session.refresh().is_none());
    }

    #[test]
    fn test_redo_through_session() {
        let mut session = open_session(20, 20);
        draw(&mut session, (1, 1), (5, 5));
        session.undo().unwrap();
        session.redo().unwrap();
        assert_eq!(session.annotation().unwrap().rectangles().len(), 1);
        assert_eq!(session.redo(), Err(EditError::NothingToRedo));
    }

    #[test]
    fn test_undo_config_applies_to_opened_images() {
        let mut session = EditSession::new(DARK_RED).with_undo_config(UndoConfig {
            max_history: Some(2),
        });
        session.open("a.jpg", "a", RgbImage::new(20, 20)).unwrap();
        for i in 0..4 {
            draw(&mut session, (i, i), (i + 1, i + 1));
        }
        assert_eq!(session.annotation().unwrap().history_len(), 2);
    }
}
