//! Undo/redo history for annotation edits.
//!
//! Every edit is recorded as a [`Snapshot`] of the annotation's mutable state
//! taken immediately before the edit is applied. Undo swaps the live state
//! with the latest snapshot, so restoring is exact: the pixel buffer and the
//! rectangle list always move together.
//!
//! Snapshots are deep copies. The live pixel buffer is painted on after a
//! snapshot is taken, so sharing storage would corrupt the history.

use image::RgbImage;

use crate::model::Rectangle;

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable copy of an annotation's pixel buffer and committed rectangles.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pixels: RgbImage,
    rectangles: Vec<Rectangle>,
}

impl Snapshot {
    /// Deep-copy the given state.
    pub fn capture(pixels: &RgbImage, rectangles: &[Rectangle]) -> Self {
        Self {
            pixels: pixels.clone(),
            rectangles: rectangles.to_vec(),
        }
    }

    /// Take ownership of state that is being replaced.
    pub fn from_parts(pixels: RgbImage, rectangles: Vec<Rectangle>) -> Self {
        Self { pixels, rectangles }
    }

    /// Pixel buffer at the time of the snapshot.
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Committed rectangles at the time of the snapshot.
    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    /// Consume the snapshot to restore it.
    pub fn into_parts(self) -> (RgbImage, Vec<Rectangle>) {
        (self.pixels, self.rectangles)
    }
}

// ============================================================================
// Undo History
// ============================================================================

/// Configuration for the undo history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoConfig {
    /// Maximum number of snapshots to keep. None keeps everything.
    pub max_history: Option<usize>,
}

/// The undo/redo history.
///
/// Maintains two stacks:
/// - `undo_stack`: states to go back to (most recent at the end)
/// - `redo_stack`: states that were undone (most recent at the end)
///
/// Pushing a new snapshot clears the redo stack, since the undone states no
/// longer follow from the current one.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    config: UndoConfig,
}

impl UndoHistory {
    /// Create an empty, unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the state from before an edit.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if let Some(max) = self.config.max_history {
            while self.undo_stack.len() > max {
                self.undo_stack.remove(0);
                log::debug!("Undo history full ({}), dropped oldest snapshot", max);
            }
        }
        log::trace!("Undo: {} snapshot(s) recorded", self.undo_stack.len());
    }

    /// Pop the state to restore on undo.
    ///
    /// The caller hands the state it replaces back through [`push_redo`](Self::push_redo).
    pub fn pop_undo(&mut self) -> Option<Snapshot> {
        self.undo_stack.pop()
    }

    /// Pop the state to restore on redo.
    ///
    /// The caller hands the state it replaces back through [`push_undo`](Self::push_undo).
    pub fn pop_redo(&mut self) -> Option<Snapshot> {
        self.redo_stack.pop()
    }

    /// Record the state replaced by an undo.
    pub fn push_redo(&mut self, snapshot: Snapshot) {
        self.redo_stack.push(snapshot);
    }

    /// Record the state replaced by a redo, keeping the redo stack intact.
    pub fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
    }

    /// Number of snapshots available to undo.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of snapshots available to redo.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
