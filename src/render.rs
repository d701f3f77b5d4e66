//! Render hook for the edit loop.
//!
//! Drawing the image on screen belongs to a windowing toolkit. The batch
//! controller only needs somewhere to hand the current [`Frame`] once per tick
//! and to report recoverable problems to the operator.

use crate::model::Vertex;
use crate::session::Frame;

/// Receives the current frame once per tick.
pub trait Renderer {
    /// Present the frame. Called before any event of the tick is applied.
    fn present(&mut self, frame: &Frame<'_>);

    /// Tell the operator about a rejected action (e.g. nothing to undo).
    fn notify(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Renderer that logs what changed between frames.
///
/// Used when no window is available: the operator drives the session from
/// the terminal and sees progress in the log.
#[derive(Debug, Default)]
pub struct LogRenderer {
    last: Option<(String, usize, Option<Vertex>)>,
    frames: u64,
}

impl LogRenderer {
    /// Create a logging renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn present(&mut self, frame: &Frame<'_>) {
        self.frames += 1;

        let current = (
            frame.display_name.to_string(),
            frame.rectangle_count,
            frame.pending_vertex,
        );
        if self.last.as_ref() == Some(&current) {
            return;
        }

        match frame.pending_vertex {
            Some(vertex) => log::info!(
                "{} ({}x{}): {} rectangle(s), drawing from ({}, {})",
                frame.display_name,
                frame.pixels.width(),
                frame.pixels.height(),
                frame.rectangle_count,
                vertex.x,
                vertex.y
            ),
            None => log::info!(
                "{} ({}x{}): {} rectangle(s)",
                frame.display_name,
                frame.pixels.width(),
                frame.pixels.height(),
                frame.rectangle_count
            ),
        }
        self.last = Some(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;
    use crate::session::EditSession;
    use image::RgbImage;

    #[test]
    fn test_log_renderer_counts_frames() {
        let mut session = EditSession::new(Color::BLACK);
        session.open("a.png", "a", RgbImage::new(4, 4)).unwrap();

        let mut renderer = LogRenderer::new();
        for _ in 0..3 {
            let frame = session.refresh().unwrap();
            renderer.present(&frame);
        }
        assert_eq!(renderer.frames(), 3);
    }
}
