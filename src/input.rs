//! Input events and the sources that deliver them.
//!
//! The batch controller consumes [`InputEvent`]s through the [`EventSource`]
//! trait, one per tick. [`InputListener`] runs a background thread that reads
//! a line-oriented command stream (stdin or a script file), resolves key names
//! through the [`KeyBindings`], applies debounce and sends the resulting
//! events over a channel. [`ScriptedSource`] replays a fixed list of events.
//!
//! Line protocol:
//!
//! ```text
//! down 10 10      # pointer pressed at (10, 10)
//! up 50 40        # pointer released at (50, 40)
//! click 5 5       # down + up at the same point
//! d               # any bound key name (next image, undo, terminate)
//! ```

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::keybindings::{Action, Debouncer, KeyBindings};
use crate::model::Vertex;

/// Pointer button transitions on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Button pressed at a pixel
    Down(Vertex),
    /// Button released at a pixel
    Up(Vertex),
}

/// An event consumed by the batch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer input used to draw rectangles
    Pointer(PointerEvent),
    /// A debounced operator action
    Action(Action),
}

impl From<Action> for InputEvent {
    fn from(action: Action) -> Self {
        InputEvent::Action(action)
    }
}

/// Result of polling an [`EventSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// An event arrived
    Event(InputEvent),
    /// Nothing arrived before the timeout
    Idle,
    /// The source is exhausted and will never deliver another event
    Closed,
}

/// Source of input events, polled once per render tick.
pub trait EventSource {
    /// Wait up to `timeout` for the next event.
    fn poll(&mut self, timeout: Duration) -> Poll;
}

// ============================================================================
// Scripted source
// ============================================================================

/// Replays a fixed sequence of events, then reports [`Poll::Closed`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    events: VecDeque<InputEvent>,
}

impl ScriptedSource {
    /// Create a source that yields `events` in order.
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedSource {
    fn poll(&mut self, _timeout: Duration) -> Poll {
        match self.events.pop_front() {
            Some(event) => Poll::Event(event),
            None => Poll::Closed,
        }
    }
}

// ============================================================================
// Line parsing
// ============================================================================

/// Errors for input lines that cannot be turned into events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Not a pointer command and not a bound key
    #[error("Unknown command or key '{0}'")]
    UnknownCommand(String),

    /// A pointer command without two coordinates
    #[error("'{command}' expects two coordinates")]
    MissingCoordinate {
        /// The pointer command
        command: String,
    },

    /// A coordinate that is not a non-negative integer
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// Parse one input line into zero or more events.
///
/// Blank lines and `#` comments yield no events. `click` yields a press and a
/// release at the same point.
pub fn parse_line(line: &str, bindings: &KeyBindings) -> Result<Vec<InputEvent>, InputParseError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens = line.split_whitespace();
    let command = tokens.next().unwrap_or_default();

    let pointer = match command.to_ascii_lowercase().as_str() {
        "down" | "up" | "click" => {
            let vertex = parse_vertex(command, tokens.next(), tokens.next())?;
            match command.to_ascii_lowercase().as_str() {
                "down" => vec![PointerEvent::Down(vertex)],
                "up" => vec![PointerEvent::Up(vertex)],
                _ => vec![PointerEvent::Down(vertex), PointerEvent::Up(vertex)],
            }
        }
        _ => {
            return bindings
                .action_for_key(line)
                .map(|action| vec![InputEvent::Action(action)])
                .ok_or_else(|| InputParseError::UnknownCommand(line.to_string()));
        }
    };

    Ok(pointer.into_iter().map(InputEvent::Pointer).collect())
}

fn parse_vertex(
    command: &str,
    x: Option<&str>,
    y: Option<&str>,
) -> Result<Vertex, InputParseError> {
    let (Some(x), Some(y)) = (x, y) else {
        return Err(InputParseError::MissingCoordinate {
            command: command.to_string(),
        });
    };
    let coordinate = |token: &str| {
        token
            .parse::<u32>()
            .map_err(|_| InputParseError::InvalidCoordinate(token.to_string()))
    };
    Ok(Vertex::new(coordinate(x)?, coordinate(y)?))
}

// ============================================================================
// Listener thread
// ============================================================================

/// Reads input lines on a background thread and delivers events over a channel.
///
/// The thread exits when its reader reaches end of input or when the
/// listener is dropped and the channel closes.
pub struct InputListener {
    /// Receiver for events from the background thread
    receiver: Receiver<InputEvent>,
    /// Handle to the background thread
    thread_handle: Option<JoinHandle<()>>,
}

impl InputListener {
    /// Spawn a listener thread reading from `reader`.
    ///
    /// With `debounce` set, repeated actions are filtered with the delays of
    /// `bindings`. Scripts replayed from a file should pass false, since their
    /// lines arrive faster than any human could type them.
    pub fn spawn<R>(reader: R, bindings: KeyBindings, debounce: bool) -> std::io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<InputEvent>();

        let thread_handle = thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                log::debug!("Input listener thread started");
                let debouncer = debounce.then(|| Debouncer::new(&bindings));
                Self::listen(reader, &bindings, debouncer, sender);
                log::debug!("Input listener thread exiting");
            })?;

        Ok(Self {
            receiver,
            thread_handle: Some(thread_handle),
        })
    }

    /// Background thread main loop.
    fn listen<R: BufRead>(
        reader: R,
        bindings: &KeyBindings,
        mut debouncer: Option<Debouncer>,
        sender: Sender<InputEvent>,
    ) {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("Input read failed, listener stopping: {}", e);
                    break;
                }
            };

            let events = match parse_line(&line, bindings) {
                Ok(events) => events,
                Err(e) => {
                    log::warn!("Ignoring input: {}", e);
                    continue;
                }
            };

            for event in events {
                let debounced = match (event, debouncer.as_mut()) {
                    (InputEvent::Action(action), Some(debouncer)) => {
                        !debouncer.accept(action, Instant::now())
                    }
                    _ => false,
                };
                if debounced {
                    continue;
                }
                if sender.send(event).is_err() {
                    log::debug!("Event channel closed");
                    return;
                }
            }
        }
    }
}

impl InputListener {
    /// Join the background thread if it has exited.
    ///
    /// Returns whether it exited cleanly, or None while it is still running.
    fn reap(&mut self) -> Option<bool> {
        match self.thread_handle.take() {
            Some(handle) if handle.is_finished() => {
                let clean = handle.join().is_ok();
                if !clean {
                    log::warn!("Input listener thread panicked");
                }
                Some(clean)
            }
            running => {
                self.thread_handle = running;
                None
            }
        }
    }
}

impl EventSource for InputListener {
    fn poll(&mut self, timeout: Duration) -> Poll {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Poll::Event(event),
            Err(RecvTimeoutError::Timeout) => Poll::Idle,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        // A thread blocked on stdin cannot be interrupted; only join finished ones.
        self.reap();
    }
}
