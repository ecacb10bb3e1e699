//! Per-dispatch state: the frame chain recording each visited node's produced
//! value, and the message sink feeding the run result.

use super::params::Value;

/// The value produced at one depth of one dispatch, keyed by node name. The
/// root frame's name is the empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    name: String,
    value: Value,
}

impl Frame {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Mutable state of one dispatch. Frames are appended newest-last, one per
/// node visited, written immediately before descending past that node (or,
/// for the terminal node, immediately before dispatch completes); lookups
/// only ever walk from the current frame toward the root.
pub struct RunContext {
    frames: Vec<Frame>,
    messages: Vec<String>,
    echo: bool,
    help_requested: bool,
}

impl RunContext {
    pub(crate) fn new(echo: bool) -> Self {
        Self {
            frames: Vec::new(),
            messages: Vec::new(),
            echo,
            help_requested: false,
        }
    }

    /// Record one output line, streaming it to stdout when the dispatch was
    /// started in echo mode.
    pub fn print(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.echo {
            println!("{message}");
        }
        self.messages.push(message);
    }

    /// Absolute-path lookup of an ancestor frame's value, e.g. `"/server"`.
    /// Only frames at or above the current depth exist; anything deeper (or a
    /// path that does not match the traversed name sequence) is `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        if segments.len() >= self.frames.len() {
            return None;
        }
        for (frame, segment) in self.frames.iter().skip(1).zip(&segments) {
            if frame.name() != *segment {
                return None;
            }
        }
        self.frames.get(segments.len()).map(Frame::value)
    }

    /// The frames recorded so far, root first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub(crate) fn push_frame(&mut self, name: &str, value: Value) {
        self.frames.push(Frame {
            name: name.to_string(),
            value,
        });
    }

    pub(crate) fn request_help(&mut self) {
        self.help_requested = true;
    }

    pub(crate) fn help_requested(&self) -> bool {
        self.help_requested
    }

    pub(crate) fn into_messages(self) -> Vec<String> {
        self.messages
    }
}
