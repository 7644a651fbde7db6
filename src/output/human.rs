#![forbid(unsafe_code)]

//! Human-readable report formatter
//!
//! Reports are built as a sequence of toned segments so the same message can
//! be written with or without color. Color selection itself is left to the
//! `termcolor` writer handed to [`HumanFormatter::write`].

use std::io;
use termcolor::{Color, ColorSpec, WriteColor};

/// Visual tone of a message segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Info,
    Accent,
    Failure,
}

impl Tone {
    fn color_spec(&self) -> Option<ColorSpec> {
        let color = match self {
            Tone::Plain => return None,
            Tone::Success => Color::Green,
            Tone::Info => Color::Cyan,
            Tone::Accent => Color::Blue,
            Tone::Failure => Color::Red,
        };
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color));
        Some(spec)
    }
}

/// A piece of text sharing one tone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub tone: Tone,
    pub text: String,
}

/// A console message made of toned segments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    segments: Vec<Segment>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a message with a single segment
    pub fn toned(tone: Tone, text: impl Into<String>) -> Self {
        Self::new().push(tone, text)
    }

    /// Append a segment
    pub fn push(mut self, tone: Tone, text: impl Into<String>) -> Self {
        self.segments.push(Segment {
            tone,
            text: text.into(),
        });
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The message without any styling
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::toned(Tone::Plain, text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::toned(Tone::Plain, text)
    }
}

/// Writes messages to a color-capable stream
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter
    }

    /// Write the message followed by a newline
    pub fn write(&self, out: &mut dyn WriteColor, message: &Message) -> io::Result<()> {
        for segment in message.segments() {
            match segment.tone.color_spec() {
                Some(spec) => {
                    out.set_color(&spec)?;
                    out.write_all(segment.text.as_bytes())?;
                    out.reset()?;
                }
                None => out.write_all(segment.text.as_bytes())?,
            }
        }
        out.write_all(b"\n")?;
        out.flush()
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}
