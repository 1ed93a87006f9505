//! Terminal colour support

use std::sync::LazyLock;

use owo_colors::{OwoColorize, colors::css};

static COLOR: LazyLock<bool> =
    LazyLock::new(|| supports_color::on(supports_color::Stream::Stdout).is_some());

#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Warning,
    Info,
    Dim,
}

fn paint(text: &str, tone: Tone) -> String {
    if !*COLOR {
        return text.to_string();
    }
    match tone {
        Tone::Success => text.fg::<css::Green>().to_string(),
        Tone::Warning => text.fg::<css::Orange>().to_string(),
        Tone::Info => text.fg::<css::LightBlue>().to_string(),
        Tone::Dim => text.dimmed().to_string(),
    }
}

/// Colours command output when stdout supports it.
pub trait Colorize: AsRef<str> {
    /// Green, for completed actions.
    fn success(&self) -> String {
        paint(self.as_ref(), Tone::Success)
    }

    /// Amber, for undeclared or dangling items.
    fn warning(&self) -> String {
        paint(self.as_ref(), Tone::Warning)
    }

    /// Blue, for linked identifiers.
    fn info(&self) -> String {
        paint(self.as_ref(), Tone::Info)
    }

    /// Dimmed, for headings and arrows.
    fn dim(&self) -> String {
        paint(self.as_ref(), Tone::Dim)
    }
}

impl Colorize for str {}
impl Colorize for String {}
