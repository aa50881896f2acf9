//! Styled chat text handed to the host's notification collaborator.
//!
//! The core never renders text; it builds a list of coloured segments and
//! lets the host translate them into its own chat component format.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 24-bit RGB colour of a text segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    /// Success / completion.
    pub const GREEN: Self = Self(0x55_FF55);
    /// Prefix tags and highlights.
    pub const GOLD: Self = Self(0xFF_AA00);
    /// Body text.
    pub const WHITE: Self = Self(0xFF_FFFF);
    /// Secondary text (descriptions, hints).
    pub const GRAY: Self = Self(0xAA_AAAA);
    /// In-progress and "getting harder" messages.
    pub const YELLOW: Self = Self(0xFF_FF55);
    /// Warnings and empty states.
    pub const RED: Self = Self(0xFF_5555);
}

/// One run of text in a single colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// The literal text.
    pub text: String,
    /// Colour of the run.
    pub color: Color,
}

/// A chat message made of coloured segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    /// Segments in display order.
    pub segments: Vec<TextSegment>,
}

impl StyledText {
    /// An empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-segment message.
    #[must_use]
    pub fn plain(text: impl Into<String>, color: Color) -> Self {
        Self::new().push(text, color)
    }

    /// A `prefix` tag in one colour followed by `body` in another, e.g.
    /// `[Quest Completed] Kill Zombie`.
    #[must_use]
    pub fn tagged(prefix: &str, prefix_color: Color, body: impl Into<String>, body_color: Color) -> Self {
        Self::new().push(prefix, prefix_color).push(body, body_color)
    }

    /// Append a segment.
    #[must_use]
    pub fn push(mut self, text: impl Into<String>, color: Color) -> Self {
        self.segments.push(TextSegment {
            text: text.into(),
            color,
        });
        self
    }

    /// The concatenated text without styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_message_concatenates() {
        let msg = StyledText::tagged("[Quest] ", Color::GOLD, "hello", Color::WHITE);
        assert_eq!(msg.segments.len(), 2);
        assert_eq!(msg.plain_text(), "[Quest] hello");
        assert_eq!(msg.to_string(), "[Quest] hello");
    }
}
