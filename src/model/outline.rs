//! Document outline types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level derived from font-size rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a font-size rank (0 = largest) to a level; ranks past the third yield `None`.
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(HeadingLevel::H1),
            1 => Some(HeadingLevel::H2),
            2 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    /// Numeric depth (1-3).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A heading in the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    /// 1-based page number
    #[serde(rename = "page")]
    pub page_number: u32,
}

impl Heading {
    pub fn new(level: HeadingLevel, text: impl Into<String>, page_number: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page_number,
        }
    }
}

/// Structural outline of one PDF: a title plus headings in reading order.
///
/// Serializes as `{"title": ..., "outline": [{"level", "text", "page"}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title, empty when none was detected
    #[serde(default)]
    pub title: String,

    /// Headings in content-stream order
    #[serde(rename = "outline", default)]
    pub headings: Vec<Heading>,
}

impl Outline {
    /// The empty outline written for documents that could not be read.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether neither a title nor headings were found.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.headings.is_empty()
    }

    pub fn push(&mut self, heading: Heading) {
        self.headings.push(heading);
    }

    /// Count headings at a given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.headings.iter().filter(|h| h.level == level).count()
    }
}
