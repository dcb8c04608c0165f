//! Chunking configuration shared by the cleaner, splitter and session store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Strategy used to divide cleaned text into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Blank-line boundaries
    #[default]
    Paragraph,
    /// Sentence-terminal punctuation followed by whitespace
    Sentence,
    /// A literal, user-supplied delimiter
    Custom,
}

impl SplitMethod {
    pub const ALL: [SplitMethod; 3] = [Self::Paragraph, Self::Sentence, Self::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
            Self::Custom => "custom",
        }
    }

    /// Separator that joins chunks back into the cleaned text
    pub fn separator<'a>(&self, delimiter: Option<&'a str>) -> &'a str {
        match self {
            Self::Paragraph => "\n\n",
            Self::Sentence => " ",
            Self::Custom => delimiter.unwrap_or(""),
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paragraph" => Ok(Self::Paragraph),
            "sentence" => Ok(Self::Sentence),
            "custom" => Ok(Self::Custom),
            other => Err(Error::InvalidConfiguration(format!(
                "Unknown split method '{}' (expected paragraph, sentence or custom)",
                other
            ))),
        }
    }
}

/// Flags recognized by the text cleaner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    /// Strip boilerplate front/back matter, page numbers and copyright lines
    #[serde(default = "enabled")]
    pub remove_headers: bool,

    /// Collapse runs of whitespace and normalize line endings
    #[serde(default = "enabled")]
    pub normalize_whitespace: bool,

    /// Remove leading list markers
    #[serde(default = "enabled")]
    pub strip_bullets: bool,
}

impl CleanOptions {
    /// Options that leave the text untouched
    pub fn none() -> Self {
        Self {
            remove_headers: false,
            normalize_whitespace: false,
            strip_bullets: false,
        }
    }
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            remove_headers: true,
            normalize_whitespace: true,
            strip_bullets: true,
        }
    }
}

fn enabled() -> bool {
    true
}
