//! Slide deck model and loader
//!
//! A deck is a TOML file:
//!
//! ```toml
//! title = "Talk"
//!
//! [timer]
//! duration = 20
//! relative = true
//!
//! [[slides]]
//! content = """
//! Hello
//! """
//! caption = "Opening"
//! ```

use crate::core::timer::TimerAttributes;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Failed to read deck {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse deck: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Deck has no slides")]
    Empty,
}

/// One slide: a figure with content and an optional caption
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Speaker notes, never shown on the slide itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Slide {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            caption: None,
            notes: None,
        }
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_string());
        self
    }

    /// Content lines with surrounding blank lines trimmed
    pub fn lines(&self) -> Vec<&str> {
        let lines: Vec<&str> = self.content.lines().collect();
        let start = lines
            .iter()
            .position(|l| !l.trim().is_empty())
            .unwrap_or(lines.len());
        let end = lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map(|i| i + 1)
            .unwrap_or(start);
        lines[start..end.max(start)].to_vec()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Caption, or the first content line, for list views
    pub fn title(&self) -> &str {
        self.caption()
            .or_else(|| self.lines().into_iter().next().map(str::trim))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerAttributes>,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Deck {
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let contents = fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut deck = Self::from_toml(&contents)?;
        if deck.title.is_empty() {
            if let Some(stem) = path.file_stem() {
                deck.title = stem.to_string_lossy().into_owned();
            }
        }
        tracing::info!(path = ?path, slides = deck.slides.len(), "deck loaded");
        Ok(deck)
    }

    pub fn from_toml(contents: &str) -> Result<Self, DeckError> {
        let deck: Deck = toml::from_str(contents)?;
        if deck.slides.is_empty() {
            return Err(DeckError::Empty);
        }
        Ok(deck)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }
}
