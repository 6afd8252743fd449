//! Catalog subjects (movies and series) that can carry a sentiment score.

use serde::{Deserialize, Serialize};

/// Opaque catalog identifier for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

/// Returned when a subject identifier is empty or contains unsupported characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid subject id: {0:?}")]
pub struct InvalidSubjectId(pub String);

impl SubjectId {
    /// Parse a subject ID, trimming surrounding whitespace.
    ///
    /// Identifiers are used as record keys, so only ASCII alphanumerics,
    /// `-`, `_` and `.` are accepted.
    pub fn parse(s: &str) -> Result<Self, InvalidSubjectId> {
        let trimmed = s.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= 128
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidSubjectId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SubjectId {
    type Err = InvalidSubjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Kind of catalog subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Movie,
    Series,
}

impl SubjectKind {
    /// Phrase appended to search queries so the provider disambiguates
    /// between a film and a show with the same title.
    pub fn query_suffix(&self) -> &'static str {
        match self {
            SubjectKind::Movie => "movie",
            SubjectKind::Series => "tv series",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Movie => "movie",
            SubjectKind::Series => "series",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "film" => Ok(SubjectKind::Movie),
            "series" | "show" | "tv" => Ok(SubjectKind::Series),
            _ => Err(format!("Invalid subject kind: {}", s)),
        }
    }
}

/// A catalog entry as seen by the enrichment pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
    pub kind: SubjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u16>,
}

impl Subject {
    pub fn new(id: SubjectId, title: impl Into<String>, kind: SubjectKind) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            release_year: None,
        }
    }

    /// Set the release year, used to sharpen provider queries.
    pub fn with_release_year(mut self, year: u16) -> Self {
        self.release_year = Some(year);
        self
    }
}
