use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned book identifier. The service may hand out numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookId {
    Number(i64),
    Text(String),
}

impl BookId {
    /// Parses user input, preferring the numeric form the service usually returns.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(raw.to_owned()),
        }
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Loosely validated publication year: whatever the form field held.
///
/// Any JSON number is accepted, so a fractional or oversized year from the
/// service does not fail decoding of the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishedYear {
    Number(serde_json::Number),
    Text(String),
}

impl PublishedYear {
    /// Numeric input becomes a number, blank input becomes `None`, anything else is kept as text.
    pub fn from_input(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(n) => Some(Self::Number(n.into())),
            Err(_) => Some(Self::Text(raw.to_owned())),
        }
    }
}

impl fmt::Display for PublishedYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => fmt::Display::fmt(n, f),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub published_year: Option<PublishedYear>,
}

impl Book {
    pub fn set_field(&mut self, field: BookField, value: &str) {
        match field {
            BookField::Title => self.title = value.to_owned(),
            BookField::Author => self.author = value.to_owned(),
            BookField::PublishedYear => self.published_year = PublishedYear::from_input(value),
        }
    }

    pub fn published_year_text(&self) -> String {
        self.published_year
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// A new book staged in the form, before the service has assigned it an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub author: String,
    pub published_year: String,
}

impl Draft {
    pub fn set_field(&mut self, field: BookField, value: &str) {
        let slot = match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::PublishedYear => &mut self.published_year,
        };
        *slot = value.to_owned();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_payload(&self) -> NewBook {
        NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            published_year: PublishedYear::from_input(&self.published_year),
        }
    }
}

/// Request body for `POST /books`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_year: Option<PublishedYear>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    PublishedYear,
}

impl BookField {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "year" | "published_year" => Ok(Self::PublishedYear),
            other => anyhow::bail!("unknown book field: {other}"),
        }
    }
}
