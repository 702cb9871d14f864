//! The harvested review record and its fixed tags

use chrono::{DateTime, Utc};
use std::fmt;

/// Platform of the storefront the reviews come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
}

/// Device the review was written on
///
/// The storefront pages do not expose it, so every record carries `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Unknown,
}

/// Kind of harvested unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Review,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("iOS")
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown")
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("review")
    }
}

/// One customer review harvested from a storefront listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Listing the review belongs to
    pub source_id: String,

    /// Zero-based page the review was found on
    pub page: u32,

    pub os: Platform,
    pub device: Device,
    pub kind: RecordKind,

    pub title: Option<String>,

    /// Star rating, 0 to 5
    pub rating: u8,

    /// Stable storefront identifier of the review
    pub id: String,

    /// Application version the review was written against
    pub version: String,

    /// Submission date (day precision, midnight UTC)
    pub date: DateTime<Utc>,

    pub text: Option<String>,
}
