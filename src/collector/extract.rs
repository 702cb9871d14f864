//! Field extraction for a single review node
//!
//! Each review in a storefront page is a `VBoxView` whose fields sit at
//! fixed positions in the view hierarchy. Every lookup is explicit and
//! fails with the step that did not resolve.

use crate::collector::record::{Device, Platform, RecordKind, Review};
use crate::markup::{Element, PathError, Step};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use url::Url;

const TITLE_PATH: [Step; 4] = [
    Step::new("HBoxView", 0),
    Step::new("TextView", 0),
    Step::new("SetFontStyle", 0),
    Step::new("b", 0),
];

const RATING_PATH: [Step; 3] = [
    Step::new("HBoxView", 0),
    Step::new("HBoxView", 0),
    Step::new("HBoxView", 0),
];

const REVIEW_LINK_PATH: [Step; 3] = [
    Step::new("HBoxView", 1),
    Step::new("HBoxView", 0),
    Step::new("GotoURL", 0),
];

const VERSION_LINE_PATH: [Step; 3] = [
    Step::new("HBoxView", 1),
    Step::new("TextView", 0),
    Step::new("SetFontStyle", 0),
];

const BODY_PATH: [Step; 2] = [Step::new("TextView", 0), Step::new("SetFontStyle", 0)];

/// Query parameter of the review link carrying the review identifier
const REVIEW_ID_PARAM: &str = "userReviewId";

/// Base used to resolve review links given without a host
const STORE_BASE: &str = "https://itunes.apple.com/";

/// Reasons a single review node could not be turned into a [`Review`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0}")]
    MissingNode(#[from] PathError),

    #[error("<{element}> has no {attribute:?} attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("invalid rating {0:?}")]
    InvalidRating(String),

    #[error("no review identifier in link {0:?}")]
    MissingReviewId(String),

    #[error("no version in {0:?}")]
    InvalidVersionLine(String),

    #[error("unrecognized date {0:?}")]
    InvalidDate(String),
}

/// Builds a [`Review`] from one review node of a decoded page
///
/// Rating, identifier, version and date are required; title and body are
/// `None` when their nodes are absent or blank.
pub fn extract_review(node: &Element, source_id: &str, page: u32) -> Result<Review, FieldError> {
    let rating = parse_rating(required_attr(node.descend(&RATING_PATH)?, "alt")?)?;
    let id = parse_review_id(required_attr(node.descend(&REVIEW_LINK_PATH)?, "url")?)?;
    let (version, date) = parse_version_line(&node.descend(&VERSION_LINE_PATH)?.deep_text())?;

    Ok(Review {
        source_id: source_id.to_string(),
        page,
        os: Platform::Ios,
        device: Device::Unknown,
        kind: RecordKind::Review,
        title: optional_text(node, &TITLE_PATH),
        rating,
        id,
        version,
        date,
        text: optional_text(node, &BODY_PATH),
    })
}

fn required_attr<'a>(element: &'a Element, attribute: &'static str) -> Result<&'a str, FieldError> {
    element
        .attr(attribute)
        .ok_or_else(|| FieldError::MissingAttribute {
            element: element.name.clone(),
            attribute,
        })
}

fn optional_text(node: &Element, path: &[Step]) -> Option<String> {
    node.descend(path)
        .ok()
        .map(Element::text)
        .filter(|text| !text.is_empty())
}

/// Parses the leading number of a rating label such as `"4 stars"`
pub fn parse_rating(label: &str) -> Result<u8, FieldError> {
    label
        .trim()
        .split(' ')
        .next()
        .and_then(|number| number.parse::<u8>().ok())
        .filter(|rating| *rating <= 5)
        .ok_or_else(|| FieldError::InvalidRating(label.to_string()))
}

/// Extracts the review identifier from the query string of a review link
pub fn parse_review_id(link: &str) -> Result<String, FieldError> {
    let url = Url::parse(link)
        .or_else(|_| Url::parse(STORE_BASE).and_then(|base| base.join(link)))
        .map_err(|_| FieldError::MissingReviewId(link.to_string()))?;

    url.query_pairs()
        .find(|(key, _)| key == REVIEW_ID_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FieldError::MissingReviewId(link.to_string()))
}

/// Splits a line such as `"by Jane - Version 4.2 - Jun 10, 2016"` into version and date
pub fn parse_version_line(line: &str) -> Result<(String, DateTime<Utc>), FieldError> {
    // The nickname comes first and may itself contain either separator
    let (head, date) = line
        .rsplit_once(" - ")
        .ok_or_else(|| FieldError::InvalidVersionLine(line.to_string()))?;
    let (_, version) = head
        .rsplit_once("Version ")
        .ok_or_else(|| FieldError::InvalidVersionLine(line.to_string()))?;

    let version = version.trim();
    if version.is_empty() {
        return Err(FieldError::InvalidVersionLine(line.to_string()));
    }

    Ok((version.to_string(), parse_review_date(date)?))
}

/// Parses a storefront date such as `"Jun 10, 2016"` or `"June 10, 2016"`
pub fn parse_review_date(text: &str) -> Result<DateTime<Utc>, FieldError> {
    let text = text.trim();

    ["%b %d, %Y", "%B %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| FieldError::InvalidDate(text.to_string()))
}
