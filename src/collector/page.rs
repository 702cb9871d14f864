//! Page decoding: locating the review list and extracting every review
//!
//! A page either yields its full ordered review list or fails as a whole;
//! nothing is published for a failed page. With `skip_malformed` enabled a
//! bad review is logged and dropped instead of failing the page.

use crate::collector::events::{EventBus, PageComplete, PageDecision, RecordFound};
use crate::collector::extract::{extract_review, FieldError};
use crate::collector::record::Review;
use crate::markup::{Element, PathError, Step};
use thiserror::Error;

/// Name of the document root of a review page
const ROOT_ELEMENT: &str = "Document";

/// Path from the document root to the element holding one `VBoxView` per review
const REVIEW_LIST_PATH: [Step; 7] = [
    Step::new("View", 0),
    Step::new("ScrollView", 0),
    Step::new("VBoxView", 0),
    Step::new("View", 0),
    Step::new("MatrixView", 0),
    Step::new("VBoxView", 0),
    Step::new("VBoxView", 0),
];

const REVIEW_ELEMENT: &str = "VBoxView";

/// The decoded page does not have the expected shape
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("review list not found, the listing may not exist: {0}")]
    MissingReviewList(PathError),

    #[error("review {index} is malformed: {reason}")]
    MalformedReview { index: usize, reason: FieldError },
}

/// Locates the review list of a decoded page
pub fn review_list(root: &Element) -> Result<&Element, StructureError> {
    if root.name != ROOT_ELEMENT {
        return Err(StructureError::MissingReviewList(PathError {
            parent: root.name.clone(),
            missing: ROOT_ELEMENT.to_string(),
            resolved: 0,
        }));
    }

    root.descend(&REVIEW_LIST_PATH)
        .map_err(StructureError::MissingReviewList)
}

/// Extracts every review of a decoded page, in document order
///
/// An empty list is a valid, empty page.
pub fn extract_page(
    root: &Element,
    source_id: &str,
    page: u32,
    skip_malformed: bool,
) -> Result<Vec<Review>, StructureError> {
    let list = review_list(root)?;
    let mut reviews = Vec::new();

    for (index, node) in list.children_named(REVIEW_ELEMENT).enumerate() {
        match extract_review(node, source_id, page) {
            Ok(review) => reviews.push(review),
            Err(reason) if skip_malformed => {
                tracing::warn!(
                    "Skipping malformed review {} on page {} of {}: {}",
                    index,
                    page,
                    source_id,
                    reason
                );
            }
            Err(reason) => return Err(StructureError::MalformedReview { index, reason }),
        }
    }

    Ok(reviews)
}

/// Publishes one `record-found` per review, then the `page-complete` event
pub(crate) fn publish_page(
    events: &EventBus,
    source_id: &str,
    page: u32,
    reviews: Vec<Review>,
    decision: Option<PageDecision>,
) {
    for review in &reviews {
        events.emit_record_found(&RecordFound {
            source_id: source_id.to_string(),
            page,
            review: review.clone(),
        });
    }

    events.emit_page_complete(&PageComplete {
        source_id: source_id.to_string(),
        page,
        reviews,
        decision,
    });
}
