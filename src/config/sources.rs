use crate::ConfigError;
use std::collections::HashSet;

/// Ordered list of storefront listing identifiers to visit
///
/// Built from either a single identifier or a collection of them. Nothing is
/// checked on conversion; [`SourceList::validate`] runs when the collector is
/// constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList(Vec<String>);

impl SourceList {
    /// Rejects blank and repeated identifiers
    ///
    /// An empty list is valid; the run completes without fetching anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for id in &self.0 {
            if id.trim().is_empty() {
                return Err(ConfigError::InvalidSource(id.clone()));
            }

            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateSource(id.clone()));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for SourceList {
    fn from(id: &str) -> Self {
        Self(vec![id.to_string()])
    }
}

impl From<String> for SourceList {
    fn from(id: String) -> Self {
        Self(vec![id])
    }
}

impl From<Vec<String>> for SourceList {
    fn from(ids: Vec<String>) -> Self {
        Self(ids)
    }
}

impl From<Vec<&str>> for SourceList {
    fn from(ids: Vec<&str>) -> Self {
        Self(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for SourceList {
    fn from(ids: &[&str]) -> Self {
        Self(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SourceList {
    fn from(ids: [&str; N]) -> Self {
        Self(ids.iter().map(|id| id.to_string()).collect())
    }
}
