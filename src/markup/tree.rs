use std::fmt;
use thiserror::Error;

/// A node of the decoded tree: either a nested element or a run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// One decoded markup element with its attributes and mixed content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// One step of a fixed structural path: the `index`-th child element named `name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub name: &'static str,
    pub index: usize,
}

impl Step {
    pub const fn new(name: &'static str, index: usize) -> Self {
        Self { name, index }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

/// A structural path did not resolve
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no {missing} under <{parent}> (after {resolved} steps)")]
pub struct PathError {
    /// Name of the last element that did resolve
    pub parent: String,

    /// The step that failed
    pub missing: String,

    /// Number of steps resolved before the failure
    pub resolved: usize,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the value of the first attribute called `name`
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Iterates over child elements called `name`, in document order
    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.elements().filter(move |element| element.name == name)
    }

    /// Returns the `index`-th child element called `name`
    pub fn child(&self, name: &str, index: usize) -> Option<&Element> {
        self.elements()
            .filter(|element| element.name == name)
            .nth(index)
    }

    /// Follows `path` from this element, failing on the first step that does not resolve
    pub fn descend(&self, path: &[Step]) -> Result<&Element, PathError> {
        let mut current = self;

        for (resolved, step) in path.iter().enumerate() {
            current = current
                .child(step.name, step.index)
                .ok_or_else(|| PathError {
                    parent: current.name.clone(),
                    missing: step.to_string(),
                    resolved,
                })?;
        }

        Ok(current)
    }

    /// Direct text content of this element, trimmed
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            if let Node::Text(run) = node {
                text.push_str(run);
            }
        }
        text.trim().to_string()
    }

    /// All descendant text in document order, with whitespace runs collapsed
    pub fn deep_text(&self) -> String {
        let mut runs = Vec::new();
        self.collect_text(&mut runs);
        runs.concat()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn collect_text<'a>(&'a self, runs: &mut Vec<&'a str>) {
        for node in &self.children {
            match node {
                Node::Text(run) => runs.push(run),
                Node::Element(element) => element.collect_text(runs),
            }
        }
    }
}
