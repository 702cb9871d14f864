use crate::markup::tree::{Element, Node};
use crate::markup::DecodeError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Turns a raw page payload into an element tree
///
/// Implementations must not keep state between calls; the collector invokes
/// the same decoder for every page of every source.
pub trait Decoder: Send + Sync {
    fn decode(&self, payload: &str) -> Result<Element, DecodeError>;
}

/// Decoder for the storefront's XML view documents, backed by `quick-xml`
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDecoder;

impl Decoder for XmlDecoder {
    fn decode(&self, payload: &str) -> Result<Element, DecodeError> {
        let mut reader = Reader::from_str(payload);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|e| DecodeError::Malformed {
                position,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => open.push(open_element(&start, position)?),
                Event::Empty(start) => {
                    let element = open_element(&start, position)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    // quick-xml rejects unmatched end tags before they get here
                    let element = open.pop().ok_or_else(|| DecodeError::Malformed {
                        position,
                        message: "closing tag without a matching opening tag".to_string(),
                    })?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| DecodeError::Malformed {
                        position,
                        message: e.to_string(),
                    })?;
                    push_text(&mut open, text.into_owned());
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    push_text(&mut open, text);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes
                _ => {}
            }
        }

        if let Some(unclosed) = open.pop() {
            return Err(DecodeError::Unclosed(unclosed.name));
        }

        root.ok_or(DecodeError::Empty)
    }
}

fn open_element(start: &BytesStart<'_>, position: u64) -> Result<Element, DecodeError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| DecodeError::Malformed {
            position,
            message: e.to_string(),
        })?;
        let value = attribute
            .unescape_value()
            .map_err(|e| DecodeError::Malformed {
                position,
                message: e.to_string(),
            })?;
        element.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }

    Ok(element)
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DecodeError> {
    match open.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(DecodeError::MultipleRoots),
    }
}

// Text outside the root element is ignored.
fn push_text(open: &mut [Element], text: String) {
    if let Some(parent) = open.last_mut() {
        parent.children.push(Node::Text(text));
    }
}
