use super::delimiters::is_line_break;
use super::{Delimiters, ParseError};
use std::fmt;
use std::str::Split;

/// One X12 segment: the tag followed by its data elements
///
/// Indexing follows X12 reference designators, so `element(13)` of an ISA
/// segment is ISA13. Composite elements are kept as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    elements: Vec<String>,
}

impl Segment {
    pub fn new(elements: Vec<String>) -> Self {
        Self { elements }
    }

    /// Build a segment from a tag and its data elements
    pub fn from_parts<I, S>(tag: &str, data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut elements = vec![tag.to_string()];
        elements.extend(data.into_iter().map(Into::into));
        Self { elements }
    }

    pub fn tag(&self) -> &str {
        self.elements.first().map(String::as_str).unwrap_or("")
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag() == tag
    }

    /// Element at an X12 position (1 = first data element)
    pub fn element(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Replace the element at `index`, padding with empty elements if needed
    pub fn set_element(&mut self, index: usize, value: impl Into<String>) {
        if self.elements.len() <= index {
            self.elements.resize(index + 1, String::new());
        }
        self.elements[index] = value.into();
    }

    pub fn with_element(mut self, index: usize, value: impl Into<String>) -> Self {
        self.set_element(index, value);
        self
    }

    /// Append this segment and its terminator to `out`
    pub fn write_to(&self, out: &mut String, delimiters: &Delimiters) {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                out.push(delimiters.element);
            }
            out.push_str(element);
        }
        out.push(delimiters.segment);
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.elements.join("*"))
    }
}

/// Lazy, single-pass tokenizer over the text of one source file
pub struct Segments<'a> {
    fragments: Split<'a, char>,
    delimiters: Delimiters,
    position: usize,
}

impl<'a> Segments<'a> {
    pub fn new(text: &'a str, delimiters: Delimiters) -> Self {
        Self {
            fragments: text.split(delimiters.segment),
            delimiters,
            position: 0,
        }
    }

    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// Number of segments produced so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Strip line breaks (unless they are delimiters) and the whitespace
    /// between a terminator and the next tag.
    fn clean(&self, fragment: &str) -> String {
        let delimiters = self.delimiters;
        let cleaned: String = fragment
            .chars()
            .filter(|&c| !is_line_break(c) || delimiters.contains(c))
            .collect();
        cleaned
            .trim_start_matches(|c: char| c.is_whitespace() && !delimiters.contains(c))
            .to_string()
    }

    fn tokenize(&self, text: String) -> Result<Segment, ParseError> {
        let elements: Vec<String> = text
            .split(self.delimiters.element)
            .map(str::to_string)
            .collect();

        let tag = &elements[0];
        if tag.is_empty() {
            return Err(ParseError::Tokenization {
                position: self.position,
                reason: "empty segment tag".to_string(),
            });
        }
        if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ParseError::Tokenization {
                position: self.position,
                reason: format!("invalid segment tag '{}'", tag.escape_debug()),
            });
        }

        Ok(Segment::new(elements))
    }
}

impl Iterator for Segments<'_> {
    type Item = Result<Segment, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let fragment = self.fragments.next()?;
            let text = self.clean(fragment);
            if text.trim().is_empty() {
                continue;
            }
            self.position += 1;
            return Some(self.tokenize(text));
        }
    }
}
