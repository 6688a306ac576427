use super::ParseError;

/// Fixed length of the ISA segment including its terminator
pub const ISA_HEADER_LEN: usize = 106;

const ELEMENT_INDEX: usize = 3;
const REPEAT_ELEMENT_INDEX: usize = 103;
const COMPONENT_INDEX: usize = 104;
const TERMINATOR_INDEX: usize = 105;

/// Separators self-declared by an interchange header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Ends every segment (ISA char 106)
    pub segment: char,
    /// Separates elements within a segment (ISA char 4)
    pub element: char,
    /// Separates components within a composite element (ISA16)
    pub component: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            segment: '~',
            element: '*',
            component: ':',
        }
    }
}

impl Delimiters {
    /// Recover the delimiters from the fixed layout of the leading ISA segment.
    ///
    /// Leading whitespace is ignored. Line breaks inside the fixed fields
    /// (80-column wrapped files) are skipped; the separator and terminator
    /// positions are taken as-is, so a newline terminator is supported.
    pub fn detect(text: &str) -> Result<Self, ParseError> {
        let text = text.trim_start();
        if !text.starts_with("ISA") {
            return Err(ParseError::MalformedHeader(
                "starting 'ISA' not found".to_string(),
            ));
        }

        let mut header: Vec<char> = Vec::with_capacity(ISA_HEADER_LEN);
        for c in text.chars() {
            if header.len() == ISA_HEADER_LEN {
                break;
            }
            let fixed_field = header.len() != ELEMENT_INDEX && header.len() != TERMINATOR_INDEX;
            if fixed_field && is_line_break(c) {
                continue;
            }
            header.push(c);
        }

        if header.len() < ISA_HEADER_LEN {
            return Err(ParseError::MalformedHeader(format!(
                "header is {} characters, expected {}",
                header.len(),
                ISA_HEADER_LEN
            )));
        }

        let delimiters = Self {
            segment: header[TERMINATOR_INDEX],
            element: header[ELEMENT_INDEX],
            component: header[COMPONENT_INDEX],
        };

        if header[REPEAT_ELEMENT_INDEX] != delimiters.element {
            return Err(ParseError::MalformedHeader(format!(
                "element separator '{}' does not precede ISA16 (found '{}')",
                delimiters.element, header[REPEAT_ELEMENT_INDEX]
            )));
        }

        delimiters.validate()?;
        Ok(delimiters)
    }

    /// Whether `c` is one of the three separators
    pub(crate) fn contains(&self, c: char) -> bool {
        c == self.segment || c == self.element || c == self.component
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.segment == self.element
            || self.segment == self.component
            || self.element == self.component
        {
            return Err(ParseError::MalformedHeader(format!(
                "delimiters are not distinct: segment '{}', element '{}', component '{}'",
                self.segment.escape_debug(),
                self.element.escape_debug(),
                self.component.escape_debug()
            )));
        }

        for c in [self.segment, self.element, self.component] {
            if c.is_ascii_alphanumeric() {
                return Err(ParseError::MalformedHeader(format!(
                    "alphanumeric delimiter '{}'",
                    c
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}
