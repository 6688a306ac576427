//! X12 wire format: delimiter detection and segment tokenization.

pub mod charset;
mod delimiters;
mod error;
mod segment;


pub use delimiters::{Delimiters, ISA_HEADER_LEN};
pub use error::ParseError;
pub use segment::{Segment, Segments};

/// Detect the delimiters declared by `text` and tokenize it
///
/// Tokenization starts at the ISA header; leading whitespace is skipped.
pub fn read(text: &str) -> Result<Segments<'_>, ParseError> {
    let delimiters = Delimiters::detect(text)?;
    Ok(Segments::new(text.trim_start(), delimiters))
}

/// Serialize segments with the given delimiters
///
/// With `line_breaks`, a newline follows every terminator.
pub fn render<'a, I>(segments: I, delimiters: &Delimiters, line_breaks: bool) -> String
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut out = String::new();
    for segment in segments {
        segment.write_to(&mut out, delimiters);
        if line_breaks && delimiters.segment != '\n' {
            out.push('\n');
        }
    }
    out
}
