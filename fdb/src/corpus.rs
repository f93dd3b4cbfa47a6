//! Corpus parsing: splitting a raw text blob into fortunes with derived metrics

use tracing::debug;

use crate::error::ParseError;

/// A single parsed fortune with its derived display metrics.
///
/// The text is owned by the fortune and immutable once created. Metrics are
/// computed at construction and count Unicode scalar values, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fortune {
    text: String,
    length: usize,
    width: usize,
    height: usize,
}

impl Fortune {
    /// Build a fortune from its text, computing length, width, and height.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        let mut width = 0;
        let mut height = 0;
        for line in text.split('\n') {
            height += 1;
            // A CR belonging to a CRLF terminator is not display width
            let line = line.strip_suffix('\r').unwrap_or(line);
            width = width.max(line.chars().count());
        }
        Self {
            text,
            length,
            width,
            height,
        }
    }

    /// The fortune text, internal line breaks included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total character count of the text.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Character count of the longest line.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of lines (one more than the line-break count).
    pub fn height(&self) -> usize {
        self.height
    }
}

/// Parse a corpus blob into fortunes.
///
/// A delimiter is the literal `%%` token at the start of a line; a single
/// line terminator immediately following the token is consumed with it. Any
/// other text on the delimiter line belongs to the next fortune. Every
/// delimiter introduces exactly one boundary, so a blob with `k` delimiters
/// always yields `k + 1` fortunes.
///
/// Each segment is trimmed of exactly one trailing line terminator (the one
/// that preceded the delimiter or ended the blob); leading and interior
/// whitespace is preserved verbatim since it is meaningful for width and
/// height. Metrics are computed from the trimmed text.
///
/// Policy choice: consecutive delimiters produce zero-length fortunes rather
/// than being coalesced, so ordinal positions map one-to-one onto the source
/// blob structure.
///
/// Fails only when `raw` is empty.
pub fn parse(raw: &str) -> Result<Vec<Fortune>, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut fortunes = Vec::new();
    let mut current = String::new();
    for line in raw.split_inclusive('\n') {
        match delimiter_rest(line) {
            Some(rest) => {
                fortunes.push(Fortune::new(trim_trailing_terminator(&current)));
                current.clear();
                current.push_str(rest);
            }
            None => current.push_str(line),
        }
    }
    fortunes.push(Fortune::new(trim_trailing_terminator(&current)));

    debug!(fortunes = fortunes.len(), "parsed corpus blob");
    Ok(fortunes)
}

/// If `line` starts with the delimiter token, return the remainder with one
/// directly-following line terminator consumed.
fn delimiter_rest(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(crate::DELIMITER)?;
    Some(
        rest.strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest),
    )
}

/// Remove at most one trailing line terminator.
fn trim_trailing_terminator(segment: &str) -> &str {
    segment
        .strip_suffix("\r\n")
        .or_else(|| segment.strip_suffix('\n'))
        .unwrap_or(segment)
}
