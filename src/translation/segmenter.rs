/*!
 * Line-oriented segmentation of annotated markdown documents.
 *
 * Every non-blank line becomes one segment. HTML comments on a line of their
 * own (`<!-- Keep brand names -->`) are instructions: they set the context
 * carried by every following segment until another annotation replaces it.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::fingerprint::{Fingerprint, fingerprint};

/// Complete annotation on a single line
static ANNOTATION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!--(.*?)-->").unwrap());

/// Unpaired opening or closing delimiter
static STRAY_DELIMITER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!--|-->").unwrap());

/// Code fence line, with an optional info string
static FENCE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(```+|~~~+)[\w+.-]*\s*$").unwrap());

/// One translatable unit of source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Line content with annotations removed; leading indentation kept
    pub text: String,
    /// Instruction from the nearest preceding annotation, empty if none
    pub context: String,
    /// 1-based line number in the source document
    pub line: usize,
}

impl Segment {
    /// Cache fingerprint of this segment
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.context, &self.text)
    }

    /// Whether the line only opens or closes a code block
    pub fn is_fence(&self) -> bool {
        FENCE_REGEX.is_match(&self.text)
    }

    /// Leading whitespace of the source line
    pub fn indentation(&self) -> &str {
        let trimmed = self.text.trim_start();
        &self.text[..self.text.len() - trimmed.len()]
    }
}

/// What a single source line contributes
#[derive(Debug, PartialEq)]
enum LineKind {
    /// Nothing to translate
    Blank,
    /// Only annotations; carries the last one's trimmed text
    Annotation(String),
    /// Translatable text with annotations stripped
    Text(String),
}

fn classify(line: &str) -> LineKind {
    let last_annotation = ANNOTATION_REGEX
        .captures_iter(line)
        .last()
        .map(|caps| caps[1].trim().to_string());

    let stripped = strip_annotations(line);
    if !stripped.trim().is_empty() {
        return LineKind::Text(stripped.trim_end().to_string());
    }

    match last_annotation {
        Some(instruction) => LineKind::Annotation(instruction),
        None => LineKind::Blank,
    }
}

/// Fold state: the context in force and the segments emitted so far
#[derive(Debug, Default)]
struct SegmentAccumulator {
    context: String,
    segments: Vec<Segment>,
}

impl SegmentAccumulator {
    fn push_line(mut self, line_number: usize, line: &str) -> Self {
        match classify(line) {
            LineKind::Blank => {}
            LineKind::Annotation(instruction) => self.context = instruction,
            LineKind::Text(text) => self.segments.push(Segment {
                text,
                context: self.context.clone(),
                line: line_number,
            }),
        }
        self
    }
}

/// Remove every annotation and stray delimiter from a line
pub fn strip_annotations(text: &str) -> String {
    let without_annotations = ANNOTATION_REGEX.replace_all(text, "");
    STRAY_DELIMITER_REGEX
        .replace_all(&without_annotations, "")
        .into_owned()
}

/// Split a document into ordered segments
pub fn segment(source: &str) -> Vec<Segment> {
    source
        .lines()
        .enumerate()
        .fold(SegmentAccumulator::default(), |acc, (index, line)| {
            acc.push_line(index + 1, line)
        })
        .segments
}
