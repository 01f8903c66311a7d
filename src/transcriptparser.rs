use anyhow::{Context, Error};
use once_cell::sync::Lazy;
use pdf::{content::Operation, file::File, object::Page, primitive::Primitive};
use regex::Regex;
use std::borrow::Cow;
use tracing::{debug, trace};

// "MR. SMITH:" style speaker prefix at the start of a line
static SPEAKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Z .]*[A-Z.]):\s*").expect("Invalid speaker regex pattern"));

/// Page geometry of a line-numbered transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSettings {
    /// Text left of this x coordinate is a line number
    pub margin_x_left: f32,
    /// Text starting right of this x coordinate is an indented paragraph start
    pub indent_x_left: f32,
    /// Text below this y coordinate on the last line is the page number
    pub bottom_y_cutoff: f32,
}

impl PageSettings {
    pub fn new(margin_x_left: f32, indent_x_left: f32) -> Self {
        Self {
            margin_x_left,
            indent_x_left,
            bottom_y_cutoff: 27.0,
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self::new(112.0, 200.0)
    }
}

/// One numbered line of a transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub line: u32,
    pub text: String,
    pub new_paragraph: bool,
    pub speaker: String,
}

#[derive(Debug, Clone, PartialEq)]
struct TextObject<'src> {
    pub x: f32,
    pub y: f32,
    pub text: Cow<'src, str>,
}

#[derive(Debug, Clone)]
struct TextObjectParser<'src> {
    ops: std::slice::Iter<'src, Operation>,
}

impl<'src> Iterator for TextObjectParser<'src> {
    type Item = TextObject<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut last_coords = None;
        let mut last_text = None;

        while let Some(Operation { operator, operands }) = self.ops.next() {
            match (operator.as_str(), operands.as_slice()) {
                ("BT", _) => {
                    // Clear all prior state because we've just seen a
                    // "begin text" op
                    last_coords = None;
                    last_text = None;
                }
                ("Td", [x, y]) => {
                    if let (Ok(x), Ok(y)) = (x.as_number(), y.as_number()) {
                        last_coords = Some((x, y));
                    }
                }
                ("Tm", [_, _, _, _, e, f]) => {
                    // The translation components of the text matrix
                    if let (Ok(x), Ok(y)) = (e.as_number(), f.as_number()) {
                        last_coords = Some((x, y));
                    }
                }
                ("Tj", [Primitive::String(text)]) => {
                    last_text = text.as_str().ok();
                }
                ("TJ" | "Tj", [Primitive::Array(parts)]) => {
                    // Kerning adjustments are interleaved with the strings
                    let combined: String = parts
                        .iter()
                        .filter_map(|part| match part {
                            Primitive::String(text) => text.as_str().ok(),
                            _ => None,
                        })
                        .collect();
                    last_text = Some(Cow::from(combined));
                }
                ("ET", _) => {
                    // "end of text": yield if we saw both a position and some
                    // text, otherwise drop whatever we collected
                    if let (Some((x, y)), Some(text)) = (last_coords.take(), last_text.take()) {
                        return Some(TextObject { x, y, text });
                    }
                }
                _ => continue,
            }
        }

        None
    }
}

fn text_objects(operations: &[Operation]) -> impl Iterator<Item = TextObject<'_>> + '_ {
    TextObjectParser {
        ops: operations.iter(),
    }
}

/// Turns the positioned text of one page into numbered lines.
///
/// `speaker` carries over between pages, since a statement can continue past
/// a page break.
fn assemble_lines(
    mut text_objects: Vec<TextObject<'_>>,
    settings: &PageSettings,
    speaker: &mut String,
) -> Vec<TranscriptLine> {
    // Sort all text objects from top to bottom and then from left to right
    text_objects.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current_line: Option<u32> = None;
    let mut fragments: Vec<TextObject> = Vec::new();

    for text_obj in text_objects {
        if text_obj.x >= settings.margin_x_left {
            fragments.push(text_obj);
            continue;
        }

        // Left margin: a new line number. Blank fragments (" ") don't parse
        // and leave the current line alone.
        if let Ok(number) = text_obj.text.trim().parse::<u32>() {
            if let Some(line) = current_line {
                lines.extend(finish_line(line, &fragments, settings, speaker));
            }
            fragments.clear();
            current_line = Some(number);
        }
    }

    // The last line may share its y range with the page number
    fragments.retain(|o| o.y > settings.bottom_y_cutoff);
    if let Some(line) = current_line {
        lines.extend(finish_line(line, &fragments, settings, speaker));
    }

    lines
}

fn finish_line(
    line: u32,
    fragments: &[TextObject<'_>],
    settings: &PageSettings,
    speaker: &mut String,
) -> Option<TranscriptLine> {
    let joined: String = fragments.iter().map(|o| o.text.as_ref()).collect();
    let mut text = joined.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = SPEAKER_PATTERN.captures(text) {
        *speaker = caps[1].to_string();
        text = &text[caps[0].len()..];
    }

    let new_paragraph = fragments
        .first()
        .is_some_and(|o| o.x >= settings.indent_x_left);

    trace!(line, speaker = speaker.as_str(), text, "Transcript line");
    Some(TranscriptLine {
        line,
        text: text.to_string(),
        new_paragraph,
        speaker: speaker.clone(),
    })
}

fn parse_page(
    page: &Page,
    settings: &PageSettings,
    speaker: &mut String,
) -> Result<Vec<TranscriptLine>, Error> {
    let content = match &page.contents {
        Some(c) => c,
        None => return Ok(Vec::new()),
    };

    let objects = text_objects(&content.operations).collect::<Vec<TextObject>>();
    Ok(assemble_lines(objects, settings, speaker))
}

/// Extracts the numbered lines of every page of a PDF transcript.
pub fn parse_pdf_transcript(
    pdf: &File<Vec<u8>>,
    settings: &PageSettings,
) -> Result<Vec<TranscriptLine>, Error> {
    let mut lines = Vec::<TranscriptLine>::new();
    let mut speaker = String::from("UNKNOWN");

    for (i, page) in pdf.pages().enumerate() {
        let page = page.with_context(|| format!("Unable to load page {}", i + 1))?;
        let lines_on_page = parse_page(&page, settings, &mut speaker)
            .with_context(|| format!("Unable to parse the lines on page {}", i + 1))?;
        lines.extend(lines_on_page);
    }

    debug!(lines = lines.len(), "Parsed PDF transcript");
    Ok(lines)
}

/// Joins transcript lines into running text.
pub fn transcript_text(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
