//! Minimal .docx reader
//!
//! Pulls the body paragraphs out of `word/document.xml` together with the
//! bits of formatting the classifier needs: resolved style name, explicit
//! left indent and raw list-numbering level.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use super::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Twentieths of a point per point
const TWIPS_PER_POINT: f64 = 20.0;

/// One body paragraph as it appears in the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Run text, tabs and line breaks included
    pub text: String,
    /// Display name of the paragraph style, e.g. "List Bullet"
    pub style_name: Option<String>,
    /// `w:ind/@w:left` in twips
    pub left_indent_twips: Option<i64>,
    /// `w:numPr/w:ilvl/@w:val`
    pub numbering_level: Option<u32>,
}

impl Paragraph {
    /// Explicit left indent in points
    pub fn left_indent_pt(&self) -> Option<f64> {
        self.left_indent_twips.map(|twips| twips as f64 / TWIPS_PER_POINT)
    }
}

/// Paragraph style id -> display name, plus the default paragraph style
#[derive(Debug, Clone, Default)]
pub struct Styles {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl Styles {
    /// Name for a `w:pStyle` id; unknown or absent ids get the default style
    pub fn resolve(&self, style_id: Option<&str>) -> Option<String> {
        style_id
            .and_then(|id| self.names.get(id))
            .or(self.default_paragraph.as_ref())
            .cloned()
    }
}

/// Read every body paragraph of the .docx at `path`
pub fn read_paragraphs(path: &Path) -> Result<Vec<Paragraph>, DocumentError> {
    debug!(path = %path.display(), "read_paragraphs: called");
    let file = File::open(path).map_err(|source| DocumentError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let archive_err = |source: ZipError| DocumentError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let mut archive = ZipArchive::new(file).map_err(archive_err)?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)
        .map_err(archive_err)?
        .ok_or_else(|| archive_err(ZipError::FileNotFound))?;

    let styles = match read_part(&mut archive, STYLES_PART).map_err(archive_err)? {
        Some(xml) => parse_styles(&xml).map_err(|source| DocumentError::Xml {
            path: path.to_path_buf(),
            part: STYLES_PART,
            source,
        })?,
        None => {
            debug!("read_paragraphs: no styles part");
            Styles::default()
        }
    };

    parse_document(&document_xml, &styles).map_err(|source| DocumentError::Xml {
        path: path.to_path_buf(),
        part: DOCUMENT_PART,
        source,
    })
}

/// Contents of an archive member, `None` when it does not exist
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>, ZipError> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// Unescaped value of the attribute with the given local name
fn attr_value(element: &BytesStart<'_>, local_name: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

struct PendingStyle {
    id: Option<String>,
    name: Option<String>,
    paragraph: bool,
    default: bool,
}

/// Parse `word/styles.xml`
pub fn parse_styles(xml: &str) -> Result<Styles, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut styles = Styles::default();
    let mut pending: Option<PendingStyle> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"style" => {
                pending = Some(PendingStyle {
                    id: attr_value(&e, b"styleId")?,
                    name: None,
                    // w:type defaults to paragraph
                    paragraph: attr_value(&e, b"type")?.is_none_or(|t| t == "paragraph"),
                    default: matches!(attr_value(&e, b"default")?.as_deref(), Some("1" | "true" | "on")),
                });
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"name" => {
                if let Some(style) = pending.as_mut() {
                    style.name = attr_value(&e, b"val")?;
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"style" => {
                if let Some(style) = pending.take()
                    && style.paragraph
                    && let Some(name) = style.name
                {
                    // Last default wins
                    if style.default {
                        styles.default_paragraph = Some(name.clone());
                    }
                    if let Some(id) = style.id {
                        styles.names.insert(id, name);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(count = styles.names.len(), default = ?styles.default_paragraph, "parse_styles: done");
    Ok(styles)
}

/// Paragraph under construction; `depth` is the stack height with its `w:p` on top
struct ParagraphBuilder {
    depth: usize,
    text: String,
    style_id: Option<String>,
    left_indent_twips: Option<i64>,
    numbering_level: Option<u32>,
}

impl ParagraphBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            text: String::new(),
            style_id: None,
            left_indent_twips: None,
            numbering_level: None,
        }
    }

    /// Element path below the paragraph, text boxes excluded
    fn relative<'a>(&self, stack: &'a [Vec<u8>]) -> Option<Vec<&'a [u8]>> {
        let below = stack.get(self.depth..)?;
        if below.iter().any(|name| name.as_slice() == b"txbxContent") {
            return None;
        }
        Some(below.iter().map(Vec::as_slice).collect())
    }

    /// Handle a start or empty element whose ancestors are `stack`
    fn element(&mut self, element: &BytesStart<'_>, stack: &[Vec<u8>]) -> Result<(), quick_xml::Error> {
        let Some(path) = self.relative(stack) else {
            return Ok(());
        };

        let name = element.local_name();
        match (path.as_slice(), name.as_ref()) {
            ([b"pPr"], b"pStyle") => {
                self.style_id = attr_value(element, b"val")?;
            }
            ([b"pPr"], b"ind") => {
                let left = match attr_value(element, b"left")? {
                    Some(left) => Some(left),
                    None => attr_value(element, b"start")?,
                };
                self.left_indent_twips = left.and_then(|v| v.parse().ok());
            }
            ([b"pPr", b"numPr"], b"ilvl") => {
                self.numbering_level = attr_value(element, b"val")?.and_then(|v| v.parse().ok());
            }
            ([.., b"r"], b"tab") => self.text.push('\t'),
            ([.., b"r"], b"cr") => self.text.push('\n'),
            ([.., b"r"], b"br") => {
                // Page and column breaks carry no text
                if attr_value(element, b"type")?.is_none_or(|t| t == "textWrapping") {
                    self.text.push('\n');
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn accepts_text(&self, stack: &[Vec<u8>]) -> bool {
        self.relative(stack)
            .is_some_and(|path| path.last().is_some_and(|name| *name == b"t"))
    }

    fn finish(self, styles: &Styles) -> Paragraph {
        Paragraph {
            text: self.text,
            style_name: styles.resolve(self.style_id.as_deref()),
            left_indent_twips: self.left_indent_twips,
            numbering_level: self.numbering_level,
        }
    }
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|parent| parent.as_slice() == name)
}

/// Parse `word/document.xml` into its body paragraphs, in document order
///
/// Only direct children of `w:body` count; paragraphs inside tables or text
/// boxes are skipped.
pub fn parse_document(xml: &str, styles: &Styles) -> Result<Vec<Paragraph>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<ParagraphBuilder> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if let Some(builder) = current.as_mut() {
                    builder.element(&e, &stack)?;
                } else if e.local_name().as_ref() == b"p" && parent_is(&stack, b"body") {
                    current = Some(ParagraphBuilder::new(stack.len() + 1));
                }
                stack.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                if let Some(builder) = current.as_mut() {
                    builder.element(&e, &stack)?;
                } else if e.local_name().as_ref() == b"p" && parent_is(&stack, b"body") {
                    paragraphs.push(ParagraphBuilder::new(stack.len() + 1).finish(styles));
                }
            }
            Event::Text(t) => {
                if let Some(builder) = current.as_mut()
                    && builder.accepts_text(&stack)
                {
                    builder.text.push_str(&t.unescape()?);
                }
            }
            Event::End(_) => {
                stack.pop();
                if current.as_ref().is_some_and(|builder| stack.len() < builder.depth)
                    && let Some(builder) = current.take()
                {
                    paragraphs.push(builder.finish(styles));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(count = paragraphs.len(), "parse_document: done");
    Ok(paragraphs)
}
