//! Deciding which paragraphs are bullets, and how deep

use tracing::trace;

use super::BulletLine;
use super::docx::Paragraph;

/// Points of left indent per indentation level
const POINTS_PER_LEVEL: f64 = 36.0;

/// Turns a paragraph into a bullet line, or rejects it
pub trait ParagraphClassifier: Send + Sync {
    fn classify(&self, paragraph: &Paragraph) -> Option<BulletLine>;
}

/// Accepts non-blank paragraphs whose style name starts with "List"
///
/// Prefix matching picks up the numbered/bulleted sub-styles
/// ("List Bullet 2", "List Number", ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct ListStyleClassifier;

impl ParagraphClassifier for ListStyleClassifier {
    fn classify(&self, paragraph: &Paragraph) -> Option<BulletLine> {
        if paragraph.text.trim().is_empty() {
            return None;
        }

        let style = paragraph.style_name.as_deref()?;
        if !style.starts_with("List") {
            trace!(style, "ListStyleClassifier::classify: not a list style");
            return None;
        }

        Some(BulletLine {
            text: paragraph.text.clone(),
            indent: indent_level(paragraph),
        })
    }
}

/// Coarse nesting level of a list paragraph
///
/// An explicit non-zero left indent wins (36pt per level, truncated). Otherwise
/// a raw numbering level `n` maps to `n + 1`, so 0 still means "no list markup".
pub fn indent_level(paragraph: &Paragraph) -> u32 {
    if let Some(points) = paragraph.left_indent_pt()
        && points != 0.0
    {
        // Negative indents saturate to 0
        return (points / POINTS_PER_LEVEL) as u32;
    }

    match paragraph.numbering_level {
        Some(level) => level.saturating_add(1),
        None => 0,
    }
}
