//! Directory walk over a data folder of documents

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::classifier::{ListStyleClassifier, ParagraphClassifier};
use super::{DocumentError, DocumentRecord, docx};

/// What to do when one document in the folder cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole load on the first bad document
    #[default]
    Abort,
    /// Log a warning and leave the document out
    Skip,
}

/// Loads every document below a directory into bullet records
pub struct DocumentLoader {
    classifier: Box<dyn ParagraphClassifier>,
    policy: FailurePolicy,
}

impl DocumentLoader {
    /// Loader using list-style classification
    pub fn new(policy: FailurePolicy) -> Self {
        Self::with_classifier(ListStyleClassifier, policy)
    }

    pub fn with_classifier(classifier: impl ParagraphClassifier + 'static, policy: FailurePolicy) -> Self {
        Self {
            classifier: Box::new(classifier),
            policy,
        }
    }

    /// Load one document
    pub fn load_file(&self, path: &Path) -> Result<DocumentRecord, DocumentError> {
        let paragraphs = docx::read_paragraphs(path)?;
        let content: Vec<_> = paragraphs.iter().filter_map(|p| self.classifier.classify(p)).collect();

        debug!(
            path = %path.display(),
            paragraphs = paragraphs.len(),
            bullets = content.len(),
            "load_file: done"
        );

        Ok(DocumentRecord {
            path: path.to_string_lossy().into_owned(),
            content,
        })
    }

    /// Load every file below `dir`, in walk order
    ///
    /// The order is whatever the filesystem yields and is not sorted.
    pub fn load(&self, dir: &Path) -> Result<Vec<DocumentRecord>, DocumentError> {
        debug!(dir = %dir.display(), policy = ?self.policy, "load: called");
        let mut records = Vec::new();

        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself is never skipped
                Err(e) if e.depth() == 0 => {
                    return Err(DocumentError::Walk {
                        path: dir.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    self.handle_failure(DocumentError::Walk { path, source: e })?;
                    continue;
                }
            };

            // Linked files are read; linked directories are not descended into
            let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && !entry.path().is_dir());
            if !is_file {
                continue;
            }

            match self.load_file(entry.path()) {
                Ok(record) => records.push(record),
                Err(e) => self.handle_failure(e)?,
            }
        }

        info!(dir = %dir.display(), documents = records.len(), "Loaded documents");
        Ok(records)
    }

    fn handle_failure(&self, error: DocumentError) -> Result<(), DocumentError> {
        match self.policy {
            FailurePolicy::Abort => Err(error),
            FailurePolicy::Skip => {
                warn!(path = %error.path().display(), error = %error, "Skipping unreadable document");
                Ok(())
            }
        }
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::BulletLine;
    use crate::documents::docx::Paragraph;
    use crate::documents::docx::tests::{STYLES_XML, document_xml, write_docx};
    use std::fs;
    use tempfile::tempdir;

    const BULLETS: &str = r#"
        <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Parish of Sé</w:t></w:r></w:p>
        <w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="0"/></w:numPr></w:pPr><w:r><w:t>1850 baptisms</w:t></w:r></w:p>
        <w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="1"/></w:numPr></w:pPr><w:r><w:t>mostly enslaved</w:t></w:r></w:p>
        <w:p><w:pPr><w:pStyle w:val="ListBullet2"/><w:ind w:left="2160"/></w:pPr><w:r><w:t>see folio 12</w:t></w:r></w:p>
        <w:p><w:pPr><w:pStyle w:val="ListParagraph"/></w:pPr><w:r><w:t>   </w:t></w:r></w:p>
        <w:p><w:r><w:t>closing remarks</w:t></w:r></w:p>"#;

    fn line(text: &str, indent: u32) -> BulletLine {
        BulletLine {
            text: text.to_string(),
            indent,
        }
    }

    #[test]
    fn test_load_file_extracts_bullets_in_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("se.docx");
        write_docx(&path, &document_xml(BULLETS), Some(STYLES_XML));

        let record = DocumentLoader::default().load_file(&path).unwrap();

        assert_eq!(record.path, path.to_string_lossy());
        assert_eq!(
            record.content,
            vec![line("1850 baptisms", 1), line("mostly enslaved", 2), line("see folio 12", 3)]
        );
    }

    #[test]
    fn test_load_walks_subdirectories() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("brazil/bahia")).unwrap();
        write_docx(&temp.path().join("a.docx"), &document_xml(BULLETS), Some(STYLES_XML));
        write_docx(&temp.path().join("brazil/bahia/b.docx"), &document_xml(""), Some(STYLES_XML));

        let records = DocumentLoader::default().load(temp.path()).unwrap();

        assert_eq!(records.len(), 2);
        let nested = records.iter().find(|r| r.path.ends_with("b.docx")).unwrap();
        assert!(nested.path.contains("bahia"));
        assert!(nested.content.is_empty());
    }

    #[test]
    fn test_load_aborts_on_bad_document_by_default() {
        let temp = tempdir().unwrap();
        write_docx(&temp.path().join("good.docx"), &document_xml(BULLETS), Some(STYLES_XML));
        fs::write(temp.path().join("notes.txt"), "not a docx").unwrap();

        let err = DocumentLoader::default().load(temp.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Archive { .. }));
        assert!(err.path().ends_with("notes.txt"));
    }

    #[test]
    fn test_load_skip_policy_leaves_bad_document_out() {
        let temp = tempdir().unwrap();
        write_docx(&temp.path().join("good.docx"), &document_xml(BULLETS), Some(STYLES_XML));
        fs::write(temp.path().join("notes.txt"), "not a docx").unwrap();

        let records = DocumentLoader::new(FailurePolicy::Skip).load(temp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].path.ends_with("good.docx"));
    }

    #[test]
    fn test_load_missing_directory_fails_even_when_skipping() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("data");

        let err = DocumentLoader::new(FailurePolicy::Skip).load(&missing).unwrap_err();
        assert!(matches!(err, DocumentError::Walk { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_reads_symlinked_file() {
        let temp = tempdir().unwrap();
        let data = temp.path().join("data");
        fs::create_dir(&data).unwrap();
        let outside = temp.path().join("outside.docx");
        write_docx(&outside, &document_xml(BULLETS), Some(STYLES_XML));
        std::os::unix::fs::symlink(&outside, data.join("linked.docx")).unwrap();

        let records = DocumentLoader::default().load(&data).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].path.ends_with("linked.docx"));
        assert_eq!(records[0].content.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_does_not_descend_into_symlinked_directory() {
        let temp = tempdir().unwrap();
        let data = temp.path().join("data");
        let other = temp.path().join("other");
        fs::create_dir(&data).unwrap();
        fs::create_dir(&other).unwrap();
        write_docx(&other.join("hidden.docx"), &document_xml(BULLETS), Some(STYLES_XML));
        std::os::unix::fs::symlink(&other, data.join("other")).unwrap();

        assert!(DocumentLoader::default().load(&data).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_broken_symlink_is_a_failure() {
        let temp = tempdir().unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.docx"), temp.path().join("dangling.docx")).unwrap();

        let err = DocumentLoader::default().load(temp.path()).unwrap_err();
        assert!(matches!(err, DocumentError::FileAccess { .. }));
    }

    #[test]
    fn test_load_empty_directory() {
        let temp = tempdir().unwrap();
        assert!(DocumentLoader::default().load(temp.path()).unwrap().is_empty());
    }

    struct EveryParagraph;

    impl ParagraphClassifier for EveryParagraph {
        fn classify(&self, paragraph: &Paragraph) -> Option<BulletLine> {
            Some(BulletLine {
                text: paragraph.text.clone(),
                indent: 0,
            })
        }
    }

    #[test]
    fn test_custom_classifier_replaces_list_heuristic() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("se.docx");
        write_docx(&path, &document_xml(BULLETS), Some(STYLES_XML));

        let record = DocumentLoader::with_classifier(EveryParagraph, FailurePolicy::Abort)
            .load_file(&path)
            .unwrap();

        assert_eq!(record.content.len(), 6);
        assert_eq!(record.content[0].text, "Parish of Sé");
    }

    #[test]
    fn test_failure_policy_deserializes_lowercase() {
        let policy: FailurePolicy = serde_yaml::from_str("skip").unwrap();
        assert_eq!(policy, FailurePolicy::Skip);
        assert!(serde_yaml::from_str::<FailurePolicy>("ignore").is_err());
    }
}
