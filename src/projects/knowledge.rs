//! Knowledge-base files and the content sniffing shared with chat attachments.

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;

use super::types::{KnowledgeFile, Project};

/// Largest image that gets an inline `data:` preview.
pub const MAX_PREVIEW_BYTES: usize = 300_000;
/// Largest text-like file whose contents are read.
pub const MAX_TEXT_BYTES: usize = 2_000_000;

const TEXT_MIME_PREFIXES: &[&str] = &[
    "text/",
    "application/json",
    "application/xml",
    "application/javascript",
];

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub fn is_text_like(mime: &str) -> bool {
    TEXT_MIME_PREFIXES.iter().any(|p| mime.starts_with(p))
}

/// UTF-8 contents of a text-like file, if it is small enough and decodes.
pub fn extract_text(mime: &str, bytes: &[u8]) -> Option<String> {
    if !is_text_like(mime) || bytes.len() > MAX_TEXT_BYTES {
        return None;
    }
    String::from_utf8(bytes.to_vec()).ok()
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

impl KnowledgeFile {
    /// Build a knowledge-base entry from raw file contents. `mime` falls back
    /// to a guess from the file name.
    pub fn from_bytes(name: &str, mime: Option<&str>, bytes: &[u8]) -> Self {
        let mime = mime
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(name));
        let preview = (mime.starts_with("image/") && bytes.len() <= MAX_PREVIEW_BYTES)
            .then(|| data_url(&mime, bytes));
        let text = extract_text(&mime, bytes);
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.to_string(),
            size: bytes.len() as u64,
            mime_type: mime,
            data_url: preview,
            text,
            added_at: super::now_timestamp(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");
        Ok(Self::from_bytes(name, None, &bytes))
    }
}

impl Project {
    pub fn add_knowledge_files(&mut self, files: impl IntoIterator<Item = KnowledgeFile>) {
        self.knowledge_base.extend(files);
    }

    pub fn remove_knowledge_file(&mut self, id: &str) -> bool {
        let before = self.knowledge_base.len();
        self.knowledge_base.retain(|f| f.id != id);
        self.knowledge_base.len() != before
    }

    /// Replace the assistant avatar with an inline image.
    pub fn set_profile_image(&mut self, mime: &str, bytes: &[u8]) {
        self.profile_image_data_url = Some(data_url(mime, bytes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_image_gets_preview() {
        let file = KnowledgeFile::from_bytes("dot.png", None, &[0x89, b'P', b'N', b'G']);
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.data_url.as_deref(), Some("data:image/png;base64,iVBORw=="));
        assert!(file.text.is_none());
    }

    #[test]
    fn large_image_has_no_preview() {
        let bytes = vec![0u8; MAX_PREVIEW_BYTES + 1];
        let file = KnowledgeFile::from_bytes("big.jpg", None, &bytes);
        assert!(file.data_url.is_none());
        assert_eq!(file.size, (MAX_PREVIEW_BYTES + 1) as u64);
    }

    #[test]
    fn markdown_text_is_extracted() {
        let file = KnowledgeFile::from_bytes("syllabus.md", None, b"# Week 1");
        assert_eq!(file.mime_type, "text/markdown");
        assert_eq!(file.text.as_deref(), Some("# Week 1"));
        assert!(file.data_url.is_none());
    }

    #[test]
    fn mime_guess_falls_back_to_octet_stream() {
        assert_eq!(guess_mime("notes.TXT"), "text/plain");
        assert_eq!(guess_mime("data.json"), "application/json");
        assert_eq!(guess_mime("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_mime("archive.unknownext"), "application/octet-stream");
        assert_eq!(guess_mime("no-extension"), "application/octet-stream");
    }

    #[test]
    fn explicit_mime_wins_over_guess() {
        let file = KnowledgeFile::from_bytes("data.bin", Some("text/csv"), b"a,b");
        assert_eq!(file.mime_type, "text/csv");
        assert_eq!(file.text.as_deref(), Some("a,b"));
    }

    #[test]
    fn binary_with_text_mime_is_skipped() {
        assert_eq!(extract_text("text/plain", &[0xff, 0xfe, 0x00]), None);
        assert_eq!(extract_text("application/pdf", b"%PDF"), None);
    }

    #[test]
    fn remove_knowledge_file_by_id() {
        let mut project = Project::new_default("KB");
        let file = KnowledgeFile::from_bytes("a.txt", None, b"a");
        let id = file.id.clone();
        project.add_knowledge_files([file]);
        assert!(project.remove_knowledge_file(&id));
        assert!(project.knowledge_base.is_empty());
    }
}
