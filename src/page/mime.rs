//! Content-type resolution for download responses.

/// Payload kinds a download can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Binary,
    Text,
}

/// Collaborator mapping a download kind to its default content type.
pub trait MimeLookup: Send + Sync {
    fn content_type(&self, kind: DownloadKind) -> String;
}

/// Built-in lookup used when the embedder supplies nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMimeLookup;

impl MimeLookup for DefaultMimeLookup {
    fn content_type(&self, kind: DownloadKind) -> String {
        match kind {
            DownloadKind::Binary => "application/octet-stream".to_string(),
            DownloadKind::Text => "text/html; charset=utf-8".to_string(),
        }
    }
}
