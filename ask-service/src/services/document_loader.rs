//! Context document loading.
//!
//! The document is read on every non-triggered request; nothing is cached.

use crate::models::ContextDocument;
use async_trait::async_trait;
use std::path::PathBuf;

/// Error type for document loading.
#[derive(Debug, thiserror::Error)]
pub enum DocumentLoadError {
    #[error("Failed to read context document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Context document {path} is empty")]
    Empty { path: String },
}

impl DocumentLoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentLoadError::Io { .. } => "io",
            DocumentLoadError::Empty { .. } => "empty",
        }
    }
}

/// Source of the text that grounds every session.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self) -> Result<ContextDocument, DocumentLoadError>;
}

/// Reads a UTF-8 file from disk on each call.
#[derive(Debug, Clone)]
pub struct FileDocumentLoader {
    path: PathBuf,
}

impl FileDocumentLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load(&self) -> Result<ContextDocument, DocumentLoadError> {
        let path = self.path.display().to_string();
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DocumentLoadError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path, len = text.len(), "Loaded context document");
        ContextDocument::new(text).ok_or(DocumentLoadError::Empty { path })
    }
}

/// Serves a fixed in-memory document.
#[derive(Debug, Clone, Default)]
pub struct StaticDocumentLoader {
    document: ContextDocument,
}

impl StaticDocumentLoader {
    pub fn new(document: ContextDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl DocumentLoader for StaticDocumentLoader {
    async fn load(&self) -> Result<ContextDocument, DocumentLoadError> {
        Ok(self.document.clone())
    }
}
