//! In-memory store of open documents

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::Url;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(Url),
}

/// Full text of an open document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    /// Version reported by the client, if any
    pub version: Option<i32>,
}

impl Document {
    pub fn new(text: impl Into<String>, version: Option<i32>) -> Self {
        Self {
            text: text.into(),
            version,
        }
    }

    /// Splits the text into lines without their terminators
    ///
    /// Always yields at least one line; a trailing newline produces a final empty line.
    pub fn lines(&self) -> Vec<&str> {
        self.text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }

    /// Replaces the text unless `version` is older than the stored one
    ///
    /// Returns false when the update was stale and ignored.
    pub fn update(&mut self, text: String, version: Option<i32>) -> bool {
        if let (Some(current), Some(incoming)) = (self.version, version)
            && incoming < current
        {
            return false;
        }
        self.text = text;
        self.version = version;
        true
    }
}

/// Handle to a single document, locked for the duration of a read-modify-publish cycle
pub type DocumentHandle = Arc<Mutex<Document>>;

/// Map from URI to the latest known document content
#[derive(Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<Url, DocumentHandle>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `uri`, creating an empty document if it is unknown
    pub async fn entry(&self, uri: &Url) -> DocumentHandle {
        if let Some(handle) = self.documents.read().await.get(uri) {
            return handle.clone();
        }

        self.documents
            .write()
            .await
            .entry(uri.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Document::new("", None))))
            .clone()
    }

    /// Returns the handle for `uri` if the document was opened
    pub async fn handle(&self, uri: &Url) -> Result<DocumentHandle, DocumentError> {
        self.documents
            .read()
            .await
            .get(uri)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(uri.clone()))
    }

    /// Returns a snapshot of the current document content
    pub async fn get(&self, uri: &Url) -> Result<Document, DocumentError> {
        let handle = self.handle(uri).await?;
        let document = handle.lock().await;
        Ok(document.clone())
    }

    /// Overwrites the content for `uri` unconditionally
    pub async fn put(&self, uri: &Url, text: impl Into<String>) {
        let handle = self.entry(uri).await;
        let mut document = handle.lock().await;
        *document = Document::new(text, None);
    }

    pub async fn remove(&self, uri: &Url) -> Option<Document> {
        let handle = self.documents.write().await.remove(uri)?;
        debug!("Removed document {}", uri);
        let document = handle.lock().await;
        Some(document.clone())
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}
