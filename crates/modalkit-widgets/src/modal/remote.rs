#![forbid(unsafe_code)]

//! Remote dialog content.
//!
//! A dialog configured with `remote` asks the host's [`ContentLoader`] for
//! the URL once, when its controller is created. The loader may answer
//! immediately or from another thread: completions travel back through a
//! channel and are applied on the next [`ModalHost::pump`](super::ModalHost::pump).

use std::sync::mpsc;

use ahash::AHashMap;

/// Handle to one outstanding load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(pub(crate) u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: LoadId,
    pub url: String,
}

/// Failure reported by a [`ContentLoader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("no content found at {url}")]
    NotFound { url: String },
    #[error("loading {url} failed: {reason}")]
    Failed { url: String, reason: String },
}

pub(crate) type Completion = (LoadId, Result<String, LoadError>);

/// One-shot completion handle passed to a loader.
#[derive(Debug)]
pub struct LoadSink {
    id: LoadId,
    tx: mpsc::Sender<Completion>,
}

impl LoadSink {
    pub(crate) fn new(id: LoadId, tx: mpsc::Sender<Completion>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> LoadId {
        self.id
    }

    /// Deliver the result. Completions for a host that no longer exists are
    /// dropped.
    pub fn complete(self, result: Result<String, LoadError>) {
        if self.tx.send((self.id, result)).is_err() {
            tracing::trace!(load = self.id.0, "modal host gone; load result dropped");
        }
    }
}

/// Fetches remote dialog content.
pub trait ContentLoader {
    /// Start loading `request.url`; call [`LoadSink::complete`] when done.
    fn load(&mut self, request: LoadRequest, sink: LoadSink);
}

/// Loader serving content from an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    pages: AHashMap<String, String>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, content: impl Into<String>) -> Self {
        self.pages.insert(url.into(), content.into());
        self
    }
}

impl ContentLoader for StaticLoader {
    fn load(&mut self, request: LoadRequest, sink: LoadSink) {
        let result = self
            .pages
            .get(&request.url)
            .cloned()
            .ok_or(LoadError::NotFound { url: request.url });
        sink.complete(result);
    }
}
