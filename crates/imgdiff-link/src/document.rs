//! Opened image documents.
//!
//! A [`Document`] is a cheap, clonable handle to one opened resource. Its
//! raw bytes and decoded image are produced lazily, at most once, and
//! shared by every caller; concurrent requesters await the same in-flight
//! read instead of starting their own.
//!
//! The host disposes a document when it closes it. Disposal runs every
//! registered hook synchronously, which is how pairing indices drop their
//! back-references.

use std::path::PathBuf;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use imgdiff_engine::{DiffError, RgbaImage};
use tokio::sync::OnceCell;

use crate::address::Address;
use crate::lifecycle::Lifecycle;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

/// Where a document's bytes come from.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Bytes already in memory (untitled buffers, VCS blobs handed over
    /// by the host).
    Inline(Vec<u8>),
    /// A file read asynchronously on first access.
    File(PathBuf),
}

struct Inner {
    id: DocumentId,
    address: Address,
    source: ByteSource,
    bytes: OnceCell<Vec<u8>>,
    decoded: OnceCell<Result<RgbaImage, DiffError>>,
    lifecycle: Lifecycle,
}

/// One opened image resource.
#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

impl Document {
    /// Open a document whose bytes come from `source`.
    #[must_use]
    pub fn new(address: Address, source: ByteSource) -> Self {
        let id = DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Rc::new(Inner {
                id,
                address,
                source,
                bytes: OnceCell::new(),
                decoded: OnceCell::new(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    /// Open a document over in-memory bytes.
    #[must_use]
    pub fn from_bytes(address: Address, bytes: Vec<u8>) -> Self {
        Self::new(address, ByteSource::Inline(bytes))
    }

    /// This document's identity.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.inner.id
    }

    /// The address the document was opened under.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    /// Raw bytes, read on first access and cached.
    ///
    /// A file that cannot be read yields empty bytes, which decode as
    /// "not available".
    pub async fn bytes(&self) -> &[u8] {
        self.inner
            .bytes
            .get_or_init(|| read_source(&self.inner.source, &self.inner.address))
            .await
    }

    /// The decoded image or the reason it could not be decoded, computed
    /// on first access and cached.
    pub async fn decoded(&self) -> &Result<RgbaImage, DiffError> {
        self.inner
            .decoded
            .get_or_init(|| async { imgdiff_engine::decode(self.bytes().await) })
            .await
    }

    /// The decoded image, or `None` if the bytes are empty or undecodable.
    pub async fn image(&self) -> Option<&RgbaImage> {
        self.decoded().await.as_ref().ok()
    }

    /// Register `hook` to run when this document is disposed.
    ///
    /// Runs immediately if the document is already disposed.
    pub fn on_dispose(&self, hook: impl FnOnce() + 'static) {
        self.inner.lifecycle.on_dispose(Box::new(hook));
    }

    /// Dispose the document, running every disposal hook. Idempotent.
    pub fn dispose(&self) {
        if self.inner.lifecycle.dispose() {
            tracing::trace!(document = %self.inner.address, "document disposed");
        }
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.lifecycle.is_disposed()
    }

    #[cfg(test)]
    pub(crate) fn dispose_hook_count(&self) -> usize {
        self.inner.lifecycle.hook_count()
    }

    /// A non-owning reference to this document.
    #[must_use]
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            id: self.inner.id,
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Document {}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.inner.id)
            .field("address", &self.inner.address)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

/// Non-owning reference to a [`Document`].
#[derive(Debug, Clone)]
pub struct WeakDocument {
    id: DocumentId,
    inner: Weak<Inner>,
}

impl WeakDocument {
    /// Identity of the referenced document, available even after it is
    /// dropped.
    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// The document, if it is still alive and not disposed.
    #[must_use]
    pub fn upgrade(&self) -> Option<Document> {
        self.inner
            .upgrade()
            .map(|inner| Document { inner })
            .filter(|doc| !doc.is_disposed())
    }
}

async fn read_source(source: &ByteSource, address: &Address) -> Vec<u8> {
    match source {
        ByteSource::Inline(bytes) => bytes.clone(),
        ByteSource::File(path) => match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    document = %address,
                    path = %path.display(),
                    error = %err,
                    "failed to read document bytes",
                );
                Vec::new()
            }
        },
    }
}
