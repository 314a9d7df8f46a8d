//! Avatar store over OpenDAL.

use bytes::Bytes;
use futures::TryStreamExt;
use futures::future::try_join_all;
use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::error::{StoreError, StoreResult};
use crate::key::ObjectKey;

/// JPEG magic bytes, used when the backend reports no content type.
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// One stored avatar blob with its metadata.
#[derive(Debug, Clone)]
pub struct StoredAvatar {
    /// Blob contents. `Bytes` keeps promotion's serve-and-persist
    /// fan-out a cheap reference-count bump from one storage read.
    pub bytes: Bytes,
    /// Content type reported by the backend, if any.
    pub content_type: Option<String>,
}

impl StoredAvatar {
    /// Returns the blob size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Whether this blob is servable as `image/jpeg`.
    ///
    /// Backends without metadata support report no content type; those
    /// fall back to sniffing the JPEG magic bytes.
    pub fn is_jpeg(&self) -> bool {
        match self.content_type.as_deref() {
            Some(content_type) => content_type == "image/jpeg",
            None => self.bytes.starts_with(&JPEG_MAGIC),
        }
    }
}

/// One page of a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    /// Object keys on this page.
    pub keys: Vec<String>,
    /// Cursor to resume after this page; `None` on the final page.
    pub cursor: Option<String>,
    /// Whether more keys remain past this page.
    pub truncated: bool,
}

/// Key-value blob store for avatars, wrapping an OpenDAL operator.
///
/// Provides per-key atomicity only; no cross-key transactions. Callers
/// tolerate racing writes by always writing content-addressed truth.
#[derive(Clone)]
pub struct AvatarStore {
    operator: Operator,
}

impl std::fmt::Debug for AvatarStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarStore")
            .field("scheme", &self.operator.info().scheme())
            .finish_non_exhaustive()
    }
}

impl AvatarStore {
    /// Wraps an already-built operator.
    pub fn from_operator(operator: Operator) -> Self {
        Self { operator }
    }

    /// Creates an in-memory store, used by tests and local development.
    pub fn memory() -> StoreResult<Self> {
        let operator = Operator::new(services::Memory::default())
            .map_err(|e| StoreError::init(e.to_string()))?
            .finish();
        Ok(Self::from_operator(operator))
    }

    /// Reads a blob, returning `None` on a miss.
    pub async fn get(&self, key: &ObjectKey) -> StoreResult<Option<StoredAvatar>> {
        let path = key.to_string();

        let meta = match self.operator.stat(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let buffer = match self.operator.read(&path).await {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            key = %path,
            size = buffer.len(),
            content_type = ?meta.content_type(),
            "Blob read complete"
        );

        Ok(Some(StoredAvatar {
            bytes: buffer.to_bytes(),
            content_type: meta.content_type().map(str::to_owned),
        }))
    }

    /// Writes a blob and returns the key the backend reports back.
    pub async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
    ) -> StoreResult<String> {
        let path = key.to_string();

        tracing::debug!(
            target: TRACING_TARGET,
            key = %path,
            size = bytes.len(),
            content_type = %content_type,
            "Writing blob"
        );

        let mut writer = self.operator.write_with(&path, bytes);
        if self
            .operator
            .info()
            .full_capability()
            .write_with_content_type
        {
            writer = writer.content_type(content_type);
        }
        writer.await?;

        Ok(path)
    }

    /// Lists one page of keys under a prefix.
    ///
    /// `cursor` resumes after a previously returned key. An empty or
    /// non-truncated page ends iteration.
    pub async fn list_page(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<ListPage> {
        let mut lister = self.operator.lister_with(prefix).recursive(true).await?;

        let mut keys = Vec::new();
        let mut truncated = false;
        while let Some(entry) = lister.try_next().await? {
            if entry.metadata().mode().is_dir() {
                continue;
            }
            let path = entry.path().to_string();
            if cursor.is_some_and(|c| path.as_str() <= c) {
                continue;
            }
            if keys.len() == limit {
                truncated = true;
                break;
            }
            keys.push(path);
        }

        let cursor = truncated.then(|| keys.last().cloned()).flatten();
        Ok(ListPage {
            keys,
            cursor,
            truncated,
        })
    }

    /// Deletes a batch of keys.
    pub async fn delete_many(&self, keys: &[String]) -> StoreResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            count = keys.len(),
            "Deleting blobs"
        );

        try_join_all(keys.iter().map(|key| self.operator.delete(key))).await?;
        Ok(())
    }
}
