//! File-backed stores for running the provisioning flow off-device.
//!
//! - [`FileBlobStore`] maps a blob UID to `<dir>/<uid>.pem`, with the UID
//!   rendered as at least four lowercase hex digits (`0100.pem`).
//! - [`FileProvisioningStore`] keeps every item in `<dir>/items.json` and
//!   rewrites the document atomically after each change.

use crate::items::FactoryItem;
use crate::store::{
    copy_blob, BlobInfo, BlobStore, MemoryProvisioningStore, ProvisioningStore, StorageUid,
    StoredItem,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the provisioning store document inside its directory.
pub const ITEMS_FILE: &str = "items.json";

/// Blob store reading one file per UID from a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the path the blob `uid` is read from.
    pub fn blob_path(&self, uid: StorageUid) -> PathBuf {
        self.dir.join(format!("{uid:04x}.pem"))
    }

    fn not_found(&self, uid: StorageUid, err: std::io::Error) -> Error {
        if err.kind() == ErrorKind::NotFound {
            Error::Storage(format!(
                "no blob stored under uid {uid:#x} ({})",
                self.blob_path(uid).display()
            ))
        } else {
            Error::Io(err)
        }
    }
}

impl BlobStore for FileBlobStore {
    fn info(&self, uid: StorageUid) -> Result<BlobInfo> {
        let meta = fs::metadata(self.blob_path(uid)).map_err(|e| self.not_found(uid, e))?;
        let size = usize::try_from(meta.len())
            .map_err(|_| Error::Storage(format!("blob {uid:#x} is too large")))?;
        Ok(BlobInfo { size })
    }

    fn read(&self, uid: StorageUid, buf: &mut [u8]) -> Result<usize> {
        let blob = fs::read(self.blob_path(uid)).map_err(|e| self.not_found(uid, e))?;
        copy_blob(&blob, buf)
    }
}

/// On-disk layout of [`FileProvisioningStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    items: BTreeMap<String, StoredItem>,
    #[serde(default)]
    trust_anchor: Option<String>,
}

/// Provisioning store persisted as JSON in a directory.
///
/// The store counts as initialized when its directory exists.
#[derive(Debug)]
pub struct FileProvisioningStore {
    dir: PathBuf,
    inner: MemoryProvisioningStore,
}

impl FileProvisioningStore {
    /// Opens the store in `dir`, loading `items.json` if present.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let path = dir.join(ITEMS_FILE);

        let doc = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<StoreDocument>(&bytes).map_err(|e| {
                Error::Storage(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut inner = MemoryProvisioningStore::from_items(doc.items);
        if let Some(name) = doc.trust_anchor {
            inner.set_trust_anchor(&name)?;
        }
        debug!(dir = %dir.display(), items = inner.items().len(), "opened provisioning store");

        Ok(Self { dir, inner })
    }

    /// Creates the store directory if needed, then opens it.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Self::open(dir)
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the item stored under `name`.
    pub fn item(&self, name: &str) -> Option<&StoredItem> {
        self.inner.item(name)
    }

    /// Returns all stored items ordered by name.
    pub fn items(&self) -> &BTreeMap<String, StoredItem> {
        self.inner.items()
    }

    /// Returns the name of the item registered as trust anchor.
    pub fn trust_anchor_item(&self) -> Option<&str> {
        self.inner.trust_anchor_item()
    }

    /// Applies `change` to a copy of the items, and adopts the copy only
    /// once it is on disk.
    fn update(
        &mut self,
        change: impl FnOnce(&mut MemoryProvisioningStore) -> Result<()>,
    ) -> Result<()> {
        let mut next = self.inner.clone();
        change(&mut next)?;
        self.persist(&next)?;
        self.inner = next;
        Ok(())
    }

    fn persist(&self, store: &MemoryProvisioningStore) -> Result<()> {
        let doc = StoreDocument {
            items: store.items().clone(),
            trust_anchor: store.trust_anchor_item().map(str::to_string),
        };
        let json = serde_json::to_vec_pretty(&doc)
            .map_err(|e| Error::Storage(format!("failed to serialize store: {e}")))?;

        let path = self.dir.join(ITEMS_FILE);
        let tmp = self.dir.join(format!("{ITEMS_FILE}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl ProvisioningStore for FileProvisioningStore {
    fn is_initialized(&self) -> bool {
        self.dir.is_dir()
    }

    fn store_item(&mut self, item: &FactoryItem, factory: bool) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        self.update(|store| store.store_item(item, factory))
    }

    fn set_trust_anchor(&mut self, ca_item: &str) -> Result<()> {
        self.update(|store| store.set_trust_anchor(ca_item))
    }
}
