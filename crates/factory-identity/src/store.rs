//! Storage collaborators of the provisioning flow.
//!
//! Two stores are involved:
//!
//! - [`BlobStore`] - the secure blob store the device certificate was
//!   written to during manufacturing. Blobs are addressed by numeric UID and
//!   read with a size-then-fetch pattern.
//! - [`ProvisioningStore`] - the key/value store the device client reads its
//!   factory items and trust anchor from.
//!
//! In-memory implementations of both are provided here; file-backed ones
//! live in [`crate::file_store`].

use crate::items::{FactoryItem, ItemKind};
use crate::trust::TrustAnchor;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Numeric identifier of a blob in the secure blob store.
pub type StorageUid = u64;

/// Metadata of a stored blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobInfo {
    /// Blob size in bytes.
    pub size: usize,
}

/// A secure blob store addressed by numeric UID.
pub trait BlobStore {
    /// Returns metadata for the blob stored under `uid`.
    fn info(&self, uid: StorageUid) -> Result<BlobInfo>;

    /// Reads the blob stored under `uid` into `buf`, returning the bytes read.
    fn read(&self, uid: StorageUid, buf: &mut [u8]) -> Result<usize>;
}

/// The key/value store factory items are written to.
pub trait ProvisioningStore {
    /// Returns true once the store is ready to accept items.
    fn is_initialized(&self) -> bool;

    /// Writes one item. `factory` marks it as an immutable factory item.
    fn store_item(&mut self, item: &FactoryItem, factory: bool) -> Result<()>;

    /// Registers the certificate item `ca_item` as the bootstrap trust anchor.
    fn set_trust_anchor(&mut self, ca_item: &str) -> Result<()>;
}

/// An item as persisted by a provisioning store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub kind: ItemKind,
    pub factory: bool,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// In-memory blob store.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: HashMap<StorageUid, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` under `uid`, replacing any previous blob.
    pub fn insert(&mut self, uid: StorageUid, data: impl Into<Vec<u8>>) {
        self.blobs.insert(uid, data.into());
    }
}

impl BlobStore for MemoryBlobStore {
    fn info(&self, uid: StorageUid) -> Result<BlobInfo> {
        self.blobs
            .get(&uid)
            .map(|blob| BlobInfo { size: blob.len() })
            .ok_or_else(|| Error::Storage(format!("no blob stored under uid {uid:#x}")))
    }

    fn read(&self, uid: StorageUid, buf: &mut [u8]) -> Result<usize> {
        let blob = self
            .blobs
            .get(&uid)
            .ok_or_else(|| Error::Storage(format!("no blob stored under uid {uid:#x}")))?;
        copy_blob(blob, buf)
    }
}

/// Copies a whole blob into `buf`; partial reads are refused.
pub(crate) fn copy_blob(blob: &[u8], buf: &mut [u8]) -> Result<usize> {
    if blob.len() > buf.len() {
        return Err(Error::BufferTooSmall {
            needed: blob.len(),
            capacity: buf.len(),
        });
    }
    buf[..blob.len()].copy_from_slice(blob);
    Ok(blob.len())
}

/// In-memory provisioning store.
///
/// Factory items are immutable: writing an item whose name already holds a
/// factory item fails.
#[derive(Debug, Clone)]
pub struct MemoryProvisioningStore {
    initialized: bool,
    items: BTreeMap<String, StoredItem>,
    trust_anchor: Option<(String, TrustAnchor)>,
}

impl MemoryProvisioningStore {
    /// Creates an initialized, empty store.
    pub fn new() -> Self {
        Self {
            initialized: true,
            items: BTreeMap::new(),
            trust_anchor: None,
        }
    }

    /// Creates a store that reports itself as not initialized.
    pub fn uninitialized() -> Self {
        Self {
            initialized: false,
            ..Self::new()
        }
    }

    /// Rebuilds a store from persisted items.
    pub fn from_items(items: BTreeMap<String, StoredItem>) -> Self {
        Self {
            items,
            ..Self::new()
        }
    }

    /// Returns the item stored under `name`.
    pub fn item(&self, name: &str) -> Option<&StoredItem> {
        self.items.get(name)
    }

    /// Returns all stored items ordered by name.
    pub fn items(&self) -> &BTreeMap<String, StoredItem> {
        &self.items
    }

    /// Returns the name of the item registered as trust anchor.
    pub fn trust_anchor_item(&self) -> Option<&str> {
        self.trust_anchor.as_ref().map(|(name, _)| name.as_str())
    }

    /// Returns the registered trust anchor.
    pub fn trust_anchor(&self) -> Option<&TrustAnchor> {
        self.trust_anchor.as_ref().map(|(_, anchor)| anchor)
    }
}

impl Default for MemoryProvisioningStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisioningStore for MemoryProvisioningStore {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn store_item(&mut self, item: &FactoryItem, factory: bool) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if matches!(self.items.get(item.name), Some(existing) if existing.factory) {
            return Err(Error::Storage(format!(
                "factory item {} already exists",
                item.name
            )));
        }

        let data = item.value.to_bytes().into_owned();
        debug!(item = item.name, kind = ?item.kind(), len = data.len(), "storing item");
        self.items.insert(
            item.name.to_string(),
            StoredItem {
                kind: item.kind(),
                factory,
                data,
            },
        );
        Ok(())
    }

    fn set_trust_anchor(&mut self, ca_item: &str) -> Result<()> {
        let stored = self
            .items
            .get(ca_item)
            .ok_or_else(|| Error::TrustAnchor(format!("item {ca_item} not found")))?;
        if stored.kind != ItemKind::Certificate {
            return Err(Error::TrustAnchor(format!(
                "item {ca_item} is not a certificate"
            )));
        }

        let anchor = TrustAnchor::from_der(&stored.data)?;
        debug!(item = ca_item, subject = anchor.subject(), "trust anchor set");
        self.trust_anchor = Some((ca_item.to_string(), anchor));
        Ok(())
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
