//! Registry of the user's selected video assets.

use clipgen_media::{MediaHandle, PreviewHandle};
use clipgen_models::{AggregateRequest, AssetId, AssetStatus, AssetSummary};

use crate::error::{SessionError, SessionResult};

/// A selected video.
///
/// Owns its file handle; dropping the asset revokes its preview.
#[derive(Debug)]
pub struct VideoAsset {
    id: AssetId,
    handle: MediaHandle,
    preview: PreviewHandle,
    duration: f64,
    probed: bool,
    status: AssetStatus,
}

impl VideoAsset {
    /// Wrap an opened file with a fresh id and the provisional duration.
    pub fn new(handle: MediaHandle, default_duration: f64) -> Self {
        let preview = handle.preview();
        Self {
            id: AssetId::new(),
            handle,
            preview,
            duration: default_duration,
            probed: false,
            status: AssetStatus::Pending,
        }
    }

    /// Id, unique within the registry.
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Preview handle read by the metadata probe.
    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// Duration in seconds; the default until probed.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Serializable view of the asset.
    pub fn summary(&self) -> AssetSummary {
        AssetSummary {
            id: self.id.clone(),
            name: self.handle.name().to_string(),
            size: self.handle.size(),
            mime_type: self.handle.mime_type().to_string(),
            duration: self.duration,
            probed: self.probed,
            status: self.status,
        }
    }
}

/// Ordered collection of assets, unique by id.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: Vec<VideoAsset>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset; a duplicate id is rejected.
    pub fn add(&mut self, asset: VideoAsset) -> SessionResult<AssetId> {
        if self.contains(asset.id()) {
            return Err(SessionError::DuplicateAsset(asset.id().clone()));
        }
        let id = asset.id().clone();
        self.assets.push(asset);
        Ok(id)
    }

    /// Remove exactly the asset with `id`, leaving the others untouched.
    pub fn remove(&mut self, id: &AssetId) -> Option<VideoAsset> {
        let index = self.assets.iter().position(|a| a.id() == id)?;
        Some(self.assets.remove(index))
    }

    /// Set the probed duration of `id`.
    ///
    /// Returns `false` when the asset is gone or was already probed; a late
    /// probe never re-creates a removed asset.
    pub fn patch_duration(&mut self, id: &AssetId, duration: f64) -> bool {
        match self.assets.iter_mut().find(|a| a.id() == id) {
            Some(asset) if !asset.probed => {
                asset.duration = duration;
                asset.probed = true;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &AssetId) -> Option<&VideoAsset> {
        self.assets.iter().find(|a| a.id() == id)
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Summaries in insertion order.
    pub fn summaries(&self) -> Vec<AssetSummary> {
        self.assets.iter().map(VideoAsset::summary).collect()
    }

    /// Sum of the current durations.
    pub fn total_duration(&self) -> f64 {
        self.assets.iter().map(VideoAsset::duration).sum()
    }

    /// Aggregate of the current durations; `None` when empty.
    pub fn aggregate(&self) -> Option<AggregateRequest> {
        AggregateRequest::from_assets(&self.summaries())
    }

    /// Drop every asset, releasing their handles.
    pub fn clear(&mut self) {
        self.assets.clear();
    }
}
