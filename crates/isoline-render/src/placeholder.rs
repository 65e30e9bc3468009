//! Cache of empty placeholder textures, one per device.
//!
//! Shader binding slots must always hold a texture. When a layer has no data
//! for a slot (no secondary raster, no palette) it binds the device's
//! placeholder instead. The placeholder is a 1×1 transparent texel, created
//! lazily on first use and shared by every layer drawing on that device.
//!
//! Entries must be released when their device goes away. The device backends
//! release their entry in the process-wide cache when dropped; caches created
//! with [`PlaceholderTextureCache::new`] are released through
//! [`PlaceholderTextureCache::release`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use isoline_core::logging::targets;
use parking_lot::Mutex;
use tracing::debug;

use crate::device::{DeviceId, GpuDevice};
use crate::error::RenderResult;
use crate::texture::{Texture, TextureDescriptor, TextureFormat, WrapMode};

/// Process-wide cache instance.
static SHARED_CACHE: OnceLock<Arc<PlaceholderTextureCache>> = OnceLock::new();

const PLACEHOLDER_DESCRIPTOR: TextureDescriptor = TextureDescriptor {
    label: "placeholder",
    width: 1,
    height: 1,
    format: TextureFormat::Rgba8Unorm,
    wrap: WrapMode::ClampToEdge,
};

/// Placeholder textures keyed by device.
#[derive(Debug, Default)]
pub struct PlaceholderTextureCache {
    textures: Mutex<HashMap<DeviceId, Texture>>,
}

impl PlaceholderTextureCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED_CACHE.get_or_init(|| Arc::new(Self::new())))
    }

    /// The placeholder for `device`, created on first request.
    pub fn get_or_create(&self, device: &dyn GpuDevice) -> RenderResult<Texture> {
        let mut textures = self.textures.lock();
        if let Some(texture) = textures.get(&device.id()) {
            return Ok(texture.clone());
        }

        let texture = device.create_texture(&PLACEHOLDER_DESCRIPTOR, &[0; 4])?;
        debug!(
            target: targets::PLACEHOLDER,
            device = device.id().get(),
            texture = texture.id().get(),
            "created placeholder texture"
        );
        textures.insert(device.id(), texture.clone());
        Ok(texture)
    }

    /// Drop the placeholder of a device that is being released.
    ///
    /// Returns the evicted texture, if there was one.
    pub fn release(&self, device: DeviceId) -> Option<Texture> {
        let evicted = self.textures.lock().remove(&device);
        if evicted.is_some() {
            debug!(
                target: targets::PLACEHOLDER,
                device = device.get(),
                "released placeholder texture"
            );
        }
        evicted
    }

    /// Whether `device` has a cached placeholder.
    pub fn contains(&self, device: DeviceId) -> bool {
        self.textures.lock().contains_key(&device)
    }

    /// Number of devices with a cached placeholder.
    pub fn len(&self) -> usize {
        self.textures.lock().len()
    }

    /// Whether no placeholder has been created yet.
    pub fn is_empty(&self) -> bool {
        self.textures.lock().is_empty()
    }
}

/// Release `device` from the process-wide cache, if that cache exists.
///
/// Called by the device backends on drop.
pub(crate) fn release_shared(device: DeviceId) {
    if let Some(cache) = SHARED_CACHE.get() {
        cache.release(device);
    }
}

static_assertions::assert_impl_all!(PlaceholderTextureCache: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDevice;

    #[test]
    fn test_created_once_per_device() {
        let cache = PlaceholderTextureCache::new();
        let device = HeadlessDevice::new();

        let a = cache.get_or_create(&device).unwrap();
        let b = cache.get_or_create(&device).unwrap();

        assert_eq!(a, b);
        assert_eq!(device.textures_created(), 1);
        assert_eq!(a.width(), 1);
        assert_eq!(a.height(), 1);
    }

    #[test]
    fn test_keyed_by_device() {
        let cache = PlaceholderTextureCache::new();
        let first = HeadlessDevice::new();
        let second = HeadlessDevice::new();

        let a = cache.get_or_create(&first).unwrap();
        let b = cache.get_or_create(&second).unwrap();

        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_release_evicts() {
        let cache = PlaceholderTextureCache::new();
        let device = HeadlessDevice::new();

        let a = cache.get_or_create(&device).unwrap();
        assert_eq!(cache.release(device.id()), Some(a.clone()));
        assert!(cache.is_empty());
        assert!(cache.release(device.id()).is_none());

        let b = cache.get_or_create(&device).unwrap();
        assert_ne!(a, b);
        assert_eq!(device.textures_created(), 2);
    }

    #[test]
    fn test_dropped_device_leaves_shared_cache() {
        let shared = PlaceholderTextureCache::shared();
        let device = HeadlessDevice::new();
        let id = device.id();

        shared.get_or_create(&device).unwrap();
        assert!(shared.contains(id));

        drop(device);
        assert!(!shared.contains(id));
    }

    #[test]
    fn test_shared_is_process_wide() {
        let a = PlaceholderTextureCache::shared();
        let b = PlaceholderTextureCache::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
