//! Interfaces to the resource layer: credentials and scene persistence

use std::collections::HashMap;
use std::future::Future;

use scrim_ipc::{ContentLayer, ContentRev, SceneId, ViewportRecord};
use tracing::debug;

use crate::error::StoreError;

/// Supplies the bearer credential attached to image fetches
pub trait CredentialProvider: Send {
    fn request_token(&self) -> Option<String>;
}

/// A fixed credential, or none
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(pub Option<String>);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }
}

impl CredentialProvider for StaticCredential {
    fn request_token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<String> + Send,
{
    fn request_token(&self) -> Option<String> {
        self()
    }
}

/// Persistence for the records a session produces
pub trait SceneStore {
    /// Persist the remote display viewport of a scene
    fn put_viewport(
        &mut self,
        scene: &SceneId,
        record: ViewportRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Store new content for a layer, returning its new revision
    fn put_layer_content(
        &mut self,
        scene: &SceneId,
        layer: ContentLayer,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<ContentRev, StoreError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct StoredScene {
    pub viewport: Option<ViewportRecord>,
    pub layers: HashMap<ContentLayer, (ContentRev, Vec<u8>)>,
    pub uploads: usize,
}

/// In-process store used by the CLI and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySceneStore {
    scenes: HashMap<SceneId, StoredScene>,
}

impl MemorySceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self, id: &SceneId) -> Option<&StoredScene> {
        self.scenes.get(id)
    }

    pub fn layer(&self, id: &SceneId, layer: ContentLayer) -> Option<&(ContentRev, Vec<u8>)> {
        self.scenes.get(id)?.layers.get(&layer)
    }
}

impl SceneStore for MemorySceneStore {
    async fn put_viewport(&mut self, scene: &SceneId, record: ViewportRecord) -> Result<(), StoreError> {
        debug!("MemorySceneStore: viewport of {} = {:?}", scene, record.viewport);
        self.scenes.entry(scene.clone()).or_default().viewport = Some(record);
        Ok(())
    }

    async fn put_layer_content(
        &mut self,
        scene: &SceneId,
        layer: ContentLayer,
        bytes: Vec<u8>,
    ) -> Result<ContentRev, StoreError> {
        let stored = self.scenes.entry(scene.clone()).or_default();
        let rev = stored
            .layers
            .get(&layer)
            .map_or(ContentRev(1), |(rev, _)| rev.next());
        debug!(
            "MemorySceneStore: {} {:?} -> rev {} ({} bytes)",
            scene,
            layer,
            rev.0,
            bytes.len()
        );
        stored.layers.insert(layer, (rev, bytes));
        stored.uploads += 1;
        Ok(rev)
    }
}
