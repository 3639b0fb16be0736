//! Scene records shared with the persistence collaborators.

use serde::{Deserialize, Serialize};

use geometry::{Rect, Size};

/// Opaque scene identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Content slots of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentLayer {
    Background,
    Overlay,
    Detail,
}

impl ContentLayer {
    pub const ALL: [ContentLayer; 3] = [
        ContentLayer::Background,
        ContentLayer::Overlay,
        ContentLayer::Detail,
    ];
}

/// Monotonic content revision of one layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContentRev(pub u64);

impl ContentRev {
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Per-layer revisions of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentRevisions {
    #[serde(default)]
    pub background: ContentRev,
    #[serde(default)]
    pub overlay: ContentRev,
    #[serde(default)]
    pub detail: ContentRev,
}

impl ContentRevisions {
    pub fn get(&self, layer: ContentLayer) -> ContentRev {
        match layer {
            ContentLayer::Background => self.background,
            ContentLayer::Overlay => self.overlay,
            ContentLayer::Detail => self.detail,
        }
    }

    pub fn get_mut(&mut self, layer: ContentLayer) -> &mut ContentRev {
        match layer {
            ContentLayer::Background => &mut self.background,
            ContentLayer::Overlay => &mut self.overlay,
            ContentLayer::Detail => &mut self.detail,
        }
    }
}

/// Scene as handed to the core by the resource layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    pub id: SceneId,
    pub background: Option<String>,
    pub overlay: Option<String>,
    pub detail: Option<String>,
    /// Stored remote viewport in `background_size` coordinates
    pub viewport: Option<Rect>,
    pub background_size: Option<Size>,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub revisions: ContentRevisions,
}

/// What gets persisted for the remote viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRecord {
    pub viewport: Rect,
    pub background_size: Size,
    pub angle: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_description_from_json() {
        let scene: SceneDescription = serde_json::from_str(
            r#"{
                "id": "scene-1",
                "background": "assets/map.png",
                "overlay": null,
                "detail": null,
                "viewport": {"x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0},
                "background_size": {"width": 4000.0, "height": 3000.0},
                "angle": 90.0,
                "revisions": {"overlay": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(scene.id.as_str(), "scene-1");
        assert_eq!(scene.revisions.get(ContentLayer::Overlay), ContentRev(3));
        assert_eq!(scene.revisions.background, ContentRev(0));
    }

    #[test]
    fn test_revision_slots() {
        let mut revs = ContentRevisions::default();
        *revs.get_mut(ContentLayer::Detail) = ContentRev(5).next();
        assert_eq!(revs.detail, ContentRev(6));
        assert_eq!(revs.get(ContentLayer::Background), ContentRev(0));
    }
}
