//! Content revision tracking

use scrim_ipc::{ContentLayer, ContentRev, ContentRevisions, SceneId};
use tracing::{debug, info};

/// Last seen revision of every layer of the current scene.
///
/// Revisions only move forward. Switching scenes is the one reset point and
/// marks every layer for redraw.
#[derive(Debug, Clone, Default)]
pub struct RevisionTracker {
    scene: Option<SceneId>,
    seen: ContentRevisions,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> Option<&SceneId> {
        self.scene.as_ref()
    }

    pub fn get(&self, layer: ContentLayer) -> ContentRev {
        self.seen.get(layer)
    }

    /// Switch to `scene`. Returns true (and resets) if it differs from the
    /// current one.
    pub fn set_scene(&mut self, scene: &SceneId) -> bool {
        if self.scene.as_ref() == Some(scene) {
            return false;
        }
        info!("RevisionTracker: scene {:?} -> {}", self.scene, scene);
        self.scene = Some(scene.clone());
        self.seen = ContentRevisions::default();
        true
    }

    /// Record `rev` for `layer`. Returns true if it is newer than the last
    /// one seen; older or equal revisions are ignored.
    pub fn accept(&mut self, layer: ContentLayer, rev: ContentRev) -> bool {
        let seen = self.seen.get_mut(layer);
        if rev <= *seen {
            debug!("RevisionTracker: {:?} rev {} not newer than {}", layer, rev.0, seen.0);
            return false;
        }
        *seen = rev;
        true
    }

    /// Layers of `revisions` that need redrawing for `scene`, recording them
    /// as seen. A scene change returns every layer.
    pub fn changed_layers(&mut self, scene: &SceneId, revisions: &ContentRevisions) -> Vec<ContentLayer> {
        let switched = self.set_scene(scene);
        let mut changed = Vec::new();
        for layer in ContentLayer::ALL {
            let newer = self.accept(layer, revisions.get(layer));
            if switched || newer {
                changed.push(layer);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revisions(background: u64, overlay: u64) -> ContentRevisions {
        ContentRevisions {
            background: ContentRev(background),
            overlay: ContentRev(overlay),
            detail: ContentRev(0),
        }
    }

    #[test]
    fn test_never_goes_backwards() {
        let mut tracker = RevisionTracker::new();
        tracker.set_scene(&SceneId::new("a"));
        assert!(tracker.accept(ContentLayer::Overlay, ContentRev(3)));
        assert!(!tracker.accept(ContentLayer::Overlay, ContentRev(2)));
        assert!(!tracker.accept(ContentLayer::Overlay, ContentRev(3)));
        assert_eq!(tracker.get(ContentLayer::Overlay), ContentRev(3));
    }

    #[test]
    fn test_scene_change_redraws_everything() {
        let mut tracker = RevisionTracker::new();
        let a = SceneId::new("a");
        assert_eq!(tracker.changed_layers(&a, &revisions(1, 1)).len(), 3);
        assert!(tracker.changed_layers(&a, &revisions(1, 1)).is_empty());
        assert_eq!(
            tracker.changed_layers(&a, &revisions(1, 2)),
            vec![ContentLayer::Overlay]
        );

        // Lower revisions on a new scene are fine: it is a reset
        let b = SceneId::new("b");
        assert_eq!(tracker.changed_layers(&b, &revisions(0, 1)).len(), 3);
        assert_eq!(tracker.get(ContentLayer::Overlay), ContentRev(1));
    }
}
