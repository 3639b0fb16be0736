//! Editing sessions driven through pointer and toolbar input

use painting::{Raster, decode_raster, encode_png};
use scrim::{MemorySceneStore, Orchestrator, SessionError, StaticCredential};
use scrim_config::ScrimConfig;
use scrim_input::{EditorInput, EditorState};
use scrim_ipc::{
    ContentLayer, ContentRev, PRIMARY_BUTTON, PointerEvent, PointerKind, Rect, SceneDescription,
    SceneId, WorkerCommand, WorkerEvent,
};
use scrim_render::{CanvasSet, MemoryFetcher, TransferError};

fn png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&Raster::new(width, height)).unwrap()
}

fn scene(background: &str) -> SceneDescription {
    SceneDescription {
        id: SceneId::new("scene-1"),
        background: Some(background.into()),
        ..Default::default()
    }
}

fn session(fetcher: MemoryFetcher) -> Orchestrator<MemorySceneStore> {
    Orchestrator::new(
        ScrimConfig::default(),
        fetcher,
        MemorySceneStore::new(),
        CanvasSet::new(200, 150),
    )
    .unwrap()
}

/// Session with a 400x300 background open on a 200x150 canvas (zoom 2)
async fn opened() -> Orchestrator<MemorySceneStore> {
    let mut session = session(MemoryFetcher::new().with_image("bg", png(400, 300)));
    session.open_scene(scene("bg")).unwrap();
    session
        .wait_for(|e| matches!(e, WorkerEvent::Initialized { .. }))
        .await
        .unwrap();
    session
}

async fn drag(session: &mut Orchestrator<MemorySceneStore>, from: (f64, f64), to: (f64, f64)) {
    let events = [
        PointerEvent::new(PointerKind::Down, from.0, from.1, PRIMARY_BUTTON),
        PointerEvent::new(PointerKind::Move, to.0, to.1, PRIMARY_BUTTON),
        PointerEvent::new(PointerKind::Up, to.0, to.1, 0),
    ];
    for event in events {
        session.pointer(event).await.unwrap();
    }
}

fn assert_rect_near(actual: Rect, expected: Rect) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-6;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height),
        "{actual:?} != {expected:?}"
    );
}

#[tokio::test]
async fn test_canvases_transfer_once() {
    let mut session = session(MemoryFetcher::new());
    session.transfer_canvases().unwrap();
    let err = session.transfer_canvases().unwrap_err();
    assert!(
        matches!(err, SessionError::Transfer(TransferError::AlreadyTransferred)),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_open_scene_reports_sizes() {
    let session = opened().await;
    let sizes = session.sizes().unwrap();
    assert_eq!((sizes.visible.width, sizes.visible.height), (200.0, 150.0));
    assert_eq!((sizes.full.width, sizes.full.height), (400.0, 300.0));
    assert_eq!(session.state(), EditorState::Wait);
}

#[tokio::test]
async fn test_stroke_uploads_overlay_once() {
    let mut session = opened().await;
    let id = SceneId::new("scene-1");

    assert!(session.action(EditorInput::Paint).await.unwrap());
    session
        .pointer(PointerEvent::new(PointerKind::Move, 20.0, 20.0, 0))
        .await
        .unwrap();
    drag(&mut session, (50.0, 40.0), (60.0, 40.0)).await;
    assert_eq!(session.state(), EditorState::Paint);

    let WorkerEvent::Overlay { blob } = session
        .wait_for(|e| matches!(e, WorkerEvent::Overlay { .. }))
        .await
        .unwrap()
    else {
        unreachable!()
    };
    let overlay = decode_raster(&blob).unwrap();
    assert_eq!(overlay.get_pixel(100, 80), Some([0, 0, 0, 255]));
    assert_eq!(session.store().scene(&id).unwrap().uploads, 1);
    assert_eq!(session.scene().unwrap().revisions.overlay, ContentRev(1));

    session.post(WorkerCommand::Clear).unwrap();
    session
        .wait_for(|e| matches!(e, WorkerEvent::Overlay { .. }))
        .await
        .unwrap();
    assert_eq!(session.store().scene(&id).unwrap().uploads, 2);
    assert_eq!(session.revisions().get(ContentLayer::Overlay), ContentRev(2));

    let store = session.into_store();
    let (rev, bytes) = store.layer(&id, ContentLayer::Overlay).unwrap();
    assert_eq!(*rev, ContentRev(2));
    assert!(decode_raster(bytes).unwrap().is_blank());
}

#[tokio::test]
async fn test_select_then_obscure() {
    let mut session = opened().await;

    session.action(EditorInput::Select).await.unwrap();
    drag(&mut session, (10.0, 10.0), (30.0, 30.0)).await;
    session
        .wait_for(|e| matches!(e, WorkerEvent::SelectComplete { .. }))
        .await
        .unwrap();
    assert_eq!(session.selection(), Some(Rect::new(10.0, 10.0, 20.0, 20.0)));

    session.action(EditorInput::Obscure).await.unwrap();
    assert_eq!(session.state(), EditorState::Select);
    let WorkerEvent::Overlay { blob } = session
        .wait_for(|e| matches!(e, WorkerEvent::Overlay { .. }))
        .await
        .unwrap()
    else {
        unreachable!()
    };
    let overlay = decode_raster(&blob).unwrap();
    assert_eq!(overlay.get_pixel(30, 30), Some([0, 0, 0, 255]));
    assert_eq!(overlay.get_pixel(100, 100), Some([0, 0, 0, 0]));
}

#[tokio::test]
async fn test_zoom_persists_viewport() {
    let mut session = opened().await;
    let id = SceneId::new("scene-1");

    session.action(EditorInput::Select).await.unwrap();
    drag(&mut session, (0.0, 0.0), (100.0, 75.0)).await;
    session
        .wait_for(|e| matches!(e, WorkerEvent::SelectComplete { .. }))
        .await
        .unwrap();
    session.action(EditorInput::Zoom).await.unwrap();
    session
        .wait_for(|e| matches!(e, WorkerEvent::Viewport { .. }))
        .await
        .unwrap();

    let record = session.store().scene(&id).unwrap().viewport.unwrap();
    assert_rect_near(record.viewport, Rect::new(0.0, 0.0, 200.0, 150.0));
    assert_eq!(
        (record.background_size.width, record.background_size.height),
        (400.0, 300.0)
    );
    assert_eq!(session.scene().unwrap().viewport, Some(record.viewport));
}

#[tokio::test]
async fn test_remote_zoom_scales_stored_viewport() {
    let mut session = opened().await;
    let id = SceneId::new("scene-1");

    session.action(EditorInput::RemoteZoomIn).await.unwrap();
    assert_eq!(session.state(), EditorState::Wait);
    let record = session.store().scene(&id).unwrap().viewport.unwrap();
    assert_rect_near(record.viewport, Rect::new(40.0, 30.0, 320.0, 240.0));

    // Zooming out past the image clamps to it
    session.action(EditorInput::RemoteZoomOut).await.unwrap();
    session.action(EditorInput::RemoteZoomOut).await.unwrap();
    let record = session.store().scene(&id).unwrap().viewport.unwrap();
    assert_rect_near(record.viewport, Rect::new(0.0, 0.0, 400.0, 300.0));
}

#[tokio::test]
async fn test_rotate_persists_angle() {
    let mut session = opened().await;
    let id = SceneId::new("scene-1");

    session.action(EditorInput::Rotate).await.unwrap();
    assert_eq!(session.angle(), 90.0);
    let record = session.store().scene(&id).unwrap().viewport.unwrap();
    assert_eq!(record.angle, 90.0);
}

#[tokio::test]
async fn test_load_failure_sets_notice() {
    let mut session = session(MemoryFetcher::new());
    session.open_scene(scene("missing")).unwrap();
    session
        .wait_for(|e| matches!(e, WorkerEvent::LoadFailed { .. }))
        .await
        .unwrap();
    let notice = session.notice().unwrap();
    assert!(notice.contains("background"), "{notice}");
    assert!(session.sizes().is_none());
}

#[tokio::test]
async fn test_scene_without_background_is_rejected() {
    let mut session = session(MemoryFetcher::new());
    let err = session
        .open_scene(SceneDescription {
            id: SceneId::new("empty"),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, SessionError::MissingBackground(_)), "{err:?}");
}

#[tokio::test]
async fn test_credentials_attached_to_fetch() {
    let fetcher = MemoryFetcher::new()
        .with_image("bg", png(64, 64))
        .with_required_token("secret");
    let mut session = session(fetcher).with_credentials(StaticCredential::new("secret"));
    session.open_scene(scene("bg")).unwrap();
    let event = session
        .wait_for(|e| {
            matches!(
                e,
                WorkerEvent::Initialized { .. } | WorkerEvent::LoadFailed { .. }
            )
        })
        .await
        .unwrap();
    assert!(matches!(event, WorkerEvent::Initialized { .. }), "{event:?}");
}
