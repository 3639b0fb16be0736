//! Headless command line: run an editing session against local files
//!
//! ```text
//! scrim render --background map.png --obscure 0,0,400,300 --out fog.png
//! scrim render --background map.png --overlay fog.png --reveal 10,10,50,50 --out fog.png
//! ```
//!
//! Rectangles are `x,y,width,height` in canvas pixels of the fully zoomed
//! out view.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use geometry::{Rect, normalize_rect};
use scrim_config::ScrimConfig;
use scrim_input::EditorInput;
use scrim_ipc::{ContentLayer, PRIMARY_BUTTON, PointerEvent, PointerKind, SceneDescription, SceneId, WorkerEvent};
use scrim_render::{CanvasSet, FileFetcher};
use tracing::info;

use crate::collaborators::MemorySceneStore;
use crate::orchestrator::Orchestrator;

/// Scrim overlay-masked scene renderer
#[derive(Parser, Debug)]
#[command(name = "scrim", version, about = "Scrim overlay-masked scene renderer")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log more (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply overlay edits to a scene and write the resulting overlay PNG
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Background image
    #[arg(long, value_name = "FILE")]
    pub background: PathBuf,

    /// Existing overlay to start from (blank when omitted)
    #[arg(long, value_name = "FILE")]
    pub overlay: Option<PathBuf>,

    /// Canvas width (defaults to the configured canvas)
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height (defaults to the configured canvas)
    #[arg(long)]
    pub height: Option<u32>,

    /// Rotation in degrees, snapped to a quarter turn
    #[arg(long, default_value_t = 0.0)]
    pub angle: f64,

    /// Cover a rectangle with fog
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub obscure: Vec<Rect>,

    /// Clear fog from a rectangle (applied after every --obscure)
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub reveal: Vec<Rect>,

    /// Propose a remote viewport and print the persisted record as JSON
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub zoom: Option<Rect>,

    /// Output overlay PNG
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,
}

/// Parse `x,y,width,height`
pub fn parse_rect(text: &str) -> Result<Rect, String> {
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid rectangle '{text}': {err}"))?;
    match values.as_slice() {
        [x, y, width, height] => Ok(Rect::new(*x, *y, *width, *height)),
        _ => Err(format!("expected x,y,width,height, got '{text}'")),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ScrimConfig> {
    let config = match path {
        Some(path) => ScrimConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ScrimConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Run one `render` invocation. Returns the overlay PNG bytes written.
pub async fn run_render(config: ScrimConfig, args: RenderArgs) -> anyhow::Result<Vec<u8>> {
    if args.obscure.is_empty() && args.reveal.is_empty() && args.zoom.is_none() {
        bail!("nothing to do: pass --obscure, --reveal or --zoom");
    }

    let width = args.width.unwrap_or(config.canvas.scaled_width());
    let height = args.height.unwrap_or(config.canvas.scaled_height());
    let scene = SceneDescription {
        id: SceneId::new("cli"),
        background: Some(args.background.to_string_lossy().into_owned()),
        overlay: args
            .overlay
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned()),
        angle: args.angle,
        ..Default::default()
    };
    let id = scene.id.clone();

    let mut session = Orchestrator::new(
        config,
        FileFetcher::new(),
        MemorySceneStore::new(),
        CanvasSet::new(width, height),
    )?;
    session.open_scene(scene)?;

    let ready = session
        .wait_for(|event| {
            matches!(
                event,
                WorkerEvent::Initialized { .. } | WorkerEvent::LoadFailed { .. }
            )
        })
        .await?;
    if let WorkerEvent::LoadFailed { image, reason } = ready {
        bail!("could not load the {image} image: {reason}");
    }
    if let Some(sizes) = session.sizes() {
        info!(
            "Loaded {}x{} image, {}x{} on screen",
            sizes.full.width, sizes.full.height, sizes.visible.width, sizes.visible.height
        );
    }

    session.action(EditorInput::Select).await?;
    let edits = args
        .obscure
        .iter()
        .map(|rect| (*rect, EditorInput::Obscure))
        .chain(args.reveal.iter().map(|rect| (*rect, EditorInput::Reveal)));
    for (rect, operation) in edits {
        select(&mut session, rect).await?;
        session.action(operation).await?;
        // Rects that miss the image produce no overlay
        if hits_image(&session, rect) {
            session
                .wait_for(|event| matches!(event, WorkerEvent::Overlay { .. }))
                .await?;
        }
    }

    if let Some(rect) = args.zoom {
        select(&mut session, rect).await?;
        session.action(EditorInput::Zoom).await?;
        session
            .wait_for(|event| matches!(event, WorkerEvent::Viewport { .. }))
            .await?;
    }

    let store = session.into_store();
    if let Some(record) = store.scene(&id).and_then(|scene| scene.viewport) {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    let Some((rev, bytes)) = store.layer(&id, ContentLayer::Overlay) else {
        bail!("no overlay was produced");
    };
    tokio::fs::write(&args.out, bytes)
        .await
        .with_context(|| format!("writing {}", args.out.display()))?;
    info!("Wrote overlay rev {} to {}", rev.0, args.out.display());
    Ok(bytes.clone())
}

fn hits_image(session: &Orchestrator<MemorySceneStore>, rect: Rect) -> bool {
    session
        .sizes()
        .and_then(|sizes| Rect::from_size(sizes.visible).intersect(&normalize_rect(rect)))
        .is_some_and(|overlap| !overlap.is_empty())
}

/// Drag a selection box over `rect` and wait for the worker to confirm it
async fn select(session: &mut Orchestrator<MemorySceneStore>, rect: Rect) -> anyhow::Result<()> {
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.right(), rect.bottom());
    session
        .pointer(PointerEvent::new(PointerKind::Down, x0, y0, PRIMARY_BUTTON))
        .await?;
    session
        .pointer(PointerEvent::new(PointerKind::Move, x1, y1, PRIMARY_BUTTON))
        .await?;
    session
        .pointer(PointerEvent::new(PointerKind::Up, x1, y1, 0))
        .await?;
    session
        .wait_for(|event| matches!(event, WorkerEvent::SelectComplete { .. }))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rect() {
        assert_eq!(parse_rect("1, 2,3.5,4").unwrap(), Rect::new(1.0, 2.0, 3.5, 4.0));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::try_parse_from([
            "scrim",
            "render",
            "--background",
            "map.png",
            "--obscure",
            "0,0,10,10",
            "--obscure",
            "5,5,1,1",
            "--out",
            "fog.png",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Render(args) = cli.command;
        assert_eq!(args.obscure.len(), 2);
        assert!(args.reveal.is_empty());
        assert_eq!(args.angle, 0.0);
    }
}
