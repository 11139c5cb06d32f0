use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use floormap::camera::Camera;
use floormap::client::NavApiClient;
use floormap::config::MapConfig;
use floormap::consts::FIT_DURATION_MS;
use floormap::engine::{Action, EngineCore};
use floormap::loader::{FloorCatalog, FloorPlanLoader, FloorSource, floor_source};
use floormap::render::{self, OverlaySurface};
use floormap::route::RouteRequest;
use floormap::MapError;
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "floormap", about = "Indoor floor-plan route renderer")]
struct Cli {
    /// Route and room service base URL.
    #[arg(long, env = "FLOORMAP_API_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the room directory.
    Rooms,
    /// Parse one floor plan and summarize it.
    Inspect {
        floor: String,
        /// Write the plan as SVG to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Request a route and render every segment.
    Route {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Directory for per-segment SVG files.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = MapConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url.trim_end_matches('/').to_owned();
    }

    match cli.command {
        Command::Rooms => run_rooms(&config).await,
        Command::Inspect { floor, out } => run_inspect(&config, &floor, out.as_deref()).await,
        Command::Route { from, to, out } => run_route(&config, RouteRequest::new(from, to), out.as_deref()).await,
    }
}

async fn run_rooms(config: &MapConfig) -> Result<(), CliError> {
    let client = NavApiClient::from_config(config)?;
    let rooms = client.fetch_rooms().await?;
    println!("{}", serde_json::to_string_pretty(&rooms)?);
    Ok(())
}

async fn run_inspect(config: &MapConfig, floor: &str, out: Option<&Path>) -> Result<(), CliError> {
    let source = floor_source(config)?;
    let mut loader = FloorPlanLoader::new(FloorCatalog::from_location(&config.floors, &config.default_floor));
    let plan = loader.load(source.as_ref(), floor).await?;

    println!("floor:       {}", plan.id);
    println!("source:      {}", plan.source_uri);
    println!("size:        {} x {} ({:?})", plan.native_width, plan.native_height, plan.size_source);
    println!("viewBox:     {}", plan.view_box.as_attr());
    println!("nodes:       {}", plan.scene.len());
    for (_, node) in plan.scene.iter() {
        if let Some(id) = &node.id {
            println!("  {:<6} {id}", node.kind.tag());
        }
    }

    if let Some(path) = out {
        let svg = render::render_svg(plan, &Camera::default(), config.container, &OverlaySurface::new(), None);
        write_file(path, &svg).await?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

async fn run_route(config: &MapConfig, request: RouteRequest, out: Option<&Path>) -> Result<(), CliError> {
    let client = NavApiClient::from_config(config)?;
    let source = floor_source(config)?;
    let mut engine = EngineCore::from_config(config);

    // Virtual clock: each segment's fit transition runs to completion before rendering.
    let mut now_ms = 0.0;
    let actions = match client.navigate(&request).await {
        Ok(response) => engine.apply_route(&response, now_ms),
        Err(e) => engine.route_failed(&e, now_ms),
    };
    drive(&mut engine, source.as_ref(), actions, now_ms).await;
    if engine.navigator().segment_count() == 0 {
        println!("{}", engine.status());
        return Ok(());
    }

    if let Some(dir) = out {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| CliError::Write { path: dir.to_path_buf(), source })?;
    }

    loop {
        now_ms += FIT_DURATION_MS;
        engine.tick(now_ms);

        if let Some(label) = engine.progress_label() {
            println!("{label}");
        }
        if let Some(instruction) = engine.instruction() {
            println!("  {instruction}");
        }
        match (out, engine.render_svg()) {
            (Some(dir), Some(svg)) => {
                let index = engine.navigator().index() + 1;
                let floor = engine.navigator().current().map_or("", |s| s.floor_id.as_str());
                let path = dir.join(format!("segment_{index}_floor_{floor}.svg"));
                write_file(&path, &svg).await?;
                println!("  wrote {}", path.display());
            }
            (_, None) => println!("  {}", engine.status()),
            (None, Some(_)) => {}
        }

        if !engine.navigator().has_next() {
            break;
        }
        let actions = engine.next_segment(now_ms);
        drive(&mut engine, source.as_ref(), actions, now_ms).await;
    }
    Ok(())
}

/// Act on engine actions until none remain, fetching requested floors from `source`.
async fn drive(engine: &mut EngineCore, source: &dyn FloorSource, actions: Vec<Action>, now_ms: f64) {
    let mut pending = actions;
    while !pending.is_empty() {
        let mut next = Vec::new();
        for action in pending {
            match action {
                Action::LoadFloor { ticket, uri } => {
                    let fetched = source.fetch(&uri).await;
                    next.extend(engine.floor_loaded(&ticket, fetched, now_ms));
                }
                Action::StatusChanged(status) => info!(%status, "status"),
                Action::RoomSelected(_) | Action::RenderNeeded => {}
            }
        }
        pending = next;
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| CliError::Write { path: path.to_path_buf(), source })
}
