//! Terminal Garden
//!
//! A living garden in the console demonstrating the garden crates.
//! - Plants and messages come from an embedded store, seeded from RON
//! - A background gardener sprouts, grows and talks to plants
//! - Plants drift, bounce and link up with their neighbours
//! - Hover a plant with the mouse to inspect it

mod surface;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use garden_core::{GardenConfig, GardenEvents, GardenRng, GardenSession, Message, MessageKind};
use garden_store::{sprout, GardenSeed, Store};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use surface::{cell_center, lock_panel, PanelObserver, SharedPanel, TerminalSurface};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser, Debug)]
#[command(name = "terminal_garden")]
#[command(about = "A living garden of plants drifting in your terminal")]
struct Args {
    /// Garden config (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed fixtures applied to an empty store (RON)
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Database file; in-memory when omitted
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log file (the terminal is busy drawing)
    #[arg(long, default_value = "terminal_garden.log")]
    log: PathBuf,

    /// Milliseconds between background gardener actions
    #[arg(long, default_value = "2500")]
    activity_ms: u64,
}

const PLANT_LINES: &[&str] = &[
    "The light feels nice today.",
    "I dreamt in fractals again.",
    "Has anyone seen my roots?",
    "Photosynthesis is going well.",
];
const GROWTH_LINES: &[&str] = &["I grew a new leaf!", "Stretching towards the sun."];
const EVOLUTION_LINES: &[&str] = &["Something in my genome shifted.", "I feel... different."];
const TASK_LINES: &[&str] = &["Sorting pollen by colour.", "Counting raindrops."];

fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    init_logging(&args.log)?;

    let config = load_config(args.config.as_deref())?;
    let store = Arc::new(open_store(&args)?);

    // Initialize terminal
    terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide, EnableMouseCapture)?;

    let result = run(store, config, &args);

    // Restore terminal
    execute!(stdout, DisableMouseCapture, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn init_logging(path: &Path) -> Result<(), BoxError> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,garden_core=debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Find a data file: explicit path first, then the usual locations
fn find_data_file(explicit: Option<&Path>, name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    [
        format!("demos/terminal_garden/data/{name}"),
        format!("data/{name}"),
        format!("../data/{name}"),
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

fn load_config(path: Option<&Path>) -> Result<GardenConfig, BoxError> {
    match find_data_file(path, "garden.ron") {
        Some(path) => {
            info!(path = %path.display(), "loading garden config");
            Ok(GardenConfig::load(path)?)
        }
        None => Ok(GardenConfig::default()),
    }
}

fn open_store(args: &Args) -> Result<Store, BoxError> {
    let store = match &args.db {
        Some(path) => Store::open(path)?,
        None => Store::in_memory()?,
    };

    if store.count_plants()? == 0 {
        if let Some(path) = find_data_file(args.seed.as_deref(), "seed.ron") {
            GardenSeed::load(&path)?.apply(&store)?;
        }
    }
    Ok(store)
}

fn run(store: Arc<Store>, config: GardenConfig, args: &Args) -> Result<(), BoxError> {
    let seed = config.seed;
    let panel = SharedPanel::default();
    let session = GardenSession::open(
        store.as_ref(),
        TerminalSurface::new(panel.clone()),
        config,
        PanelObserver::new(panel.clone()),
    )?;

    let ids = Arc::new(AtomicU64::new(0));
    let stop = Arc::new(AtomicBool::new(false));
    let gardener = spawn_gardener(
        store.clone(),
        ids.clone(),
        stop.clone(),
        Duration::from_millis(args.activity_ms.max(1)),
        seed,
    )?;

    let result = input_loop(&store, &session.events(), &panel, &ids, seed);

    stop.store(true, Ordering::Release);
    gardener.thread().unpark();
    if gardener.join().is_err() {
        warn!("gardener thread panicked");
    }
    if let Some(garden) = session.close() {
        info!(plants = garden.state().len(), "garden closed");
    }
    result
}

fn input_loop(
    store: &Store,
    events: &GardenEvents,
    panel: &SharedPanel,
    ids: &AtomicU64,
    seed: u64,
) -> Result<(), BoxError> {
    let mut rng = GardenRng::new(seed.wrapping_mul(31).wrapping_add(7));

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Char('s') => {
                    let id = next_id("sprout", ids);
                    if let Err(err) = store.save_plant(&sprout(&mut rng, id), None) {
                        warn!(error = %err, "sprouting failed");
                    }
                }
                KeyCode::Char('w') => water_hovered(store, panel, ids),
                _ => {}
            },
            Event::Mouse(mouse) => {
                if let MouseEventKind::Moved | MouseEventKind::Drag(_) = mouse.kind {
                    let (_, rows) = terminal::size()?;
                    if mouse.row.saturating_add(surface::PANEL_ROWS) < rows {
                        events.pointer_moved(cell_center(mouse.column, mouse.row));
                    } else {
                        events.pointer_left();
                    }
                }
            }
            Event::FocusLost => {
                events.pointer_left();
            }
            _ => {}
        }
    }
}

fn water_hovered(store: &Store, panel: &SharedPanel, ids: &AtomicU64) {
    let hovered = lock_panel(panel).hovered.clone();
    let Some(plant) = hovered else {
        return;
    };
    let message = Message::new(
        next_id("msg", ids),
        plant.id.clone(),
        MessageKind::User,
        "*waters you gently*",
        Utc::now(),
    );
    if let Err(err) = store.insert_message(&message) {
        warn!(error = %err, "watering failed");
    }
}

fn next_id(prefix: &str, ids: &AtomicU64) -> String {
    let n = ids.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{n}", Utc::now().timestamp_millis())
}

/// Background writer standing in for other gardeners
fn spawn_gardener(
    store: Arc<Store>,
    ids: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    interval: Duration,
    seed: u64,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("gardener".to_string())
        .spawn(move || {
            let mut rng = GardenRng::new(seed.wrapping_add(1));
            loop {
                thread::park_timeout(interval);
                if stop.load(Ordering::Acquire) {
                    break;
                }
                if let Err(err) = tend(&store, &mut rng, &ids) {
                    warn!(error = %err, "gardener action failed");
                }
            }
        })
}

/// One gardener action: sprout, grow or chat
fn tend(store: &Store, rng: &mut GardenRng, ids: &AtomicU64) -> garden_store::Result<()> {
    let roll = rng.next_f64();
    let plants = store.load_plants()?;

    if roll < 0.25 || plants.is_empty() {
        let profiles = store.load_profiles()?;
        let owner = rng.pick(&profiles).map(|p| p.id.clone());
        let plant = store.save_plant(&sprout(rng, next_id("sprout", ids)), owner.as_deref())?;
        info!(plant = %plant.species, rarity = %plant.rarity, "sprouted");
        return Ok(());
    }

    let Some(plant) = rng.pick(&plants) else {
        return Ok(());
    };

    if roll < 0.55 {
        store.update_plant(&plant.id, |plant| {
            plant.experience += 10;
            plant.growth = (plant.growth + 5.0).min(100.0);
            if plant.experience >= plant.level * 50 {
                plant.level += 1;
            }
        })?;
        return Ok(());
    }

    let (kind, lines) = match rng.index(4) {
        Some(0) => (MessageKind::Growth, GROWTH_LINES),
        Some(1) => (MessageKind::Evolution, EVOLUTION_LINES),
        Some(2) => (MessageKind::Task, TASK_LINES),
        _ => (MessageKind::Plant, PLANT_LINES),
    };
    let content = rng.pick(lines).copied().unwrap_or_default();
    let message = Message::new(
        next_id("msg", ids),
        plant.id.clone(),
        kind,
        content,
        Utc::now(),
    );
    store.insert_message(&message)
}
