//! Entry point and frame loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use config::GameConfig;
use domain::tile::TileCatalog;
use error::{AppResult, ConfigError};
use sim::state::{GameState, Outcome};
use ui::input::{Bindings, InputState};
use ui::panel::PanelRenderer;
use ui::renderer::GameRenderer;
use ui::terminal::Terminal;
use ui::world_view;

const EXIT_CONFIG: u8 = 1;
const EXIT_RUNTIME: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "spiralworld", version, about = "Procedural spiral tile world in the terminal")]
struct Args {
    /// Path to config.toml (default: next to the executable, then the CWD)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tile catalog, overriding general.tiles_file
    #[arg(short, long)]
    tiles: Option<PathBuf>,

    /// World seed, overriding world.seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the generated world to stdout and exit
    #[arg(long)]
    dump: bool,
}

/// Everything loaded before the terminal is touched.
struct Setup {
    config: GameConfig,
    catalog: TileCatalog,
    state: GameState,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level, args.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let setup = match load(&args) {
        Ok(setup) => setup,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let result = if args.dump { dump(&setup) } else { run(setup) };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_RUNTIME)
        }
    }
}

fn init_logging(level: &str, file: Option<&Path>) -> Result<(), ConfigError> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if let Some(path) = file {
        let out = File::create(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(out)));
    }
    builder.init();
    Ok(())
}

/// Config, catalog and the first world. Any failure here is a
/// configuration problem.
fn load(args: &Args) -> AppResult<Setup> {
    let mut config = GameConfig::load(args.config.as_deref())?;
    if let Some(tiles) = &args.tiles {
        config.tiles_file = tiles.clone();
    }

    let catalog = TileCatalog::load(&config.tiles_file)?;
    config.check_tiles(&catalog)?;

    let state = GameState::new(
        config.spiral_params(args.seed),
        Box::new(config.ring_rule()),
        config.startup_flags(),
    )?;
    Ok(Setup { config, catalog, state })
}

fn dump(setup: &Setup) -> AppResult<()> {
    log::info!("Dumping world with seed {}", setup.state.params().seed);
    let lines = world_view::grid_text(setup.state.grid(), &setup.catalog, setup.state.flags.seamless_mode)?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn run(setup: Setup) -> AppResult<()> {
    let Setup { config, catalog, mut state } = setup;

    let bindings = Bindings {
        regenerate: config.world.regenerate_seed,
        move_speed: config.camera.move_speed,
        fast_move_speed: config.camera.fast_move_speed,
    };
    let help = bindings.help_lines(&format!("Tiles: {}", config.tiles_file.display()));
    let panels = PanelRenderer::new(config.ui.panel, config.ui.top_panel_max_lines, config.ui.bottom_panel_max_lines);
    let mut renderer = GameRenderer::new(config.rendering.clear_color, panels, help, config.regen_effects());

    let mut terminal = Terminal::new(config.rendering.clear_color);
    if let Err(e) = terminal.init() {
        // raw mode may already be on
        let _ = terminal.cleanup();
        return Err(e.into());
    }
    log::info!("Viewer started");

    let frame_time = Duration::from_millis(config.rendering.frame_ms);
    let result = game_loop(&mut state, &mut renderer, &mut terminal, &catalog, &bindings, frame_time);

    if let Err(e) = terminal.cleanup() {
        log::error!("Terminal cleanup failed: {e}");
    }
    result
}

fn game_loop(
    state: &mut GameState,
    renderer: &mut GameRenderer,
    terminal: &mut Terminal,
    catalog: &TileCatalog,
    bindings: &Bindings,
    frame_time: Duration,
) -> AppResult<()> {
    let mut input = InputState::new();
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        let delta = frame_start - last_frame;
        last_frame = frame_start;

        input.drain_events();
        state.begin_frame(terminal.size(), delta);

        for cmd in input.commands(bindings) {
            match state.dispatch(cmd) {
                Ok(Outcome::Regenerated) => renderer.celebrate_regenerate(state),
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Continue) => {}
                // already logged; the previous world stays
                Err(_) => {}
            }
        }

        renderer.update_effects(delta);
        let frame = renderer.render_frame(state, catalog)?;
        terminal.present(frame)?;

        if state.quit_requested() {
            break;
        }
        std::thread::sleep(frame_time.saturating_sub(frame_start.elapsed()));
    }

    Ok(())
}
