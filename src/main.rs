use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use skyburst::{Config, ExplosionKind, Simulation};
use std::fs::File;
use std::io::{stdout, BufWriter, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod frontend;
use frontend::canvas::TerminalCanvas;
use frontend::controls::{self, Action};
use frontend::sink::LogSink;

const FIXED_DT: f32 = 1.0 / 60.0;

/// Terminal firework show.
///
/// Space launches a shell, f fires a finale, click launches above the pointer.
/// a/m/s/k toggle auto launch, finale mode, sound and smoke; +/- change volume;
/// arrows steer the wind; [ and ] change the launch interval. p/P, z/Z, e/E,
/// g/G and h/H lower/raise particle count, particle size, explosion force,
/// gravity and hover time. q or Esc quits.
#[derive(Parser, Debug)]
#[command(name = "skyburst", version, about)]
struct Args {
    /// TOML file with simulation settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for a reproducible show
    #[arg(long)]
    seed: Option<u64>,

    /// Base particle count per shell
    #[arg(long, value_name = "N")]
    particles: Option<usize>,

    /// Explosion type for manual launches (e.g. willow, crossette); unknown
    /// names fall back to peony
    #[arg(long = "type", value_name = "KIND")]
    kind: Option<String>,

    /// Start in finale mode
    #[arg(long)]
    finale: bool,

    /// Disable sound cues
    #[arg(long)]
    no_sound: bool,

    /// Background colour as hex (e.g. 1a1b26)
    #[arg(long, value_name = "RRGGBB", value_parser = parse_hex_color)]
    bg_color: Option<(u8, u8, u8)>,

    /// Write log output to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_hex_color(hex: &str) -> std::result::Result<(u8, u8, u8), String> {
    let hex = hex.trim_start_matches('#');
    let invalid = || format!("invalid hex color '{hex}', expected RRGGBB (e.g. 1a1b26)");
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn init_logging(args: &Args) -> Result<()> {
    let level = match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("failed to initialise logging")?;
    Ok(())
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(particles) = args.particles {
        config.particle_count = particles;
    }
    if args.finale {
        config.finale_mode = true;
    }
    if args.no_sound {
        config.sound_enabled = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(sim: &mut Simulation<LogSink>, background: (u8, u8, u8)) -> Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let result = event_loop(sim, background, &mut stdout);

    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    result
}

fn event_loop(
    sim: &mut Simulation<LogSink>,
    background: (u8, u8, u8),
    stdout: &mut BufWriter<Stdout>,
) -> Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let eye = sim.config().listener();
    let mut canvas = TerminalCanvas::new(cols as usize, rows as usize, eye, background);

    let start = Instant::now();
    let mut last_frame = start;
    let mut accumulator = 0.0f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match controls::translate(&event, sim.config(), cols, rows) {
                Some(Action::Quit) => break,
                Some(Action::Resize(new_cols, new_rows)) => {
                    (cols, rows) = (new_cols, new_rows);
                    canvas.resize(cols as usize, rows as usize);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                Some(Action::Input(input)) => sim.handle_input(input),
                None => {}
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        let mut stepped = false;
        while accumulator >= FIXED_DT {
            let now_ms = now.duration_since(start).as_secs_f64() * 1000.0;
            sim.tick(FIXED_DT, now_ms);
            accumulator -= FIXED_DT;
            stepped = true;
        }

        if stepped {
            sim.render(&mut canvas);
            canvas.present(stdout)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = build_config(&args).context("invalid configuration")?;
    let mut sim = Simulation::new(config, LogSink::new()).context("failed to start simulation")?;
    sim.set_forced_kind(args.kind.as_deref().map(ExplosionKind::from_key_or_default));
    log::info!("starting show with seed {}", sim.seed());

    run(&mut sim, args.bg_color.unwrap_or((0, 0, 0))).context("terminal session failed")
}
