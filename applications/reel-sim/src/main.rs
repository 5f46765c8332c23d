/// Reel Simulator - runs the player control core against a card directory
use anyhow::Context;
use clap::{Parser, Subcommand};
use reel_core::{mailbox, PostPolicy, SystemClock};
use reel_playback::{display_channels, GestureConfig, InputTranslator, StreamingEngine};
use reel_sim::{
    config::SimulatorConfig, display::spawn_display, prepare_card, Console, FsStorage,
    PacedDecoder,
};
use std::io;
use std::path::PathBuf;
use std::thread;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reel-sim")]
#[command(about = "Reel audio player simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a card directory, reading gestures from stdin
    Play {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Card directory (overrides the config file)
        #[arg(short, long, env = "REEL_MUSIC_ROOT")]
        music_root: Option<PathBuf>,

        /// Print display snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Copy audio files onto a card directory and write its index
    Index {
        /// Directory holding the audio files
        source: PathBuf,

        /// Card directory to populate
        #[arg(short, long)]
        output: PathBuf,

        /// Index file name
        #[arg(long, default_value = "songs.txt")]
        index_file: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reel_sim=info,reel_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config,
            music_root,
            json,
        } => {
            let mut settings = SimulatorConfig::load(config.as_deref())?;
            if let Some(root) = music_root {
                settings.card.music_root = root;
            }
            settings.display.json |= json;
            settings.validate()?;
            play(settings)?;
        }
        Commands::Index {
            source,
            output,
            index_file,
        } => {
            let entries = prepare_card(&source, &output, &index_file)
                .with_context(|| format!("indexing {}", source.display()))?;
            for entry in &entries {
                println!("{}, {}", entry.key, entry.title);
            }
        }
    }

    Ok(())
}

fn play(settings: SimulatorConfig) -> anyhow::Result<()> {
    info!("Playing card {}", settings.card.music_root.display());

    let (engine_postbox, engine_mailbox) = mailbox(PostPolicy::Overwrite);
    let (touch_postbox, touch_mailbox) = mailbox(PostPolicy::Reject);
    let (display_link, display_port) = display_channels();

    let storage = FsStorage::new(
        settings.card.music_root.clone(),
        settings.card.index_file.as_str(),
    );
    let decoder = PacedDecoder::new(settings.decoder.byte_rate);
    let stats = decoder.stats();

    // Start on this thread so an unplayable card fails before any input is read
    let engine = StreamingEngine::start(
        settings.engine.clone(),
        storage,
        decoder,
        SystemClock::new(),
        engine_mailbox,
        display_link.clone(),
    )
    .context("starting the streaming engine")?;
    info!("{} tracks on the card", engine.playlist().len());

    let gestures = GestureConfig::default();
    let display = spawn_display(display_port, settings.display.clone())?;
    let engine = thread::Builder::new()
        .name("streaming-engine".to_string())
        .spawn(move || engine.run())?;
    let translator = InputTranslator::new(
        gestures,
        engine_postbox,
        display_link,
        SystemClock::new(),
    )
    .spawn(touch_mailbox)?;

    let console = Console::new(touch_postbox, gestures);
    let stdin = io::stdin();
    console.run(stdin.lock(), || !engine.is_finished())?;

    // Closing touch input stops the translator, which powers off the engine,
    // which closes the display
    drop(console);
    translator
        .join()
        .map_err(|_| anyhow::anyhow!("input translator panicked"))?;
    engine
        .join()
        .map_err(|_| anyhow::anyhow!("streaming engine panicked"))?;
    display
        .join()
        .map_err(|_| anyhow::anyhow!("display panicked"))?;

    info!(
        "Streamed {} bytes over {} decoder resets",
        stats.bytes(),
        stats.resets()
    );
    Ok(())
}
