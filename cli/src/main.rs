use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use pazuru::{render_to, BoardCore, DirFetcher, RevealMode, SvgScene};
use pazuru_core::BoardRules;
use pazuru_image_pipeline::{generate_puzzle, GeneratorConfig};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pazuru-cli", version, about = "Jigsaw puzzle generator and board inspector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Slice an image into jigsaw pieces plus a puzzle.json manifest.
    Generate {
        input: PathBuf,
        columns: u32,
        rows: u32,
        output: PathBuf,
        #[arg(long, env = "PAZURU_PIECE_WIDTH")]
        piece_width: Option<u32>,
        #[arg(long, env = "PAZURU_PIECE_HEIGHT")]
        piece_height: Option<u32>,
        #[arg(long, env = "PAZURU_TAB_SIZE")]
        tab_size: Option<u32>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load a generated puzzle into a board and report on it.
    Inspect {
        dir: PathBuf,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, default_value = "hidden")]
        reveal: String,
        #[arg(long)]
        scene: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    generator: GeneratorConfig,
    board: BoardRules,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            columns,
            rows,
            output,
            piece_width,
            piece_height,
            tab_size,
            config,
        } => {
            let mut generator = load_config(config.as_deref())?.generator;
            if let Some(value) = piece_width {
                generator.piece_width = value;
            }
            if let Some(value) = piece_height {
                generator.piece_height = value;
            }
            if let Some(value) = tab_size {
                generator.tab_size = value;
            }
            let report = generate_puzzle(&input, columns, rows, &output, &generator)?;
            println!("format: {}", report.format.label());
            println!("pieces: {}", report.entries.len());
            println!("manifest: {}", report.manifest_path.display());
        }
        Commands::Inspect {
            dir,
            seed,
            reveal,
            scene,
            config,
        } => {
            let rules = load_config(config.as_deref())?.board;
            let reveal = RevealMode::parse(&reveal)
                .ok_or_else(|| format!("unknown reveal mode: {reveal} (hidden, hint, exact)"))?;
            let board = match seed.as_deref() {
                Some(raw) => BoardCore::with_seed(rules, parse_seed_arg(raw)?),
                None => BoardCore::new(rules),
            };
            let fetcher = DirFetcher::new(&dir);
            info!(dir = %fetcher.root().display(), "loading puzzle");
            if let Err(err) = board.load(&fetcher).await {
                eprintln!("{}", board.status_text());
                return Err(err.into());
            }
            println!("{}", board.status_text());

            while board.reveal_mode() != reveal {
                board.cycle_solution_reveal();
            }
            if reveal != RevealMode::Hidden {
                println!("{}", board.status_text());
            }
            board.check_solved();
            println!("{}", board.status_text());
            println!("zoom: {}%", board.zoom_percent());

            if let Some(path) = scene {
                let mut surface = SvgScene::default();
                let frame = render_to(&board.snapshot(), &mut surface);
                tokio::fs::write(&path, surface.finish()).await?;
                info!(
                    sprites = frame.sprites.len(),
                    scene = %path.display(),
                    "scene written"
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let config = toml::from_str(&text)
        .map_err(|err| format!("invalid config {}: {err}", path.display()))?;
    Ok(config)
}

fn parse_seed_arg(raw: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u64>()?
    };
    Ok(value)
}
