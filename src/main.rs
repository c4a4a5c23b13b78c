//! Command-line front end for wiz-scenes.
//!
//! Run with: wiz-scenes --help

use std::fs::{self, OpenOptions};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use log::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use wiz_scenes::{
    AppConfig, BulbState, Database, Error, LinePrompter, PresetCatalog, SceneStore, set_scene,
};

#[derive(Parser)]
#[command(name = "wiz-scenes")]
#[command(about = "Name WiZ bulbs, store scenes and replay them", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/wiz-scenes/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available presets
    Presets,

    /// Manage stored bulbs
    #[command(subcommand)]
    Bulb(BulbCommand),

    /// Manage stored scenes
    #[command(subcommand)]
    Scene(SceneCommand),
}

#[derive(Subcommand)]
enum BulbCommand {
    /// List stored bulbs with their current state
    List,

    /// Search the network and name newly found bulbs
    Add,

    /// Store a bulb by address without discovery
    Register { name: String, ip: Ipv4Addr },

    /// Forget a bulb
    Remove { name: String },

    /// Apply a preset to one bulb
    Set { name: String, preset: String },
}

#[derive(Subcommand)]
enum SceneCommand {
    /// List stored scenes
    List,

    /// Show the bulbs and presets of one scene
    Show { name: String },

    /// Compose a new scene by picking a preset for every bulb
    Add { name: String },

    /// Compose a scene again and replace the stored one
    Update { name: String },

    /// Forget a scene
    Remove { name: String },

    /// Apply a scene to its bulbs
    Set { name: String },

    /// Write every scene to a JSON file
    Export {
        /// Output file (default: export_path from the config)
        path: Option<PathBuf>,
    },

    /// Import scenes from a JSON file written by `export`
    Load { path: PathBuf },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Logging disabled: {e}");
    }
    info!("Starting wiz-scenes");

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, Error> {
    match path.map(Path::to_path_buf).or_else(AppConfig::default_path) {
        Some(path) => AppConfig::load(&path),
        None => Ok(AppConfig::default()),
    }
}

fn init_logging(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level: LevelFilter = config.log_level.parse()?;

    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| e.to_string())?;
    Ok(())
}

async fn run(command: Commands, config: &AppConfig) -> Result<(), Error> {
    let presets = PresetCatalog::new();
    let db = Database::open(&config.db_path)?;
    let transport = config.transport();
    let bulbs = db.bulbs(&transport)?;
    let scenes = db.scenes()?;

    match command {
        Commands::Presets => {
            for (name, preset) in presets.iter() {
                println!("{:<10}{}", name, preset);
            }
        }

        Commands::Bulb(BulbCommand::List) => {
            let entries = bulbs.entries()?;
            if entries.is_empty() {
                println!("No bulbs saved.");
            }
            for bulb in entries {
                let state = bulbs
                    .status(&bulb.name)
                    .await?
                    .unwrap_or(BulbState::Unavailable);
                println!("{:<15}{:<10}{:<11}", bulb.ip.to_string(), bulb.name, state);
            }
        }

        Commands::Bulb(BulbCommand::Add) => {
            println!("Searching for bulbs . . .");
            let added = bulbs.add(&mut LinePrompter::stdio()).await?;
            info!("Bulb adding finished, {} added", added);
            println!("{added} bulb(s) added.");
        }

        Commands::Bulb(BulbCommand::Register { name, ip }) => {
            bulbs.register(&name, ip)?;
            info!("Bulb {} registered at {}", name, ip);
            println!("Bulb {name} has been added.");
        }

        Commands::Bulb(BulbCommand::Remove { name }) => {
            bulbs.remove(&name)?;
            info!("Bulb {} removed", name);
        }

        Commands::Bulb(BulbCommand::Set { name, preset }) => {
            bulbs.apply_preset(&name, presets.get(&preset)?).await?;
            info!("Bulb {} set to preset {}", name, preset);
        }

        Commands::Scene(SceneCommand::List) => {
            let table = scenes.all()?;
            if table.is_empty() {
                println!("No scenes saved.");
            }
            for (name, settings) in table {
                let entries: Vec<String> = settings
                    .iter()
                    .map(|(bulb, preset)| format!("{bulb}: {preset}"))
                    .collect();
                println!("{:<15}{}", format!("{name}:"), entries.join("  "));
            }
        }

        Commands::Scene(SceneCommand::Show { name }) => {
            for (bulb, preset) in scenes.get(&name)? {
                println!("{:<15}{}", bulb, preset);
            }
        }

        Commands::Scene(SceneCommand::Add { name }) => {
            scenes.add(&name, &bulbs.list()?, &presets, &mut LinePrompter::stdio())?;
            info!("Scene {} added", name);
        }

        Commands::Scene(SceneCommand::Update { name }) => {
            if !scenes.contains(&name)? {
                return Err(Error::SceneNotFound(name));
            }
            let settings =
                SceneStore::compose(&bulbs.list()?, &presets, &mut LinePrompter::stdio())?;
            scenes.update(&name, &settings, &presets)?;
            info!("Scene {} updated", name);
        }

        Commands::Scene(SceneCommand::Remove { name }) => {
            scenes.remove(&name)?;
            info!("Scene {} removed", name);
        }

        Commands::Scene(SceneCommand::Set { name }) => {
            set_scene(&scenes, &bulbs, &presets, &name).await?;
            info!("Scene {} set", name);
        }

        Commands::Scene(SceneCommand::Export { path }) => {
            let path = path.unwrap_or_else(|| config.export_path.clone());
            scenes.export(&path)?;
            info!("Scenes exported to {}", path.display());
            println!("Scenes exported to {}", path.display());
        }

        Commands::Scene(SceneCommand::Load { path }) => {
            let added = scenes.load(&path)?;
            info!("{} scene(s) imported from {}", added, path.display());
            println!("{added} scene(s) imported.");
        }
    }

    Ok(())
}
