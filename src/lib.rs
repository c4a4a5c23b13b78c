//! # wiz_scenes
//!
//! Name the WiZ smart bulbs on your network, group them into scenes and
//! replay those scenes later.
//!
//! The crate keeps two tables in a small SQLite database: bulbs (a name
//! and an address) and scenes (a name and a mapping from bulb name to
//! preset name). Presets come from a fixed catalog.
//!
//! ## Quick Start
//!
//! ```ignore
//! use wiz_scenes::{Database, LinePrompter, PresetCatalog, WizTransport, set_scene};
//!
//! async fn evening() -> Result<(), wiz_scenes::Error> {
//!     let db = Database::open("bulbs.db".as_ref())?;
//!     let transport = WizTransport::default();
//!     let presets = PresetCatalog::new();
//!     let bulbs = db.bulbs(&transport)?;
//!     let scenes = db.scenes()?;
//!
//!     // Flash every new bulb on the network and ask for a name.
//!     bulbs.add(&mut LinePrompter::stdio()).await?;
//!
//!     // Pick a preset for each bulb and store the result.
//!     scenes.add("evening", &bulbs.list()?, &presets, &mut LinePrompter::stdio())?;
//!
//!     // Replay it; unreachable bulbs are reported once the others are set.
//!     set_scene(&scenes, &bulbs, &presets, "evening").await
//! }
//! ```
//!
//! ## Components
//!
//! - [`PresetCatalog`]: the fixed brightness/colour presets
//! - [`BulbRegistry`]: stored bulbs, live status and preset application
//! - [`SceneStore`]: stored scenes with JSON export and import
//! - [`set_scene`]: applies a scene, collecting per-bulb failures
//! - [`Transport`]: the device seam, implemented for WiZ by [`WizTransport`]
//! - [`Prompter`]: where interactive answers come from
//!
//! ## Communication
//!
//! WiZ bulbs are driven over UDP on port 38899 and must be on the same
//! local network. Each command is sent once; a bulb that does not answer in
//! time is reported as unavailable.

mod bulb;
mod config;
mod db;
mod discovery;
mod errors;
mod executor;
mod light;
mod payload;
mod preset;
mod prompt;
mod scene;
#[cfg(test)]
mod testing;
mod transport;
mod types;

// Re-export public API
pub use bulb::{Bulb, BulbRegistry, BulbState};
pub use config::AppConfig;
pub use db::Database;
pub use discovery::{DiscoveredBulb, discover_bulbs};
pub use errors::Error;
pub use executor::{BulbFailure, FailureReason, set_scene};
pub use light::WizTransport;
pub use payload::Payload;
pub use preset::{ColorMode, Preset, PresetCatalog};
pub use prompt::{LinePrompter, Prompter, Rejection};
pub use scene::{ImportReport, SceneSettings, SceneStore, SceneTable};
pub use transport::Transport;
pub use types::{Brightness, Color, Kelvin, SceneMode};
