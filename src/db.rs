//! SQLite file holding the bulb and scene tables.

use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::bulb::BulbRegistry;
use crate::errors::Error;
use crate::scene::SceneStore;
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;

/// An open database.
///
/// The registries borrow the connection; each one creates and owns its own
/// table.
///
/// ```
/// use wiz_scenes::{Database, WizTransport};
///
/// let db = Database::open_in_memory().unwrap();
/// let transport = WizTransport::default();
/// assert!(db.bulbs(&transport).unwrap().list().unwrap().is_empty());
/// assert!(db.scenes().unwrap().list().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
        Ok(Database {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Database {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bulbs<'a, T: Transport>(&'a self, transport: &'a T) -> Result<BulbRegistry<'a, T>> {
        BulbRegistry::new(&self.conn, transport)
    }

    pub fn scenes(&self) -> Result<SceneStore<'_>> {
        SceneStore::new(&self.conn)
    }
}
