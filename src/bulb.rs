//! Named bulbs and their live state.

use std::net::Ipv4Addr;

use rusqlite::{Connection, OptionalExtension, params};
use strum_macros::{Display, EnumString};

use crate::errors::Error;
use crate::preset::Preset;
use crate::prompt::{Prompter, Rejection};
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;

/// A stored bulb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bulb {
    pub name: String,
    pub ip: Ipv4Addr,
}

/// What a bulb reports when asked for its power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BulbState {
    On,
    Off,
    /// The bulb did not answer.
    Unavailable,
}

/// Persistent mapping of user-chosen bulb names to addresses.
///
/// Lookups that search (`find_by_name`, `find_by_address`, `status`) report
/// absence as `None`; operations that act on a named bulb (`remove`,
/// `apply_preset`) fail with [`Error::BulbNotFound`].
pub struct BulbRegistry<'a, T> {
    conn: &'a Connection,
    transport: &'a T,
}

impl<'a, T: Transport> BulbRegistry<'a, T> {
    /// Wrap the connection, creating the `bulbs` table if needed.
    pub fn new(conn: &'a Connection, transport: &'a T) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS bulbs (
                name TEXT PRIMARY KEY,
                ip TEXT NOT NULL
            )",
            [],
        )?;
        Ok(BulbRegistry { conn, transport })
    }

    pub fn transport(&self) -> &T {
        self.transport
    }

    /// All stored bulb names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM bulbs ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// All stored bulbs with their addresses, sorted by name.
    pub fn entries(&self) -> Result<Vec<Bulb>> {
        let mut stmt = self.conn.prepare("SELECT name, ip FROM bulbs ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(name, ip)| parse_ip(&ip).map(|ip| Bulb { name, ip }))
            .collect()
    }

    pub fn find_by_address(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM bulbs WHERE ip = ?1",
                [ip.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Ipv4Addr>> {
        let ip: Option<String> = self
            .conn
            .query_row("SELECT ip FROM bulbs WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        ip.as_deref().map(parse_ip).transpose()
    }

    /// Ask the bulb whether it is on.
    ///
    /// Returns `None` for an unknown name. Any communication failure is
    /// reported as [`BulbState::Unavailable`].
    pub async fn status(&self, name: &str) -> Result<Option<BulbState>> {
        let Some(ip) = self.find_by_name(name)? else {
            return Ok(None);
        };

        let state = match self.transport.power(ip).await {
            Ok(true) => BulbState::On,
            Ok(false) => BulbState::Off,
            Err(_) => BulbState::Unavailable,
        };
        Ok(Some(state))
    }

    /// Store a bulb under `name`.
    pub fn register(&self, name: &str, ip: Ipv4Addr) -> Result<()> {
        if self.find_by_name(name)?.is_some() {
            return Err(Error::DuplicateBulbName(name.to_string()));
        }
        if let Some(known) = self.find_by_address(ip)? {
            return Err(Error::invalid_address(
                &ip.to_string(),
                &format!("already known as {known}"),
            ));
        }

        self.conn.execute(
            "INSERT INTO bulbs (name, ip) VALUES (?1, ?2)",
            params![name, ip.to_string()],
        )?;
        Ok(())
    }

    /// Discover bulbs and let the user name the new ones.
    ///
    /// Each bulb not stored yet flashes while the prompter asks for its name.
    /// An empty answer skips the bulb; a name already in use is rejected and
    /// asked again. Returns how many bulbs were stored.
    pub async fn add<P: Prompter>(&self, prompter: &mut P) -> Result<usize> {
        let found = self.transport.discover().await?;
        if found.is_empty() {
            return Err(Error::NoBulbsDiscoverable);
        }

        let mut new_bulbs = 0;
        let mut added = 0;
        for bulb in found {
            if self.find_by_address(bulb.ip)?.is_some() {
                continue;
            }
            new_bulbs += 1;

            // The effect is only a hint; a bulb that ignores it can still be named.
            let _ = self.transport.set_power(bulb.ip, true).await;
            let _ = self.transport.run_indicator(bulb.ip).await;
            let named = self.name_bulb(bulb.ip, prompter);
            let _ = self.transport.stop_indicator(bulb.ip).await;

            if named? {
                added += 1;
            }
        }

        if new_bulbs == 0 {
            return Err(Error::NoNewBulbs);
        }
        Ok(added)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM bulbs WHERE name = ?1", [name])?;
        if deleted == 0 {
            return Err(Error::BulbNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Put the named bulb into the state described by `preset`.
    ///
    /// An "off" preset only switches the bulb off. Any other preset sets
    /// colour and brightness in one command and then makes sure the bulb is
    /// powered. Device failures surface as [`Error::Unavailable`].
    pub async fn apply_preset(&self, name: &str, preset: &Preset) -> Result<()> {
        let ip = self
            .find_by_name(name)?
            .ok_or_else(|| Error::BulbNotFound(name.to_string()))?;

        let outcome = match preset.mode() {
            None => self.transport.set_power(ip, false).await,
            Some(mode) => {
                match self.transport.set_light(ip, preset.brightness(), mode).await {
                    Ok(()) => self.transport.set_power(ip, true).await,
                    Err(e) => Err(e),
                }
            }
        };
        outcome.map_err(|e| Error::unavailable(name, e))
    }

    fn name_bulb<P: Prompter>(&self, ip: Ipv4Addr, prompter: &mut P) -> Result<bool> {
        let mut rejected = None;
        loop {
            let answer = prompter
                .bulb_name(ip, rejected.as_ref())
                .map_err(Error::Prompt)?;
            let name = answer.trim();
            if name.is_empty() {
                return Ok(false);
            }
            if self.find_by_name(name)?.is_some() {
                rejected = Some(Rejection::DuplicateBulbName(name.to_string()));
                continue;
            }

            self.register(name, ip)?;
            return Ok(true);
        }
    }
}

fn parse_ip(ip: &str) -> Result<Ipv4Addr> {
    ip.parse()
        .map_err(|_| Error::invalid_address(ip, "not an IPv4 address"))
}
