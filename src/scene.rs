//! Stored scenes: named assignments of presets to bulbs.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use uuid::Uuid;

use crate::errors::Error;
use crate::preset::PresetCatalog;
use crate::prompt::{Prompter, Rejection};

type Result<T> = std::result::Result<T, Error>;

/// Bulb name to preset name. Ordered so serialization is deterministic.
pub type SceneSettings = BTreeMap<String, String>;

/// Scene name to its settings; the shape of an export document.
pub type SceneTable = BTreeMap<String, SceneSettings>;

/// Outcome of importing a scene document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub empty_skipped: usize,
    pub duplicates_skipped: usize,
}

impl ImportReport {
    /// At least one scene was added and nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.added > 0 && self.empty_skipped == 0 && self.duplicates_skipped == 0
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut phrases = Vec::new();
        if self.added == 0 {
            phrases.push("No new scenes added.");
        }
        if self.empty_skipped > 0 {
            phrases.push("Skipped empty scene(s).");
        }
        if self.duplicates_skipped > 0 {
            phrases.push("Skipped duplicate(s).");
        }
        write!(f, "{}", phrases.join(" "))
    }
}

/// Persistent scene table.
///
/// A scene always holds at least one bulb. Bulb names are stored by value
/// and are not checked against the bulb registry; a scene may outlive the
/// bulbs it mentions.
pub struct SceneStore<'a> {
    conn: &'a Connection,
}

impl<'a> SceneStore<'a> {
    /// Wrap the connection, creating the `scenes` table if needed.
    pub fn new(conn: &'a Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS scenes (
                name TEXT PRIMARY KEY,
                settings TEXT NOT NULL
            )",
            [],
        )?;
        Ok(SceneStore { conn })
    }

    /// All scene names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM scenes ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn is_empty(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scenes", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM scenes WHERE name = ?1", [name], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Every scene with its settings.
    pub fn all(&self) -> Result<SceneTable> {
        let mut stmt = self.conn.prepare("SELECT name, settings FROM scenes")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(name, settings)| decode(&settings).map(|settings| (name, settings)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Result<SceneSettings> {
        let settings: Option<String> = self
            .conn
            .query_row("SELECT settings FROM scenes WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;

        match settings {
            Some(settings) => decode(&settings),
            None => Err(Error::SceneNotFound(name.to_string())),
        }
    }

    /// Ask for a preset for every bulb in `bulb_names`.
    ///
    /// An empty answer leaves the bulb out; an answer that is not a preset
    /// name is rejected and asked again. The result may be empty.
    pub fn compose<P: Prompter>(
        bulb_names: &[String],
        presets: &PresetCatalog,
        prompter: &mut P,
    ) -> Result<SceneSettings> {
        if bulb_names.is_empty() {
            return Err(Error::NoBulbs);
        }

        let choices = presets.list();
        let mut settings = SceneSettings::new();
        for bulb in bulb_names {
            let mut rejected = None;
            loop {
                let answer = prompter
                    .preset_choice(bulb, &choices, rejected.as_ref())
                    .map_err(Error::Prompt)?;
                let choice = answer.trim();
                if choice.is_empty() {
                    break;
                }
                if presets.contains(choice) {
                    settings.insert(bulb.clone(), choice.to_string());
                    break;
                }
                rejected = Some(Rejection::UnknownPreset(choice.to_string()));
            }
        }
        Ok(settings)
    }

    /// Interactively build a scene over `bulb_names` and store it as `name`.
    pub fn add<P: Prompter>(
        &self,
        name: &str,
        bulb_names: &[String],
        presets: &PresetCatalog,
        prompter: &mut P,
    ) -> Result<()> {
        if bulb_names.is_empty() {
            return Err(Error::NoBulbs);
        }
        if self.contains(name)? {
            return Err(Error::DuplicateSceneName(name.to_string()));
        }

        let settings = Self::compose(bulb_names, presets, prompter)?;
        if settings.is_empty() {
            return Err(Error::EmptyScene(name.to_string()));
        }
        insert(self.conn, name, &settings)
    }

    /// Replace the settings of an existing scene in one statement.
    pub fn update(
        &self,
        name: &str,
        settings: &SceneSettings,
        presets: &PresetCatalog,
    ) -> Result<()> {
        if !self.contains(name)? {
            return Err(Error::SceneNotFound(name.to_string()));
        }
        if settings.is_empty() {
            return Err(Error::EmptyScene(name.to_string()));
        }
        if let Some(unknown) = settings.values().find(|preset| !presets.contains(preset)) {
            return Err(Error::PresetNotFound(unknown.clone()));
        }

        self.conn.execute(
            "UPDATE scenes SET settings = ?2 WHERE name = ?1",
            params![name, encode(settings)?],
        )?;
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM scenes WHERE name = ?1", [name])?;
        if deleted == 0 {
            return Err(Error::SceneNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Render every scene as one JSON document.
    ///
    /// Keys are sorted at both levels and indented by four spaces, so an
    /// unchanged store always renders to the same bytes.
    pub fn export_document(&self) -> Result<String> {
        let table = self.all()?;
        if table.is_empty() {
            return Err(Error::NothingToExport);
        }

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        table.serialize(&mut ser).map_err(Error::JsonDump)?;
        String::from_utf8(buf).map_err(Error::Utf8Decode)
    }

    /// Write [`SceneStore::export_document`] to `path`.
    ///
    /// The document goes to a temporary sibling first and is renamed into
    /// place, so a failed export never truncates an earlier one.
    pub fn export(&self, path: &Path) -> Result<()> {
        let document = self.export_document()?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenes".to_string());
        let staging = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        fs::write(&staging, document).map_err(|e| Error::file(&staging, e))?;
        fs::rename(&staging, path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            Error::file(path, e)
        })
    }

    /// Import scenes from the file at `path`. See [`SceneStore::load_document`].
    pub fn load(&self, path: &Path) -> Result<usize> {
        let text = fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        self.load_document(&text, &path.display().to_string())
    }

    /// Import scenes from a document shaped like the export.
    ///
    /// Scenes with no bulbs and scenes whose name is already stored are
    /// skipped; the rest are inserted together. Returns the number added, or
    /// [`Error::ImportIssues`] when nothing was added or anything was
    /// skipped. An unparsable document inserts nothing.
    pub fn load_document(&self, document: &str, source_name: &str) -> Result<usize> {
        let incoming: SceneTable =
            serde_json::from_str(document).map_err(|err| Error::CorruptData {
                source_name: source_name.to_string(),
                err,
            })?;

        let mut report = ImportReport::default();
        let tx = self.conn.unchecked_transaction()?;
        for (name, settings) in &incoming {
            if settings.is_empty() {
                report.empty_skipped += 1;
                continue;
            }
            if self.contains(name)? {
                report.duplicates_skipped += 1;
                continue;
            }
            insert(&tx, name, settings)?;
            report.added += 1;
        }
        tx.commit()?;

        if report.is_clean() {
            Ok(report.added)
        } else {
            Err(Error::ImportIssues(report))
        }
    }
}

fn insert(conn: &Connection, name: &str, settings: &SceneSettings) -> Result<()> {
    conn.execute(
        "INSERT INTO scenes (name, settings) VALUES (?1, ?2)",
        params![name, encode(settings)?],
    )?;
    Ok(())
}

fn encode(settings: &SceneSettings) -> Result<String> {
    serde_json::to_string(settings).map_err(Error::JsonDump)
}

fn decode(settings: &str) -> Result<SceneSettings> {
    serde_json::from_str(settings).map_err(Error::JsonLoad)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::testing::ScriptedPrompter;

    fn conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn settings(pairs: &[(&str, &str)]) -> SceneSettings {
        pairs
            .iter()
            .map(|(bulb, preset)| (bulb.to_string(), preset.to_string()))
            .collect()
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("wiz-scenes-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn test_add_single_bulb_scene() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        let presets = PresetCatalog::new();

        let mut prompter = ScriptedPrompter::new(&["warm"]);
        scenes
            .add("evening", &names(&["desk"]), &presets, &mut prompter)
            .unwrap();

        assert_eq!(scenes.list().unwrap(), vec!["evening"]);
        assert_eq!(scenes.get("evening").unwrap(), settings(&[("desk", "warm")]));
    }

    #[test]
    fn test_add_reprompts_and_skips() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        let presets = PresetCatalog::new();

        let mut prompter = ScriptedPrompter::new(&["sparkle", " blue ", "", "off"]);
        scenes
            .add("night", &names(&["desk", "hall", "porch"]), &presets, &mut prompter)
            .unwrap();

        assert_eq!(
            scenes.get("night").unwrap(),
            settings(&[("desk", "blue"), ("porch", "off")])
        );
        assert_eq!(
            prompter.rejections,
            vec![Rejection::UnknownPreset("sparkle".into())]
        );
    }

    #[test]
    fn test_add_validation() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        let presets = PresetCatalog::new();
        let bulbs = names(&["desk"]);

        let mut prompter = ScriptedPrompter::new(&[""]);
        assert_eq!(
            scenes.add("empty", &bulbs, &presets, &mut prompter).unwrap_err(),
            Error::EmptyScene("empty".into())
        );
        assert!(scenes.is_empty().unwrap());

        let mut prompter = ScriptedPrompter::default();
        assert_eq!(
            scenes.add("any", &[], &presets, &mut prompter).unwrap_err(),
            Error::NoBulbs
        );

        let mut prompter = ScriptedPrompter::new(&["cold"]);
        scenes.add("a", &bulbs, &presets, &mut prompter).unwrap();
        let mut prompter = ScriptedPrompter::new(&["warm"]);
        assert_eq!(
            scenes.add("a", &bulbs, &presets, &mut prompter).unwrap_err(),
            Error::DuplicateSceneName("a".into())
        );
        assert_eq!(scenes.get("a").unwrap(), settings(&[("desk", "cold")]));
    }

    #[test]
    fn test_get_and_remove_missing() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();

        assert_eq!(
            scenes.get("ghost").unwrap_err(),
            Error::SceneNotFound("ghost".into())
        );
        assert_eq!(
            scenes.remove("ghost").unwrap_err(),
            Error::SceneNotFound("ghost".into())
        );
    }

    #[test]
    fn test_remove() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        insert(&conn, "a", &settings(&[("desk", "warm")])).unwrap();

        scenes.remove("a").unwrap();
        assert!(scenes.list().unwrap().is_empty());
        assert!(scenes.remove("a").unwrap_err().is_not_found());
    }

    #[test]
    fn test_update() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        let presets = PresetCatalog::new();
        insert(&conn, "a", &settings(&[("desk", "warm")])).unwrap();

        let replacement = settings(&[("desk", "off"), ("hall", "dim")]);
        scenes.update("a", &replacement, &presets).unwrap();
        assert_eq!(scenes.get("a").unwrap(), replacement);

        assert_eq!(
            scenes.update("b", &replacement, &presets).unwrap_err(),
            Error::SceneNotFound("b".into())
        );
        assert_eq!(
            scenes.update("a", &SceneSettings::new(), &presets).unwrap_err(),
            Error::EmptyScene("a".into())
        );
        assert_eq!(
            scenes
                .update("a", &settings(&[("desk", "sparkle")]), &presets)
                .unwrap_err(),
            Error::PresetNotFound("sparkle".into())
        );
        assert_eq!(scenes.get("a").unwrap(), replacement);
    }

    #[test]
    fn test_export_is_sorted_and_indented() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        insert(&conn, "night", &settings(&[("porch", "off"), ("desk", "dim")])).unwrap();
        insert(&conn, "evening", &settings(&[("desk", "warm")])).unwrap();

        let expected = "{\n    \"evening\": {\n        \"desk\": \"warm\"\n    },\n    \"night\": {\n        \"desk\": \"dim\",\n        \"porch\": \"off\"\n    }\n}";
        assert_eq!(scenes.export_document().unwrap(), expected);
        assert_eq!(scenes.export_document().unwrap(), expected);
    }

    #[test]
    fn test_export_empty_store() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();

        assert_eq!(scenes.export_document().unwrap_err(), Error::NothingToExport);
        let path = temp_path();
        assert_eq!(scenes.export(&path).unwrap_err(), Error::NothingToExport);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_then_load_into_empty_store() {
        let source = conn();
        let scenes = SceneStore::new(&source).unwrap();
        insert(&source, "a", &settings(&[("desk", "warm"), ("hall", "red")])).unwrap();
        insert(&source, "b", &settings(&[("porch", "off")])).unwrap();

        let path = temp_path();
        scenes.export(&path).unwrap();

        let target = conn();
        let imported = SceneStore::new(&target).unwrap();
        assert_eq!(imported.load(&path).unwrap(), 2);
        assert_eq!(imported.all().unwrap(), scenes.all().unwrap());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_reimport_after_removal() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        insert(&conn, "a", &settings(&[("desk", "warm")])).unwrap();
        insert(&conn, "b", &settings(&[("desk", "blue")])).unwrap();

        let document = scenes.export_document().unwrap();
        scenes.remove("b").unwrap();

        // "a" is still stored, so it counts as a duplicate.
        let err = scenes.load_document(&document, "export").unwrap_err();
        assert_eq!(
            err,
            Error::ImportIssues(ImportReport {
                added: 1,
                empty_skipped: 0,
                duplicates_skipped: 1,
            })
        );
        assert_eq!(err.to_string(), "Skipped duplicate(s).");
        assert_eq!(scenes.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_load_missing_scene_only() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        insert(&conn, "a", &settings(&[("desk", "warm")])).unwrap();

        let added = scenes
            .load_document(r#"{"b": {"desk": "blue"}}"#, "inline")
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(scenes.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_load_reports_every_issue() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();
        insert(&conn, "a", &settings(&[("desk", "warm")])).unwrap();

        let err = scenes
            .load_document(r#"{"a": {"desk": "red"}, "empty": {}}"#, "inline")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No new scenes added. Skipped empty scene(s). Skipped duplicate(s)."
        );
        assert_eq!(scenes.get("a").unwrap(), settings(&[("desk", "warm")]));
        assert!(!scenes.contains("empty").unwrap());
    }

    #[test]
    fn test_load_empty_only_has_no_duplicate_phrase() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();

        let err = scenes
            .load_document(r#"{"new": {"desk": "red"}, "empty": {}}"#, "inline")
            .unwrap_err();
        let message = err.to_string();
        assert_eq!(message, "Skipped empty scene(s).");
        assert!(!message.contains("duplicate"));
        assert_eq!(scenes.list().unwrap(), vec!["new"]);
    }

    #[test]
    fn test_load_empty_document() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();

        let err = scenes.load_document("{}", "inline").unwrap_err();
        assert_eq!(err.to_string(), "No new scenes added.");
    }

    #[test]
    fn test_load_corrupt_document() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();

        for document in ["{\"a\": {\"desk\": ", "[1, 2]", r#"{"a": {"desk": 3}}"#] {
            assert!(matches!(
                scenes.load_document(document, "inline"),
                Err(Error::CorruptData { .. })
            ));
        }
        assert!(scenes.is_empty().unwrap());
    }

    #[test]
    fn test_load_missing_file() {
        let conn = conn();
        let scenes = SceneStore::new(&conn).unwrap();

        assert!(matches!(
            scenes.load(&temp_path()),
            Err(Error::File { .. })
        ));
    }
}
