//! Named border settings kept as `<name>.json` files in one directory.

use super::BorderSettings;
use crate::error::{SettingsError, ToolkitError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// A directory of saved border settings
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Use `dir` for presets. It is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config dir>/photo-toolkit/borders`, if the platform has a config dir
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photo-toolkit").join("borders"))
    }

    /// Open the store in [`PresetStore::default_dir`]
    pub fn open_default() -> Result<Self, ToolkitError> {
        Self::default_dir()
            .map(Self::new)
            .ok_or_else(|| ToolkitError::Config("no configuration directory on this platform".to_string()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `settings` under its own name, replacing any preset of that name
    pub fn save(&self, settings: &BorderSettings) -> Result<PathBuf, SettingsError> {
        let path = self.path_for(&settings.name)?;
        settings.save(&path)?;
        info!(name = %settings.name, path = %path.display(), "preset saved");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<BorderSettings, SettingsError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(SettingsError::PresetNotFound {
                name: name.to_string(),
            });
        }
        BorderSettings::load(&path)
    }

    /// Preset names in alphabetical order. A missing directory has none.
    pub fn list(&self) -> Result<Vec<String>, SettingsError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .filter(|name| validate_name(name).is_ok())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn remove(&self, name: &str) -> Result<(), SettingsError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(name, "preset removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SettingsError::PresetNotFound {
                name: name.to_string(),
            }),
            Err(source) => Err(SettingsError::Io { path, source }),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, SettingsError> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

/// Names become file names, so no separators and no leading dot
fn validate_name(name: &str) -> Result<(), SettingsError> {
    let trimmed = name.trim();
    let valid = !trimmed.is_empty()
        && trimmed == name
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(SettingsError::InvalidName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::border::BorderColor;
    use tempfile::TempDir;

    fn preset(name: &str, width: u32) -> BorderSettings {
        BorderSettings::uniform(width, BorderColor::BLACK).with_name(name)
    }

    #[test]
    fn save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = PresetStore::new(temp.path().join("borders"));

        let path = store.save(&preset("instagram", 60)).unwrap();

        assert_eq!(path, temp.path().join("borders").join("instagram.json"));
        assert_eq!(store.load("instagram").unwrap(), preset("instagram", 60));
    }

    #[test]
    fn list_is_sorted_and_ignores_other_files() {
        let temp = TempDir::new().unwrap();
        let store = PresetStore::new(temp.path());
        store.save(&preset("thin", 5)).unwrap();
        store.save(&preset("gallery", 80)).unwrap();
        fs::write(temp.path().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list().unwrap(), vec!["gallery", "thin"]);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let temp = TempDir::new().unwrap();
        let store = PresetStore::new(temp.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn remove_deletes_preset() {
        let temp = TempDir::new().unwrap();
        let store = PresetStore::new(temp.path());
        store.save(&preset("thin", 5)).unwrap();

        store.remove("thin").unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.remove("thin"),
            Err(SettingsError::PresetNotFound { .. })
        ));
    }

    #[test]
    fn unknown_preset_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = PresetStore::new(temp.path());
        assert!(matches!(
            store.load("nope"),
            Err(SettingsError::PresetNotFound { .. })
        ));
    }

    #[test]
    fn rejects_unsafe_names() {
        let temp = TempDir::new().unwrap();
        let store = PresetStore::new(temp.path());
        for name in ["", "  ", "../escape", "a/b", "a\\b", ".hidden", " padded"] {
            assert!(
                matches!(store.save(&preset(name, 1)), Err(SettingsError::InvalidName { .. })),
                "accepted {:?}",
                name
            );
        }
    }
}
