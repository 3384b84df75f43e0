//! Per-application mapping tables from gesture events to actions.
//!
//! The mapping file has the shape `{"profile": {"GESTURE": "action"}}`.
//! Profiles in the file replace the built-in profile of the same id; the
//! other built-ins stay available.

use crate::core::events::GestureKind;
use crate::dispatch::action::{Action, Key};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_PROFILE: &str = "default";

/// One application profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub mappings: BTreeMap<GestureKind, Action>,
}

impl Profile {
    pub fn new(id: &str, display_name: &str, mappings: BTreeMap<GestureKind, Action>) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            mappings,
        }
    }
}

type MappingFile = BTreeMap<String, BTreeMap<GestureKind, Action>>;

/// All known profiles, keyed by id. Always contains `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    profiles: BTreeMap<String, Profile>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    /// The built-in `default`, `browser` and `designer` profiles.
    pub fn builtin() -> Self {
        let base = base_mappings();

        let mut default = base.clone();
        default.insert(GestureKind::SwipeLeft, Action::hotkey(&[Key::Left]));
        default.insert(GestureKind::SwipeRight, Action::hotkey(&[Key::Right]));
        default.insert(GestureKind::SwipeUp, Action::hotkey(&[Key::Up]));
        default.insert(GestureKind::SwipeDown, Action::hotkey(&[Key::Down]));

        let mut browser = default.clone();
        browser.insert(GestureKind::SwipeLeft, Action::hotkey(&[Key::Alt, Key::Left]));
        browser.insert(GestureKind::SwipeRight, Action::hotkey(&[Key::Alt, Key::Right]));

        let mut designer = base;
        designer.insert(
            GestureKind::SwipeLeft,
            Action::hotkey(&[Key::Ctrl, Key::Char('z')]),
        );
        designer.insert(
            GestureKind::SwipeRight,
            Action::hotkey(&[Key::Ctrl, Key::Shift, Key::Char('z')]),
        );

        let profiles = [
            Profile::new(DEFAULT_PROFILE, "Default Profile", default),
            Profile::new("browser", "Web Browser Profile", browser),
            Profile::new("designer", "Design Tool Profile", designer),
        ]
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

        Self { profiles }
    }

    /// Parse a mapping file on top of the built-ins.
    pub fn from_json(content: &str) -> Result<Self, ProfileError> {
        let file: MappingFile =
            serde_json::from_str(content).map_err(|e| ProfileError::ParseError(e.to_string()))?;

        let mut table = Self::builtin();
        for (id, mappings) in file {
            if id.trim().is_empty() {
                return Err(ProfileError::EmptyProfileId);
            }
            let display_name = table
                .profiles
                .get(&id)
                .map(|p| p.display_name.clone())
                .unwrap_or_else(|| id.clone());
            debug!(profile = %id, mappings = mappings.len(), "loaded profile");
            table
                .profiles
                .insert(id.clone(), Profile::new(&id, &display_name, mappings));
        }
        Ok(table)
    }

    /// Load the mapping file if present, otherwise use the built-ins.
    pub fn load_or_builtin(path: &Path) -> Result<Self, ProfileError> {
        if !path.exists() {
            info!("No mapping file at {}, using built-in profiles", path.display());
            return Ok(Self::builtin());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ProfileError::IoError(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Write the table in the mapping file format.
    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProfileError::IoError(e.to_string()))?;
        }
        let file: MappingFile = self
            .profiles
            .iter()
            .map(|(id, p)| (id.clone(), p.mappings.clone()))
            .collect();
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| ProfileError::ParseError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ProfileError::IoError(e.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }
}

/// Mappings shared by every built-in profile.
fn base_mappings() -> BTreeMap<GestureKind, Action> {
    [
        (GestureKind::MouseMove, Action::MouseMove),
        (GestureKind::LeftClick, Action::LeftClick),
        (GestureKind::DoubleClick, Action::DoubleClick),
        (GestureKind::DragStart, Action::MouseDownLeft),
        (GestureKind::Dragging, Action::MouseDrag),
        (GestureKind::DragDrop, Action::MouseUpLeft),
        (GestureKind::ScrollUp, Action::Scroll),
        (GestureKind::ScrollDown, Action::Scroll),
    ]
    .into_iter()
    .collect()
}

/// Pure lookup from (profile, event) to an action.
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    table: ProfileTable,
}

impl ProfileResolver {
    pub fn new(table: ProfileTable) -> Self {
        Self { table }
    }

    /// Unknown profiles resolve through `default`. `None` means the event
    /// is unmapped; an explicit `none` action is reported as unmapped too.
    pub fn resolve(&self, profile: &str, kind: GestureKind) -> Option<&Action> {
        let profile = self
            .table
            .get(profile)
            .or_else(|| self.table.get(DEFAULT_PROFILE))?;
        profile
            .mappings
            .get(&kind)
            .filter(|action| **action != Action::None)
    }

    /// The id a lookup for `profile` actually uses.
    pub fn effective_profile<'a>(&self, profile: &'a str) -> &'a str {
        if self.table.contains(profile) {
            profile
        } else {
            DEFAULT_PROFILE
        }
    }

    pub fn table(&self) -> &ProfileTable {
        &self.table
    }
}

/// Errors loading profiles.
#[derive(Debug)]
pub enum ProfileError {
    IoError(String),
    ParseError(String),
    EmptyProfileId,
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::IoError(e) => write!(f, "IO error: {e}"),
            ProfileError::ParseError(e) => write!(f, "Mapping file error: {e}"),
            ProfileError::EmptyProfileId => write!(f, "Mapping file has an empty profile id"),
        }
    }
}

impl std::error::Error for ProfileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let resolver = ProfileResolver::new(ProfileTable::builtin());

        assert_eq!(
            resolver.resolve("default", GestureKind::SwipeLeft),
            Some(&Action::hotkey(&[Key::Left]))
        );
        assert_eq!(
            resolver.resolve("browser", GestureKind::SwipeRight),
            Some(&Action::hotkey(&[Key::Alt, Key::Right]))
        );
        assert_eq!(
            resolver.resolve("designer", GestureKind::SwipeRight),
            Some(&Action::hotkey(&[Key::Ctrl, Key::Shift, Key::Char('z')]))
        );
        assert_eq!(resolver.resolve("designer", GestureKind::SwipeUp), None);
        assert_eq!(resolver.resolve("default", GestureKind::FistToOpen), None);
        assert_eq!(
            resolver.resolve("browser", GestureKind::DragStart),
            Some(&Action::MouseDownLeft)
        );
    }

    #[test]
    fn test_unknown_profile_falls_back_to_default() {
        let resolver = ProfileResolver::new(ProfileTable::builtin());
        assert_eq!(
            resolver.resolve("spreadsheet", GestureKind::SwipeUp),
            Some(&Action::hotkey(&[Key::Up]))
        );
        assert_eq!(resolver.effective_profile("spreadsheet"), "default");
        assert_eq!(resolver.effective_profile("browser"), "browser");
    }

    #[test]
    fn test_mapping_file_overrides_and_adds() {
        let json = r#"{
            "default": {"LEFT_CLICK": "left_click", "FIST_TO_OPEN": "hotkey:meta+tab"},
            "slides": {"SWIPE_RIGHT": "hotkey:pagedown", "SWIPE_LEFT": "do_nothing"}
        }"#;
        let table = ProfileTable::from_json(json).unwrap();
        let resolver = ProfileResolver::new(table);

        assert_eq!(
            resolver.resolve("default", GestureKind::FistToOpen),
            Some(&Action::hotkey(&[Key::Meta, Key::Tab]))
        );
        // The file replaced the whole default profile.
        assert_eq!(resolver.resolve("default", GestureKind::MouseMove), None);
        assert_eq!(resolver.resolve("slides", GestureKind::SwipeLeft), None);
        assert_eq!(
            resolver.resolve("slides", GestureKind::SwipeRight),
            Some(&Action::hotkey(&[Key::PageDown]))
        );
        assert!(resolver.table().contains("browser"));
        assert_eq!(
            resolver.table().get("default").map(|p| p.display_name.as_str()),
            Some("Default Profile")
        );
    }

    #[test]
    fn test_mapping_file_errors() {
        assert!(matches!(
            ProfileTable::from_json(r#"{"default": {"LEFT_CLICK": "explode"}}"#),
            Err(ProfileError::ParseError(_))
        ));
        assert!(matches!(
            ProfileTable::from_json(r#"{"default": {"WAVE": "left_click"}}"#),
            Err(ProfileError::ParseError(_))
        ));
        assert!(matches!(
            ProfileTable::from_json(r#"{"": {}}"#),
            Err(ProfileError::EmptyProfileId)
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "handbridge-mappings-{}.json",
            std::process::id()
        ));
        let table = ProfileTable::builtin();
        table.save(&path).unwrap();
        let loaded = ProfileTable::load_or_builtin(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, table);
    }
}
