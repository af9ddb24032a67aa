use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{
    ChatKitResult, CreateDirSnafu, ExtractSettingsSnafu, RenameTempFileSnafu,
    SerializeSettingsSnafu, WriteFileSnafu,
};
use crate::reactions::{DEFAULT_REACTIONS, ReactionPalette};
use crate::theme::{DesignTokens, ThemePreset, ThemeScope, TokenOverrides};

pub const SETTINGS_DIRECTORY_NAME: &str = "chatkit";
pub const SETTINGS_FILE_NAME: &str = "surface.json";
pub const DEFAULT_INPUT_PLACEHOLDER: &str = "Message";

/// User-tunable surface configuration persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSettings {
    #[serde(default)]
    pub preset: ThemePreset,
    /// Applied on top of the preset.
    #[serde(default)]
    pub overrides: TokenOverrides,
    #[serde(default = "default_reactions")]
    pub reactions: Vec<String>,
    #[serde(default = "default_input_placeholder")]
    pub input_placeholder: String,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            preset: ThemePreset::default(),
            overrides: TokenOverrides::default(),
            reactions: default_reactions(),
            input_placeholder: default_input_placeholder(),
        }
    }
}

impl SurfaceSettings {
    pub fn normalized(mut self) -> Self {
        self.reactions = ReactionPalette::new(self.reactions).glyphs().to_vec();
        if self.reactions.is_empty() {
            self.reactions = default_reactions();
        }

        self.input_placeholder = self.input_placeholder.trim().to_string();
        if self.input_placeholder.is_empty() {
            self.input_placeholder = default_input_placeholder();
        }

        self
    }

    pub fn theme_scope(&self) -> ThemeScope {
        ThemeScope::from_preset(self.preset).child(self.overrides.clone())
    }

    pub fn tokens(&self) -> DesignTokens {
        self.theme_scope().resolve()
    }

    pub fn palette(&self) -> ReactionPalette {
        ReactionPalette::new(self.reactions.iter().cloned())
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<SurfaceSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".chatkit"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    /// Opens the store, falling back to defaults when the file is missing or unreadable.
    pub fn new(config_path: PathBuf) -> Self {
        let settings = match Self::read_from_disk(&config_path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!("{error}. using defaults");
                SurfaceSettings::default()
            }
        };

        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<SurfaceSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: SurfaceSettings) -> ChatKitResult<()> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    /// Reads the file without touching the in-memory copy. A missing file yields defaults.
    pub fn read_from_disk(path: &Path) -> ChatKitResult<SurfaceSettings> {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
            return Ok(SurfaceSettings::default());
        }

        let settings = Figment::from(Serialized::defaults(SurfaceSettings::default()))
            .merge(Json::file(path))
            .extract::<SurfaceSettings>()
            .context(ExtractSettingsSnafu {
                stage: "extract-surface-settings",
                path: path.to_path_buf(),
            })?;

        Ok(settings.normalized())
    }

    fn persist(&self, settings: &SurfaceSettings) -> ChatKitResult<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeSettingsSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved surface settings to {:?}", self.config_path);
        Ok(())
    }
}

fn default_reactions() -> Vec<String> {
    DEFAULT_REACTIONS.iter().map(|glyph| glyph.to_string()).collect()
}

fn default_input_placeholder() -> String {
    DEFAULT_INPUT_PLACEHOLDER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatKitError;
    use crate::theme::Color;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("surface.json"));
        assert_eq!(*store.settings(), SurfaceSettings::default());
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.json");
        std::fs::write(
            &path,
            r##"{ "preset": "dark", "overrides": { "colors": { "primary": "#ff8800" } } }"##,
        )
        .unwrap();

        let store = SettingsStore::new(path);
        let settings = store.settings();
        assert_eq!(settings.preset, ThemePreset::Dark);
        assert_eq!(settings.reactions, default_reactions());

        let tokens = settings.tokens();
        assert_eq!(tokens.colors.primary, Color::rgb(0xff8800));
        assert_eq!(
            tokens.colors.background,
            ThemePreset::Dark.tokens().colors.background
        );
    }

    #[test]
    fn update_persists_normalized_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("surface.json");
        let store = SettingsStore::new(path.clone());

        store
            .update(SurfaceSettings {
                preset: ThemePreset::Green,
                reactions: vec!["🔥".to_string(), " ".to_string(), "🔥".to_string()],
                input_placeholder: "   ".to_string(),
                ..SurfaceSettings::default()
            })
            .unwrap();

        let current = store.settings();
        assert_eq!(current.reactions, ["🔥"]);
        assert_eq!(current.input_placeholder, DEFAULT_INPUT_PLACEHOLDER);
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = SettingsStore::new(path);
        assert_eq!(*reopened.settings(), *current);
    }

    #[test]
    fn malformed_file_reports_extract_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.json");
        std::fs::write(&path, r#"{ "preset": "neon" }"#).unwrap();

        let error = SettingsStore::read_from_disk(&path).unwrap_err();
        assert!(matches!(error, ChatKitError::ExtractSettings { .. }));

        let store = SettingsStore::new(path);
        assert_eq!(store.settings().preset, ThemePreset::Light);
    }
}
