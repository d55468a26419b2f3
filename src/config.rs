use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::Level;

pub const CONFIG_PATH_ENV: &str = "PORTRAIT_ALBUM_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "portrait-album.toml";
const ENV_PREFIX: &str = "PORTRAIT_ALBUM";
const API_KEY_FALLBACK_ENV: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub api: ApiSettings,
    pub generation: GenerationSettings,
    pub album: AlbumSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Upper bound on in-flight API calls, shared by the queue and regeneration.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlbumSettings {
    pub page_width: u32,
    pub page_height: u32,
    pub columns: u32,
    pub title: String,
    pub footer: String,
    pub background: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            api: ApiSettings::default(),
            generation: GenerationSettings::default(),
            album: AlbumSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash-image-preview".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { concurrency: 2 }
    }
}

impl Default for AlbumSettings {
    fn default() -> Self {
        Self {
            page_width: 2480,
            page_height: 3508,
            columns: 2,
            title: "Portrait Variations".to_string(),
            footer: "Made with portrait-album".to_string(),
            background: "#fdf5e6".to_string(),
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 860.0,
        }
    }
}

impl Settings {
    /// Loads settings from the optional config file and `PORTRAIT_ALBUM__*`
    /// environment overrides, on top of the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut settings: Settings = config::Config::builder()
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if settings.api.api_key.is_none() {
            settings.api.api_key = API_KEY_FALLBACK_ENV
                .iter()
                .find_map(|name| std::env::var(name).ok())
                .filter(|key| !key.trim().is_empty());
        }
        settings.generation.concurrency = settings.generation.concurrency.max(1);
        settings.album.columns = settings.album.columns.max(1);
        Ok(settings)
    }

    pub fn max_log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Tests that call `Settings::load` read the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_use_two_workers() {
        let settings = Settings::default();
        assert_eq!(settings.generation.concurrency, 2);
        assert_eq!(settings.album.columns, 2);
        assert_eq!(settings.max_log_level(), Level::INFO);
    }

    #[test]
    fn test_load_reads_partial_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = std::env::temp_dir().join(format!("portrait-album-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        writeln!(file, "[api]").unwrap();
        writeln!(file, "model = \"test-model\"").unwrap();
        writeln!(file, "api_key = \"abc\"").unwrap();
        writeln!(file, "[generation]").unwrap();
        writeln!(file, "concurrency = 0").unwrap();
        drop(file);

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.api.model, "test-model");
        assert_eq!(settings.api.api_key.as_deref(), Some("abc"));
        assert_eq!(settings.api.timeout_secs, 120);
        assert_eq!(settings.generation.concurrency, 1);
        assert_eq!(settings.max_log_level(), Level::DEBUG);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_load_applies_env_overrides_and_key_fallback() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let missing = std::env::temp_dir().join(format!("portrait-album-{}.toml", uuid::Uuid::new_v4()));
        std::env::set_var("PORTRAIT_ALBUM__API__MODEL", "env-model");
        std::env::set_var("GEMINI_API_KEY", "key-from-env");

        let settings = Settings::load(Some(missing.as_path()));

        std::env::remove_var("PORTRAIT_ALBUM__API__MODEL");
        std::env::remove_var("GEMINI_API_KEY");
        let settings = settings.unwrap();
        assert_eq!(settings.api.model, "env-model");
        assert_eq!(settings.api.api_key.as_deref(), Some("key-from-env"));
        assert_eq!(settings.generation.concurrency, 2);
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let settings = Settings {
            log_level: "chatty".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.max_log_level(), Level::INFO);
    }
}
