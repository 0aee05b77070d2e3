use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::{
    domain::{
        clamp_size, clamp_size_input, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND,
        DEFAULT_SIZE_PIXELS,
    },
    ErrorCorrectionLevel, FormState,
};

pub const SETTINGS_FILE: &str = "qr_studio.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub initial_text: String,
    pub size: u32,
    pub error_correction: ErrorCorrectionLevel,
    pub foreground: String,
    pub background: String,
    pub debounce_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_text: "https://github.com/".into(),
            size: DEFAULT_SIZE_PIXELS,
            error_correction: ErrorCorrectionLevel::M,
            foreground: DEFAULT_FOREGROUND.into(),
            background: DEFAULT_BACKGROUND.into(),
            debounce_ms: 250,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn initial_form(&self) -> FormState {
        FormState {
            text: self.initial_text.clone(),
            size_input: self.size.to_string(),
            error_correction: self.error_correction,
            foreground: self.foreground.clone(),
            background: self.background.clone(),
        }
    }
}

/// Settings plus anything worth reporting once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warnings: Vec<String>,
}

/// `size = 300` and `size = "300px"` are both accepted, like the form field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SizeSetting {
    Pixels(i64),
    Text(String),
}

impl SizeSetting {
    fn resolve(&self) -> u32 {
        match self {
            Self::Pixels(px) => clamp_size(Some(*px)),
            Self::Text(raw) => clamp_size_input(raw),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    initial_text: Option<String>,
    size: Option<SizeSetting>,
    error_correction: Option<String>,
    foreground: Option<String>,
    background: Option<String>,
    debounce_ms: Option<u64>,
    log_filter: Option<String>,
}

pub fn load_settings(path: &Path) -> LoadedSettings {
    load_settings_with(path, |name| std::env::var(name).ok())
}

/// Defaults, then the TOML file at `path` if readable, then environment
/// overrides looked up through `env`. Problems come back as warnings; no log
/// subscriber exists yet when this runs.
pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> LoadedSettings {
    let mut settings = Settings::default();
    let mut warnings = Vec::new();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warnings.push(format!(
                "ignoring settings file '{}': {err}",
                path.display()
            )),
        }
    }

    if let Some(v) = env_override(&env, "QR_STUDIO_TEXT", "APP__INITIAL_TEXT") {
        settings.initial_text = v;
    }
    if let Some(v) = env_override(&env, "QR_STUDIO_SIZE", "APP__SIZE") {
        settings.size = clamp_size_input(&v);
    }
    if let Some(v) = env_override(&env, "QR_STUDIO_ECC", "APP__ERROR_CORRECTION") {
        if let Some(level) = ErrorCorrectionLevel::parse(&v) {
            settings.error_correction = level;
        }
    }
    if let Some(v) = env_override(&env, "QR_STUDIO_FG", "APP__FOREGROUND") {
        settings.foreground = v;
    }
    if let Some(v) = env_override(&env, "QR_STUDIO_BG", "APP__BACKGROUND") {
        settings.background = v;
    }
    if let Some(v) = env_override(&env, "QR_STUDIO_DEBOUNCE_MS", "APP__DEBOUNCE_MS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.debounce_ms = parsed,
            Err(_) => warnings.push(format!("ignoring debounce delay '{v}': not a number")),
        }
    }
    if let Some(v) = env_override(&env, "QR_STUDIO_LOG", "APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    LoadedSettings { settings, warnings }
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.initial_text {
        settings.initial_text = v;
    }
    if let Some(size) = file_cfg.size {
        settings.size = size.resolve();
    }
    if let Some(level) = file_cfg
        .error_correction
        .as_deref()
        .and_then(ErrorCorrectionLevel::parse)
    {
        settings.error_correction = level;
    }
    if let Some(v) = file_cfg.foreground {
        settings.foreground = v;
    }
    if let Some(v) = file_cfg.background {
        settings.background = v;
    }
    if let Some(v) = file_cfg.debounce_ms {
        settings.debounce_ms = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

/// The `APP__` name wins when both are set.
fn env_override(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
    app_name: &str,
) -> Option<String> {
    env(app_name).or_else(|| env(name))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
