use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::RepeatMode;
use crate::error::SettingsError;
use crate::playback::{DEFAULT_POLL_INTERVAL, EngineConfig};

const SETTINGS_FILE: &str = "settings.json";

/// 持久化到 `{data_dir}/settings.json` 的播放偏好
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub repeat_mode: RepeatMode,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            repeat_mode: RepeatMode::Off,
            shuffle: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_volume() -> f32 {
    1.0
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

// 轮询间隔下限 10ms
impl From<&PlayerSettings> for EngineConfig {
    fn from(s: &PlayerSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(s.poll_interval_ms.max(10)),
            volume: s.volume,
            repeat_mode: s.repeat_mode,
            shuffle: s.shuffle,
            ..EngineConfig::default()
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("dev", "local-player", "local-player")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("local-player"))
}

/// 文件缺失或损坏时回退到默认设置
pub fn load_settings(data_dir: &Path) -> PlayerSettings {
    let p = settings_path(data_dir);
    let Ok(bytes) = fs::read(&p) else {
        return PlayerSettings::default();
    };
    match serde_json::from_slice(&bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %p.display(), err = %e, "设置文件损坏，使用默认值");
            PlayerSettings::default()
        }
    }
}

/// 先写 `settings.json.tmp` 再 rename 覆盖
pub fn save_settings(data_dir: &Path, s: &PlayerSettings) -> Result<(), SettingsError> {
    fs::create_dir_all(data_dir).map_err(|source| SettingsError::Save { source })?;
    let p = settings_path(data_dir);
    let tmp = p.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(s).map_err(|source| SettingsError::Serialize { source })?;
    fs::write(&tmp, bytes).map_err(|source| SettingsError::Save { source })?;
    if let Err(e) = fs::rename(&tmp, &p) {
        let _ = fs::remove_file(&p);
        fs::rename(&tmp, &p).map_err(|_| SettingsError::Save { source: e })?;
    }
    Ok(())
}

fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE)
}
