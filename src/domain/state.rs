use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    /// 资源已打开，尚未开始输出
    Ready,
    Playing,
    Paused,
    Stopped,
    /// 上次加载/启动失败；下一次 `load` 清除
    Error,
}

impl PlaybackState {
    pub fn can_transition_to(self, next: PlaybackState) -> bool {
        use PlaybackState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, Ready)
                | (Loading, Error)
                | (Ready, Playing)
                | (Ready, Loading)
                | (Ready, Stopped)
                | (Ready, Error)
                | (Playing, Paused)
                | (Playing, Loading)
                | (Playing, Stopped)
                | (Playing, Error)
                | (Paused, Playing)
                | (Paused, Loading)
                | (Paused, Stopped)
                | (Stopped, Idle)
                | (Error, Loading)
                | (Error, Stopped)
        )
    }

    /// 持有音频资源的状态
    pub fn has_resource(self) -> bool {
        matches!(
            self,
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Ready => "ready",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// 播完列表即停
    #[default]
    Off,
    /// 列表循环
    All,
    /// 单曲循环
    One,
}

impl RepeatMode {
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }
}

/// 观察者看到的播放状态；只有引擎写入
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub current_track: Option<Track>,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f32,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
    pub last_error: Option<String>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            current_track: None,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: 1.0,
            shuffle_enabled: false,
            repeat_mode: RepeatMode::Off,
            last_error: None,
        }
    }
}
