use std::time::Duration;

use crate::domain::RepeatMode;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 位置监视器的采样间隔
    pub poll_interval: Duration,
    /// 命令队列容量
    pub command_buffer: usize,
    pub volume: f32,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            command_buffer: 32,
            volume: 1.0,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
        }
    }
}

/// 限制到 `[0, 1]`；NaN 视为静音
pub(crate) fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}
