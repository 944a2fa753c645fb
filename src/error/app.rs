//! 二进制层错误

use super::{BackendError, PlaybackError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("设置错误: {0}")]
    Settings(#[from] SettingsError),

    #[error("播放错误: {0}")]
    Playback(#[from] PlaybackError),

    #[error("音频后端错误: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("保存设置失败: {source}")]
    Save {
        #[source]
        source: std::io::Error,
    },

    #[error("序列化设置失败: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}
