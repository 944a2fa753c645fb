//! 面向调用方的播放错误

use std::path::PathBuf;

use super::BackendError;
use crate::domain::PlaybackState;

/// 传输操作被拒绝的原因
///
/// 需要 `Clone`：同一个值既回给调用方，也写进快照；后端错误因此被拍平成字符串。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("音频文件不存在: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("不支持的音频格式（{}）: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("音频设备不可用: {0}")]
    DeviceBusy(String),

    /// 当前状态下不允许该操作；引擎状态不变
    #[error("{operation} 不可用（{detail}）")]
    InvalidState {
        operation: &'static str,
        detail: String,
    },
}

impl PlaybackError {
    pub fn invalid_state(operation: &'static str, state: PlaybackState) -> Self {
        PlaybackError::InvalidState {
            operation,
            detail: format!("播放器处于 {state} 状态"),
        }
    }

    pub fn disposed(operation: &'static str) -> Self {
        PlaybackError::InvalidState {
            operation,
            detail: "播放器已销毁".to_owned(),
        }
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, PlaybackError::InvalidState { .. })
    }
}

impl From<BackendError> for PlaybackError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::FileNotFound(p) => PlaybackError::FileNotFound(p),
            BackendError::UnsupportedFormat { path, reason } => {
                PlaybackError::UnsupportedFormat { path, reason }
            }
            BackendError::DeviceBusy(msg) => PlaybackError::DeviceBusy(msg),
            other => PlaybackError::DeviceBusy(other.to_string()),
        }
    }
}
