//! 音频后端原始错误

use std::path::PathBuf;

/// [`AudioBackend`](crate::playback::AudioBackend) 实现报告的错误
///
/// 不会直接暴露给观察者：引擎要么转换成 [`PlaybackError`](super::PlaybackError)，
/// 要么记日志后丢弃。
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("音频文件不存在: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("不支持的音频格式（{}）: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("音频设备不可用: {0}")]
    DeviceBusy(String),

    #[error("后端不支持跳转")]
    SeekUnsupported,

    #[error("后端不支持音量调节")]
    VolumeUnsupported,

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// 打开 `path` 时的 IO 错误：NotFound 单独映射
    pub fn from_open(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => BackendError::FileNotFound(path.into()),
            _ => BackendError::Io(err),
        }
    }
}
