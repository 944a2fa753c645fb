//! 播放器各层的错误类型

mod app;
mod backend;
mod playback;

pub use app::{AppError, SettingsError};
pub use backend::BackendError;
pub use playback::PlaybackError;
