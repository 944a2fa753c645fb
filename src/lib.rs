//! 本地音频播放控制器
//!
//! [`playback::PlaybackEngine`] 持有打开的音频资源和播放状态机；调用方通过可克隆的
//! [`playback::PlayerHandle`] 驱动它，通过 [`domain::PlaybackSnapshot`] 观察它。

pub mod domain;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod playback;
pub mod settings;

pub use domain::{PlaybackSnapshot, PlaybackState, PlaylistContext, RepeatMode, Track, TrackId};
pub use error::{AppError, BackendError, PlaybackError};
pub use playback::{AudioBackend, AudioResource, EngineConfig, PlaybackEngine, PlayerHandle};
