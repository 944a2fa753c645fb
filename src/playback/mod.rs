//! 播放引擎：持有音频资源的 actor、调用方句柄、位置监视器和可驱动的后端

mod backend;
mod config;
mod engine;
mod handle;
mod messages;
mod monitor;
mod null_backend;
mod rodio_backend;

pub use backend::{AudioBackend, AudioResource};
pub use config::{DEFAULT_POLL_INTERVAL, EngineConfig};
pub use engine::PlaybackEngine;
pub use handle::PlayerHandle;
pub use null_backend::{KNOWN_EXTENSIONS, NullBackend};
pub use rodio_backend::{RodioBackend, open_default_output};
