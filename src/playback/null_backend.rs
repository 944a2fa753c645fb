use std::path::Path;
use std::time::{Duration, Instant};

use super::backend::{AudioBackend, AudioResource};
use crate::error::BackendError;

/// [`NullBackend`] 接受的扩展名
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "ogg", "oga", "opus", "m4a", "mp4", "aac", "aiff", "aif", "au",
];

/// 无音频输出的后端
///
/// 像真实后端一样校验路径，“播放”时只走墙上时钟。时长未知，
/// 因此沿用曲目的标称时长，资源也不会自己播完。
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn AudioResource>, BackendError> {
        let meta = std::fs::metadata(path).map_err(|e| BackendError::from_open(path, e))?;
        if !meta.is_file() {
            return Err(BackendError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: "不是普通文件".to_owned(),
            });
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !KNOWN_EXTENSIONS.contains(&ext.as_str()) {
            return Err(BackendError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: format!("未知扩展名 {ext:?}"),
            });
        }
        Ok(Box::new(NullResource::default()))
    }
}

#[derive(Debug, Default)]
struct NullResource {
    started_at: Option<Instant>,
    offset: Duration,
    closed: bool,
}

impl AudioResource for NullResource {
    fn duration_secs(&self) -> f64 {
        0.0
    }

    fn start(&mut self) -> Result<(), BackendError> {
        if self.closed {
            return Err(BackendError::DeviceBusy("资源已关闭".to_owned()));
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(at) = self.started_at.take() {
            self.offset = self.offset.saturating_add(at.elapsed());
        }
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.pause();
        self.closed = true;
        Ok(())
    }

    fn set_volume(&mut self, _level: f32) -> Result<(), BackendError> {
        Err(BackendError::VolumeUnsupported)
    }

    fn elapsed_secs(&self) -> f64 {
        let running = self.started_at.map(|at| at.elapsed()).unwrap_or_default();
        self.offset.saturating_add(running).as_secs_f64()
    }

    fn is_running(&self) -> bool {
        !self.closed && self.started_at.is_some()
    }

    fn seek(&mut self, secs: f64) -> bool {
        if self.closed {
            return false;
        }
        let Ok(offset) = Duration::try_from_secs_f64(secs.max(0.0)) else {
            return false;
        };
        self.offset = offset;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
        true
    }
}
