use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use super::backend::{AudioBackend, AudioResource};
use crate::error::BackendError;

/// 打开默认输出设备
///
/// 返回的流必须比基于其 mixer 构建的所有后端活得久；它并非在所有平台上都是 `Send`，
/// 留在创建它的线程上。
pub fn open_default_output() -> Result<OutputStream, BackendError> {
    OutputStreamBuilder::open_default_stream().map_err(|e| {
        tracing::error!(err = %e, "打开音频输出失败");
        BackendError::DeviceBusy(e.to_string())
    })
}

/// symphonia 解码、rodio mixer 输出的后端
pub struct RodioBackend {
    mixer: Mixer,
}

impl RodioBackend {
    pub fn new(mixer: Mixer) -> Self {
        Self { mixer }
    }

    pub fn from_stream(stream: &OutputStream) -> Self {
        Self::new(stream.mixer().clone())
    }
}

impl AudioBackend for RodioBackend {
    fn name(&self) -> &'static str {
        "rodio"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn AudioResource>, BackendError> {
        let file = File::open(path).map_err(|e| BackendError::from_open(path, e))?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| BackendError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let duration_secs = decoder
            .total_duration()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let sink = Sink::connect_new(&self.mixer);
        sink.pause();
        sink.append(decoder);
        tracing::debug!(path = %path.display(), duration_secs, "rodio sink 已就绪");

        Ok(Box::new(RodioResource {
            sink: Some(sink),
            duration_secs,
        }))
    }
}

struct RodioResource {
    sink: Option<Sink>,
    duration_secs: f64,
}

impl AudioResource for RodioResource {
    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    fn start(&mut self) -> Result<(), BackendError> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| BackendError::DeviceBusy("sink 已关闭".to_owned()))?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn close(&mut self) -> Result<(), BackendError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        Ok(())
    }

    fn set_volume(&mut self, level: f32) -> Result<(), BackendError> {
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(level);
        }
        Ok(())
    }

    fn elapsed_secs(&self) -> f64 {
        self.sink
            .as_ref()
            .map(|s| s.get_pos().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn is_running(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && !s.empty())
    }

    fn seek(&mut self, secs: f64) -> bool {
        let Some(sink) = self.sink.as_ref() else {
            return false;
        };
        let Ok(pos) = Duration::try_from_secs_f64(secs.max(0.0)) else {
            tracing::warn!(secs, "跳转位置超出范围");
            return false;
        };
        match sink.try_seek(pos) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(secs, err = %e, "rodio 跳转失败");
                false
            }
        }
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
