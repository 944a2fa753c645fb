#![allow(dead_code)]

use local_player::domain::{PlaybackSnapshot, PlaylistContext, Track};
use local_player::error::BackendError;
use local_player::playback::{
    AudioBackend, AudioResource, EngineConfig, PlaybackEngine, PlayerHandle,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tokio::sync::watch;

pub const WAIT: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
struct ResourceState {
    elapsed: f64,
    playing: bool,
    finished: bool,
}

#[derive(Debug, Default)]
struct Script {
    missing: HashSet<PathBuf>,
    unsupported: HashSet<PathBuf>,
    durations: HashMap<PathBuf, f64>,
    unseekable: bool,
    fail_start: bool,
    volume_unsupported: bool,

    opened: Vec<PathBuf>,
    closes: usize,
    live: usize,
    max_live: usize,
    seeks: usize,
    volume: Option<f32>,
    next_id: u64,
    current: Option<u64>,
    resources: HashMap<u64, ResourceState>,
}

/// 由测试驱动的内存后端：除非标记为缺失，文件都“存在”；
/// 资源只在测试要求时才播完。
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
    seek_gate: Arc<Gate>,
}

/// 跳转闸门；关闭时 `seek` 在后端线程上阻塞，直到测试放行
#[derive(Debug)]
struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            open: Mutex::new(true),
            cv: Condvar::new(),
        }
    }
}

impl Gate {
    fn set(&self, open: bool) {
        *self.open.lock().unwrap() = open;
        self.cv.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        f(&mut self.script.lock().unwrap())
    }

    pub fn mark_missing(&self, path: &str) {
        self.with(|s| s.missing.insert(PathBuf::from(path)));
    }

    pub fn mark_unsupported(&self, path: &str) {
        self.with(|s| s.unsupported.insert(PathBuf::from(path)));
    }

    pub fn set_duration(&self, path: &str, secs: f64) {
        self.with(|s| s.durations.insert(PathBuf::from(path), secs));
    }

    pub fn set_seekable(&self, on: bool) {
        self.with(|s| s.unseekable = !on);
    }

    pub fn set_fail_start(&self, on: bool) {
        self.with(|s| s.fail_start = on);
    }

    pub fn set_volume_unsupported(&self, on: bool) {
        self.with(|s| s.volume_unsupported = on);
    }

    /// 后续 `seek` 阻塞在后端线程，直到 `release_seeks`
    pub fn hold_seeks(&self) {
        self.seek_gate.set(false);
    }

    pub fn release_seeks(&self) {
        self.seek_gate.set(true);
    }

    /// 让最近打开的资源报告播放结束
    pub fn finish_current(&self) {
        self.with(|s| {
            if let Some(res) = s.current.and_then(|id| s.resources.get_mut(&id)) {
                res.finished = true;
            }
        });
    }

    pub fn set_elapsed(&self, secs: f64) {
        self.with(|s| {
            if let Some(res) = s.current.and_then(|id| s.resources.get_mut(&id)) {
                res.elapsed = secs;
            }
        });
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.with(|s| s.opened.clone())
    }

    pub fn closes(&self) -> usize {
        self.with(|s| s.closes)
    }

    pub fn live(&self) -> usize {
        self.with(|s| s.live)
    }

    pub fn max_live(&self) -> usize {
        self.with(|s| s.max_live)
    }

    pub fn seeks(&self) -> usize {
        self.with(|s| s.seeks)
    }

    /// 最近一次下发到资源的音量
    pub fn volume(&self) -> Option<f32> {
        self.with(|s| s.volume)
    }
}

impl AudioBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn AudioResource>, BackendError> {
        let mut s = self.script.lock().unwrap();
        if s.missing.contains(path) {
            return Err(BackendError::FileNotFound(path.to_path_buf()));
        }
        if s.unsupported.contains(path) {
            return Err(BackendError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: "scripted".to_owned(),
            });
        }
        s.opened.push(path.to_path_buf());
        s.live += 1;
        s.max_live = s.max_live.max(s.live);
        s.next_id += 1;
        let id = s.next_id;
        s.current = Some(id);
        s.resources.insert(id, ResourceState::default());

        Ok(Box::new(ScriptedResource {
            id,
            duration_secs: s.durations.get(path).copied().unwrap_or(0.0),
            script: Arc::clone(&self.script),
            seek_gate: Arc::clone(&self.seek_gate),
            closed: false,
        }))
    }
}

struct ScriptedResource {
    id: u64,
    duration_secs: f64,
    script: Arc<Mutex<Script>>,
    seek_gate: Arc<Gate>,
    closed: bool,
}

impl ScriptedResource {
    fn with<R>(&self, f: impl FnOnce(&mut ResourceState) -> R) -> Option<R> {
        let mut s = self.script.lock().unwrap();
        s.resources.get_mut(&self.id).map(f)
    }
}

impl AudioResource for ScriptedResource {
    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    fn start(&mut self) -> Result<(), BackendError> {
        if self.script.lock().unwrap().fail_start {
            return Err(BackendError::DeviceBusy("scripted start failure".to_owned()));
        }
        self.with(|r| r.playing = true);
        Ok(())
    }

    fn pause(&mut self) {
        self.with(|r| r.playing = false);
    }

    fn close(&mut self) -> Result<(), BackendError> {
        if !self.closed {
            self.closed = true;
            let mut s = self.script.lock().unwrap();
            s.closes += 1;
            s.live -= 1;
            s.resources.remove(&self.id);
        }
        Ok(())
    }

    fn set_volume(&mut self, level: f32) -> Result<(), BackendError> {
        let mut s = self.script.lock().unwrap();
        if s.volume_unsupported {
            return Err(BackendError::VolumeUnsupported);
        }
        s.volume = Some(level);
        Ok(())
    }

    fn elapsed_secs(&self) -> f64 {
        self.with(|r| r.elapsed).unwrap_or(0.0)
    }

    fn is_running(&self) -> bool {
        self.with(|r| r.playing && !r.finished).unwrap_or(false)
    }

    fn seek(&mut self, secs: f64) -> bool {
        {
            let mut s = self.script.lock().unwrap();
            if s.unseekable {
                return false;
            }
            s.seeks += 1;
        }
        self.seek_gate.wait();
        let mut s = self.script.lock().unwrap();
        if let Some(r) = s.resources.get_mut(&self.id) {
            r.elapsed = secs;
        }
        true
    }
}

impl Drop for ScriptedResource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        poll_interval: Duration::from_millis(5),
        ..EngineConfig::default()
    }
}

pub fn spawn(backend: &ScriptedBackend) -> PlayerHandle {
    spawn_with(backend, test_config())
}

pub fn spawn_with(backend: &ScriptedBackend, config: EngineConfig) -> PlayerHandle {
    PlaybackEngine::spawn(Arc::new(backend.clone()), config)
}

pub fn track(path: &str) -> Track {
    Track::new(path, path, 0.0)
}

pub fn playlist(paths: &[&str]) -> Arc<PlaylistContext> {
    Arc::new(PlaylistContext::new(paths.iter().map(|p| track(p)).collect()))
}

pub fn current_path(snap: &PlaybackSnapshot) -> Option<&Path> {
    snap.current_track.as_ref().map(|t| t.file_path())
}

pub async fn wait_until(
    rx: &mut watch::Receiver<PlaybackSnapshot>,
    pred: impl FnMut(&PlaybackSnapshot) -> bool,
) -> PlaybackSnapshot {
    let snap = tokio::time::timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for snapshot")
        .expect("engine gone");
    PlaybackSnapshot::clone(&snap)
}

/// 轮询后端直到 `pred` 成立
pub async fn wait_backend(backend: &ScriptedBackend, pred: impl Fn(&ScriptedBackend) -> bool) {
    tokio::time::timeout(WAIT, async {
        while !pred(backend) {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("timed out waiting for backend");
}
