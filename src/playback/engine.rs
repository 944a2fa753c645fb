use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::select;
use tokio::sync::{mpsc, watch};

use super::backend::{AudioBackend, AudioResource};
use super::config::{EngineConfig, clamp_volume};
use super::handle::PlayerHandle;
use super::messages::{MonitorSignal, PlaybackCommand};
use super::monitor::PositionMonitor;
use crate::domain::{PlaybackSnapshot, PlaybackState, PlaylistContext, Track};
use crate::error::{BackendError, PlaybackError};
use crate::navigation;

/// 播放引擎：音频资源和播放状态机的唯一持有者
///
/// 单任务运行；每条传输命令、每个监视器 tick 都处理完才看下一条。
/// 打开、关闭、跳转这些可能阻塞的后端调用都放到 blocking 线程池。
pub struct PlaybackEngine {
    backend: Arc<dyn AudioBackend>,
    config: EngineConfig,
    rx_cmd: mpsc::Receiver<PlaybackCommand>,
    tx_monitor: mpsc::Sender<MonitorSignal>,
    rx_monitor: mpsc::Receiver<MonitorSignal>,
    tx_snapshot: watch::Sender<PlaybackSnapshot>,
    snapshot: PlaybackSnapshot,
    playlist: Arc<PlaylistContext>,
    resource: Option<Box<dyn AudioResource>>,
    monitor: Option<PositionMonitor>,
    session: u64,
    disposed: bool,
}

impl PlaybackEngine {
    /// 在当前 tokio runtime 上启动引擎，返回调用方句柄
    pub fn spawn(backend: Arc<dyn AudioBackend>, config: EngineConfig) -> PlayerHandle {
        let (tx_cmd, rx_cmd) = mpsc::channel(config.command_buffer.max(1));
        let (tx_monitor, rx_monitor) = mpsc::channel(8);

        let snapshot = PlaybackSnapshot {
            volume: clamp_volume(config.volume),
            shuffle_enabled: config.shuffle,
            repeat_mode: config.repeat_mode,
            ..PlaybackSnapshot::default()
        };
        let (tx_snapshot, rx_snapshot) = watch::channel(snapshot.clone());

        let engine = Self {
            backend,
            config,
            rx_cmd,
            tx_monitor,
            rx_monitor,
            tx_snapshot,
            snapshot,
            playlist: Arc::new(PlaylistContext::default()),
            resource: None,
            monitor: None,
            session: 0,
            disposed: false,
        };
        tokio::spawn(engine.run());

        PlayerHandle::new(tx_cmd, rx_snapshot)
    }

    async fn run(mut self) {
        tracing::info!(
            backend = self.backend.name(),
            poll_ms = self.config.poll_interval.as_millis() as u64,
            "播放引擎已启动"
        );

        loop {
            select! {
                biased;
                Some(sig) = self.rx_monitor.recv() => {
                    self.handle_monitor_signal(sig).await;
                }
                maybe_cmd = self.rx_cmd.recv() => {
                    let Some(cmd) = maybe_cmd else {
                        tracing::debug!("所有 PlayerHandle 已释放");
                        break;
                    };
                    if self.handle_command(cmd).await.is_break() {
                        break;
                    }
                }
            }
        }

        self.shutdown().await;
        // 队列里剩下的命令不再回复，调用方会收到“已销毁”
        self.rx_cmd.close();
        tracing::info!("播放引擎已退出");
    }

    async fn handle_command(&mut self, cmd: PlaybackCommand) -> ControlFlow<()> {
        tracing::debug!(command = cmd.name(), state = %self.snapshot.state, "处理命令");
        match cmd {
            PlaybackCommand::Load { track, reply } => {
                let _ = reply.send(self.load(track).await);
            }
            PlaybackCommand::Play { reply } => {
                let _ = reply.send(self.play().await);
            }
            PlaybackCommand::Pause { reply } => {
                self.pause();
                let _ = reply.send(Ok(()));
            }
            PlaybackCommand::Resume { reply } => {
                let _ = reply.send(self.resume());
            }
            PlaybackCommand::Stop { reply } => {
                self.stop().await;
                let _ = reply.send(Ok(()));
            }
            PlaybackCommand::Seek { secs, reply } => {
                let _ = reply.send(self.seek(secs).await);
            }
            PlaybackCommand::SetVolume { level, reply } => {
                self.set_volume(level);
                let _ = reply.send(Ok(()));
            }
            PlaybackCommand::SetPlaylist { playlist, reply } => {
                self.set_playlist(playlist);
                let _ = reply.send(Ok(()));
            }
            PlaybackCommand::PlayFromPlaylist {
                track,
                playlist,
                reply,
            } => {
                self.set_playlist(playlist);
                let res = match self.load(track).await {
                    Ok(()) => self.play().await,
                    Err(e) => Err(e),
                };
                let _ = reply.send(res);
            }
            PlaybackCommand::SetShuffle { on, reply } => {
                self.set_shuffle(on);
                let _ = reply.send(Ok(()));
            }
            PlaybackCommand::ToggleShuffle { reply } => {
                let on = !self.snapshot.shuffle_enabled;
                self.set_shuffle(on);
                let _ = reply.send(Ok(on));
            }
            PlaybackCommand::SetRepeatMode { mode, reply } => {
                self.snapshot.repeat_mode = mode;
                self.publish();
                let _ = reply.send(Ok(()));
            }
            PlaybackCommand::CycleRepeatMode { reply } => {
                let mode = self.snapshot.repeat_mode.cycle();
                self.snapshot.repeat_mode = mode;
                self.publish();
                let _ = reply.send(Ok(mode));
            }
            PlaybackCommand::SkipNext { reply } => {
                let _ = reply.send(self.skip(true).await);
            }
            PlaybackCommand::SkipPrevious { reply } => {
                let _ = reply.send(self.skip(false).await);
            }
            PlaybackCommand::Dispose { reply } => {
                self.shutdown().await;
                let _ = reply.send(Ok(()));
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn load(&mut self, track: Track) -> Result<(), PlaybackError> {
        self.release().await;

        self.snapshot.current_track = Some(track.clone());
        self.snapshot.position_secs = 0.0;
        self.snapshot.duration_secs = track.duration_secs();
        self.snapshot.last_error = None;
        self.transition(PlaybackState::Loading);

        let backend = Arc::clone(&self.backend);
        let path = track.file_path().to_path_buf();
        let opened = tokio::task::spawn_blocking(move || backend.open(&path))
            .await
            .map_err(|e| BackendError::DeviceBusy(format!("打开任务失败: {e}")))
            .and_then(|res| res);

        match opened {
            Ok(mut resource) => {
                let reported = resource.duration_secs();
                if reported > 0.0 {
                    self.snapshot.duration_secs = reported;
                }
                apply_volume(&mut *resource, self.snapshot.volume);

                self.session = self.session.wrapping_add(1).max(1);
                self.resource = Some(resource);
                tracing::info!(
                    track_id = %track.id(),
                    path = %track.file_path().display(),
                    session = self.session,
                    duration_secs = self.snapshot.duration_secs,
                    "曲目已加载"
                );
                self.transition(PlaybackState::Ready);
                Ok(())
            }
            Err(e) => {
                let err = PlaybackError::from(e);
                tracing::warn!(track_id = %track.id(), err = %err, "加载失败");
                self.snapshot.last_error = Some(err.to_string());
                self.transition(PlaybackState::Error);
                Err(err)
            }
        }
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        match self.snapshot.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Ready => {
                let Some(resource) = self.resource.as_mut() else {
                    return Err(PlaybackError::invalid_state("play", PlaybackState::Ready));
                };
                if let Err(e) = resource.start() {
                    let err = PlaybackError::from(e);
                    tracing::warn!(session = self.session, err = %err, "启动输出失败");
                    self.release().await;
                    self.snapshot.position_secs = 0.0;
                    self.snapshot.last_error = Some(err.to_string());
                    self.transition(PlaybackState::Error);
                    return Err(err);
                }
                self.monitor = Some(PositionMonitor::start(
                    self.session,
                    self.config.poll_interval,
                    self.tx_monitor.clone(),
                ));
                self.transition(PlaybackState::Playing);
                Ok(())
            }
            state => Err(PlaybackError::invalid_state("play", state)),
        }
    }

    fn pause(&mut self) {
        if self.snapshot.state != PlaybackState::Playing {
            return;
        }
        if let Some(resource) = self.resource.as_mut() {
            resource.pause();
            self.snapshot.position_secs =
                clamp_position(resource.elapsed_secs(), self.snapshot.duration_secs);
        }
        if let Some(monitor) = self.monitor.as_ref() {
            monitor.suspend();
        }
        self.transition(PlaybackState::Paused);
    }

    fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.snapshot.state != PlaybackState::Paused {
            return Ok(());
        }
        let Some(resource) = self.resource.as_mut() else {
            return Err(PlaybackError::invalid_state("resume", PlaybackState::Paused));
        };
        if let Err(e) = resource.start() {
            tracing::warn!(session = self.session, err = %e, "恢复输出失败");
            return Err(e.into());
        }
        match self.monitor.as_ref() {
            Some(monitor) => monitor.resume(),
            None => {
                self.monitor = Some(PositionMonitor::start(
                    self.session,
                    self.config.poll_interval,
                    self.tx_monitor.clone(),
                ));
            }
        }
        self.transition(PlaybackState::Playing);
        Ok(())
    }

    async fn stop(&mut self) {
        if self.snapshot.state == PlaybackState::Idle {
            return;
        }
        self.release().await;
        self.snapshot.current_track = None;
        self.snapshot.position_secs = 0.0;
        self.snapshot.duration_secs = 0.0;
        self.snapshot.last_error = None;
        self.transition(PlaybackState::Stopped);
        self.transition(PlaybackState::Idle);
    }

    async fn seek(&mut self, secs: f64) -> Result<(), PlaybackError> {
        let state = self.snapshot.state;
        if !state.has_resource() || self.resource.is_none() {
            return Err(PlaybackError::invalid_state("seek", state));
        }

        let duration = self.snapshot.duration_secs;
        if duration <= 0.0 {
            tracing::warn!(secs, "时长未知，忽略跳转");
            return Ok(());
        }
        let target = if secs.is_nan() {
            0.0
        } else {
            secs.clamp(0.0, duration)
        };

        let Some(mut resource) = self.resource.take() else {
            return Err(PlaybackError::invalid_state("seek", state));
        };
        let session = self.session;
        let outcome = tokio::task::spawn_blocking(move || {
            let res = if resource.seek(target) {
                Ok(())
            } else {
                Err(BackendError::SeekUnsupported)
            };
            (resource, res)
        })
        .await;

        match outcome {
            Ok((resource, Ok(()))) => {
                self.resource = Some(resource);
                self.snapshot.position_secs = target;
                self.publish();
                Ok(())
            }
            Ok((resource, Err(e))) => {
                self.resource = Some(resource);
                tracing::warn!(pos = target, session, err = %e, "跳转被后端拒绝");
                Ok(())
            }
            Err(e) => {
                // 资源随任务一起丢失，只能整体停下
                tracing::error!(session, err = %e, "跳转任务失败");
                self.stop().await;
                Err(PlaybackError::DeviceBusy(format!("跳转任务失败: {e}")))
            }
        }
    }

    fn set_volume(&mut self, level: f32) {
        let level = clamp_volume(level);
        self.snapshot.volume = level;
        if let Some(resource) = self.resource.as_mut() {
            apply_volume(&mut **resource, level);
        }
        self.publish();
    }

    fn set_playlist(&mut self, playlist: Arc<PlaylistContext>) {
        let shuffle = self.snapshot.shuffle_enabled;
        self.playlist = if shuffle || playlist.is_shuffled() {
            Arc::new((*playlist).clone().with_shuffle(shuffle))
        } else {
            playlist
        };
        tracing::debug!(tracks = self.playlist.len(), shuffle, "播放列表已更新");
    }

    fn set_shuffle(&mut self, on: bool) {
        self.snapshot.shuffle_enabled = on;
        let mut ctx = (*self.playlist).clone();
        ctx.set_shuffle(on);
        self.playlist = Arc::new(ctx);
        self.publish();
    }

    async fn skip(&mut self, forward: bool) -> Result<Option<Track>, PlaybackError> {
        let op = if forward { "skip_next" } else { "skip_previous" };
        let Some(current) = self.snapshot.current_track.clone() else {
            return Err(PlaybackError::invalid_state(op, self.snapshot.state));
        };

        let repeat = self.snapshot.repeat_mode;
        let target = if forward {
            navigation::next(&self.playlist, &current, repeat)
        } else {
            navigation::previous(&self.playlist, &current, repeat)
        }
        .cloned();

        let Some(target) = target else {
            tracing::debug!(op, track_id = %current.id(), "没有可切换的曲目");
            return Ok(None);
        };
        self.load(target.clone()).await?;
        self.play().await?;
        Ok(Some(target))
    }

    async fn handle_monitor_signal(&mut self, sig: MonitorSignal) {
        let MonitorSignal::Tick { session } = sig;
        if self.monitor.as_ref().map(PositionMonitor::session) != Some(session) {
            tracing::trace!(session, current = self.session, "过期的监视器 tick");
            return;
        }
        if self.snapshot.state != PlaybackState::Playing {
            return;
        }
        let (elapsed, running) = match self.resource.as_ref() {
            Some(resource) => (resource.elapsed_secs(), resource.is_running()),
            None => return,
        };
        let position = clamp_position(elapsed, self.snapshot.duration_secs);

        if position != self.snapshot.position_secs {
            self.snapshot.position_secs = position;
            self.publish();
        }
        if running {
            return;
        }

        let first = self.monitor.as_mut().is_some_and(PositionMonitor::mark_ended);
        if !first {
            return;
        }
        tracing::info!(session, position_secs = position, "播放结束");
        self.advance().await;
    }

    /// 当前资源自然播完后调用
    async fn advance(&mut self) {
        let Some(finished) = self.snapshot.current_track.clone() else {
            self.stop().await;
            return;
        };
        self.release().await;

        let next =
            navigation::next(&self.playlist, &finished, self.snapshot.repeat_mode).cloned();
        let Some(next) = next else {
            tracing::info!(track_id = %finished.id(), "播放列表已播完");
            self.stop().await;
            return;
        };

        tracing::info!(from = %finished.id(), to = %next.id(), "自动切到下一首");
        if self.load(next).await.is_ok()
            && let Err(e) = self.play().await
        {
            tracing::warn!(err = %e, "自动切歌后无法开始播放");
        }
    }

    /// 取消监视器并关闭资源；close 失败也照样丢弃资源
    async fn release(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.cancel();
        }
        let Some(mut resource) = self.resource.take() else {
            return;
        };

        let session = self.session;
        let closed = tokio::task::spawn_blocking(move || {
            let res = resource.close();
            drop(resource);
            res
        })
        .await;

        match closed {
            Ok(Ok(())) => tracing::debug!(session, "资源已释放"),
            Ok(Err(e)) => tracing::warn!(session, err = %e, "关闭失败，资源已丢弃"),
            Err(e) => tracing::error!(session, err = %e, "关闭任务失败"),
        }
    }

    async fn shutdown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.stop().await;
    }

    fn transition(&mut self, next: PlaybackState) {
        let prev = self.snapshot.state;
        if prev != next {
            if !prev.can_transition_to(next) {
                tracing::error!(from = %prev, to = %next, "非法状态切换，已忽略");
                return;
            }
            self.snapshot.state = next;
            tracing::debug!(from = %prev, to = %next, "状态切换");
        }
        self.publish();
    }

    fn publish(&self) {
        self.tx_snapshot.send_replace(self.snapshot.clone());
    }
}

/// 时长已知时限制在 `[0, duration]`，未知时只保证非负
fn clamp_position(elapsed: f64, duration: f64) -> f64 {
    if elapsed.is_nan() {
        0.0
    } else if duration > 0.0 {
        elapsed.clamp(0.0, duration)
    } else {
        elapsed.max(0.0)
    }
}

fn apply_volume(resource: &mut dyn AudioResource, level: f32) {
    match resource.set_volume(level) {
        Ok(()) => {}
        Err(BackendError::VolumeUnsupported) => {
            tracing::debug!(level, "后端不支持音量调节");
        }
        Err(e) => tracing::warn!(level, err = %e, "设置音量失败"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(75.0, 60.0), 60.0);
        assert_eq!(clamp_position(-1.0, 60.0), 0.0);
        assert_eq!(clamp_position(12.5, 60.0), 12.5);
        assert_eq!(clamp_position(300.0, 0.0), 300.0);
        assert_eq!(clamp_position(f64::NAN, 60.0), 0.0);
    }
}
