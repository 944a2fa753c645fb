use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

use super::messages::{PlaybackCommand, Reply};
use crate::domain::{PlaybackSnapshot, PlaylistContext, RepeatMode, Track};
use crate::error::PlaybackError;

/// 运行中 [`PlaybackEngine`](super::PlaybackEngine) 的调用方接口
///
/// 克隆开销很小。每个方法都排队一条命令并等引擎处理完；多个克隆的调用按到达顺序处理。
/// 引擎销毁后，所有调用都返回 [`PlaybackError::InvalidState`]。
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: mpsc::Sender<PlaybackCommand>,
    snapshot: watch::Receiver<PlaybackSnapshot>,
}

impl PlayerHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<PlaybackCommand>,
        snapshot: watch::Receiver<PlaybackSnapshot>,
    ) -> Self {
        Self { tx, snapshot }
    }

    async fn request<T>(
        &self,
        operation: &'static str,
        make: impl FnOnce(Reply<T>) -> PlaybackCommand,
    ) -> Result<T, PlaybackError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| PlaybackError::disposed(operation))?;
        rx.await.map_err(|_| PlaybackError::disposed(operation))?
    }

    /// 释放当前资源并打开 `track`；之后处于就绪状态，不会自动播放
    pub async fn load(&self, track: Track) -> Result<(), PlaybackError> {
        self.request("load", |reply| PlaybackCommand::Load { track, reply })
            .await
    }

    pub async fn play(&self) -> Result<(), PlaybackError> {
        self.request("play", |reply| PlaybackCommand::Play { reply })
            .await
    }

    /// 非播放状态下不做任何事
    pub async fn pause(&self) -> Result<(), PlaybackError> {
        self.request("pause", |reply| PlaybackCommand::Pause { reply })
            .await
    }

    /// 非暂停状态下不做任何事
    pub async fn resume(&self) -> Result<(), PlaybackError> {
        self.request("resume", |reply| PlaybackCommand::Resume { reply })
            .await
    }

    pub async fn stop(&self) -> Result<(), PlaybackError> {
        self.request("stop", |reply| PlaybackCommand::Stop { reply })
            .await
    }

    /// 限制到 `[0, duration]`；后端不支持或时长未知时静默忽略
    pub async fn seek(&self, secs: f64) -> Result<(), PlaybackError> {
        self.request("seek", |reply| PlaybackCommand::Seek { secs, reply })
            .await
    }

    /// 限制到 `[0, 1]`；没有打开的资源时留给下次加载
    pub async fn set_volume(&self, level: f32) -> Result<(), PlaybackError> {
        self.request("set_volume", |reply| PlaybackCommand::SetVolume {
            level,
            reply,
        })
        .await
    }

    /// 播完和切歌时用来挑下一首的列表
    pub async fn set_playlist(&self, playlist: Arc<PlaylistContext>) -> Result<(), PlaybackError> {
        self.request("set_playlist", |reply| PlaybackCommand::SetPlaylist {
            playlist,
            reply,
        })
        .await
    }

    pub async fn play_from_playlist(
        &self,
        track: Track,
        playlist: Arc<PlaylistContext>,
    ) -> Result<(), PlaybackError> {
        self.request("play_from_playlist", |reply| {
            PlaybackCommand::PlayFromPlaylist {
                track,
                playlist,
                reply,
            }
        })
        .await
    }

    pub async fn set_shuffle(&self, on: bool) -> Result<(), PlaybackError> {
        self.request("set_shuffle", |reply| PlaybackCommand::SetShuffle { on, reply })
            .await
    }

    /// 返回切换后的随机开关
    pub async fn toggle_shuffle(&self) -> Result<bool, PlaybackError> {
        self.request("toggle_shuffle", |reply| PlaybackCommand::ToggleShuffle {
            reply,
        })
        .await
    }

    pub async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<(), PlaybackError> {
        self.request("set_repeat_mode", |reply| PlaybackCommand::SetRepeatMode {
            mode,
            reply,
        })
        .await
    }

    /// Off -> All -> One -> Off，返回新模式
    pub async fn cycle_repeat_mode(&self) -> Result<RepeatMode, PlaybackError> {
        self.request("cycle_repeat_mode", |reply| {
            PlaybackCommand::CycleRepeatMode { reply }
        })
        .await
    }

    /// 切到下一首；没有时返回 `Ok(None)`
    pub async fn skip_next(&self) -> Result<Option<Track>, PlaybackError> {
        self.request("skip_next", |reply| PlaybackCommand::SkipNext { reply })
            .await
    }

    pub async fn skip_previous(&self) -> Result<Option<Track>, PlaybackError> {
        self.request("skip_previous", |reply| PlaybackCommand::SkipPrevious {
            reply,
        })
        .await
    }

    /// 释放一切并停止引擎；之后的调用全部被拒绝
    pub async fn dispose(&self) -> Result<(), PlaybackError> {
        self.request("dispose", |reply| PlaybackCommand::Dispose { reply })
            .await
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot.clone()
    }
}
