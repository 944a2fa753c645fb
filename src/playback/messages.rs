use std::sync::Arc;
use tokio::sync::oneshot;

use crate::domain::{PlaylistContext, RepeatMode, Track};
use crate::error::PlaybackError;

pub type Reply<T = ()> = oneshot::Sender<Result<T, PlaybackError>>;

#[derive(Debug)]
pub enum PlaybackCommand {
    Load { track: Track, reply: Reply },
    Play { reply: Reply },
    Pause { reply: Reply },
    Resume { reply: Reply },
    Stop { reply: Reply },
    Seek { secs: f64, reply: Reply },
    SetVolume { level: f32, reply: Reply },
    SetPlaylist {
        playlist: Arc<PlaylistContext>,
        reply: Reply,
    },
    PlayFromPlaylist {
        track: Track,
        playlist: Arc<PlaylistContext>,
        reply: Reply,
    },
    SetShuffle { on: bool, reply: Reply },
    ToggleShuffle { reply: Reply<bool> },
    SetRepeatMode { mode: RepeatMode, reply: Reply },
    CycleRepeatMode { reply: Reply<RepeatMode> },
    SkipNext { reply: Reply<Option<Track>> },
    SkipPrevious { reply: Reply<Option<Track>> },
    Dispose { reply: Reply },
}

impl PlaybackCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackCommand::Load { .. } => "load",
            PlaybackCommand::Play { .. } => "play",
            PlaybackCommand::Pause { .. } => "pause",
            PlaybackCommand::Resume { .. } => "resume",
            PlaybackCommand::Stop { .. } => "stop",
            PlaybackCommand::Seek { .. } => "seek",
            PlaybackCommand::SetVolume { .. } => "set_volume",
            PlaybackCommand::SetPlaylist { .. } => "set_playlist",
            PlaybackCommand::PlayFromPlaylist { .. } => "play_from_playlist",
            PlaybackCommand::SetShuffle { .. } => "set_shuffle",
            PlaybackCommand::ToggleShuffle { .. } => "toggle_shuffle",
            PlaybackCommand::SetRepeatMode { .. } => "set_repeat_mode",
            PlaybackCommand::CycleRepeatMode { .. } => "cycle_repeat_mode",
            PlaybackCommand::SkipNext { .. } => "skip_next",
            PlaybackCommand::SkipPrevious { .. } => "skip_previous",
            PlaybackCommand::Dispose { .. } => "dispose",
        }
    }
}

/// 位置监视器发给引擎的信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorSignal {
    Tick { session: u64 },
}
