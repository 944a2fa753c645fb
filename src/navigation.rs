//! 上一首/下一首的选择
//!
//! 基于 [`PlaylistContext`] 的纯函数；随机只通过它携带的遍历顺序起作用。

use crate::domain::{PlaylistContext, RepeatMode, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// `current` 的下一首；`None` 表示应停止播放
pub fn next<'a>(
    playlist: &'a PlaylistContext,
    current: &'a Track,
    repeat: RepeatMode,
) -> Option<&'a Track> {
    step(playlist, current, repeat, Direction::Forward)
}

/// `current` 的上一首，没有则 `None`
pub fn previous<'a>(
    playlist: &'a PlaylistContext,
    current: &'a Track,
    repeat: RepeatMode,
) -> Option<&'a Track> {
    step(playlist, current, repeat, Direction::Backward)
}

fn step<'a>(
    playlist: &'a PlaylistContext,
    current: &'a Track,
    repeat: RepeatMode,
    dir: Direction,
) -> Option<&'a Track> {
    if repeat == RepeatMode::One {
        return Some(current);
    }
    let len = playlist.traversal_order().len();
    let pos = playlist.position_of(current.id())?;

    let target = match dir {
        Direction::Forward if pos + 1 < len => pos + 1,
        Direction::Backward if pos > 0 => pos - 1,
        _ if repeat == RepeatMode::All => match dir {
            Direction::Forward => 0,
            Direction::Backward => len - 1,
        },
        _ => return None,
    };
    playlist.track_at(target)
}
