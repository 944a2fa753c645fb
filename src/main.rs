mod cli;

use clap::Parser;
use cli::{Cli, Command};
use local_player::domain::{PlaybackSnapshot, PlaybackState, PlaylistContext, Track};
use local_player::error::AppError;
use local_player::playback::{
    AudioBackend, EngineConfig, NullBackend, PlaybackEngine, PlayerHandle, RodioBackend,
    open_default_output,
};
use local_player::{logging, settings};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(settings::default_data_dir);

    let _log_guard = logging::init(
        &data_dir,
        logging::LogConfig {
            dir: cli.log_dir.clone(),
            filter: cli.log_filter.clone(),
            ..logging::LogConfig::default()
        },
    );

    let no_audio_env = env::var("LOCAL_PLAYER_NO_AUDIO")
        .ok()
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);

    let mut player_settings = settings::load_settings(&data_dir);

    match cli.command {
        Command::Play {
            files,
            repeat,
            shuffle,
            volume,
        } => {
            if let Some(v) = volume {
                player_settings.volume = v.clamp(0.0, 1.0);
            }
            if let Some(r) = repeat {
                player_settings.repeat_mode = r.into();
            }
            if shuffle {
                player_settings.shuffle = true;
            }

            let config = EngineConfig::from(&player_settings);
            // 输出流必须比它上面打开的所有 sink 活得久
            let mut _stream = None;
            let backend: Arc<dyn AudioBackend> = if cli.no_audio || no_audio_env {
                Arc::new(NullBackend::new())
            } else {
                let stream = open_default_output()?;
                let backend = Arc::new(RodioBackend::from_stream(&stream));
                _stream = Some(stream);
                backend
            };

            tracing::info!(
                backend = backend.name(),
                tracks = files.len(),
                volume = config.volume,
                repeat = config.repeat_mode.label(),
                shuffle = config.shuffle,
                "开始播放"
            );
            let player = PlaybackEngine::spawn(backend, config);
            let result = play_files(&player, files).await;

            let last = player.snapshot();
            player_settings.volume = last.volume;
            player_settings.repeat_mode = last.repeat_mode;
            player_settings.shuffle = last.shuffle_enabled;

            if let Err(e) = player.dispose().await {
                tracing::warn!(err = %e, "销毁播放器失败");
            }
            settings::save_settings(&data_dir, &player_settings)?;
            result
        }
    }
}

async fn play_files(player: &PlayerHandle, files: Vec<PathBuf>) -> Result<(), AppError> {
    let playlist = Arc::new(PlaylistContext::new(
        files.into_iter().map(Track::from_path).collect(),
    ));
    let Some(first) = playlist.first().cloned() else {
        return Ok(());
    };
    let tracks = playlist.len();

    let mut updates = player.subscribe();
    match player.play_from_playlist(first, playlist).await {
        Ok(()) => {}
        // 引擎已不在，后面没什么可做的
        Err(e) if e.is_invalid_state() => return Err(e.into()),
        Err(e) => tracing::warn!(err = %e, "第一首播放失败"),
    }

    tokio::select! {
        _ = follow(player, &mut updates, tracks) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("收到 Ctrl-C，退出");
        }
    }
    Ok(())
}

/// 打印曲目变化，直到播放器回到空闲；无法播放的文件报错后跳过
async fn follow(
    player: &PlayerHandle,
    updates: &mut watch::Receiver<PlaybackSnapshot>,
    tracks: usize,
) {
    let mut shown: Option<String> = None;
    let mut failures = 0usize;
    loop {
        let snap = updates.borrow_and_update().clone();
        match snap.state {
            PlaybackState::Idle => return,
            PlaybackState::Playing => failures = 0,
            PlaybackState::Error => {
                eprintln!("错误: {}", snap.last_error.as_deref().unwrap_or("未知"));
                failures += 1;
                if failures >= tracks {
                    return;
                }
                match player.skip_next().await {
                    Ok(Some(_)) => continue,
                    Ok(None) => return,
                    // 下一首也失败了，下一轮循环会再报出来
                    Err(e) if !e.is_invalid_state() => continue,
                    Err(e) => {
                        tracing::warn!(err = %e, "出错后跳到下一首失败");
                        return;
                    }
                }
            }
            _ => {}
        }
        if let Some(track) = snap.current_track.as_ref() {
            let name = track.display_name();
            if shown.as_deref() != Some(name.as_str()) {
                println!("> {name} ({:.0}s)", snap.duration_secs);
                shown = Some(name);
            }
        }
        if updates.changed().await.is_err() {
            return;
        }
    }
}
