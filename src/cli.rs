use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use local_player::domain::RepeatMode;

#[derive(Debug, Parser)]
#[command(name = "local-player", version, about = "终端本地音频播放器")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 覆盖数据目录（设置和日志）
    #[arg(long, env = "LOCAL_PLAYER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// 覆盖日志目录（默认 `{data_dir}/logs`）
    #[arg(long, env = "LOCAL_PLAYER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// 覆盖日志过滤（语法同 RUST_LOG）
    #[arg(long, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    /// 不打开音频设备运行（也可设置 `LOCAL_PLAYER_NO_AUDIO=1`）
    #[arg(long)]
    pub no_audio: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 按顺序播放给定文件
    Play {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 循环模式（默认沿用已保存的设置）
        #[arg(long, value_enum)]
        repeat: Option<RepeatArg>,

        /// 随机播放
        #[arg(long)]
        shuffle: bool,

        /// 音量 0~1（默认沿用已保存的设置）
        #[arg(long)]
        volume: Option<f32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(v: RepeatArg) -> Self {
        match v {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from([
            "local-player",
            "--no-audio",
            "play",
            "a.mp3",
            "b.flac",
            "--repeat",
            "all",
            "--shuffle",
        ])
        .unwrap();
        assert!(cli.no_audio);
        let Command::Play {
            files,
            repeat,
            shuffle,
            volume,
        } = cli.command;
        assert_eq!(files.len(), 2);
        assert_eq!(repeat.map(RepeatMode::from), Some(RepeatMode::All));
        assert!(shuffle);
        assert_eq!(volume, None);
    }

    #[test]
    fn test_play_requires_files() {
        assert!(Cli::try_parse_from(["local-player", "play"]).is_err());
    }
}
