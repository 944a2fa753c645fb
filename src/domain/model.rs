use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::ids::TrackId;

/// 一个可播放的本地音频文件（构造后不可变）
///
/// `duration_secs == 0.0` 表示时长未知，需打开文件后由后端给出。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    id: TrackId,
    file_path: PathBuf,
    #[serde(default)]
    duration_secs: f64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
}

impl Track {
    /// 负数、NaN、无穷大的时长一律视为未知（0）
    pub fn new(id: impl Into<TrackId>, file_path: impl Into<PathBuf>, duration_secs: f64) -> Self {
        let duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            id: id.into(),
            file_path: file_path.into(),
            duration_secs,
            title: None,
            artist: None,
            album: None,
        }
    }

    /// 仅凭路径构造：路径本身作为 id，文件名（不含扩展名）作为标题
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned());
        let id = TrackId::new(path.to_string_lossy().into_owned());
        Self {
            title,
            ..Self::new(id, path, 0.0)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    /// 有歌手和标题时显示 "歌手 - 标题"，否则退回标题或路径
    pub fn display_name(&self) -> String {
        match (self.artist.as_deref(), self.title.as_deref()) {
            (Some(a), Some(t)) => format!("{a} - {t}"),
            (None, Some(t)) => t.to_owned(),
            _ => self.file_path.display().to_string(),
        }
    }
}
