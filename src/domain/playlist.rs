use rand::Rng;
use rand::seq::SliceRandom;

use super::ids::TrackId;
use super::model::Track;

/// 有序曲目列表 + 遍历顺序
///
/// `order` 始终恰好包含 `tracks` 的每个下标一次。关闭随机时是原顺序；
/// 开启随机或曲目变化时重新洗牌。
#[derive(Debug, Clone, Default)]
pub struct PlaylistContext {
    tracks: Vec<Track>,
    order: Vec<usize>,
    shuffled: bool,
}

impl PlaylistContext {
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut ctx = Self {
            tracks,
            order: Vec::new(),
            shuffled: false,
        };
        ctx.rebuild_order(&mut rand::thread_rng());
        ctx
    }

    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.rebuild_order(&mut rand::thread_rng());
    }

    /// 打开随机总会重新洗牌，即使之前已经打开
    pub fn set_shuffle(&mut self, on: bool) {
        self.set_shuffle_with(on, &mut rand::thread_rng());
    }

    pub fn set_shuffle_with<R: Rng + ?Sized>(&mut self, on: bool, rng: &mut R) {
        self.shuffled = on;
        self.rebuild_order(rng);
    }

    pub fn with_shuffle(mut self, on: bool) -> Self {
        self.set_shuffle(on);
        self
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// 按插入顺序
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// 按遍历顺序排列的 `tracks()` 下标
    pub fn traversal_order(&self) -> &[usize] {
        &self.order
    }

    pub fn traversal(&self) -> impl Iterator<Item = &Track> + '_ {
        self.order.iter().filter_map(|&i| self.tracks.get(i))
    }

    pub fn track_at(&self, pos: usize) -> Option<&Track> {
        self.order.get(pos).and_then(|&i| self.tracks.get(i))
    }

    pub fn first(&self) -> Option<&Track> {
        self.track_at(0)
    }

    /// `id` 在遍历顺序中的位置
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.order
            .iter()
            .position(|&i| self.tracks.get(i).is_some_and(|t| t.id() == id))
    }

    fn rebuild_order<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.clear();
        self.order.extend(0..self.tracks.len());
        if self.shuffled {
            self.order.shuffle(rng);
        }
    }
}
