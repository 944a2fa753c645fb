use std::path::Path;

use crate::error::BackendError;

/// 能打开音频文件并输出的后端
///
/// `open` 可能阻塞（设备协商、文件 IO），引擎总在 blocking 线程池里调用。
pub trait AudioBackend: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn open(&self, path: &Path) -> Result<Box<dyn AudioResource>, BackendError>;
}

/// 一个已打开、绑定到输出设备的音频文件
///
/// 从 `open` 到 `close` 由引擎独占。实现在 drop 时也必须释放设备，
/// 没有 `close` 就被丢弃的资源不能泄漏。
pub trait AudioResource: Send {
    /// 解码器给出的时长，未知为 `0.0`
    fn duration_secs(&self) -> f64;

    fn start(&mut self) -> Result<(), BackendError>;

    fn pause(&mut self);

    fn close(&mut self) -> Result<(), BackendError>;

    /// `level` 已限制在 `[0, 1]`
    fn set_volume(&mut self, level: f32) -> Result<(), BackendError>;

    fn elapsed_secs(&self) -> f64;

    /// 播完或暂停后为 false
    fn is_running(&self) -> bool;

    /// 可能阻塞；无法跳转时返回 false
    fn seek(&mut self, secs: f64) -> bool;
}
