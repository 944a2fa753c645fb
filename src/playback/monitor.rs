use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::messages::MonitorSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Running,
    Suspended,
}

/// 单个播放会话的定时 tick
///
/// 任务只发 [`MonitorSignal::Tick`]；引擎处理 tick 时才去采样资源，
/// 资源永远不会在引擎之外被碰到。drop 即中止任务。
pub(crate) struct PositionMonitor {
    session: u64,
    control: watch::Sender<Control>,
    task: JoinHandle<()>,
    ended: bool,
}

impl PositionMonitor {
    pub(crate) fn start(
        session: u64,
        period: Duration,
        tx: mpsc::Sender<MonitorSignal>,
    ) -> Self {
        let (control, rx_control) = watch::channel(Control::Running);
        let task = tokio::spawn(run(session, period, tx, rx_control));
        tracing::debug!(
            session,
            period_ms = period.as_millis() as u64,
            "位置监视器已启动"
        );
        Self {
            session,
            control,
            task,
            ended: false,
        }
    }

    pub(crate) fn session(&self) -> u64 {
        self.session
    }

    pub(crate) fn suspend(&self) {
        self.control.send_replace(Control::Suspended);
    }

    pub(crate) fn resume(&self) {
        self.control.send_replace(Control::Running);
    }

    /// 锁存本会话的播放结束；只有第一次返回 true
    pub(crate) fn mark_ended(&mut self) -> bool {
        !std::mem::replace(&mut self.ended, true)
    }

    pub(crate) fn cancel(self) {
        tracing::debug!(session = self.session, "位置监视器已取消");
        drop(self);
    }
}

impl Drop for PositionMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    session: u64,
    period: Duration,
    tx: mpsc::Sender<MonitorSignal>,
    mut control: watch::Receiver<Control>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if *control.borrow_and_update() == Control::Suspended {
            if control.changed().await.is_err() {
                break;
            }
            ticker.reset();
            continue;
        }
        tokio::select! {
            _ = ticker.tick() => {
                if tx.send(MonitorSignal::Tick { session }).await.is_err() {
                    break;
                }
            }
            changed = control.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracing::trace!(session, "位置监视器退出");
}
