//! Save acknowledgement shown after a batch save.
//!
//! A success notice clears itself after a fixed delay; a failure stays until
//! the next successful save. The clearing timer is cancelled when a newer
//! outcome is recorded or the notice is dropped.

use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle};

use crate::sync::SaveOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saved,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
struct NoticeState {
    generation: u64,
    status: SaveStatus,
}

pub struct SaveNotice {
    tx: watch::Sender<NoticeState>,
    clear_after: Duration,
    timer: Option<JoinHandle<()>>,
}

/// Read side of a [`SaveNotice`], cheap to clone across threads.
#[derive(Clone)]
pub struct NoticeWatcher(watch::Receiver<NoticeState>);

impl NoticeWatcher {
    pub fn status(&self) -> SaveStatus {
        self.0.borrow().status.clone()
    }
}

impl SaveNotice {
    pub fn new(clear_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(NoticeState::default());
        Self {
            tx,
            clear_after,
            timer: None,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.tx.borrow().status.clone()
    }

    pub fn watch(&self) -> NoticeWatcher {
        NoticeWatcher(self.tx.subscribe())
    }

    /// Must be called from within a tokio runtime.
    pub fn record(&mut self, outcome: &SaveOutcome) {
        self.cancel_timer();

        let status = match outcome {
            SaveOutcome::Success => SaveStatus::Saved,
            SaveOutcome::Failure(reason) => SaveStatus::Failed(reason.clone()),
        };
        let mut generation = 0;
        self.tx.send_modify(|state| {
            state.generation += 1;
            state.status = status;
            generation = state.generation;
        });

        if *outcome == SaveOutcome::Success {
            let tx = self.tx.clone();
            let clear_after = self.clear_after;
            self.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(clear_after).await;
                tx.send_if_modified(|state| {
                    if state.generation != generation {
                        return false;
                    }
                    state.status = SaveStatus::Idle;
                    true
                });
            }));
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SaveNotice {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR_AFTER: Duration = Duration::from_secs(2);

    fn failure() -> SaveOutcome {
        SaveOutcome::Failure("Failed to save values".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_itself_after_delay() {
        let mut notice = SaveNotice::new(CLEAR_AFTER);
        let watcher = notice.watch();

        notice.record(&SaveOutcome::Success);
        assert_eq!(watcher.status(), SaveStatus::Saved);

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(notice.status(), SaveStatus::Saved);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notice.status(), SaveStatus::Idle);
        assert_eq!(watcher.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_persists_until_next_success() {
        let mut notice = SaveNotice::new(CLEAR_AFTER);

        notice.record(&failure());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(
            notice.status(),
            SaveStatus::Failed("Failed to save values".to_string())
        );

        notice.record(&SaveOutcome::Success);
        assert_eq!(notice.status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_success_restarts_the_clear_timer() {
        let mut notice = SaveNotice::new(CLEAR_AFTER);

        notice.record(&SaveOutcome::Success);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        notice.record(&SaveOutcome::Success);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(notice.status(), SaveStatus::Saved);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(notice.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_cancels_pending_success_clear() {
        let mut notice = SaveNotice::new(CLEAR_AFTER);

        notice.record(&SaveOutcome::Success);
        notice.record(&failure());
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(matches!(notice.status(), SaveStatus::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_notice_aborts_timer() {
        let mut notice = SaveNotice::new(CLEAR_AFTER);
        let watcher = notice.watch();

        notice.record(&SaveOutcome::Success);
        drop(notice);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(watcher.status(), SaveStatus::Saved);
    }
}
