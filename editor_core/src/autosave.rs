//! Periodic autosave.
//!
//! A tokio task ticks every autosave interval and hands the latest
//! document content to a save callback. Content is read fresh on each
//! tick from a watch channel, so a save sees whatever was committed last.

use crate::settings::EditorSettings;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Shortest accepted autosave interval.
pub const MIN_AUTO_SAVE_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to the autosave timer of one editor.
///
/// At most one timer runs per handle; dropping the handle stops it.
#[derive(Debug, Default)]
pub struct AutoSave {
    task: Option<Running>,
}

#[derive(Debug)]
struct Running {
    handle: JoinHandle<()>,
    /// Held by the task for the whole of each save; cleared by `stop`.
    active: Arc<Mutex<bool>>,
}

/// Locks the flag, ignoring poisoning from a panicking save callback.
fn lock(flag: &Mutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AutoSave {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the timer, replacing any running one.
    ///
    /// Returns false without starting when autosave is disabled in
    /// `settings` or when called outside a tokio runtime. The first save
    /// happens one full interval after start; empty content is never saved.
    pub fn start<F>(
        &mut self,
        settings: &EditorSettings,
        mut content: watch::Receiver<String>,
        mut on_save: F,
    ) -> bool
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.stop();

        if !settings.auto_save {
            log::debug!("Autosave disabled, not starting");
            return false;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Autosave needs a tokio runtime: {}", e);
                return false;
            }
        };

        let requested = settings.auto_save_interval();
        let period = requested.max(MIN_AUTO_SAVE_INTERVAL);
        if period != requested {
            log::warn!(
                "Autosave interval {:?} too short, using {:?}",
                requested,
                period
            );
        }

        let active = Arc::new(Mutex::new(true));
        let flag = Arc::clone(&active);
        let handle = handle.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                // The flag is held for the whole save, so `stop` waits for it.
                let keep_running = {
                    let running = lock(&flag);
                    if !*running {
                        false
                    } else if content.has_changed().is_err() {
                        // The editor dropped its sender: nothing left to save.
                        log::debug!("Editor closed, autosave task exiting");
                        false
                    } else {
                        let snapshot = content.borrow_and_update().clone();
                        if !snapshot.is_empty() {
                            on_save(&snapshot);
                        }
                        true
                    }
                };
                if !keep_running {
                    break;
                }
            }
        });
        self.task = Some(Running { handle, active });

        log::debug!("Autosave started (every {:?})", period);
        true
    }

    /// Cancels the timer. Does nothing when not running.
    ///
    /// Blocks until a save already in progress has returned; no save
    /// starts after this returns.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            *lock(&task.active) = false;
            task.handle.abort();
            log::debug!("Autosave stopped");
        }
    }

    /// Returns true while a timer task is alive.
    pub fn is_active(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

impl Drop for AutoSave {
    fn drop(&mut self) {
        self.stop();
    }
}
