//! The deadline-driven scheduler.
//!
//! One owned component with a start → tick-loop → stop lifecycle. Each
//! tick sweeps the active games in ascending-deadline order, processing
//! every overdue phase and firing pre-deadline reminders. Games are
//! independent: one game's failure is logged and the sweep moves on. The
//! per-game lock inside [`Core`] makes overlapping ticks harmless: a
//! game can't be processed twice for the same deadline because processing
//! re-checks dueness under the lock.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::service::Core;

pub struct Scheduler {
    core: Arc<Core>,
}

/// Controls a running scheduler task.
pub struct SchedulerHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the loop to finish its current tick and exit.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.task.await;
    }
}

impl Scheduler {
    pub fn new(core: Arc<Core>) -> Self {
        Scheduler { core }
    }

    /// Start the tick loop on the current runtime.
    pub fn spawn(core: Arc<Core>) -> SchedulerHandle {
        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(Scheduler::new(core).run(stopped));
        SchedulerHandle { stop, task }
    }

    /// Run until `stopped` fires. Processes deadlines missed while the
    /// process was down before entering the periodic loop.
    pub async fn run(self, mut stopped: oneshot::Receiver<()>) {
        if self.core.config().startup_process_missed_deadlines {
            info!("sweeping deadlines missed while offline");
            self.process_due().await;
        }

        let mut ticker = tokio::time::interval(self.core.config().tick_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = &mut stopped => {
                    info!("scheduler stopping");
                    return;
                }
            }
        }
    }

    /// One pass: overdue games first, then reminders.
    pub async fn tick(&self) {
        self.process_due().await;
        self.send_reminders().await;
    }

    async fn process_due(&self) {
        let now = Utc::now();
        let due = match self.core.store().due_games(now).await {
            Ok(due) => due,
            Err(e) => {
                warn!(error = %e, "could not list due games; skipping this pass");
                return;
            }
        };

        for game in due {
            match self.core.process_if_due(game, now).await {
                Ok(Some(outcome)) => {
                    debug!(game, records = outcome.records.len(), "deadline processed");
                }
                Ok(None) => {
                    // Someone processed it between the listing and the
                    // lock; nothing owed.
                }
                Err(e) => {
                    // The transaction rolled back; the game keeps its
                    // pre-phase state and deadline for manual recovery.
                    error!(game, error = %e, "deadline processing failed; game left untouched");
                }
            }
        }
    }

    async fn send_reminders(&self) {
        let now = Utc::now();
        let threshold = self.core.config().reminder_threshold();
        let pending = match self.core.store().reminder_games(now, threshold).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "could not list reminder games; skipping this pass");
                return;
            }
        };

        for game in pending {
            if let Err(e) = self.core.send_deadline_reminder(game, now).await {
                warn!(game, error = %e, "reminder failed");
            }
        }
    }
}
