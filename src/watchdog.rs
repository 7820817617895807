//! Run-wide hard timeout
//!
//! The watchdog knows nothing about in-flight waits. On expiry it runs its handler,
//! which by default terminates the process.

use crate::error::{PilotError, Result};
use std::{sync::{mpsc::{self, RecvTimeoutError, Sender},
                 Arc},
          thread::{self, JoinHandle},
          time::Duration};

type ExpiryHandler = Arc<dyn Fn(Duration) + Send + Sync>;

struct Armed {
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Timer owned by the run's top-level controller, armed once at start and disarmed at the end
pub struct Watchdog {
    on_expire: ExpiryHandler,
    armed: Option<Armed>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::with_handler(|timeout| {
            log::error!("Run exceeded allowed timeout of {:?}", timeout);
            std::process::exit(1);
        })
    }
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(on_expire: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        Self { on_expire: Arc::new(on_expire), armed: None }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn arm(&mut self, timeout: Duration) -> Result<()> {
        if self.armed.is_some() {
            return Err(PilotError::WatchdogAlreadyArmed);
        }

        log::info!("Setting up timeout watchdog: {:?}", timeout);

        let (cancel, cancelled) = mpsc::channel::<()>();
        let on_expire = self.on_expire.clone();
        let handle = thread::spawn(move || {
            // A dropped sender counts as a cancel
            if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(timeout) {
                on_expire(timeout);
            }
        });

        self.armed = Some(Armed { cancel, handle });
        Ok(())
    }

    /// Cancel the timer; a no-op when not armed
    pub fn disarm(&mut self) {
        if let Some(armed) = self.armed.take() {
            let _ = armed.cancel.send(());
            if armed.handle.join().is_err() {
                log::warn!("Watchdog thread panicked");
            }
            log::debug!("Watchdog disarmed");
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.disarm();
    }
}
