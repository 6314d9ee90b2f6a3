use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc::{self, RecvTimeoutError, Sender, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::LifeError;

/// Periodic task on a dedicated thread.
///
/// The first tick runs immediately, the following ones `delay` apart. The
/// delay is a `recv_timeout` on the stop channel, so a stop request wakes the
/// thread at once instead of waiting out the period.
pub(crate) struct Ticker {
    stop_tx: Sender<()>,
    handle: JoinHandle<Result<(), LifeError>>,
}

/// Keeps `live` equal to the number of running loops, panics included.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn enter(live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(live)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Ticker {
    pub fn spawn<F>(
        name: String,
        delay: Duration,
        live: Arc<AtomicUsize>,
        mut tick: F,
    ) -> Result<Self, LifeError>
    where
        F: FnMut() -> Result<ControlFlow<()>, LifeError> + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                let _live = LiveGuard::enter(live);
                loop {
                    if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
                        break;
                    }
                    if tick()?.is_break() {
                        break;
                    }
                    if !matches!(stop_rx.recv_timeout(delay), Err(RecvTimeoutError::Timeout)) {
                        break;
                    }
                }
                Ok(())
            })
            .map_err(|err| LifeError::Spawn(err.to_string()))?;
        Ok(Self { stop_tx, handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Ask the loop to end and wait for its thread to exit.
    pub fn stop(self) -> Result<(), LifeError> {
        // the receiver is gone if the loop already ended on its own
        let _ = self.stop_tx.send(());
        self.handle.join().unwrap_or(Err(LifeError::LoopPanicked))
    }
}
