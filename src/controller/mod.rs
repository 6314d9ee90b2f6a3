mod observer;
mod ticker;

pub use observer::{LifeEvent, SubscriptionId};

use observer::Observers;
use std::{
    cell::Cell,
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};
use ticker::Ticker;
use tracing::{debug, error, info, trace, warn};

use crate::{ConwayStep, ControllerConfig, Grid, GridId, LifeError, StepEngine};

thread_local! {
    // Address of the `Shared` whose loop runs on this thread, 0 elsewhere.
    static LOOP_OWNER: Cell<usize> = const { Cell::new(0) };
}

/// Published state of a controller: both buffers and the generation number.
///
/// A snapshot is taken under one lock, so `current`, `previous` and `number`
/// always belong to the same tick.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    current: Option<Arc<Grid>>,
    previous: Option<Arc<Grid>>,
    number: u64,
}

impl Generation {
    pub fn current(&self) -> Option<&Arc<Grid>> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Arc<Grid>> {
        self.previous.as_ref()
    }

    pub fn number(&self) -> u64 {
        self.number
    }
}

#[derive(Default)]
struct Shared {
    generation: RwLock<Generation>,
    observers: Observers,
    last_error: Mutex<Option<LifeError>>,
    halt: AtomicBool,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, Generation> {
        self.generation.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Generation> {
        self.generation.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn last_error(&self) -> MutexGuard<'_, Option<LifeError>> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn owner_key(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }

    /// One generation: step outside the lock, then swap both buffers and bump
    /// the counter under the write lock.
    fn tick(&self, engine: &dyn StepEngine) -> Result<(), LifeError> {
        let Some(current) = self.read().current.clone() else {
            return Ok(());
        };
        let next = engine.step(&current)?;
        if (next.width(), next.height()) != (current.width(), current.height()) {
            return Err(LifeError::Step(format!(
                "engine produced a {}x{} grid from a {}x{} one",
                next.width(),
                next.height(),
                current.width(),
                current.height()
            )));
        }
        let id = next.id();
        let generation = {
            let mut published = self.write();
            if !published
                .current
                .as_ref()
                .is_some_and(|installed| Arc::ptr_eq(installed, &current))
            {
                debug!(%id, "field replaced during the tick; result dropped");
                return Ok(());
            }
            published.previous = published.current.replace(Arc::new(next));
            published.number += 1;
            published.number
        };
        trace!(generation, %id, "published generation");
        self.observers.notify(&LifeEvent::Advanced { generation, id });
        Ok(())
    }
}

/// Runs a [`StepEngine`] on a background thread over a double-buffered field.
///
/// The background loop is the only writer of the published [`Generation`]
/// while running; [`set_current`](Self::set_current) stops the loop before it
/// writes. Listeners registered with [`subscribe`](Self::subscribe) are called
/// on the thread that published the change, so while running they execute on
/// the loop thread. A listener may call [`stop`](Self::stop) or
/// [`set_current`](Self::set_current); `start` from a listener is refused.
pub struct SimulationController {
    shared: Arc<Shared>,
    engine: Arc<dyn StepEngine>,
    config: ControllerConfig,
    // held across a whole start, stop or set_current; never taken on the loop thread
    lifecycle: Mutex<()>,
    ticker: Mutex<Option<Ticker>>,
    live_loops: Arc<AtomicUsize>,
}

impl Default for SimulationController {
    fn default() -> Self {
        Self::new(ConwayStep, ControllerConfig::default())
    }
}

impl SimulationController {
    pub fn new(engine: impl StepEngine, config: ControllerConfig) -> Self {
        Self {
            shared: Arc::default(),
            engine: Arc::new(engine),
            config,
            lifecycle: Mutex::new(()),
            ticker: Mutex::new(None),
            live_loops: Arc::default(),
        }
    }

    /// Conway controller with the default config and `grid` installed.
    pub fn with_grid(grid: Grid) -> Self {
        let controller = Self::default();
        controller.install(grid);
        controller
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Install `grid` as the current generation.
    ///
    /// `None` only stops the simulation. Otherwise the running loop (if any)
    /// is stopped, the history is dropped and the counter restarts at zero;
    /// the controller stays stopped. An error left by the stopped loop is
    /// returned after the grid is installed.
    pub fn set_current(&self, grid: Option<Grid>) -> Result<(), LifeError> {
        if self.on_loop_thread() {
            self.request_halt();
            if let Some(grid) = grid {
                self.install(grid);
            }
            return Ok(());
        }
        let (stopped, id) = {
            let lifecycle = self.lock_lifecycle();
            let stopped = self.stop_locked(&lifecycle);
            (stopped, grid.map(|grid| self.publish_grid(grid)))
        };
        if let Some(id) = id {
            self.shared.observers.notify(&LifeEvent::Replaced { id });
        }
        stopped
    }

    /// Start the background loop.
    ///
    /// Returns `false` without doing anything when there is no current grid or
    /// it has no cells. A loop that is already running is stopped first.
    pub fn start(&self) -> bool {
        if self.on_loop_thread() {
            warn!("start requested from the simulation thread; ignored");
            return false;
        }
        let _lifecycle = self.lock_lifecycle();
        match self.current() {
            None => {
                debug!("start ignored: no current grid");
                return false;
            }
            Some(grid) if grid.is_empty() => {
                debug!(
                    width = grid.width(),
                    height = grid.height(),
                    "start ignored: grid has no cells"
                );
                return false;
            }
            Some(_) => {}
        }

        let running = self.lock_ticker().take();
        if let Some(previous) = running {
            if let Err(err) = previous.stop() {
                warn!(%err, "previous simulation loop ended with an error");
            }
        }
        self.shared.halt.store(false, Ordering::SeqCst);
        *self.shared.last_error() = None;

        let shared = Arc::clone(&self.shared);
        let engine = Arc::clone(&self.engine);
        let spawned = Ticker::spawn(
            self.config.thread_name.clone(),
            self.config.generation_delay,
            Arc::clone(&self.live_loops),
            move || {
                LOOP_OWNER.with(|owner| owner.set(shared.owner_key()));
                if shared.halt.load(Ordering::SeqCst) {
                    return Ok(ControlFlow::Break(()));
                }
                if let Err(err) = shared.tick(engine.as_ref()) {
                    error!(%err, "simulation loop stopped");
                    *shared.last_error() = Some(err.clone());
                    shared.observers.notify(&LifeEvent::Faulted {
                        message: err.to_string(),
                    });
                    return Err(err);
                }
                if shared.halt.load(Ordering::SeqCst) {
                    return Ok(ControlFlow::Break(()));
                }
                Ok(ControlFlow::Continue(()))
            },
        );
        match spawned {
            Ok(ticker) => {
                *self.lock_ticker() = Some(ticker);
                info!(
                    delay = ?self.config.generation_delay,
                    generation = self.generation_number(),
                    "simulation started"
                );
                true
            }
            Err(err) => {
                error!(%err, "could not start simulation");
                *self.shared.last_error() = Some(err);
                false
            }
        }
    }

    /// Stop the background loop and wait until its thread has exited.
    ///
    /// Does nothing when no loop is running. Returns the error that ended the
    /// loop, if it ended with one. Called from a listener, it only asks the
    /// loop to finish after the current tick.
    pub fn stop(&self) -> Result<(), LifeError> {
        if self.on_loop_thread() {
            self.request_halt();
            return Ok(());
        }
        let lifecycle = self.lock_lifecycle();
        self.stop_locked(&lifecycle)
    }

    /// Join the running loop; the caller holds the lifecycle lock.
    fn stop_locked(&self, _lifecycle: &MutexGuard<'_, ()>) -> Result<(), LifeError> {
        let Some(ticker) = self.lock_ticker().take() else {
            return Ok(());
        };
        let result = ticker.stop();
        info!(generation = self.generation_number(), "simulation stopped");
        result
    }

    /// `true` while a loop is alive; a loop that ended on an error is not running.
    pub fn is_running(&self) -> bool {
        self.lock_ticker()
            .as_ref()
            .is_some_and(|ticker| !ticker.is_finished())
    }

    /// Number of simulation threads currently inside their loop.
    pub fn active_loops(&self) -> usize {
        self.live_loops.load(Ordering::SeqCst)
    }

    /// Error recorded by the last loop, cleared by the next successful `start`.
    pub fn last_error(&self) -> Option<LifeError> {
        self.shared.last_error().clone()
    }

    pub fn current(&self) -> Option<Arc<Grid>> {
        self.shared.read().current.clone()
    }

    pub fn previous(&self) -> Option<Arc<Grid>> {
        self.shared.read().previous.clone()
    }

    pub fn generation_number(&self) -> u64 {
        self.shared.read().number
    }

    /// Current, previous and generation number as one consistent value.
    pub fn snapshot(&self) -> Generation {
        self.shared.read().clone()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&LifeEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.shared.observers.subscribe(listener)
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.observers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.observers.len()
    }

    fn install(&self, grid: Grid) {
        let id = self.publish_grid(grid);
        self.shared.observers.notify(&LifeEvent::Replaced { id });
    }

    fn publish_grid(&self, grid: Grid) -> GridId {
        let id = grid.id();
        info!(%id, width = grid.width(), height = grid.height(), "new current grid");
        *self.shared.write() = Generation {
            current: Some(Arc::new(grid)),
            previous: None,
            number: 0,
        };
        id
    }

    fn request_halt(&self) {
        debug!("halt requested from the simulation thread");
        self.shared.halt.store(true, Ordering::SeqCst);
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Option<Ticker>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_loop_thread(&self) -> bool {
        LOOP_OWNER.with(|owner| owner.get() == self.shared.owner_key())
    }
}

impl Drop for SimulationController {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(%err, "simulation loop ended with an error");
        }
    }
}
