use std::time::Duration;

pub struct Config;

impl Config {
    pub const DEFAULT_WIDTH: usize = 25;
    pub const DEFAULT_HEIGHT: usize = 20;
    pub const DEFAULT_FILL_RATE: f64 = 0.3;

    pub const GENERATION_DELAY: Duration = Duration::from_millis(10);
    pub const THREAD_NAME: &'static str = "conway-ticker";

    pub const MAX_POLL_HZ: f64 = 30.;
}

/// Runtime settings of a [`SimulationController`](crate::SimulationController).
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Pause between two published generations.
    pub generation_delay: Duration,
    /// Name given to the background thread.
    pub thread_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            generation_delay: Config::GENERATION_DELAY,
            thread_name: Config::THREAD_NAME.to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn with_generation_delay(mut self, delay: Duration) -> Self {
        self.generation_delay = delay;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}
