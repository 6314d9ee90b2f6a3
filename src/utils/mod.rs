mod poll_limit;

pub use poll_limit::PollLimiter;
