use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::time_attack::TimeAttackEngine;

/// Unified event type consumed by the play loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LadderEvent {
    /// One line typed by the player.
    Input(String),
    Tick,
    /// The input stream ended.
    Closed,
}

/// Source of player input lines
#[async_trait]
pub trait InputSource: Send {
    /// Next line, or `None` once the input is exhausted. Must be cancel safe.
    async fn next_line(&mut self) -> Option<String>;
}

/// Production input source reading lines from stdin on a dedicated thread
pub struct StdinSource {
    rx: UnboundedReceiver<String>,
}

impl StdinSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read input: {e}");
                        break;
                    }
                }
            }
        });

        Self { rx }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSource for StdinSource {
    async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Input source fed from a channel, for tests
pub struct TestInputSource {
    rx: UnboundedReceiver<String>,
}

impl TestInputSource {
    pub fn new(rx: UnboundedReceiver<String>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl InputSource for TestInputSource {
    async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The time attack clock rate.
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

fn delayed_interval(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Drive the session clock, one `tick()` per ticker interval, until the
/// session is no longer active.
pub async fn run_countdown<T: Ticker>(engine: Arc<TimeAttackEngine>, ticker: T) {
    let mut interval = delayed_interval(ticker.interval());
    loop {
        interval.tick().await;
        if !engine.tick() {
            break;
        }
    }
}

/// Runner that merges player input with clock ticks
pub struct Runner<I: InputSource, T: Ticker> {
    input: I,
    ticker: T,
    interval: Interval,
}

impl<I: InputSource, T: Ticker> Runner<I, T> {
    pub fn new(input: I, ticker: T) -> Self {
        let interval = delayed_interval(ticker.interval());
        Self {
            input,
            ticker,
            interval,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Wait for the next input line, or a Tick when the interval elapses first
    pub async fn step(&mut self) -> LadderEvent {
        tokio::select! {
            biased;
            line = self.input.next_line() => match line {
                Some(line) => LadderEvent::Input(line),
                None => LadderEvent::Closed,
            },
            _ = self.interval.tick() => LadderEvent::Tick,
        }
    }
}
