//! Trailing-edge debouncing.
//!
//! `Debouncer` is the pure state: feed it values with the time they arrived
//! and poll it with the current time. `spawn_debouncer` drives one on the
//! tokio clock between two channels.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Last-value-wins coalescing within a fixed quiet window
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a value, replacing any pending one and restarting the window
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// When the pending value settles, if there is one
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.window)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value once the window has passed without new input
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop the pending value without emitting it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// Debounce a channel on the tokio clock.
///
/// Settled values are sent on the returned receiver. When the input closes,
/// a still-pending value is flushed immediately and the task ends.
pub fn spawn_debouncer<T>(
    window: Duration,
    mut input: mpsc::Receiver<T>,
) -> (mpsc::Receiver<T>, JoinHandle<()>)
where
    T: Send + 'static,
{
    let (output, settled) = mpsc::channel(16);

    let handle = tokio::spawn(async move {
        let mut debouncer = Debouncer::new(window);

        loop {
            let now = tokio::time::Instant::now();
            let deadline = debouncer
                .deadline()
                .map(tokio::time::Instant::from_std)
                .unwrap_or(now + window);

            tokio::select! {
                received = input.recv() => match received {
                    Some(value) => debouncer.push(value, tokio::time::Instant::now().into_std()),
                    None => {
                        if let Some(value) = debouncer.cancel() {
                            let _ = output.send(value).await;
                        }
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline), if debouncer.is_pending() => {
                    if let Some(value) = debouncer.poll(tokio::time::Instant::now().into_std()) {
                        if output.send(value).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    (settled, handle)
}
