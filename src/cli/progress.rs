//! CLI-specific progress handling for iconify-dl
//!
//! Runs the progress display as its own task, fed by the pipeline's event
//! channel, with a rolling window of the most recently written icons.

use std::collections::VecDeque;
use std::future::Future;

use anyhow::Context;
use console::style;
use iconify_dl::ProgressEvent;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Number of recent icons kept on screen
pub const WINDOW_SIZE: usize = 10;

/// Display state owned by the reporter task
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    total: u64,
    completed: u64,
    window: VecDeque<String>,
}

impl ProgressState {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            completed: 0,
            window: VecDeque::with_capacity(WINDOW_SIZE),
        }
    }

    /// Record a written icon, evicting the oldest label once the window is full
    pub fn record(&mut self, event: &ProgressEvent) {
        if self.window.len() == WINDOW_SIZE {
            self.window.pop_front();
        }
        self.window.push_back(event.label());

        if self.completed < self.total {
            self.completed += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Labels currently on screen, oldest first
    pub fn window(&self) -> impl Iterator<Item = &str> {
        self.window.iter().map(String::as_str)
    }

    /// Completed share of the total in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    fn window_text(&self) -> String {
        self.window()
            .map(|label| style(label).dim().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Creates the multi-line icon progress bar
pub fn create_progress_bar(total: u64, target: ProgressDrawTarget) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), target);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Downloading icons\ncurrent: {pos} / total: {len}\n\n{msg}\n\n{wide_bar:.magenta/yellow} {percent:>3}%")
            .expect("Failed to create progress style")
            .progress_chars("█▓░")
    );
    pb
}

/// Handle to the running progress display
pub struct ProgressReporter {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<ProgressState>,
}

impl ProgressReporter {
    /// Start the display on stderr, closed early when `cancel` fires
    ///
    /// Cancelling only closes the display; downloads keep running. A dropped
    /// `cancel` sender never closes it.
    pub fn start(
        total: u64,
        events: UnboundedReceiver<ProgressEvent>,
        quiet: bool,
        cancel: oneshot::Receiver<()>,
    ) -> Self {
        let target = if quiet {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };

        Self::start_with_cancel(total, events, target, async move {
            if cancel.await.is_err() {
                std::future::pending::<()>().await;
            }
        })
    }

/// Start the display with a custom cancel trigger
    pub fn start_with_cancel<F>(
        total: u64,
        events: UnboundedReceiver<ProgressEvent>,
        target: ProgressDrawTarget,
        cancel: F,
    ) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel();
        let pb = create_progress_bar(total, target);
        let handle = tokio::spawn(display_loop(ProgressState::new(total), events, pb, stop_rx, cancel));

        Self {
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Tell the display to stop and wait until it has released the terminal
    pub async fn stop(mut self) -> anyhow::Result<ProgressState> {
        if let Some(stop) = self.stop.take() {
            // The loop may already be gone after a cancel
            let _ = stop.send(());
        }

        self.handle.await.context("progress display task failed")
    }
}

async fn display_loop<F>(
    mut state: ProgressState,
    mut events: UnboundedReceiver<ProgressEvent>,
    pb: ProgressBar,
    mut stop: oneshot::Receiver<()>,
    cancel: F,
) -> ProgressState
where
    F: Future<Output = ()>,
{
    tokio::pin!(cancel);

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => {
                // Everything sent before the stop still belongs on the last frame
                while let Ok(event) = events.try_recv() {
                    state.record(&event);
                }
                pb.set_position(state.completed());
                pb.set_message(state.window_text());
                pb.finish();
                break;
            }
            _ = &mut cancel => {
                debug!("Progress display cancelled by user");
                pb.finish_and_clear();
                break;
            }
            event = events.recv() => match event {
                Some(event) => {
                    state.record(&event);
                    pb.set_position(state.completed());
                    pb.set_message(state.window_text());
                }
                None => {
                    // Producer finished; keep the last frame until told to stop
                    tokio::select! {
                        _ = &mut stop => pb.finish(),
                        _ = &mut cancel => pb.finish_and_clear(),
                    }
                    break;
                }
            },
        }
    }

    state
}

/// Resolves on the next Ctrl+C press
///
/// Never resolves when no signal handler can be installed.
pub async fn ctrl_c_press() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Close the display on the first interrupt, resolve on the second
///
/// The caller aborts the run once this resolves, so a stuck request can
/// still be interrupted after the display is gone.
pub async fn interrupt_after_cancel<P, Fut>(mut press: P, cancel_display: oneshot::Sender<()>)
where
    P: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    press().await;
    // The display may already be stopped
    let _ = cancel_display.send(());
    debug!("Interrupt received, press Ctrl+C again to abort");

    press().await;
}
