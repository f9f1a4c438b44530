use crate::translate::{paste_units, translate_key};
use core_events::{AsyncEventSource, Event};
use crossterm::event::{Event as CEvent, EventStream};
use std::io;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{debug, info, trace, warn};

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Terminal input as an [`AsyncEventSource`]. Keep the returned shutdown
/// handle to stop the task before the channel closes.
#[derive(Debug)]
pub struct CrosstermInput {
    listener: ShutdownListener,
}

impl CrosstermInput {
    pub fn new() -> (Self, AsyncInputShutdown) {
        let (shutdown, listener) = ShutdownListener::new_pair();
        (Self { listener }, shutdown)
    }
}

impl AsyncEventSource for CrosstermInput {
    fn name(&self) -> &'static str {
        "crossterm"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> task::JoinHandle<()> {
        let listener = self.listener;
        task::spawn(async move {
            let span = tracing::debug_span!(target: "runtime", "input_task");
            let _enter = span.enter();
            InputTask::new(tx, EventStream::new(), listener).run().await;
        })
    }
}

/// Spawn a Tokio task that forwards `crossterm::EventStream` into `sender`.
pub(crate) fn spawn_async_event_task(sender: Sender<Event>) -> (task::JoinHandle<()>, AsyncInputShutdown) {
    let (source, shutdown) = CrosstermInput::new();
    (Box::new(source).spawn(sender), shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExitReason {
    Running,
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Running => "running",
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

struct InputTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    sender: Sender<Event>,
    stream: S,
    shutdown: ShutdownListener,
    exit_reason: ExitReason,
    stream_error: Option<io::ErrorKind>,
}

impl<S> InputTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    fn new(sender: Sender<Event>, stream: S, shutdown: ShutdownListener) -> Self {
        Self {
            sender,
            stream,
            shutdown,
            exit_reason: ExitReason::Running,
            stream_error: None,
        }
    }

    async fn run(mut self) -> ExitReason {
        info!(target: "runtime", "input task started");
        self.exit_reason = ExitReason::StreamEnded;
        loop {
            let maybe_result = tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    self.exit_reason = ExitReason::ShutdownSignal;
                    break;
                }
                result = self.stream.next() => result,
            };

            let Some(result) = maybe_result else {
                break;
            };

            let keep_going = match result {
                Ok(CEvent::Key(key)) => match translate_key(&key) {
                    Some(event) => self.send_event(event).await,
                    None => true,
                },
                Ok(CEvent::Resize(w, h)) => {
                    trace!(target: "runtime", w, h, "resize");
                    self.send_event(Event::Resize(w, h)).await
                }
                Ok(CEvent::Paste(data)) => self.forward_paste(&data).await,
                Ok(_) => true,
                Err(err) => {
                    self.exit_reason = ExitReason::StreamError;
                    self.stream_error = Some(err.kind());
                    false
                }
            };
            if !keep_going {
                break;
            }
        }

        let reason = self.exit_reason;
        if reason == ExitReason::StreamError {
            warn!(target: "runtime", error_kind = ?self.stream_error, "input stream failed");
        }
        info!(target: "runtime", reason = reason.as_str(), "input task stopped");
        reason
    }

    async fn forward_paste(&mut self, data: &str) -> bool {
        // Length only; pasted text may be sensitive.
        debug!(target: "runtime", len = data.len(), "paste");
        for unit in paste_units(data) {
            if !self.send_event(Event::Input(unit)).await {
                return false;
            }
        }
        true
    }

    async fn send_event(&mut self, event: Event) -> bool {
        if self.sender.send(event).await.is_ok() {
            return true;
        }
        if self.exit_reason != ExitReason::ShutdownSignal {
            self.exit_reason = ExitReason::ChannelClosed;
        }
        false
    }
}
