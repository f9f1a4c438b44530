//! `cooked` entrypoint: runs console cooked reads on a raw-mode terminal.
use anyhow::Result;
use clap::Parser;
use core_actions::{CookedReadSlot, EditorOptions, LineEditor, ReadContext, ReadStatus};
use core_events::{ControlKeyState, EVENT_CHANNEL_CAP, Event, EventSourceRegistry, QueuedInput, WaitTerminationReason};
use core_state::{AliasTable, ConsoleLock, MemoryHistory, ReadHandleData, Utf8Sink};
use core_terminal::{CrosstermBackend, Endpoints, OutputChannel, TerminalBackend};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod host;

use host::{HostScreen, editor_options};

const PROMPT: &str = "cooked> ";
/// Caller buffer handed to each read, in bytes.
const LINE_CAPACITY: usize = 4096;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "cooked", version, about = "Console cooked-read line editor demo")]
struct Args {
    /// Configuration file path (overrides discovery of `cooked.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Executable name used to select the alias table.
    #[arg(long = "exe-name", default_value = "cmd.exe")]
    pub exe_name: String,
    /// End reads on Tab as well as Enter, as a completion-capable shell would.
    #[arg(long = "wakeup-tab")]
    pub wakeup_tab: bool,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

struct RuntimeContext<'a> {
    config: core_config::Config,
    options: EditorOptions,
    terminal_guard: core_terminal::TerminalGuard<'a>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn run(&mut self) -> Result<RuntimeContext<'_>> {
        let args = Args::parse();
        let config = core_config::load_from(args.config.clone())?;

        self.configure_logging(&config.file.log.filter);
        Self::install_panic_hook();

        let path_str = config.path.as_ref().map(|p| p.display().to_string());
        info!(
            target: "runtime",
            config = path_str.as_deref(),
            config_loaded = config.raw.is_some(),
            exe = args.exe_name.as_str(),
            wakeup_tab = args.wakeup_tab,
            "startup"
        );

        let options = editor_options(&config, &args.exe_name, args.wakeup_tab);
        self.backend.set_title("cooked")?;
        let guard = self.backend.enter_guard()?;

        Ok(RuntimeContext {
            config,
            options,
            terminal_guard: guard,
        })
    }

    fn configure_logging(&mut self, default_filter: &str) {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("cooked.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        let file_appender = tracing_appender::rolling::never(log_dir, "cooked.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    ExitCommand,
    Interrupted,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(self) -> &'static str {
        match self {
            ShutdownReason::ExitCommand => "exit_command",
            ShutdownReason::Interrupted => "interrupted",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

enum LoopControl {
    Continue,
    Break(ShutdownReason),
}

/// Everything a cooked read borrows, owned for the life of the session.
struct ConsoleSession {
    slot: CookedReadSlot,
    input: QueuedInput,
    history: MemoryHistory,
    aliases: AliasTable,
    screen: HostScreen,
    pending: ReadHandleData,
    channel: OutputChannel,
    lock: ConsoleLock,
    options: EditorOptions,
}

impl ConsoleSession {
    fn new(config: &core_config::Config, options: EditorOptions) -> Result<Self> {
        let mut channel = OutputChannel::new();
        channel.open(Endpoints::output_only(std::io::stdout()))?;
        channel.set_close_handler(|| warn!(target: "output.channel", "terminal output closed"));
        Ok(Self {
            slot: CookedReadSlot::new(),
            input: QueuedInput::new(),
            history: MemoryHistory::with_capacity(config.history_capacity()),
            aliases: AliasTable::new(),
            screen: HostScreen::from_terminal(),
            pending: ReadHandleData::new(),
            channel,
            lock: ConsoleLock::new(),
            options,
        })
    }

    /// Run read turns until the editor parks. Every completed line is shown
    /// and followed by a fresh prompt.
    fn pump(&mut self) -> LoopControl {
        loop {
            if !self.slot.is_active() && !self.pending.is_input_pending() {
                self.channel.write_text(PROMPT);
            }
            let mut sink = Utf8Sink::new(LINE_CAPACITY);
            let status = {
                let guard = self.lock.lock();
                let mut ctx = ReadContext {
                    input: &mut self.input,
                    history: Some(&mut self.history),
                    aliases: &mut self.aliases,
                    screen: &mut self.screen,
                    pending: &mut self.pending,
                    sink: &mut sink,
                };
                let options = self.options.clone();
                self.slot.read(&mut ctx, &mut self.channel, &guard, move |screen| {
                    LineEditor::new(screen, "", options)
                })
            };
            match status {
                ReadStatus::Pending => return LoopControl::Continue,
                ReadStatus::Success {
                    bytes,
                    control_key_state,
                } => {
                    let line = sink.into_string();
                    if let LoopControl::Break(reason) = self.show_line(&line, bytes, control_key_state) {
                        return LoopControl::Break(reason);
                    }
                }
                ReadStatus::Alerted | ReadStatus::ThreadTerminating => {
                    return LoopControl::Break(ShutdownReason::Interrupted);
                }
            }
        }
    }

    fn show_line(&mut self, line: &str, bytes: usize, control_key_state: ControlKeyState) -> LoopControl {
        trace!(target: "runtime", bytes, ?control_key_state, "line delivered");
        if line.trim_end_matches(['\r', '\n']) == "exit" {
            return LoopControl::Break(ShutdownReason::ExitCommand);
        }
        // A wake-up completion leaves the cursor mid-line.
        if !line.ends_with('\n') {
            self.channel.write_text("\r\n");
        }
        self.channel.write_text(&format!("  {bytes} bytes: {line:?}\r\n"));
        LoopControl::Continue
    }

    fn resize(&mut self, width: u16, height: u16) {
        let Some(editor) = self.slot.editor_mut() else {
            self.screen.resize(width, height);
            return;
        };
        editor.erase_before_resize(&mut self.channel);
        self.screen.resize(width, height);
        let mut sink = Utf8Sink::new(0);
        let mut ctx = ReadContext {
            input: &mut self.input,
            history: Some(&mut self.history),
            aliases: &mut self.aliases,
            screen: &mut self.screen,
            pending: &mut self.pending,
            sink: &mut sink,
        };
        editor.redraw_after_resize(&mut ctx, &mut self.channel);
    }

    fn terminate(&mut self, reason: WaitTerminationReason) -> LoopControl {
        let status = self.slot.notify(reason);
        info!(target: "runtime", ?reason, ?status, "termination requested");
        self.channel.write_text("^C\r\n");
        LoopControl::Break(ShutdownReason::Interrupted)
    }
}

struct CookedRuntime<'a> {
    session: ConsoleSession,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    input_task: Option<tokio::task::JoinHandle<()>>,
    input_shutdown: Option<core_input::AsyncInputShutdown>,
    source_handles: Vec<tokio::task::JoinHandle<()>>,
    _terminal_guard: core_terminal::TerminalGuard<'a>,
}

impl<'a> CookedRuntime<'a> {
    fn new(
        context: RuntimeContext<'a>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        input_task: tokio::task::JoinHandle<()>,
        input_shutdown: core_input::AsyncInputShutdown,
        source_handles: Vec<tokio::task::JoinHandle<()>>,
    ) -> Result<Self> {
        let RuntimeContext {
            config,
            options,
            terminal_guard,
        } = context;
        Ok(Self {
            session: ConsoleSession::new(&config, options)?,
            rx,
            tx: Some(tx),
            input_task: Some(input_task),
            input_shutdown: Some(input_shutdown),
            source_handles,
            _terminal_guard: terminal_guard,
        })
    }

    async fn run(&mut self) -> Result<()> {
        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        if let LoopControl::Break(reason) = self.session.pump() {
            shutdown_reason = reason;
        } else {
            while let Some(event) = self.rx.recv().await {
                let control = match event {
                    Event::Input(unit) => {
                        self.session.input.push(unit);
                        self.session.pump()
                    }
                    Event::Resize(w, h) => {
                        self.session.resize(w, h);
                        LoopControl::Continue
                    }
                    Event::Terminate(reason) => self.session.terminate(reason),
                    Event::Shutdown => LoopControl::Break(ShutdownReason::ShutdownEvent),
                };
                if let LoopControl::Break(reason) = control {
                    shutdown_reason = reason;
                    break;
                }
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(())
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        info!(target: "runtime", reason = reason.as_str(), "shutdown");
        drop(self.tx.take());

        if let Some(shutdown) = self.input_shutdown.take() {
            shutdown.signal();
        }

        let handles = self.input_task.take().into_iter().chain(self.source_handles.drain(..));
        for handle in handles {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(())) => trace!(target: "runtime", "event source stopped"),
                Ok(Err(err)) if err.is_cancelled() => trace!(target: "runtime", "event source cancelled"),
                Ok(Err(err)) => error!(target: "runtime", ?err, "event source failed"),
                Err(_) => warn!(target: "runtime", "event source did not stop in time"),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    let context = startup.run()?;
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());
    // Extra sources (none by default) share the same channel.
    let source_handles = EventSourceRegistry::new().spawn_all(&tx);

    let mut runtime = CookedRuntime::new(context, tx, rx, input_task, input_shutdown, source_handles)?;
    runtime.run().await
}
