//! The remote script the host loads: lifecycle hooks and relay wiring.
//!
//! The host calls [`create_instance`] once, then drives the script through
//! the [`ControlSurface`] hooks on its own thread. [`ControlSurface::update_display`]
//! is the tick: it is the only place host API calls happen.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use liverelay_config::{LOOPBACK_HOST, RELAY_PORT, RelayLimits};
use tracing::{info, warn};

use crate::actions;
use crate::dispatch::{CommandProcessor, DispatchTable};
use crate::health::{LifecycleReporter, StructuredLifecycleReporter};
use crate::host::Host;
use crate::relay::{Command, RelayCore, Response, drain_tick};
use crate::transport::{ListenerError, ListenerHandle, SessionHandler, SocketListener};

/// Name reported by `ping`.
pub const SCRIPT_NAME: &str = "LiveRelay_Remote";
/// Version reported by `ping` and `health_check`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Prefix for every line written to the host's log.
pub const LOG_PREFIX: &str = "[LiveRelay] ";

const SCRIPT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::script");

/// Writes `message` to the host log with the script prefix. Host thread only.
pub(crate) fn log_to_host<H: Host + ?Sized>(host: &H, message: impl fmt::Display) {
    host.log_message(&format!("{LOG_PREFIX}{message}"));
}

/// Opaque MIDI map handle passed to [`ControlSurface::build_midi_map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMapHandle(usize);

impl MidiMapHandle {
    /// Wraps the host's raw handle.
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }
}

/// Hooks the host invokes on a loaded control surface. Names and arities are
/// fixed by the host.
pub trait ControlSurface {
    /// Informs the script of the other scripts the host has loaded.
    fn connect_script_instances(&mut self, instantiated_scripts: &[String]);

    /// Whether the script wants to lock to a device.
    fn can_lock_to_devices(&self) -> bool;

    /// Asks the script to resend its state to hardware.
    fn refresh_state(&mut self);

    /// Lets the script register MIDI mappings.
    fn build_midi_map(&mut self, midi_map_handle: MidiMapHandle);

    /// Periodic tick, roughly 60 times per second.
    fn update_display(&mut self);

    /// Called when the script is unloaded.
    fn disconnect(&mut self);
}

/// Construction parameters for [`RemoteScript::with_options`].
pub struct ScriptOptions<H> {
    host: String,
    port: u16,
    limits: RelayLimits,
    table: DispatchTable<H>,
    reporter: Arc<dyn LifecycleReporter>,
}

impl<H: Host + 'static> ScriptOptions<H> {
    /// Loopback endpoint on the relay port, default limits, full action
    /// catalog and `tracing` lifecycle reporting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: LOOPBACK_HOST.to_owned(),
            port: RELAY_PORT,
            limits: RelayLimits::default(),
            table: actions::catalog(),
            reporter: Arc::new(StructuredLifecycleReporter::new()),
        }
    }

    /// Listens on `port` instead of the relay port; `0` picks a free port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the timeouts and per-tick cap.
    #[must_use]
    pub const fn with_limits(mut self, limits: RelayLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the action catalog.
    #[must_use]
    pub fn with_table(mut self, table: DispatchTable<H>) -> Self {
        self.table = table;
        self
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn LifecycleReporter>) -> Self {
        self.reporter = reporter;
        self
    }
}

impl<H: Host + 'static> Default for ScriptOptions<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for ScriptOptions<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("limits", &self.limits)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Factory the host calls to load the script on the relay port.
#[must_use]
pub fn create_instance<H: Host + 'static>(host: H) -> RemoteScript<H> {
    RemoteScript::with_options(host, ScriptOptions::new())
}

/// A loaded remote script exposing the host over the relay socket.
pub struct RemoteScript<H> {
    host: H,
    processor: CommandProcessor<H>,
    core: Arc<RelayCore>,
    listener: Option<ListenerHandle>,
    local_addr: Option<SocketAddr>,
    reporter: Arc<dyn LifecycleReporter>,
    stopped: bool,
}

impl<H: Host + 'static> RemoteScript<H> {
    /// Builds the script and starts the acceptor.
    ///
    /// A listener that cannot bind is reported and logged; the script is
    /// still returned so the host keeps running without remote control.
    #[must_use]
    pub fn with_options(host: H, options: ScriptOptions<H>) -> Self {
        let ScriptOptions {
            host: bind_host,
            port,
            limits,
            table,
            reporter,
        } = options;
        reporter.script_starting();

        let core = Arc::new(RelayCore::new(limits));
        core.start();
        let (listener, local_addr) = match start_listener(&core, &bind_host, port) {
            Ok((handle, addr)) => {
                reporter.listener_started(addr);
                log_to_host(
                    &host,
                    format_args!("Socket server started successfully on port {}", addr.port()),
                );
                (Some(handle), Some(addr))
            }
            Err(error) => {
                core.stop();
                reporter.listener_failed(&error);
                log_to_host(&host, format_args!("ERROR starting socket server: {error}"));
                (None, None)
            }
        };

        log_to_host(&host, "LiveRelay Remote Script initialized (Queue-based, Thread-Safe)");
        if let Some(addr) = local_addr {
            log_to_host(&host, format_args!("Socket server listening on port {}", addr.port()));
        }

        Self {
            host,
            processor: CommandProcessor::new(table),
            core,
            listener,
            local_addr,
            reporter,
            stopped: false,
        }
    }

    /// Executes one command immediately on the calling (host) thread,
    /// bypassing the queue.
    pub fn process_command(&mut self, command: Command) -> Response {
        let depth = self.core.queue().len();
        self.processor.process(&mut self.host, command, depth)
    }

    /// Every action name a client may send.
    #[must_use]
    pub fn available_actions(&self) -> Vec<&'static str> {
        self.processor.available_actions()
    }

    /// Address the relay listens on, when the listener started.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Returns `true` while the relay accepts clients.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listener.is_some() && self.core.is_running()
    }

    /// Commands waiting for the next tick.
    #[must_use]
    pub fn queued_commands(&self) -> usize {
        self.core.queue().len()
    }

    /// The host the script drives.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host the script drives, mutably.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host + 'static> ControlSurface for RemoteScript<H> {
    fn connect_script_instances(&mut self, _instantiated_scripts: &[String]) {}

    fn can_lock_to_devices(&self) -> bool {
        false
    }

    fn refresh_state(&mut self) {}

    fn build_midi_map(&mut self, _midi_map_handle: MidiMapHandle) {}

    fn update_display(&mut self) {
        let Self {
            host,
            processor,
            core,
            ..
        } = self;
        let core: &RelayCore = core;
        drain_tick(core, |command| {
            let depth = core.queue().len();
            processor.process(host, command, depth)
        });
    }

    fn disconnect(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        log_to_host(&self.host, "Shutting down LiveRelay Remote Script...");

        self.core.stop();
        if let Some(listener) = self.listener.take() {
            listener.shutdown();
            if let Err(error) = listener.join() {
                warn!(target: SCRIPT_TARGET, error = %error, "listener did not stop cleanly");
            }
        }

        self.reporter.script_stopped();
        info!(target: SCRIPT_TARGET, "remote script stopped");
        log_to_host(&self.host, "LiveRelay Remote Script stopped");
    }
}

impl<H> fmt::Debug for RemoteScript<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteScript")
            .field("local_addr", &self.local_addr)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

fn start_listener(
    core: &Arc<RelayCore>,
    host: &str,
    port: u16,
) -> Result<(ListenerHandle, SocketAddr), ListenerError> {
    let listener = SocketListener::bind(host, port)?;
    let addr = listener.local_addr();
    let handler = Arc::new(SessionHandler::new(Arc::clone(core)));
    let handle = listener.start(core.running_flag(), handler)?;
    Ok((handle, addr))
}
