//! The threaded frame loop.
//!
//! [`FrameLoop::run`] drives three loops until one of them stops:
//!
//! ```text
//! compose thread          update thread           caller's thread
//! --------------          -------------           ---------------
//! snapshot widgets        tick FrameClock         read next event
//! draw by layer           run update hook         loop keys (quit, display, help)
//! draw help overlay       update each widget      help overlay or active widget
//! swap, write frame       sleep                   ...
//! sleep
//! ```
//!
//! All three share one active flag. Clearing it ([`LoopHandle::quit`]) stops
//! every loop at its next iteration boundary. The input loop reads with a
//! bounded timeout so it notices within one poll interval.
//!
//! Widgets are shared as `Arc<Mutex<Box<dyn Widget>>>`. Loops copy the list of
//! handles out of the registry and release it before locking any widget, so
//! widgets can be added or removed from inside hooks. Hooks reach other
//! widgets through [`LoopHandle::try_with_widget`], which fails instead of
//! blocking; a blocking [`LoopHandle::with_widget`] from two hooks on
//! different loops can deadlock.
//!
//! A panic in any hook is caught on the loop it happened in, recorded as
//! [`Error::LoopPanicked`] and stops all loops. The first failure is returned
//! by [`FrameLoop::run`] once every loop has exited and the terminal has been
//! restored.

mod clock;
mod registry;

pub use clock::FrameClock;
pub use registry::{SharedWidget, WidgetId};

use crate::ansi::{ColorMode, FrameWriter};
use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::error::{Error, LoopStage, Result};
use crate::input::{Event, EventSource, Input, Key, TerminalEvents};
use crate::terminal::{Terminal, TerminalOptions};
use crate::widget::{EventResult, Widget, WidgetExt};
use registry::Registry;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Builds a screen's widgets.
pub type ScreenBuilder = Arc<dyn Fn(&LoopHandle) -> Result<()> + Send + Sync>;

/// Runs once per update tick before the widgets are updated.
pub type UpdateHook = Arc<dyn Fn(&LoopHandle, &FrameClock) + Send + Sync>;

/// Keys handled by the input loop itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopKeys {
    /// Stop all loops.
    pub quit: Key,
    /// Toggle terminal output on and off.
    pub display: Key,
    /// Show or hide the help overlay.
    pub help: Key,
}

impl Default for LoopKeys {
    fn default() -> Self {
        Self {
            quit: Key::Ctrl('c'),
            display: Key::Ctrl('d'),
            help: Key::F(1),
        }
    }
}

/// Frame loop configuration.
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Canvas size in cells.
    pub size: (u32, u32),
    /// Target interval between composed frames.
    pub draw_period: Duration,
    /// Target interval between update ticks.
    pub update_period: Duration,
    /// Shortest sleep between iterations, even when a pass overruns.
    pub min_sleep: Duration,
    /// Longest the input loop blocks before rechecking the active flag.
    pub input_poll: Duration,
    /// Write frames to the output from the start.
    pub start_displayed: bool,
    /// Cell the frame is cleared with before widgets draw.
    pub background: Cell,
    pub color_mode: ColorMode,
    pub terminal: TerminalOptions,
    pub keys: LoopKeys,
}

impl Default for LoopConfig {
    fn default() -> Self {
        let sixtieth = Duration::from_nanos(1_000_000_000 / 60);
        Self {
            size: (80, 24),
            draw_period: sixtieth,
            update_period: sixtieth,
            min_sleep: Duration::from_millis(5),
            input_poll: Duration::from_millis(50),
            start_displayed: true,
            background: Cell::default(),
            color_mode: ColorMode::TrueColor,
            terminal: TerminalOptions::default(),
            keys: LoopKeys::default(),
        }
    }
}

/// Frame loop statistics.
#[derive(Clone, Debug, Default)]
pub struct LoopStats {
    /// Frames composed.
    pub frames: u64,
    /// Update ticks run.
    pub updates: u64,
    /// Interval between the last two composed frames.
    pub last_frame_time: Duration,
    /// Approximate frames per second.
    pub fps: f32,
}

struct Shared {
    config: LoopConfig,
    active: AtomicBool,
    quit_requested: AtomicBool,
    displayed: AtomicBool,
    help_visible: AtomicBool,
    registry: Mutex<Registry>,
    screens: Mutex<HashMap<String, ScreenBuilder>>,
    help: Mutex<Option<SharedWidget>>,
    update_hook: Mutex<Option<UpdateHook>>,
    frame: Mutex<Canvas>,
    stats: Mutex<LoopStats>,
    failure: Mutex<Option<Error>>,
    workers: Mutex<usize>,
    workers_done: Condvar,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking hook poisons the widget it held. The failure is already
    // recorded, so later passes just see whatever state it left.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable control surface of a frame loop.
///
/// Usable before [`FrameLoop::run`], from widget hooks, and from other
/// threads.
#[derive(Clone)]
pub struct LoopHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopHandle")
            .field("running", &self.is_running())
            .field("displayed", &self.is_displayed())
            .field("widgets", &lock(&self.shared.registry).len())
            .finish_non_exhaustive()
    }
}

impl LoopHandle {
    fn new(config: LoopConfig) -> Self {
        let (width, height) = config.size;
        let frame = Canvas::filled(width, height, config.background);
        Self {
            shared: Arc::new(Shared {
                active: AtomicBool::new(false),
                quit_requested: AtomicBool::new(false),
                displayed: AtomicBool::new(config.start_displayed),
                help_visible: AtomicBool::new(false),
                registry: Mutex::new(Registry::default()),
                screens: Mutex::new(HashMap::new()),
                help: Mutex::new(None),
                update_hook: Mutex::new(None),
                frame: Mutex::new(frame),
                stats: Mutex::new(LoopStats::default()),
                failure: Mutex::new(None),
                workers: Mutex::new(0),
                workers_done: Condvar::new(),
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.shared.config
    }

    // ========================================================================
    // Widgets
    // ========================================================================

    /// Register a top-level widget on `layer`. Lower layers paint first.
    pub fn add_widget<W: Widget + 'static>(&self, widget: W, layer: i32) -> WidgetId {
        self.add_boxed(Box::new(widget), layer)
    }

    /// Register an already boxed widget.
    pub fn add_boxed(&self, widget: Box<dyn Widget>, layer: i32) -> WidgetId {
        let id = lock(&self.shared.registry).insert(Arc::new(Mutex::new(widget)), layer);
        tracing::debug!(%id, layer, "widget registered");
        id
    }

    /// Unregister a widget. It may still appear in a pass that already took
    /// its snapshot.
    pub fn remove_widget(&self, id: WidgetId) -> Result<()> {
        lock(&self.shared.registry).remove(id)?;
        tracing::debug!(%id, "widget removed");
        Ok(())
    }

    /// Move a widget to another paint layer.
    pub fn set_layer(&self, id: WidgetId, layer: i32) -> Result<()> {
        lock(&self.shared.registry).set_layer(id, layer)?;
        tracing::debug!(%id, layer, "widget layer changed");
        Ok(())
    }

    /// Unregister every widget.
    pub fn clear_widgets(&self) {
        lock(&self.shared.registry).clear();
        tracing::debug!("widgets cleared");
    }

    /// Registered ids in paint order.
    #[must_use]
    pub fn widget_ids(&self) -> Vec<WidgetId> {
        lock(&self.shared.registry).ids()
    }

    #[must_use]
    pub fn layer_of(&self, id: WidgetId) -> Option<i32> {
        lock(&self.shared.registry).layer_of(id)
    }

    /// Route input to `id`.
    pub fn set_active(&self, id: WidgetId) -> Result<()> {
        lock(&self.shared.registry).set_active(id)?;
        tracing::debug!(%id, "active widget changed");
        Ok(())
    }

    #[must_use]
    pub fn active_widget(&self) -> Option<WidgetId> {
        lock(&self.shared.registry).active()
    }

    /// Run `f` with exclusive access to a registered widget, waiting for
    /// the loops to release it. Not for use inside widget hooks.
    pub fn with_widget<R>(&self, id: WidgetId, f: impl FnOnce(&mut dyn Widget) -> R) -> Result<R> {
        let widget = self.shared_widget(id)?;
        let mut guard = lock(&widget);
        Ok(f(guard.as_mut()))
    }

    /// Like [`with_widget`](Self::with_widget), but returns
    /// [`Error::WidgetBusy`] instead of waiting when the widget is locked.
    pub fn try_with_widget<R>(
        &self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Widget) -> R,
    ) -> Result<R> {
        let widget = self.shared_widget(id)?;
        let mut guard = match widget.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(Error::WidgetBusy(id.get())),
        };
        Ok(f(guard.as_mut()))
    }

    fn shared_widget(&self, id: WidgetId) -> Result<SharedWidget> {
        lock(&self.shared.registry)
            .get(id)
            .ok_or(Error::UnknownWidget(id.get()))
    }

    // ========================================================================
    // Screens
    // ========================================================================

    /// Register a named screen.
    pub fn add_screen<F>(&self, name: impl Into<String>, builder: F) -> Result<()>
    where
        F: Fn(&LoopHandle) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut screens = lock(&self.shared.screens);
        if screens.contains_key(&name) {
            return Err(Error::DuplicateScreen(name));
        }
        tracing::debug!(screen = %name, "screen registered");
        screens.insert(name, Arc::new(builder));
        Ok(())
    }

    /// Replace every widget with the ones built by screen `name`.
    pub fn go_to_screen(&self, name: &str) -> Result<()> {
        let builder = lock(&self.shared.screens)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownScreen(name.to_string()))?;
        self.clear_widgets();
        tracing::debug!(screen = name, "entering screen");
        builder(self)
    }

    // ========================================================================
    // Help overlay and hooks
    // ========================================================================

    /// Install the help overlay. It is drawn above every layer while visible
    /// and captures all input except the loop keys.
    pub fn set_help<W: Widget + 'static>(&self, widget: W) {
        let widget: Box<dyn Widget> = Box::new(widget);
        *lock(&self.shared.help) = Some(Arc::new(Mutex::new(widget)));
    }

    /// Show or hide the help overlay. Returns the new visibility; always
    /// `false` without an overlay.
    pub fn toggle_help(&self) -> bool {
        let has_help = lock(&self.shared.help).is_some();
        let visible = has_help && !self.shared.help_visible.load(Ordering::SeqCst);
        self.shared.help_visible.store(visible, Ordering::SeqCst);
        tracing::debug!(visible, "help overlay toggled");
        visible
    }

    #[must_use]
    pub fn is_help_visible(&self) -> bool {
        self.shared.help_visible.load(Ordering::SeqCst)
    }

    /// Install the global update hook.
    pub fn set_update_hook<F>(&self, hook: F)
    where
        F: Fn(&LoopHandle, &FrameClock) + Send + Sync + 'static,
    {
        *lock(&self.shared.update_hook) = Some(Arc::new(hook));
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Stop every loop at its next iteration boundary. Safe from hooks.
    /// Called before [`FrameLoop::run`], the run returns without starting.
    pub fn quit(&self) {
        self.shared.quit_requested.store(true, Ordering::SeqCst);
        if self.shared.active.swap(false, Ordering::SeqCst) {
            tracing::info!("frame loop stopping");
        }
    }

    /// [`quit`](Self::quit), then block until the compose and update loops
    /// have exited. Must not be called from a widget hook, since the loops
    /// may be waiting for that widget's lock.
    pub fn quit_and_wait(&self) {
        self.quit();
        let mut workers = lock(&self.shared.workers);
        while *workers > 0 {
            workers = self
                .shared
                .workers_done
                .wait(workers)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Turn terminal output on or off. Returns the new state.
    pub fn toggle_display(&self) -> bool {
        let shown = !self.shared.displayed.fetch_xor(true, Ordering::SeqCst);
        tracing::debug!(shown, "display toggled");
        shown
    }

    pub fn set_displayed(&self, displayed: bool) {
        self.shared.displayed.store(displayed, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_displayed(&self) -> bool {
        self.shared.displayed.load(Ordering::SeqCst)
    }

    /// Copy of the last composed frame.
    #[must_use]
    pub fn frame(&self) -> Canvas {
        lock(&self.shared.frame).clone()
    }

    #[must_use]
    pub fn stats(&self) -> LoopStats {
        lock(&self.shared.stats).clone()
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Route one event the way the input loop does.
    ///
    /// Loop keys come first. While the help overlay is visible it receives
    /// everything else, and returning [`EventResult::Exit`] closes it.
    /// Otherwise the active widget gets the event.
    pub fn dispatch_event(&self, event: &Event) -> Option<EventResult> {
        let keys = self.shared.config.keys;
        if event.is(keys.quit) {
            self.quit();
            return None;
        }
        if event.is(keys.display) {
            self.toggle_display();
            return None;
        }
        if event.is(keys.help) && lock(&self.shared.help).is_some() {
            self.toggle_help();
            return None;
        }

        if self.is_help_visible() {
            let help = lock(&self.shared.help).clone()?;
            let result = lock(&help).handle_event(event);
            if result == EventResult::Exit {
                self.shared.help_visible.store(false, Ordering::SeqCst);
                tracing::debug!("help overlay closed");
            }
            return Some(result);
        }

        let widget = {
            let registry = lock(&self.shared.registry);
            registry.active().and_then(|id| registry.get(id))
        }?;
        let result = lock(&widget).handle_event(event);
        tracing::trace!(key = ?event.key, ?result, "event dispatched");
        Some(result)
    }

    /// Run one update pass: the update hook, then every widget in paint
    /// order.
    pub fn update_once(&self, clock: &FrameClock) {
        let hook = lock(&self.shared.update_hook).clone();
        if let Some(hook) = hook {
            hook(self, clock);
        }
        let widgets = lock(&self.shared.registry).snapshot();
        for widget in widgets {
            lock(&widget).update(clock);
        }
        let mut stats = lock(&self.shared.stats);
        stats.updates = stats.updates.saturating_add(1);
    }

    /// Compose one frame onto `canvas`: background, widgets by layer, then
    /// the help overlay if visible.
    pub fn compose_into(&self, canvas: &mut Canvas) {
        canvas.clear(self.shared.config.background);
        let widgets = lock(&self.shared.registry).snapshot();
        for widget in widgets {
            lock(&widget).draw(canvas, (0, 0));
        }
        if self.is_help_visible() {
            let help = lock(&self.shared.help).clone();
            if let Some(help) = help {
                lock(&help).draw(canvas, (0, 0));
            }
        }
    }

    fn publish(&self, frame: &Canvas, interval: Duration) {
        lock(&self.shared.frame).clone_from(frame);
        let mut stats = lock(&self.shared.stats);
        stats.frames = stats.frames.saturating_add(1);
        stats.last_frame_time = interval;
        stats.fps = if interval.as_secs_f32() > 0.0 {
            1.0 / interval.as_secs_f32()
        } else {
            0.0
        };
    }

    fn quit_requested(&self) -> bool {
        self.shared.quit_requested.load(Ordering::SeqCst)
    }

    fn fail(&self, error: Error) {
        tracing::error!(%error, "frame loop failed");
        {
            let mut failure = lock(&self.shared.failure);
            if failure.is_none() {
                *failure = Some(error);
            }
        }
        self.quit();
    }

    fn take_failure(&self) -> Option<Error> {
        lock(&self.shared.failure).take()
    }

    fn worker_started(&self) {
        *lock(&self.shared.workers) += 1;
    }

    fn worker_finished(&self) {
        let mut workers = lock(&self.shared.workers);
        *workers = workers.saturating_sub(1);
        self.shared.workers_done.notify_all();
    }
}

/// Owns the output stream and runs the loops.
pub struct FrameLoop {
    handle: LoopHandle,
    output: Box<dyn Write + Send>,
}

impl fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl FrameLoop {
    /// A loop writing to stdout.
    #[must_use]
    pub fn new(config: LoopConfig) -> Self {
        Self::with_output(config, io::stdout())
    }

    /// A loop writing to `output`.
    pub fn with_output<W: Write + Send + 'static>(config: LoopConfig, output: W) -> Self {
        Self {
            handle: LoopHandle::new(config),
            output: Box::new(output),
        }
    }

    /// Control handle, valid before, during and after [`run`](Self::run).
    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Run with keystrokes from stdin.
    pub fn run_stdin(self) -> Result<()> {
        let events = TerminalEvents::stdin()?;
        self.run(events)
    }

    /// Run until quit, a closed event source or the first failure.
    ///
    /// The compose and update loops run on their own threads; the input loop
    /// runs on the calling thread. Both workers are joined before returning.
    pub fn run<E: EventSource>(self, mut events: E) -> Result<()> {
        let Self { handle, output } = self;
        let config = handle.config().clone();

        if handle.quit_requested() {
            tracing::info!("quit requested before start");
            return Ok(());
        }

        let mut terminal = Terminal::new(output);
        terminal.setup(&config.terminal, config.size.0, config.size.1)?;

        handle.shared.active.store(true, Ordering::SeqCst);
        // A quit racing the store above must still win.
        if handle.quit_requested() {
            handle.shared.active.store(false, Ordering::SeqCst);
        }
        tracing::info!(width = config.size.0, height = config.size.1, "frame loop started");

        let compose = spawn_worker(&handle, "termstage-compose", LoopStage::Compose, move |h| {
            compose_loop(h, &mut terminal)
        });
        let update = spawn_worker(&handle, "termstage-update", LoopStage::Update, update_loop);

        let mut workers = Vec::with_capacity(2);
        let mut spawn_error = None;
        for spawned in [compose, update] {
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(error) => spawn_error = Some(error),
            }
        }
        match spawn_error {
            Some(error) => handle.fail(error.into()),
            None => guarded(&handle, LoopStage::Input, |h| input_loop(h, &mut events)),
        }

        handle.quit();
        for worker in workers {
            // Panics are caught inside the worker.
            let _ = worker.join();
        }
        tracing::info!("frame loop stopped");

        handle.take_failure().map_or(Ok(()), Err)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

/// Run `body`, turning an error or a panic into the loop's failure.
fn guarded(handle: &LoopHandle, stage: LoopStage, body: impl FnOnce(&LoopHandle) -> Result<()>) {
    match std::panic::catch_unwind(AssertUnwindSafe(|| body(handle))) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => handle.fail(error),
        Err(payload) => handle.fail(Error::LoopPanicked {
            stage,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn spawn_worker<F>(
    handle: &LoopHandle,
    name: &str,
    stage: LoopStage,
    body: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnOnce(&LoopHandle) -> Result<()> + Send + 'static,
{
    let handle = handle.clone();
    handle.worker_started();
    let spawned = thread::Builder::new().name(name.to_string()).spawn({
        let handle = handle.clone();
        move || {
            guarded(&handle, stage, body);
            handle.worker_finished();
        }
    });
    if spawned.is_err() {
        handle.worker_finished();
    }
    spawned
}

fn pace(started: Instant, period: Duration, min_sleep: Duration) {
    thread::sleep(period.saturating_sub(started.elapsed()).max(min_sleep));
}

fn compose_loop<W: Write>(handle: &LoopHandle, terminal: &mut Terminal<W>) -> Result<()> {
    let config = handle.config();
    let (width, height) = config.size;
    let mut back = Canvas::filled(width, height, config.background);
    let mut front = back.clone();
    let mut writer = FrameWriter::with_color_mode(config.color_mode);
    let mut last_frame = Instant::now();

    while handle.is_running() {
        let started = Instant::now();

        handle.compose_into(&mut back);
        std::mem::swap(&mut front, &mut back);
        handle.publish(&front, started.duration_since(last_frame));
        last_frame = started;

        if handle.is_displayed() {
            writer.write_frame(&front, terminal.writer_mut())?;
        }
        tracing::trace!(elapsed = ?started.elapsed(), "frame composed");

        pace(started, config.draw_period, config.min_sleep);
    }
    // `terminal` is dropped with this thread's closure, which restores it.
    Ok(())
}

fn update_loop(handle: &LoopHandle) -> Result<()> {
    let config = handle.config();
    let mut clock = FrameClock::new();

    while handle.is_running() {
        let started = Instant::now();
        clock.tick_at(started);
        handle.update_once(&clock);
        pace(started, config.update_period, config.min_sleep);
    }
    Ok(())
}

fn input_loop<E: EventSource>(handle: &LoopHandle, events: &mut E) -> Result<()> {
    let poll = handle.config().input_poll;
    while handle.is_running() {
        match events.read_event(poll)? {
            Input::Event(event) => {
                handle.dispatch_event(&event);
            }
            Input::Timeout => {}
            Input::Closed => {
                tracing::info!("event source closed");
                handle.quit();
            }
        }
    }
    Ok(())
}
