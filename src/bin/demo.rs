//! `termstage-demo`: a small focus-navigation playground.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin termstage-demo
//! cargo run --bin termstage-demo -- --fps 30 --no-alt-screen
//! TERMSTAGE_LOG=/tmp/termstage.log RUST_LOG=termstage=trace cargo run --bin termstage-demo
//! ```
//!
//! Arrows (or e/d/s/f) move between buttons, Enter or Space
//! activates, Escape backs out. F1 shows help, Ctrl+D toggles output and
//! Ctrl+C quits.

#![allow(clippy::cast_possible_wrap)]

use std::ffi::OsString;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use termstage::ansi::ColorMode;
use termstage::input::Direction;
use termstage::runtime::{FrameClock, FrameLoop, LoopConfig, LoopHandle};
use termstage::terminal::{TerminalOptions, terminal_size};
use termstage::widget::{
    BorderSelection, BorderSides, EventResult, FillSelection, Panel, Selection, Widget, WidgetCore,
    WidgetExt,
};
use termstage::{Cell, Event, Key, Rgb};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

// ============================================================================
// CLI Parsing
// ============================================================================

const HELP_TEXT: &str = "termstage-demo - focus navigation playground

USAGE:
    termstage-demo [OPTIONS]

OPTIONS:
    -h, --help          Print this help message and exit
    --fps <N>           Target frames per second (default: 60)
    --no-alt-screen     Draw on the main screen instead of the alternate one
    --no-color          Write frames without color escapes

ENVIRONMENT:
    TERMSTAGE_LOG       Append logs to this file
    RUST_LOG            Log filter (default: termstage=debug)
";

#[derive(Debug)]
struct Args {
    fps: u32,
    alt_screen: bool,
    color: bool,
}

enum ParseResult {
    Run(Args),
    Help,
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut parsed = Args {
        fps: 60,
        alt_screen: true,
        color: true,
    };
    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("-h" | "--help") => return Ok(ParseResult::Help),
            Some("--fps") => {
                let value = args.next().ok_or("--fps requires a value")?;
                parsed.fps = value
                    .to_str()
                    .and_then(|s| s.parse().ok())
                    .filter(|&n| n > 0)
                    .ok_or_else(|| format!("invalid --fps value: {value:?}"))?;
            }
            Some("--no-alt-screen") => parsed.alt_screen = false,
            Some("--no-color") => parsed.color = false,
            _ => return Err(format!("unknown argument: {arg:?}")),
        }
    }
    Ok(ParseResult::Run(parsed))
}

/// Send logs to the file named by `TERMSTAGE_LOG`. Stdout belongs to the
/// frames, so without the variable nothing is logged.
fn init_logging() -> std::io::Result<()> {
    let Some(path) = std::env::var_os("TERMSTAGE_LOG") else {
        return Ok(());
    };
    let file = File::options().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termstage=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true),
        )
        .init();
    Ok(())
}

// ============================================================================
// Widgets
// ============================================================================

const PANEL_BG: Rgb = Rgb::new(20, 24, 36);
const BUTTON_BG: Rgb = Rgb::new(40, 48, 70);
const ACCENT: Rgb = Rgb::new(120, 200, 255);

struct Button {
    core: WidgetCore,
    label: &'static str,
    presses: u32,
}

impl Button {
    fn new(x: i32, y: i32, label: &'static str) -> Self {
        let border = BorderSelection::new().colors(Rgb::GREEN, Rgb::YELLOW, Rgb::new(70, 70, 90));
        Self {
            core: WidgetCore::new(x, y, 14, 3)
                .with_background(Cell::new(' ', Rgb::WHITE, BUTTON_BG))
                .with_selection(Selection::new(border)),
            label,
            presses: 0,
        }
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self) {
        let text = if self.presses == 0 {
            self.label.to_string()
        } else {
            format!("{} x{}", self.label, self.presses)
        };
        self.core.draw_text(0, 0, &text, Rgb::WHITE);
    }

    fn on_event(&mut self, event: &Event) -> EventResult {
        if event.is(Key::Return) || event.is(Key::Space) {
            self.presses += 1;
            tracing::debug!(label = self.label, presses = self.presses, "button pressed");
            EventResult::Handled
        } else {
            EventResult::NotHandled
        }
    }
}

/// Bottom line: frame statistics and the focus hint.
struct StatusBar {
    core: WidgetCore,
    handle: LoopHandle,
    line: String,
}

impl Widget for StatusBar {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self) {
        self.core.draw_text(1, 0, &self.line, Rgb::GRAY);
    }

    fn on_update(&mut self, clock: &FrameClock) {
        let stats = self.handle.stats();
        self.line = format!(
            "{:>5.1} fps  frame {}  up {}s  F1 help  Ctrl+C quit",
            stats.fps,
            stats.frames,
            clock.elapsed().as_secs()
        );
    }
}

/// Translucent help box; any back key closes it.
struct HelpOverlay {
    core: WidgetCore,
}

impl HelpOverlay {
    const LINES: [&'static str; 6] = [
        "arrows / e d s f      move",
        "Enter / Space         activate",
        "Escape / Tab          back",
        "1 2 3                 jump",
        "Ctrl+D                display",
        "Ctrl+C                quit",
    ];

    fn new(x: i32, y: i32) -> Self {
        Self {
            core: WidgetCore::new(x, y, 34, 10)
                .with_background(Cell::new(' ', Rgb::WHITE, Rgb::new(0, 0, 40)).with_alpha(160))
                .with_selection(Selection::new(
                    BorderSelection::new().colors(ACCENT, ACCENT, ACCENT),
                ))
                .with_alpha(),
        }
    }
}

impl Widget for HelpOverlay {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self) {
        self.core.draw_text(0, 0, "keys", ACCENT);
        for (row, line) in (2..).zip(Self::LINES) {
            self.core.draw_text(0, row, line, Rgb::WHITE);
        }
    }
}

fn build_root(width: u32, height: u32) -> termstage::Result<Panel> {
    let mut root = Panel::from_core(
        WidgetCore::new(0, 0, width, height.saturating_sub(1))
            .with_background(Cell::new(' ', Rgb::WHITE, PANEL_BG)),
    )
    .with_title(" termstage ", ACCENT);

    let nav = root.navigator();
    let one = nav.add(Button::new(2, 2, "one"));
    let two = nav.add(Button::new(18, 2, "two"));
    let three = nav.add(Button::new(2, 6, "three"));

    let mut group = Panel::new(18, 6, 32, 9)
        .with_selection(Selection::new(
            BorderSelection::new()
                .sides(BorderSides::TOP | BorderSides::LEFT)
                .colors(Rgb::GREEN, Rgb::YELLOW, Rgb::GRAY),
        ))
        .with_title("group", Rgb::WHITE);
    let inner = group.navigator();
    let mut left = Button::new(0, 1, "left");
    left.core.set_selection(Selection::new(FillSelection::default()));
    let left = inner.add(left);
    let right = inner.add(Button::new(15, 1, "right"));
    inner.connect(left, right, Direction::Right)?;
    inner.set_current(left)?;
    let group = nav.add(group);

    nav.connect(one, two, Direction::Right)?;
    nav.connect(one, three, Direction::Down)?;
    nav.connect(three, group, Direction::Right)?;
    nav.add_connection(two, group, "D")?;
    nav.add_hotkey(Key::Char('1'), one)?;
    nav.add_hotkey(Key::Char('2'), two)?;
    nav.add_hotkey(Key::Char('3'), three)?;
    nav.set_current(one)?;
    Ok(root)
}

fn run(args: &Args) -> termstage::Result<()> {
    let (cols, rows) = terminal_size().unwrap_or((80, 24));
    let size = (u32::from(cols).min(120), u32::from(rows).min(40));
    let period = Duration::from_secs(1) / args.fps;

    let config = LoopConfig {
        size,
        draw_period: period,
        update_period: period,
        color_mode: if args.color {
            ColorMode::detect()
        } else {
            ColorMode::NoColor
        },
        terminal: TerminalOptions {
            alt_screen: args.alt_screen,
            ..TerminalOptions::default()
        },
        ..LoopConfig::default()
    };
    let frame_loop = FrameLoop::new(config);
    let handle = frame_loop.handle();

    let root = handle.add_widget(build_root(size.0, size.1)?, 0);
    handle.set_active(root)?;
    handle.with_widget(root, |w| w.enter())?;

    handle.add_widget(
        StatusBar {
            core: WidgetCore::new(0, size.1 as i32 - 1, size.0, 1),
            handle: handle.clone(),
            line: String::new(),
        },
        1,
    );
    handle.set_help(HelpOverlay::new(size.0 as i32 / 2 - 17, 3));

    frame_loop.run_stdin()
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args_os()) {
        Ok(ParseResult::Run(args)) => args,
        Ok(ParseResult::Help) => {
            print!("{HELP_TEXT}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}\n\n{HELP_TEXT}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logging() {
        eprintln!("warning: could not open log file: {e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            eprintln!("termstage-demo: {e}");
            ExitCode::FAILURE
        }
    }
}
