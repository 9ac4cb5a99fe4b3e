//! TUI module for pianola
//!
//! Draws the keyboard, a transport line and an output scope, and turns
//! terminal input into key activations on the controller.

mod keyboard;
mod transport;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::{
    collections::HashMap,
    io::stdout,
    path::PathBuf,
    time::{Duration, Instant},
};

use pianola::{io, synth::KeyId, Controller};

use keyboard::{key_at, render_keyboard};
use transport::{render_transport, TransportStats};
use waveform::render_waveform;

/// Scope ring size (samples)
pub const SCOPE_CAPACITY: usize = 8192;

/// Samples shown in the scope
const VIS_BUFFER_SIZE: usize = 1024;

/// Without release events a key is let go this long after its last press
/// or auto-repeat
const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

/// How long a status message stays up
const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

/// Output device facts shown in the transport bar
#[derive(Debug, Clone, Copy)]
pub struct DeviceInfo {
    pub sample_rate: u32,
    pub channels: usize,
}

/// UI application state
pub struct UiApp {
    controller: Controller,
    /// Ring buffer receiver for output samples
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    device: DeviceInfo,
    /// Performance file for save/load
    file: PathBuf,
    /// Whether the terminal reports key releases
    release_events: bool,
    /// Keyboard labels currently held, with the time of their last press
    held_labels: HashMap<char, Instant>,
    /// Key under the mouse while the button is down
    pointer: Option<KeyId>,
    /// Where the keyboard was last drawn, for mouse hit testing
    keyboard_area: Rect,
    status: Option<(String, Instant)>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(controller: Controller, scope_rx: Consumer<f32>, file: PathBuf, device: DeviceInfo) -> Self {
        Self {
            controller,
            scope_rx,
            scope: vec![0.0; VIS_BUFFER_SIZE],
            device,
            file,
            release_events: false,
            held_labels: HashMap::new(),
            pointer: None,
            keyboard_area: Rect::default(),
            status: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            log::info!("terminal does not report key releases; keys release after {HOLD_TIMEOUT:?}");
        }
        execute!(stdout(), EnableMouseCapture, EnableFocusChange)?;

        let result = self.event_loop(terminal);

        if self.release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        execute!(stdout(), DisableMouseCapture, DisableFocusChange)?;
        self.controller.release_inputs();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.controller.poll();
            self.poll_scope();
            self.expire_held_labels();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::FocusLost => {
                        self.controller.release_inputs();
                        self.held_labels.clear();
                        self.pointer = None;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE output samples
    fn poll_scope(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() > VIS_BUFFER_SIZE {
            let excess = self.scope.len() - VIS_BUFFER_SIZE;
            self.scope.drain(0..excess);
        }
    }

    fn expire_held_labels(&mut self) {
        if self.release_events {
            return;
        }
        let now = Instant::now();
        let controller = &self.controller;
        self.held_labels.retain(|&label, pressed_at| {
            let keep = now.duration_since(*pressed_at) < HOLD_TIMEOUT;
            if !keep {
                controller.set_keyed(label, false);
            }
            keep
        });
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.kind == KeyEventKind::Press {
                self.handle_command(key.code);
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c) => {
                let label = c.to_ascii_lowercase();
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        self.controller.set_keyed(label, true);
                        self.held_labels.insert(label, Instant::now());
                    }
                    KeyEventKind::Release => {
                        self.controller.set_keyed(label, false);
                        self.held_labels.remove(&label);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_command(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('n') => {
                self.controller.new_performance();
                self.set_status("New performance");
            }
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('o') => self.load(),
            KeyCode::Char('p') => {
                if self.controller.stop_playback() {
                    self.set_status("Playback stopped");
                }
            }
            KeyCode::Char('c') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let under = key_at(
            self.keyboard_area,
            self.controller.voice_count(),
            mouse.column,
            mouse.row,
        );
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(id) = under {
                    self.controller.set_manual(id, true);
                    self.pointer = Some(id);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if under != self.pointer => {
                if let Some(old) = self.pointer.take() {
                    self.controller.set_manual(old, false);
                }
                if let Some(id) = under {
                    self.controller.set_manual(id, true);
                    self.pointer = Some(id);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(old) = self.pointer.take() {
                    self.controller.set_manual(old, false);
                }
            }
            _ => {}
        }
    }

    fn save(&mut self) {
        let recording = self.controller.recording().clone();
        if recording.is_empty() {
            self.set_status("Nothing recorded yet");
            return;
        }
        match io::save(&self.file, &recording) {
            Ok(()) => self.set_status(format!(
                "Saved {} events to {}",
                recording.len(),
                self.file.display()
            )),
            Err(e) => {
                log::error!("save failed: {e}");
                self.set_status(format!("Save failed: {e}"));
            }
        }
    }

    fn load(&mut self) {
        let timeline = match io::load(&self.file) {
            Ok(timeline) => timeline,
            Err(e) => {
                log::error!("load failed: {e}");
                self.set_status(format!("Load failed: {e}"));
                return;
            }
        };
        let events = timeline.len();
        match self.controller.load_playback(timeline) {
            Ok(()) => self.set_status(format!("Playing {events} events")),
            Err(_) => self.set_status("Engine busy, try again"),
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(6),    // Keyboard
                Constraint::Length(8), // Scope
                Constraint::Length(1), // Help / status
            ])
            .split(area);

        let recording_len = self.controller.recording().len();
        let stats = TransportStats {
            seconds: self.controller.clock() as f64 / self.controller.sample_rate() as f64,
            recorded_events: recording_len,
            playing_back: self.controller.is_playing_back(),
            peak: self.controller.peak(),
            dropped: self.controller.dropped_records(),
            sample_rate: self.device.sample_rate,
            channels: self.device.channels,
        };
        render_transport(frame, chunks[0], &stats);

        self.keyboard_area = render_keyboard(frame, chunks[1], self.controller.keys());

        render_waveform(frame, chunks[2], &self.scope);

        let status = match &self.status {
            Some((message, at)) if at.elapsed() < STATUS_TIMEOUT => message.clone(),
            _ => " [Esc] Quit  [^N] New  [^S] Save  [^O] Load+Play  [^P] Stop playback".to_string(),
        };
        let help = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
