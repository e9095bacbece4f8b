// SPDX-License-Identifier: GPL-3.0-only

//! Terminal preview of the idle screen
//!
//! Renders the scroll field to the terminal using Unicode half-block
//! characters, one viewport sample per half cell.

use crate::config::Config;
use crate::scroll::{
    EngineSettings, FrameTicker, Mode, SceneSurface, ScrollOverlay, TickSource, images,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::cell::RefCell;
use std::io::{self, stdout};
use std::rc::Rc;
use std::time::Instant;
use tracing::{error, info};

type Overlay = Rc<RefCell<ScrollOverlay<SceneSurface>>>;

/// Run the terminal idle screen
///
/// `scale` is the number of viewport pixels per terminal pixel.
pub fn run(config: Config, scale: u32) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    if let Some(width) = config.normalize_width {
        let rewritten = images::normalize_width(&config.image_dir, width)?;
        info!(rewritten, width, "Normalized source images");
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &config, scale.max(1));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
    scale: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticker = Rc::new(FrameTicker::new(config.fps));
    let size = terminal.size()?;
    let (width, height) = viewport_for(size.width, size.height, scale);

    let source: Rc<dyn TickSource> = ticker.clone();
    let overlay = ScrollOverlay::new(
        EngineSettings::from(config),
        SceneSurface::new(width, height),
        source,
    );
    overlay.borrow_mut().show(None);
    overlay.borrow_mut().raise(None);

    info!(width, height, fps = ticker.fps(), "Terminal idle screen started");

    let mut last_tick = Instant::now();
    let mut show_help = false;

    loop {
        if last_tick.elapsed() >= ticker.interval() {
            last_tick = Instant::now();
            ticker.tick();
        }

        terminal.draw(|f| {
            let area = f.area();

            let field_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };

            let overlay = overlay.borrow();
            f.render_widget(
                FieldWidget {
                    surface: overlay.surface(),
                    visible: overlay.is_visible(),
                    scale,
                },
                field_area,
            );

            let message = if show_help {
                help_message()
            } else {
                status_message(overlay.mode(), overlay.engine().total_tile_count())
            };
            f.render_widget(StatusBar { message: &message }, status_area);
        })?;

        let timeout = ticker.interval().saturating_sub(last_tick.elapsed());
        if !event::poll(timeout)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }

                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('h') => show_help = !show_help,
                    KeyCode::Char('s') => dismiss(&overlay, config.stop_speed),
                    KeyCode::Char('r') => restart(&overlay, config.start_speed),
                    _ => {}
                }
            }
            Event::Resize(cols, rows) => {
                let (width, height) = viewport_for(cols, rows, scale);
                resize(&overlay, width, height);
            }
            _ => {}
        }
    }

    overlay.borrow_mut().clear_overlay(None);
    Ok(())
}

/// Viewport size in pixels for a terminal of `cols` by `rows` cells
fn viewport_for(cols: u16, rows: u16, scale: u32) -> (u32, u32) {
    let cols = u32::from(cols).max(1);
    // One row is reserved for the status bar; each cell holds two pixels
    let rows = u32::from(rows.saturating_sub(1)).max(1);
    (cols * scale, rows * 2 * scale)
}

/// Drain the field, then hide and empty the overlay
fn dismiss(overlay: &Overlay, stop_speed: f32) {
    let mut overlay = overlay.borrow_mut();
    if !overlay.is_running() {
        return;
    }
    let handle = overlay.handle();
    overlay.start_scroll_animation(
        stop_speed,
        Some(Box::new(move || {
            handle.hide();
            handle.clean_scroll();
        })),
    );
}

/// Bring the idle screen back with the reveal animation
fn restart(overlay: &Overlay, start_speed: f32) {
    let mut overlay = overlay.borrow_mut();
    if overlay.is_running() {
        return;
    }
    let handle = overlay.handle();
    overlay.restart_scroll_animation(start_speed, Some(Box::new(move || handle.raise())));
}

/// Rebuild the field for a new viewport
fn resize(overlay: &Overlay, width: u32, height: u32) {
    let mut overlay = overlay.borrow_mut();
    overlay.surface_mut().set_viewport_size(width, height);
    if !overlay.is_running() {
        return;
    }
    overlay.clean_scroll(None);
    overlay.show(None);
    if !overlay.is_running() {
        error!(width, height, "Failed to rebuild scroll field after resize");
    }
}

fn status_message(mode: Mode, tiles: usize) -> String {
    let state = match mode {
        Mode::Idle => "idle",
        Mode::Continuous => "scrolling",
        Mode::Stopping { .. } => "stopping",
        Mode::Starting { .. } => "starting",
    };
    format!(
        "{} ({} tiles) | 's' dismiss | 'r' restart | 'h' help | 'q' quit",
        state, tiles
    )
}

fn help_message() -> String {
    String::from("s: Scroll out and hide | r: Reveal again | h: Toggle help | q/Ctrl+C: Quit")
}

/// Half-block rendering of the scroll field
struct FieldWidget<'a> {
    surface: &'a SceneSurface,
    visible: bool,
    scale: u32,
}

impl Widget for FieldWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.visible {
            let msg = "Idle screen hidden, press 'r'";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        }

        let scale = self.scale as f32;
        for ty in 0..area.height {
            for tx in 0..area.width {
                // Sample the centre of each half cell
                let vx = (f32::from(tx) + 0.5) * scale;
                let top = (f32::from(ty) * 2.0 + 0.5) * scale;
                let bottom = (f32::from(ty) * 2.0 + 1.5) * scale;

                if let Some(cell) = buf.cell_mut((area.x + tx, area.y + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(self.color_at(vx, top));
                    cell.set_bg(self.color_at(vx, bottom));
                }
            }
        }
    }
}

impl FieldWidget<'_> {
    fn color_at(&self, vx: f32, vy: f32) -> Color {
        match self.surface.sample(vx, vy) {
            Some(px) => Color::Rgb(px[0], px[1], px[2]),
            None => Color::Black,
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
