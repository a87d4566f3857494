// SPDX-License-Identifier: GPL-3.0-only

//! Terminal page
//!
//! Renders the scan and generate modes to the terminal. Camera frames and
//! generated codes are drawn with Unicode half-block characters for improved
//! vertical resolution.

use crate::app::{App, AppDependencies, NoticeKind, Region, ScanStatus, ViewMode};
use crate::backends::camera::types::CameraFrame;
use crate::config::Config;
use crate::constants::{TICK_INTERVAL, preview::QUIET_ZONE_MODULES};
use crate::pipelines::qr::{ModuleGrid, Rgb};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Instant;
use tracing::{debug, info};

/// Run the terminal page until the user quits
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let deps = AppDependencies::system(&config);
    let mut app = App::new(config, deps);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    app.open();
    let result = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();
        app.on_frame(now);

        terminal.draw(|f| {
            let app: &App = app;
            let area = f.area();
            if area.height < 3 {
                return;
            }

            let tabs_area = Rect {
                height: 1,
                ..area
            };
            let region_area = Rect {
                x: area.x,
                y: area.y + 1,
                width: area.width,
                height: area.height - 2,
            };
            let status_area = Rect {
                x: area.x,
                y: area.y + area.height - 1,
                width: area.width,
                height: 1,
            };

            f.render_widget(TabBar { mode: app.mode() }, tabs_area);
            match app.visible_region() {
                Region::Scanner => f.render_widget(ScanRegion { app, now }, region_area),
                Region::Generator => f.render_widget(GenerateRegion { app }, region_area),
            }

            let (message, style) = status_line(app);
            f.render_widget(
                StatusBar {
                    message: &message,
                    style,
                },
                status_area,
            );
        })?;

        // Handle input with timeout for frame updates
        if event::poll(TICK_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if handle_key(app, key) == KeyResult::Quit {
                info!("Quit requested");
                break;
            }
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum KeyResult {
    Continue,
    Quit,
}

fn handle_key(app: &mut App, key: KeyEvent) -> KeyResult {
    let now = Instant::now();
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
        return KeyResult::Quit;
    }
    app.dismiss_notice();

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => {
            let next = match app.mode() {
                ViewMode::Scanning => ViewMode::Generating,
                ViewMode::Generating => ViewMode::Scanning,
            };
            app.switch_to(next);
            return KeyResult::Continue;
        }
        KeyCode::F(1) => {
            app.switch_to(ViewMode::Scanning);
            return KeyResult::Continue;
        }
        KeyCode::F(2) => {
            app.switch_to(ViewMode::Generating);
            return KeyResult::Continue;
        }
        _ => {}
    }

    match app.mode() {
        ViewMode::Scanning => match key.code {
            KeyCode::Enter | KeyCode::Char('s') => app.toggle_scan(),
            KeyCode::Char('c') => {
                if let Err(e) = app.copy_result(now) {
                    debug!(error = %e, "Copy not performed");
                }
            }
            KeyCode::Char('q') => return KeyResult::Quit,
            _ => {}
        },
        ViewMode::Generating => match key.code {
            KeyCode::Char('s') if ctrl => {
                app.download();
            }
            KeyCode::Char('u') if ctrl => app.clear_input(now),
            KeyCode::Char(c) if !ctrl => app.type_char(c, now),
            KeyCode::Backspace => app.backspace(now),
            KeyCode::Enter => app.submit_input(),
            _ => {}
        },
    }
    KeyResult::Continue
}

fn status_line(app: &App) -> (String, Style) {
    if let Some(notice) = app.notice() {
        let bg = match notice.kind {
            NoticeKind::Info => Color::Blue,
            NoticeKind::Error => Color::Red,
        };
        return (
            notice.text.clone(),
            Style::default().fg(Color::White).bg(bg),
        );
    }

    let hints = match app.mode() {
        ViewMode::Scanning => {
            let toggle = if app.scanner().is_scanning() {
                "Enter stop"
            } else {
                "Enter start"
            };
            format!("{} | 'c' copy | Tab generate | q quit", toggle)
        }
        ViewMode::Generating => {
            let download = if app.generator().is_download_enabled() {
                " | Ctrl+S download"
            } else {
                ""
            };
            format!(
                "Type text | Enter generate{} | Ctrl+U clear | Tab scan | Esc quit",
                download
            )
        }
    };
    (hints, Style::default().fg(Color::White).bg(Color::DarkGray))
}

/// Mode selector shown on the first line
struct TabBar {
    mode: ViewMode,
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active = Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD);
        let inactive = Style::default().fg(Color::Gray);

        let (scan_style, generate_style) = match self.mode {
            ViewMode::Scanning => (active, inactive),
            ViewMode::Generating => (inactive, active),
        };

        let width = area.width as usize;
        let (x, _) = buf.set_stringn(area.x, area.y, " F1 Scan ", width, scan_style);
        if x + 1 < area.right() {
            let rest = (area.right() - x - 1) as usize;
            buf.set_stringn(x + 1, area.y, " F2 Generate ", rest, generate_style);
        }
    }
}

/// Scan region: preview, status and the result line
struct ScanRegion<'a> {
    app: &'a App,
    now: Instant,
}

impl Widget for ScanRegion<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            return;
        }
        let preview_area = Rect {
            height: area.height - 1,
            ..area
        };
        let result_y = area.y + area.height - 1;
        let scanner = self.app.scanner();

        match scanner.status() {
            ScanStatus::CameraUnavailable(message) => {
                centered_message(preview_area, buf, &format!("Camera unavailable: {}", message));
            }
            _ => {
                let frame_widget = FrameWidget {
                    frame: self.app.preview().current_frame(),
                    placeholder: if scanner.is_scanning() {
                        "Waiting for camera..."
                    } else {
                        "Press Enter to start the camera"
                    },
                };
                frame_widget.render(preview_area, buf);
            }
        }

        if let Some(result) = self.app.scan_result() {
            let label = if self.app.is_copy_confirming(self.now) {
                "Copied! "
            } else {
                "Result: "
            };
            let label_style = Style::default().fg(Color::Green);
            let (x, _) = buf.set_stringn(area.x, result_y, label, area.width as usize, label_style);
            let width = (area.x + area.width).saturating_sub(x) as usize;
            let payload: String = result.payload.chars().take(width).collect();
            buf.set_string(x, result_y, payload, Style::default());
        }
    }
}

/// Generate region: input line and the generated code
struct GenerateRegion<'a> {
    app: &'a App,
}

impl Widget for GenerateRegion<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            return;
        }

        let label_style = Style::default().fg(Color::Cyan);
        let (x, _) = buf.set_stringn(area.x, area.y, "Text: ", area.width as usize, label_style);
        let width = (area.x + area.width).saturating_sub(x + 1) as usize;
        let input = self.app.input();
        // Keep the end of long input visible
        let skip = input.chars().count().saturating_sub(width);
        let visible: String = input.chars().skip(skip).collect();
        let (x, _) = buf.set_stringn(x, area.y, visible, width, Style::default());
        buf.set_string(x, area.y, "_", Style::default().add_modifier(Modifier::SLOW_BLINK));

        let code_area = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };
        let config = self.app.config();
        match self.app.generator().modules() {
            Some(modules) => CodeWidget {
                modules,
                dark: Rgb::from_hex(&config.dark_color).unwrap_or(Rgb::BLACK),
                light: Rgb::from_hex(&config.light_color).unwrap_or(Rgb::WHITE),
            }
            .render(code_area, buf),
            None => centered_message(code_area, buf, "Type some text to generate a QR code"),
        }
    }
}

fn centered_message(area: Rect, buf: &mut Buffer, msg: &str) {
    let len = msg.chars().count() as u16;
    let x = area.x + (area.width.saturating_sub(len)) / 2;
    let y = area.y + area.height / 2;
    if y < area.y + area.height && x < area.x + area.width {
        let visible: String = msg.chars().take(area.width as usize).collect();
        buf.set_string(x, y, visible, Style::default());
    }
}

/// Live camera preview, two pixel rows per cell
struct FrameWidget {
    frame: Option<CameraFrame>,
    placeholder: &'static str,
}

/// Largest rect with the frame's aspect ratio inside `area`, in cells
///
/// Heights are counted in half cells, since each cell shows two pixel rows.
fn fit_preview(frame_w: u32, frame_h: u32, area: Rect) -> Rect {
    let cols = area.width as u64;
    let half_rows = area.height as u64 * 2;
    let (fw, fh) = (frame_w as u64, frame_h as u64);

    let (width, half_height) = if fw * half_rows > cols * fh {
        (cols, cols * fh / fw)
    } else {
        (half_rows * fw / fh, half_rows)
    };
    let (width, height) = (width as u16, (half_height / 2) as u16);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            centered_message(area, buf, self.placeholder);
            return;
        };
        if area.is_empty() || frame.width == 0 || frame.height == 0 {
            return;
        }

        let view = fit_preview(frame.width, frame.height, area);
        if view.is_empty() {
            return;
        }

        let half_rows = view.height as u32 * 2;
        for row in 0..view.height {
            let top = row as u32 * 2 * frame.height / half_rows;
            let bottom = (row as u32 * 2 + 1) * frame.height / half_rows;
            for col in 0..view.width {
                let x = col as u32 * frame.width / view.width as u32;
                if let Some(cell) = buf.cell_mut((view.x + col, view.y + row)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, x, top));
                    cell.set_bg(sample_pixel(frame, x, bottom));
                }
            }
        }
    }
}

fn sample_pixel(frame: &CameraFrame, x: u32, y: u32) -> Color {
    let x = x.min(frame.width - 1);
    let y = y.min(frame.height - 1);
    let idx = y as usize * frame.stride as usize + x as usize * 4;
    match frame.data.get(idx..idx + 3) {
        Some(px) => Color::Rgb(px[0], px[1], px[2]),
        None => Color::Black,
    }
}

/// Widget that renders a QR module matrix, one module per half cell
struct CodeWidget<'a> {
    modules: &'a ModuleGrid,
    dark: Rgb,
    light: Rgb,
}

impl Widget for CodeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let quiet = QUIET_ZONE_MODULES as isize;
        let side = self.modules.width() as isize + 2 * quiet;
        let cols = side as u16;
        let rows = ((side + 1) / 2) as u16;

        if cols > area.width || rows > area.height {
            centered_message(area, buf, "Enlarge the terminal to show the QR code");
            return;
        }

        let x_offset = area.x + (area.width - cols) / 2;
        let y_offset = area.y + (area.height - rows) / 2;
        let color = |dark: bool| {
            let Rgb(r, g, b) = if dark { self.dark } else { self.light };
            Color::Rgb(r, g, b)
        };

        for ty in 0..rows {
            for tx in 0..cols {
                let mx = tx as isize - quiet;
                let my_top = ty as isize * 2 - quiet;
                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(color(self.modules.is_dark(mx, my_top)));
                    cell.set_bg(color(self.modules.is_dark(mx, my_top + 1)));
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
    style: Style,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_style(self.style);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, self.style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::RqrrDecoder;
    use crate::backends::camera::StillImageBackend;
    use crate::backends::clipboard::SystemClipboard;
    use crate::backends::haptics::NoHaptics;
    use crate::pipelines::qr::{QrEncoder, QrcodeEncoder, RenderOptions};
    use crate::storage::DirectorySaver;

    fn app_showing(image: image::RgbaImage) -> App {
        let deps = AppDependencies {
            camera: Box::new(StillImageBackend::from_image(image)),
            decoder: Box::new(RqrrDecoder::new()),
            encoder: Box::new(QrcodeEncoder),
            clipboard: Box::new(SystemClipboard::new()),
            saver: Box::new(DirectorySaver::new(std::env::temp_dir())),
            haptics: Box::new(NoHaptics),
        };
        App::new(Config::default(), deps)
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_tab_bar_highlights_active_mode() {
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        TabBar {
            mode: ViewMode::Generating,
        }
        .render(area, &mut buf);

        assert!(row(&buf, 0).starts_with(" F1 Scan   F2 Generate "));
        assert_eq!(buf[(0, 0)].fg, Color::Gray);
        assert_eq!(buf[(10, 0)].bg, Color::White);
    }

    #[test]
    fn test_tab_bar_in_narrow_area() {
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);
        TabBar {
            mode: ViewMode::Scanning,
        }
        .render(area, &mut buf);
        assert_eq!(row(&buf, 0), " F1 Sc");
    }

    #[test]
    fn test_generate_region_shows_input_and_code() {
        let mut app = app_showing(image::RgbaImage::new(1, 1));
        app.switch_to(ViewMode::Generating);
        app.set_input("abc", Instant::now());
        app.submit_input();

        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        GenerateRegion { app: &app }.render(area, &mut buf);

        assert!(row(&buf, 0).starts_with("Text: abc_"));
        assert!((1..20).any(|y| row(&buf, y).contains('▀')));
    }

    #[test]
    fn test_scan_region_shows_result_line() {
        let code = QrcodeEncoder.create("HELLO", &RenderOptions::default()).unwrap();
        let mut app = app_showing(code.image().clone());
        app.open();
        let now = Instant::now();
        app.on_frame(now);
        assert!(app.scan_result().is_some());

        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        ScanRegion { app: &app, now }.render(area, &mut buf);

        assert!(row(&buf, 11).starts_with("Result: HELLO"));
    }

    #[test]
    fn test_code_widget_draws_quiet_zone_and_finder() {
        let code = QrcodeEncoder.create("HI", &RenderOptions::default()).unwrap();
        let modules = code.modules();
        // Version 1 is 21 modules, plus 4 quiet modules each side
        assert_eq!(modules.width(), 21);

        let area = Rect::new(0, 0, 29, 15);
        let mut buf = Buffer::empty(area);
        CodeWidget {
            modules,
            dark: Rgb::BLACK,
            light: Rgb::WHITE,
        }
        .render(area, &mut buf);

        let corner = &buf[(0, 0)];
        assert_eq!(corner.fg, Color::Rgb(255, 255, 255));
        // Cell (4, 2) covers module rows 0 and 1 of column 0: finder pattern
        let finder = &buf[(4, 2)];
        assert_eq!(finder.fg, Color::Rgb(0, 0, 0));
        assert_eq!(finder.bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_code_widget_too_small() {
        let code = QrcodeEncoder.create("HI", &RenderOptions::default()).unwrap();
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        CodeWidget {
            modules: code.modules(),
            dark: Rgb::BLACK,
            light: Rgb::WHITE,
        }
        .render(area, &mut buf);
        assert_ne!(buf[(0, 0)].symbol(), "▀");
    }

    #[test]
    fn test_fit_preview_keeps_aspect() {
        // 4:3 frame in a wide area is limited by height
        let view = fit_preview(640, 480, Rect::new(0, 0, 100, 20));
        assert_eq!((view.width, view.height), (53, 20));
        assert_eq!(view.x, 23);

        // and in a tall area by width
        let view = fit_preview(640, 480, Rect::new(0, 0, 40, 50));
        assert_eq!((view.width, view.height), (40, 15));
        assert_eq!(view.y, 17);
    }

    #[test]
    fn test_frame_widget_samples_pixels() {
        let pixels = vec![
            255, 0, 0, 255, 255, 0, 0, 255, // red row
            0, 0, 255, 255, 0, 0, 255, 255, // blue row
        ];
        let frame = CameraFrame::from_rgba(2, 2, pixels, 0);
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        FrameWidget {
            frame: Some(frame),
            placeholder: "",
        }
        .render(area, &mut buf);

        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(0, 0, 255));
    }
}
