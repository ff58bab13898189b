//! Terminal renderer for the face overlay.
//!
//! Draws one rectangle per detected face on a canvas scaled to the video
//! frame, with a status label per face and a face-counter footer. The canvas
//! is cleared and redrawn from the current frame only; nothing persists
//! between frames.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::canvas::{Canvas, Rectangle},
    widgets::Paragraph,
};
use std::io::{stdout, Stdout};

use crate::capture::camera::FacingMode;
use crate::overlay::frame_loop::OverlayFrame;

/// User input command during the overlay demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCommand {
    /// Keep looping (no key pressed).
    Continue,
    /// Switch camera facing ('f').
    SwitchFacing,
    /// Exit the demo (Escape or 'q').
    Quit,
}

pub struct OverlayTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    frame_width: f64,
    frame_height: f64,
}

impl OverlayTui {
    pub fn new(frame_width: u32, frame_height: u32) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            frame_width: frame_width as f64,
            frame_height: frame_height as f64,
        })
    }

    /// Renders one overlay frame.
    pub fn render(&mut self, overlay: &OverlayFrame, facing: FacingMode) -> anyhow::Result<()> {
        let frame_width = self.frame_width;
        let frame_height = self.frame_height;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;

            let canvas_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            let canvas = Canvas::default()
                .x_bounds([0.0, frame_width])
                .y_bounds([0.0, frame_height])
                .paint(|ctx| {
                    for (i, face) in overlay.faces.iter().enumerate() {
                        let (r, g, b) = face.color();
                        let color = Color::Rgb(r, g, b);

                        let x = face.bbox.top_left[0] as f64;
                        let y = face.bbox.top_left[1] as f64;
                        let w = face.bbox.width() as f64;
                        let h = face.bbox.height() as f64;

                        // Canvas y grows upward; video coordinates grow down.
                        ctx.draw(&Rectangle {
                            x,
                            y: frame_height - y - h,
                            width: w,
                            height: h,
                            color,
                        });

                        let label_color = if face.close {
                            color
                        } else {
                            Color::Rgb(255, 255, 255)
                        };
                        let label_y = if y > 20.0 { y - 5.0 } else { y + 15.0 };
                        ctx.print(
                            x,
                            frame_height - label_y,
                            Line::from(Span::styled(
                                face.label(i),
                                Style::default().fg(label_color),
                            )),
                        );
                    }
                });

            frame.render_widget(canvas, canvas_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let footer = Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("faces: {}", overlay.face_count()),
                    Style::default().fg(Color::Rgb(0, 255, 204)),
                ),
                Span::raw(format!("  camera: {facing}  ")),
                Span::styled(
                    "[f] switch facing  [q] quit",
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
            .style(Style::default().bg(Color::Rgb(0, 0, 0)));

            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Polls for user input without blocking the frame cadence.
    pub fn handle_input(&mut self) -> anyhow::Result<OverlayCommand> {
        if event::poll(std::time::Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('f') => OverlayCommand::SwitchFacing,
                    KeyCode::Char('q') | KeyCode::Esc => OverlayCommand::Quit,
                    _ => OverlayCommand::Continue,
                });
            }
        }
        Ok(OverlayCommand::Continue)
    }

    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
