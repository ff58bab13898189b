//! Terminal user interface for recording with the frequency-bar visualizer.
//!
//! Renders the fixed bar set once per frame from the latest samples,
//! along with recording duration, gain, and pause state.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Bar as ChartBar, BarChart, BarGroup, Paragraph},
};
use std::io::{stdout, Stdout};

use crate::recording::visualizer::{hue_to_rgb, Bar};

/// User input command during recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCommand {
    /// Continue recording (no key pressed).
    Continue,
    /// Stop and export (Enter).
    Save,
    /// Exit without exporting (Escape or 'q').
    Cancel,
    /// Pause/resume recording (Space).
    TogglePause,
    /// Raise the gain control ('+' or '=').
    GainUp,
    /// Lower the gain control ('-').
    GainDown,
}

pub struct RecordTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    recording_start: std::time::Instant,
}

impl RecordTui {
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            recording_start: std::time::Instant::now(),
        })
    }

    /// Draws this frame's bars and the status footer.
    pub fn render(&mut self, bars: &[Bar], gain: f32, paused: bool) -> anyhow::Result<()> {
        let elapsed = self.recording_start.elapsed().as_secs();

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;

            let chart_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            // Spread the fixed bar set across the terminal width.
            let bar_count = bars.len().max(1) as u16;
            let gap = 1_u16;
            let bar_width = (chart_area.width.saturating_sub(bar_count * gap) / bar_count).max(1);

            let chart_bars: Vec<ChartBar> = bars
                .iter()
                .map(|bar| {
                    let (r, g, b) = hue_to_rgb(bar.hue);
                    ChartBar::default()
                        .value(bar.height as u64)
                        .style(Style::default().fg(Color::Rgb(r, g, b)))
                        .text_value(String::new())
                })
                .collect();

            let chart = BarChart::default()
                .bar_width(bar_width)
                .bar_gap(gap)
                .max(100)
                .data(BarGroup::default().bars(&chart_bars));

            frame.render_widget(chart, chart_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let indicator = if paused {
                Span::styled("⏸ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("● ", Style::default().fg(Color::Red))
            };

            let minutes = elapsed / 60;
            let secs = elapsed % 60;
            let footer = Paragraph::new(Line::from(vec![
                indicator,
                Span::raw(format!("{minutes}:{secs:02}  gain {gain:.1}x  ")),
                Span::styled(
                    "[Enter] save  [Space] pause  [+/-] gain  [q] cancel",
                    Style::default().fg(Color::DarkGray),
                ),
            ]));

            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Polls for user input without blocking the frame cadence.
    pub fn handle_input(&mut self) -> anyhow::Result<RecordingCommand> {
        if event::poll(std::time::Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter => RecordingCommand::Save,
                    KeyCode::Esc | KeyCode::Char('q') => RecordingCommand::Cancel,
                    KeyCode::Char(' ') => RecordingCommand::TogglePause,
                    KeyCode::Char('+') | KeyCode::Char('=') => RecordingCommand::GainUp,
                    KeyCode::Char('-') => RecordingCommand::GainDown,
                    _ => RecordingCommand::Continue,
                });
            }
        }
        Ok(RecordingCommand::Continue)
    }

    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
