//! Terminal display for live transcription.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{stdout, Stdout};

/// User input command during transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeCommand {
    Continue,
    /// Stop recognition and print the final transcript (Enter, Escape, 'q').
    Stop,
}

pub struct TranscribeTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    started: std::time::Instant,
}

impl TranscribeTui {
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            started: std::time::Instant::now(),
        })
    }

    /// Redraws the transcript text. The whole paragraph is replaced each
    /// frame; interim text may visibly fluctuate.
    pub fn render(&mut self, transcript: &str, waiting: bool) -> anyhow::Result<()> {
        let elapsed = self.started.elapsed().as_secs();
        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;

            let text_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            let body = if transcript.is_empty() && waiting {
                Paragraph::new(Span::styled(
                    "Listening...",
                    Style::default().fg(Color::DarkGray),
                ))
            } else {
                Paragraph::new(transcript)
            }
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" transcript "));

            frame.render_widget(body, text_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let minutes = elapsed / 60;
            let secs = elapsed % 60;
            let footer = Paragraph::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Red)),
                Span::raw(format!("{minutes}:{secs:02}  ")),
                Span::styled("[Enter/q] stop", Style::default().fg(Color::DarkGray)),
            ]));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    pub fn handle_input(&mut self) -> anyhow::Result<TranscribeCommand> {
        if event::poll(std::time::Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => TranscribeCommand::Stop,
                    _ => TranscribeCommand::Continue,
                });
            }
        }
        Ok(TranscribeCommand::Continue)
    }

    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
