//! Interactive chat loop: draws the transcript and composer, forwards key
//! events, and pumps stream events into the controller between frames.

use crate::client::{AskClient, AskEvent, StreamFailure};
use crate::config::Config;
use crate::controller::ConversationController;
use crate::ui::composer::{Composer, ComposerResult};
use crate::ui::view::TranscriptView;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// The chat application: controller state plus the single open stream, if any.
pub struct App {
    controller: ConversationController,
    client: AskClient,
    composer: Composer,
    stream_rx: Option<mpsc::Receiver<AskEvent>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            controller: ConversationController::new(),
            client: AskClient::new(&config.api_base),
            composer: Composer::new(),
            stream_rx: None,
            should_quit: false,
        }
    }

    /// Run the TUI until the user quits. The transcript lives only for this
    /// session and is dropped on exit.
    pub async fn run(mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw terminal mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode().ok();
        execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        while !self.should_quit {
            self.pump_stream();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(50)).context("Failed to poll terminal events")? {
                if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Drain any buffered stream events without blocking the frame. On a
    /// terminal event the receiver is dropped, which closes the connection.
    fn pump_stream(&mut self) {
        let Some(mut rx) = self.stream_rx.take() else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(AskEvent::Fragment(fragment)) => self.controller.push_fragment(&fragment),
                Ok(AskEvent::End) => {
                    self.controller.complete();
                    return;
                }
                Ok(AskEvent::Failed(failure)) => {
                    self.controller.fail(failure);
                    return;
                }
                Err(mpsc::error::TryRecvError::Empty) => {
                    // Still streaming; keep the connection open.
                    self.stream_rx = Some(rx);
                    return;
                }
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // Transport task went away without a terminal event.
                    self.controller.fail(StreamFailure::Connect);
                    return;
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        if let ComposerResult::Submitted(text) = self.composer.handle_key(key) {
            let question = text.trim().to_string();
            if self.controller.submit(&question) {
                self.stream_rx = Some(self.client.ask(&question));
                self.composer.clear();
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(frame.size());

        let view = TranscriptView::new(self.controller.transcript(), self.controller.pending());
        frame.render_widget(view, chunks[0]);
        frame.render_widget(self.composer.view(self.controller.pending()), chunks[1]);
    }
}
