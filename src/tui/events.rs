use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;
use anyhow::Result;
use crate::tui::app::App;

pub fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            match key.code {
                KeyCode::Esc => {
                    app.should_quit = true;
                },
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true;
                },
                KeyCode::Tab => {
                    app.next_tab();
                },
                KeyCode::BackTab => {
                    app.previous_tab();
                },
                KeyCode::Enter => {
                    app.submit_input();
                },
                KeyCode::Backspace => {
                    app.input.pop();
                },
                KeyCode::Char(c) => {
                    app.input.push(c);
                },
                _ => {}
            }
        }
    }
    Ok(())
}
