use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

use crate::domain::{Message, RosterConfig, RosterError};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &RosterConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, RosterError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.dispatch(key, model.raw_keyevents()));
        }
        Ok(None)
    }

    /// While text input is active every key goes to the input line, except
    /// ctrl-c which always quits.
    fn dispatch(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        if raw && !is_interrupt(&key) {
            return Some(Message::RawKey(key));
        }
        self.handle_key(key)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Enter, _) => Some(Message::Enter),
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => Some(Message::SwitchScreen),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Some(Message::MoveLeft),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) | (KeyCode::Char(' '), _) => {
                Some(Message::MoveRight)
            }
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Char(c @ '1'..='9'), _) => c.to_digit(10).map(|d| Message::Number(d as u8)),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('t'), _) => Some(Message::NextTab),
            (KeyCode::Char('T'), _) => Some(Message::PreviousTab),
            (KeyCode::Char('f'), _) => Some(Message::ToggleFilters),
            (KeyCode::Char('F'), _) => Some(Message::ToggleFullscreen),
            (KeyCode::Char('s'), _) => Some(Message::CycleStatusFilter),
            (KeyCode::Char('c'), _) => Some(Message::CycleSectionFilter),
            (KeyCode::Char('r'), _) => Some(Message::ResetFilters),
            (KeyCode::Char('p'), _) => Some(Message::CyclePageSize),
            (KeyCode::Char('e'), _) => Some(Message::Edit),
            (KeyCode::Char('a'), _) => Some(Message::Add),
            (KeyCode::Char('d'), _) => Some(Message::Delete),
            (KeyCode::Char('y'), _) => Some(Message::CopyRow),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

fn is_interrupt(key: &event::KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
