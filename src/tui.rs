//! Terminal front end
//!
//! Maps key and mouse input to session actions and redraws after every
//! event. The session is only touched from this loop.

mod markdown;
mod terminal;
mod ui;

pub use terminal::{init, install_panic_hook, restore, Tui};

use crate::llm::ChatService;
use crate::preferences::DisplayPreferences;
use crate::runtime::{ChatSession, SubmitOutcome};
use crate::state_machine::{Event, SubmitTrigger, TransitionError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Position, Frame};
use std::io;
use terminal::{EventHandler, TerminalEvent};
use ui::{HitAreas, View};

const BUSY_NOTICE: &str = "Waiting for the previous reply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Submit(SubmitTrigger),
    ToggleTheme,
    Quit,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

fn action_for_key(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('s') if ctrl => Action::Submit(SubmitTrigger::SendButton),
        KeyCode::Char('d') if ctrl => Action::ToggleTheme,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Enter => Action::Submit(SubmitTrigger::Enter),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        _ => return None,
    };
    Some(action)
}

pub struct App<S>
where
    S: ChatService + 'static,
{
    session: ChatSession<S>,
    preferences: DisplayPreferences,
    /// Transient status line; cleared by the next submit
    notice: Option<String>,
    hit_areas: HitAreas,
    should_quit: bool,
}

impl<S> App<S>
where
    S: ChatService + 'static,
{
    pub fn new(session: ChatSession<S>, preferences: DisplayPreferences) -> Self {
        Self {
            session,
            preferences,
            notice: None,
            hit_areas: HitAreas::default(),
            should_quit: false,
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let view = View {
            transcript: self.session.transcript(),
            input: self.session.input(),
            dark_mode: self.preferences.dark_mode(),
            pending: self.session.in_flight(),
            notice: self.notice.as_deref(),
        };
        self.hit_areas = ui::render(frame, &view);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Submit(trigger) => self.submit(trigger),
            Action::ToggleTheme => {
                let dark_mode = self.preferences.toggle_dark_mode();
                tracing::debug!(dark_mode, "Theme toggled");
            }
            Action::Quit => self.should_quit = true,
            Action::Insert(c) => self.session.input_mut().insert(c),
            Action::Backspace => self.session.input_mut().backspace(),
            Action::Delete => self.session.input_mut().delete(),
            Action::Left => self.session.input_mut().move_left(),
            Action::Right => self.session.input_mut().move_right(),
            Action::Home => self.session.input_mut().move_home(),
            Action::End => self.session.input_mut().move_end(),
        }
    }

    fn submit(&mut self, trigger: SubmitTrigger) {
        match self.session.submit(trigger) {
            Ok(SubmitOutcome::Dispatched(_)) => self.notice = None,
            Ok(SubmitOutcome::Ignored) => {}
            Err(TransitionError::Busy) => self.notice = Some(BUSY_NOTICE.to_string()),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(action) = action_for_key(key) {
            self.apply(action);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let at = Position::new(mouse.column, mouse.row);
        if self.hit_areas.send_button.contains(at) {
            self.apply(Action::Submit(SubmitTrigger::SendButton));
        } else if self.hit_areas.theme_toggle.contains(at) {
            self.apply(Action::ToggleTheme);
        }
    }

    fn handle_terminal_event(&mut self, event: TerminalEvent) {
        match event {
            TerminalEvent::Key(key) => self.handle_key(key),
            TerminalEvent::Mouse(mouse) => self.handle_mouse(mouse),
            // Next draw picks up the new size
            TerminalEvent::Resize => {}
        }
    }

    fn handle_session_event(&mut self, event: Event) {
        // Already logged by the session
        if let Err(e) = self.session.handle_event(event) {
            self.notice = Some(e.to_string());
        }
    }
}

enum Step {
    Terminal(Option<TerminalEvent>),
    Session(Event),
}

/// Run the UI until the user quits, then tear the session down
pub async fn run<S>(terminal: &mut Tui, app: &mut App<S>) -> io::Result<()>
where
    S: ChatService + 'static,
{
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| app.draw(frame))?;

        let step = tokio::select! {
            event = events.next() => Step::Terminal(event),
            Some(event) = app.session.next_event() => Step::Session(event),
        };

        match step {
            Step::Terminal(Some(event)) => app.handle_terminal_event(event),
            Step::Terminal(None) => {
                tracing::warn!("Terminal input closed, quitting");
                app.should_quit = true;
            }
            Step::Session(event) => app.handle_session_event(event),
        }
    }

    tracing::debug!(
        session_id = app.session.session_id(),
        state = app.session.state().name(),
        "UI loop finished"
    );
    app.session.close();
    Ok(())
}
