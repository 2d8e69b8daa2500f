//! Keyboard-driven command loop

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::terminal::{self, Clear, ClearType};
use ffbsim_session::DeviceSession;
use tracing::{debug, info, warn};

use crate::error::CliError;
use crate::output;

const INPUT_POLL: Duration = Duration::from_millis(50);
const STATUS_REFRESH: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePlay,
    Next,
    Previous,
    StopAll,
    /// Signed number of intensity steps
    Intensity(i8),
    Duration(i8),
    Direction(i8),
    ToggleHelp,
    Escape,
    Quit,
}

pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char(' ') => Action::TogglePlay,
        KeyCode::Char('n' | 'N') => Action::Next,
        KeyCode::Char('p' | 'P') => Action::Previous,
        KeyCode::Char('s' | 'S') => Action::StopAll,
        KeyCode::Char('+' | '=') => Action::Intensity(1),
        KeyCode::Char('-' | '_') => Action::Intensity(-1),
        KeyCode::Char(']') => Action::Duration(1),
        KeyCode::Char('[') => Action::Duration(-1),
        KeyCode::Char('.') => Action::Direction(1),
        KeyCode::Char(',') => Action::Direction(-1),
        KeyCode::Char('h' | 'H') => Action::ToggleHelp,
        KeyCode::Esc => Action::Escape,
        KeyCode::Char('q' | 'Q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Operator state around one session
pub struct App<'a> {
    session: &'a DeviceSession,
    showing_help: bool,
    quit: bool,
    message: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(session: &'a DeviceSession) -> Self {
        Self {
            session,
            showing_help: false,
            quit: false,
            message: None,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn showing_help(&self) -> bool {
        self.showing_help
    }

    /// Result of the last command, shown under the status screen.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn on_action(&mut self, action: Action) {
        debug!(?action, help = self.showing_help, "Key action");
        match action {
            Action::Quit => self.quit = true,
            Action::ToggleHelp => self.showing_help = !self.showing_help,
            Action::Escape if self.showing_help => self.showing_help = false,
            Action::Escape => self.quit = true,
            // Effect commands are ignored while help is shown
            _ if self.showing_help => {}
            command => self.run_command(command),
        }
    }

    fn run_command(&mut self, action: Action) {
        let session = self.session;
        let config = session.config();
        self.message = match action {
            Action::TogglePlay => match session.toggle_selected() {
                Ok(true) => session.snapshot().current_effect.map(|name| format!("Playing {name}")),
                Ok(false) => Some("Stopped".to_string()),
                Err(e) => Some(format!("Error: {e}")),
            },
            Action::Next => session.select_next().map(|name| format!("Selected {name}")),
            Action::Previous => session.select_previous().map(|name| format!("Selected {name}")),
            Action::StopAll => {
                session.stop_all();
                Some("All effects stopped".to_string())
            }
            Action::Intensity(steps) => {
                let value = session.adjust_intensity(f32::from(steps) * config.intensity_step);
                Some(format!("Intensity {:.0}%", value * 100.0))
            }
            Action::Duration(steps) => {
                let step = i32::try_from(config.duration_step_ms).unwrap_or(i32::MAX);
                let duration = session.adjust_duration(step.saturating_mul(i32::from(steps)));
                Some(format!("Duration {duration}"))
            }
            Action::Direction(steps) => {
                session.adjust_direction(f32::from(steps) * config.direction_step);
                Some(format!("Direction {}", session.snapshot().direction_display()))
            }
            Action::ToggleHelp | Action::Escape | Action::Quit => None,
        };
    }

    /// Current screen, uncolored.
    pub fn screen(&self) -> Vec<String> {
        let info = self.session.info();
        if self.showing_help {
            return output::help_lines(&info.path);
        }
        let mut lines = output::status_lines(
            info,
            &self.session.snapshot(),
            &self.session.list_effect_names(),
        );
        if let Some(message) = &self.message {
            lines.push(message.clone());
        }
        lines
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in self.screen() {
            // Raw mode does not translate \n
            write!(out, "{}\r\n", output::styled(&line))?;
        }
        out.flush()
    }
}

/// Restores cooked mode when dropped.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!(error = %e, "Failed to restore terminal mode");
        }
    }
}

/// Reads keys until the operator quits, then stops all effects.
pub fn run(session: &DeviceSession) -> Result<(), CliError> {
    let raw = RawMode::enable().map_err(CliError::Terminal)?;
    let mut out = io::stdout();
    let mut app = App::new(session);
    app.draw(&mut out).map_err(CliError::Terminal)?;
    let mut last_draw = Instant::now();

    info!("Command loop started");
    while !app.should_quit() {
        if event::poll(INPUT_POLL).map_err(CliError::Terminal)? {
            let key = match event::read().map_err(CliError::Terminal)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };
            if let Some(action) = action_for(&key) {
                app.on_action(action);
                app.draw(&mut out).map_err(CliError::Terminal)?;
                last_draw = Instant::now();
            }
        } else if !app.showing_help() && last_draw.elapsed() >= STATUS_REFRESH {
            // Wheel inputs change without key presses
            app.draw(&mut out).map_err(CliError::Terminal)?;
            last_draw = Instant::now();
        }
    }
    drop(raw);
    info!("Command loop finished");

    session.stop_all();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffbsim_session::{DeviceLocator, SessionConfig, VirtualWheelControl};
    use ffbsim_test_helpers::prelude::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn session(wheel: &VirtualWheelControl) -> Result<DeviceSession, Box<dyn std::error::Error>> {
        let config = SessionConfig {
            poll_interval_ms: 50,
            ..SessionConfig::default()
        };
        let (session, _) =
            DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), config)?;
        Ok(session)
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for(&key(' ')), Some(Action::TogglePlay));
        assert_eq!(action_for(&key('N')), Some(Action::Next));
        assert_eq!(action_for(&key('=')), Some(Action::Intensity(1)));
        assert_eq!(action_for(&key('_')), Some(Action::Intensity(-1)));
        assert_eq!(action_for(&key('[')), Some(Action::Duration(-1)));
        assert_eq!(action_for(&key('.')), Some(Action::Direction(1)));
        assert_eq!(action_for(&key('x')), None);
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Action::Escape)
        );
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn space_toggles_selected_effect() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let session = session(&wheel)?;
        let mut app = App::new(&session);

        app.on_action(Action::TogglePlay);
        let playing = must_some(session.playing_handle(), "an effect plays");
        assert!(wheel.is_playing(playing));
        assert!(app.message().is_some_and(|m| m.starts_with("Playing ")));

        app.on_action(Action::TogglePlay);
        assert_eq!(session.playing_handle(), None);
        assert_eq!(app.message(), Some("Stopped"));
        Ok(())
    }

    #[test]
    fn help_swallows_effect_commands() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let session = session(&wheel)?;
        let mut app = App::new(&session);

        app.on_action(Action::ToggleHelp);
        assert!(app.showing_help());
        app.on_action(Action::TogglePlay);
        app.on_action(Action::Next);
        assert_eq!(session.playing_handle(), None);
        assert_eq!(session.snapshot().current_index, Some(0));
        assert!(app.screen().iter().any(|l| l.contains("HELP")));

        app.on_action(Action::Escape);
        assert!(!app.showing_help());
        assert!(!app.should_quit());

        app.on_action(Action::Escape);
        assert!(app.should_quit());
        Ok(())
    }

    #[test]
    fn adjustment_keys_use_configured_steps() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let session = session(&wheel)?;
        let mut app = App::new(&session);

        app.on_action(Action::Intensity(1));
        assert_eq!(app.message(), Some("Intensity 55%"));
        app.on_action(Action::Duration(1));
        assert_eq!(app.message(), Some("Duration 2500 ms"));
        app.on_action(Action::Direction(-1));
        assert!(app.message().is_some_and(|m| m.starts_with("Direction Left")));

        app.on_action(Action::Next);
        assert!(app.screen().iter().any(|l| l.starts_with("Current effect: [2/14]")));
        Ok(())
    }

    #[test]
    fn quit_works_in_help() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let session = session(&wheel)?;
        let mut app = App::new(&session);
        app.on_action(Action::ToggleHelp);
        app.on_action(Action::Quit);
        assert!(app.should_quit());
        Ok(())
    }
}
