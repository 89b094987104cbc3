//! Keyboard polling and key → command bindings.
//!
//! `InputState::drain_events()` reads everything crossterm has queued
//! without blocking. Only press/repeat events count, so a held arrow key
//! keeps panning while a tap fires a toggle once.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::state::{Command, Reseed};

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_REGENERATE: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_RECENTER: &[KeyCode] = &[KeyCode::Home, KeyCode::Char('c'), KeyCode::Char('C')];

/// Knobs the bindings need from the application config.
#[derive(Clone, Copy, Debug)]
pub struct Bindings {
    pub regenerate: Reseed,
    pub move_speed: i32,
    pub fast_move_speed: i32,
}

impl Bindings {
    /// Command for one key event, if it is bound.
    pub fn command_for(&self, key: &KeyEvent) -> Option<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl {
            return match key.code {
                KeyCode::Char('q' | 'Q' | 'c' | 'C') => Some(Command::Quit),
                _ => None,
            };
        }

        // Uppercase letters arrive with SHIFT on some terminals and without on others.
        let fast = key.modifiers.contains(KeyModifiers::SHIFT)
            || matches!(key.code, KeyCode::Char(c) if c.is_ascii_uppercase());
        let step = if fast { self.fast_move_speed } else { self.move_speed };

        let code = key.code;
        let cmd = match code {
            KeyCode::Esc => Command::Quit,
            KeyCode::F(1) => Command::ToggleDebug,
            KeyCode::F(2) => Command::ToggleCoordinates,
            KeyCode::F(3) => Command::ToggleSeamless,
            KeyCode::F(4) => Command::ToggleFps,
            _ if KEYS_REGENERATE.contains(&code) => Command::Regenerate(self.regenerate),
            _ if KEYS_RECENTER.contains(&code) => Command::Recenter,
            _ if KEYS_LEFT.contains(&code) => Command::Pan { dx: -step, dy: 0 },
            _ if KEYS_RIGHT.contains(&code) => Command::Pan { dx: step, dy: 0 },
            _ if KEYS_UP.contains(&code) => Command::Pan { dx: 0, dy: -step },
            _ if KEYS_DOWN.contains(&code) => Command::Pan { dx: 0, dy: step },
            _ => return None,
        };
        Some(cmd)
    }

    /// Bottom-panel help text.
    pub fn help_lines(&self, reload_status: &str) -> Vec<String> {
        vec![
            "Ctrl+Q/Esc: Quit | R: Regenerate world | Arrows/WASD: Pan (Shift: fast) | C: Recenter"
                .to_string(),
            "F1: Debug | F2: Coordinates | F3: Seamless blocks | F4: FPS".to_string(),
            reload_status.to_string(),
        ]
    }
}

pub struct InputState {
    /// Key events collected during the most recent `drain_events()`.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.raw_events.push(key);
                }
                // resizes are picked up from terminal::size() each frame
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Failed to read terminal event: {e}");
                    break;
                }
            }
        }
    }

    /// Commands for this frame's key presses, in arrival order.
    pub fn commands(&self, bindings: &Bindings) -> Vec<Command> {
        self.raw_events
            .iter()
            .filter_map(|k| bindings.command_for(k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Bindings {
        Bindings { regenerate: Reseed::Advance, move_speed: 1, fast_move_speed: 5 }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn quit_keys() {
        let b = bindings();
        assert_eq!(b.command_for(&key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(b.command_for(&with(KeyCode::Char('q'), KeyModifiers::CONTROL)), Some(Command::Quit));
        assert_eq!(b.command_for(&with(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Command::Quit));
        assert_eq!(b.command_for(&key(KeyCode::Char('q'))), None);
    }

    #[test]
    fn function_keys_toggle() {
        let b = bindings();
        assert_eq!(b.command_for(&key(KeyCode::F(1))), Some(Command::ToggleDebug));
        assert_eq!(b.command_for(&key(KeyCode::F(2))), Some(Command::ToggleCoordinates));
        assert_eq!(b.command_for(&key(KeyCode::F(3))), Some(Command::ToggleSeamless));
        assert_eq!(b.command_for(&key(KeyCode::F(4))), Some(Command::ToggleFps));
    }

    #[test]
    fn regenerate_uses_configured_seed_policy() {
        let b = Bindings { regenerate: Reseed::Keep, ..bindings() };
        assert_eq!(b.command_for(&key(KeyCode::Char('r'))), Some(Command::Regenerate(Reseed::Keep)));
    }

    #[test]
    fn shift_pans_faster() {
        let b = bindings();
        assert_eq!(b.command_for(&key(KeyCode::Left)), Some(Command::Pan { dx: -1, dy: 0 }));
        assert_eq!(
            b.command_for(&with(KeyCode::Down, KeyModifiers::SHIFT)),
            Some(Command::Pan { dx: 0, dy: 5 })
        );
        assert_eq!(b.command_for(&key(KeyCode::Char('W'))), Some(Command::Pan { dx: 0, dy: -5 }));
    }

    #[test]
    fn help_has_three_lines() {
        let lines = bindings().help_lines("Tiles: tiles.toml");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Tiles: tiles.toml");
    }

    #[test]
    fn commands_preserve_order_and_skip_unbound() {
        let mut input = InputState::new();
        input.raw_events = vec![key(KeyCode::F(1)), key(KeyCode::Char('z')), key(KeyCode::Esc)];
        assert_eq!(input.commands(&bindings()), vec![Command::ToggleDebug, Command::Quit]);
    }
}
