//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Configuration for all keybindings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_tab: Vec<String>,
    pub prev_tab: Vec<String>,
    pub toggle_favorite: Vec<String>,
    pub delete_story: Vec<String>,
    pub new_story: Vec<String>,
    pub open_in_browser: Vec<String>,
    pub refresh: Vec<String>,
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: vec!["q".to_string(), "Ctrl+c".to_string()],
            move_up: vec!["k".to_string(), "Up".to_string()],
            move_down: vec!["j".to_string(), "Down".to_string()],
            next_tab: vec!["Tab".to_string()],
            prev_tab: vec!["BackTab".to_string(), "Shift+Tab".to_string()],
            toggle_favorite: vec!["s".to_string(), "f".to_string()],
            delete_story: vec!["d".to_string(), "Delete".to_string()],
            new_story: vec!["n".to_string()],
            open_in_browser: vec!["o".to_string()],
            refresh: vec!["R".to_string()],
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table = [
            (&self.quit, Action::Quit),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.next_tab, Action::NextTab),
            (&self.prev_tab, Action::PrevTab),
            (&self.toggle_favorite, Action::ToggleFavorite),
            (&self.delete_story, Action::DeleteStory),
            (&self.new_story, Action::NewStory),
            (&self.open_in_browser, Action::OpenInBrowser),
            (&self.refresh, Action::Refresh),
        ];

        table
            .into_iter()
            .find(|(bindings, _)| self.matches_key(key, bindings))
            .map(|(_, action)| action)
            .unwrap_or(Action::None)
    }

    fn matches_key(&self, key: &KeyEvent, bindings: &[String]) -> bool {
        bindings
            .iter()
            .filter_map(|binding| parse_key_string(binding).ok())
            .any(|parsed| parsed.matches(key))
    }
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Check if this binding matches a key event.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse a binding such as `"j"`, `"PageDown"`, `"F5"` or `"Ctrl+Shift+a"`.
///
/// The last `+`-separated part is the key, everything before it a modifier.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let mut parts: Vec<&str> = s.trim().split('+').collect();
    let key_part = parts.pop().unwrap_or_default();

    let mut modifiers = KeyModifiers::NONE;
    for part in parts {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        _ => return Err(format!("Unknown key: {}", s)),
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_plain_and_named_keys() {
        assert_eq!(parse_key_string("s").unwrap().code, KeyCode::Char('s'));
        assert_eq!(parse_key_string("R").unwrap().code, KeyCode::Char('R'));
        assert_eq!(parse_key_string("Delete").unwrap().code, KeyCode::Delete);
        assert_eq!(parse_key_string("backtab").unwrap().code, KeyCode::BackTab);
        assert_eq!(parse_key_string("F5").unwrap().code, KeyCode::F(5));
        assert_eq!(
            parse_key_string("Space").unwrap().modifiers,
            KeyModifiers::NONE
        );
    }

    #[test]
    fn test_parse_modifiers() {
        let binding = parse_key_string("Ctrl+Shift+a").unwrap();
        assert_eq!(binding.code, KeyCode::Char('a'));
        assert_eq!(
            binding.modifiers,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_key_string("Hyper+x").is_err());
        assert!(parse_key_string("Star").is_err());
        assert!(parse_key_string("F13").is_err());
    }

    #[test]
    fn test_binding_requires_modifiers() {
        let binding = parse_key_string("Ctrl+c").unwrap();
        assert!(binding.matches(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_default_bindings_map_story_actions() {
        let config = KeybindingConfig::default();
        let cases = [
            (press(KeyCode::Char('q'), KeyModifiers::NONE), Action::Quit),
            (press(KeyCode::Char('s'), KeyModifiers::NONE), Action::ToggleFavorite),
            (press(KeyCode::Char('f'), KeyModifiers::NONE), Action::ToggleFavorite),
            (press(KeyCode::Delete, KeyModifiers::NONE), Action::DeleteStory),
            (press(KeyCode::Char('n'), KeyModifiers::NONE), Action::NewStory),
            (press(KeyCode::BackTab, KeyModifiers::SHIFT), Action::PrevTab),
            (press(KeyCode::Char('R'), KeyModifiers::SHIFT), Action::Refresh),
            (press(KeyCode::Char('z'), KeyModifiers::NONE), Action::None),
        ];
        for (key, action) in cases {
            assert_eq!(config.get_action(&key), action, "{:?}", key);
        }
    }

    #[test]
    fn test_custom_binding_replaces_default() {
        let config: KeybindingConfig =
            toml::from_str(r#"toggle_favorite = ["Space"]"#).unwrap();
        assert_eq!(
            config.get_action(&press(KeyCode::Char(' '), KeyModifiers::NONE)),
            Action::ToggleFavorite
        );
        assert_eq!(
            config.get_action(&press(KeyCode::Char('s'), KeyModifiers::NONE)),
            Action::None
        );
        assert_eq!(
            config.get_action(&press(KeyCode::Char('d'), KeyModifiers::NONE)),
            Action::DeleteStory
        );
    }
}
