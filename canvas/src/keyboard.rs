//! Global keyboard shortcuts for the annotation view.
//!
//! The host forwards every key event of the page here. The dispatcher only
//! reacts between `install()` (view entered) and `remove()` (view left), and
//! never reacts to keys typed into a text input, so editing a label cannot
//! switch tools or navigate away. Dispatch is pure: one event in, one
//! [`KeyCommand`] out.

#[cfg(test)]
#[path = "keyboard_test.rs"]
mod keyboard_test;

use serde::{Deserialize, Serialize};

use crate::input::{Modifiers, Tool};
use crate::nav::NavDirection;

/// Where keyboard focus was when the event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTarget {
    /// The canvas or page body.
    #[default]
    Canvas,
    /// A text field such as the label editor.
    TextInput,
}

/// A key event as reported by the host.
///
/// `key` holds the key name as the browser reports it (e.g. `"ArrowLeft"`,
/// `"r"`, `"?"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub target: KeyTarget,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn canvas(key: &str) -> Self {
        Self { key: key.to_owned(), target: KeyTarget::Canvas, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn text_input(key: &str) -> Self {
        Self { key: key.to_owned(), target: KeyTarget::TextInput, modifiers: Modifiers::default() }
    }
}

/// What a key press asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    None,
    SetTool(Tool),
    Navigate(NavDirection),
    ToggleHelp,
    DeleteSelection,
    ClearSelection,
    /// Space pressed (`true`) or released (`false`).
    HoldPan(bool),
}

/// A row of the shortcut help overlay.
#[derive(Debug, Clone, Copy)]
pub struct ShortcutRow {
    pub keys: &'static str,
    pub action: &'static str,
}

pub const SHORTCUTS: &[ShortcutRow] = &[
    ShortcutRow { keys: "R", action: "Rectangle tool" },
    ShortcutRow { keys: "V", action: "Select / move tool" },
    ShortcutRow { keys: "H", action: "Pan tool" },
    ShortcutRow { keys: "Space", action: "Hold to pan" },
    ShortcutRow { keys: "← / →", action: "Previous / next image" },
    ShortcutRow { keys: "Delete", action: "Delete selected box" },
    ShortcutRow { keys: "Esc", action: "Clear selection" },
    ShortcutRow { keys: "?", action: "Toggle this help" },
];

/// Maps page key events to commands while the annotation view is active.
#[derive(Debug, Clone, Default)]
pub struct KeyDispatcher {
    installed: bool,
}

impl KeyDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening. Called when the annotation view is entered.
    pub fn install(&mut self) {
        self.installed = true;
    }

    /// Stop listening. Called when the annotation view is left.
    pub fn remove(&mut self) {
        self.installed = false;
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Interpret a key press.
    #[must_use]
    pub fn key_down(&self, event: &KeyEvent) -> KeyCommand {
        if !self.installed || event.target == KeyTarget::TextInput {
            return KeyCommand::None;
        }
        match event.key.as_str() {
            "ArrowRight" => KeyCommand::Navigate(NavDirection::Next),
            "ArrowLeft" => KeyCommand::Navigate(NavDirection::Prev),
            "?" => KeyCommand::ToggleHelp,
            "Delete" | "Backspace" => KeyCommand::DeleteSelection,
            "Escape" => KeyCommand::ClearSelection,
            " " => KeyCommand::HoldPan(true),
            other => single_char(other)
                .filter(|_| !(event.modifiers.ctrl || event.modifiers.meta))
                .and_then(Tool::from_shortcut)
                .map_or(KeyCommand::None, KeyCommand::SetTool),
        }
    }

    /// Interpret a key release. Only the space bar cares about releases; it is
    /// honored regardless of focus so panning never sticks on.
    #[must_use]
    pub fn key_up(&self, event: &KeyEvent) -> KeyCommand {
        if self.installed && event.key == " " {
            KeyCommand::HoldPan(false)
        } else {
            KeyCommand::None
        }
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() { None } else { Some(c) }
}
