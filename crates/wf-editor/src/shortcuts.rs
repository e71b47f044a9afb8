//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so the browser host and native tests
//! resolve keys identically.

/// Modifier key state accompanying a key or pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Delete,
    SelectAll,
    Deselect,

    // ── Document ──
    Save,
    Load,
    Export,
    Run,
}

impl ShortcutAction {
    pub fn name(self) -> &'static str {
        match self {
            ShortcutAction::Delete => "delete",
            ShortcutAction::SelectAll => "selectAll",
            ShortcutAction::Deselect => "deselect",
            ShortcutAction::Save => "save",
            ShortcutAction::Load => "load",
            ShortcutAction::Export => "export",
            ShortcutAction::Run => "run",
        }
    }

    /// Whether the editor session handles this action on its own, without
    /// a store or download sink from the host.
    pub fn is_edit(self) -> bool {
        matches!(
            self,
            ShortcutAction::Delete | ShortcutAction::SelectAll | ShortcutAction::Deselect
        )
    }
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"s"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, mods: Modifiers) -> Option<ShortcutAction> {
        if mods.command() {
            return match key {
                "s" | "S" => Some(ShortcutAction::Save),
                "o" | "O" => Some(ShortcutAction::Load),
                "e" | "E" => Some(ShortcutAction::Export),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "Enter" => Some(ShortcutAction::Run),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
