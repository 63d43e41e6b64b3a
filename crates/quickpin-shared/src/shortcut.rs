/// History shortcuts bound on the whole window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Ctrl+Z / Ctrl+Y everywhere, Cmd+Z / Cmd+Shift+Y on macOS.
    pub fn from_key(key: &str, ctrl: bool, meta: bool, shift: bool, is_mac: bool) -> Option<Self> {
        let modifier = if is_mac { meta } else { ctrl };
        if !modifier {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "z" => Some(Shortcut::Undo),
            "y" if !is_mac || shift => Some(Shortcut::Redo),
            _ => None,
        }
    }

    pub fn is_mac_platform(platform: &str) -> bool {
        platform.to_ascii_uppercase().contains("MAC")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_platform_modifiers() {
        assert_eq!(Shortcut::from_key("z", true, false, false, false), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key("Y", true, false, false, false), Some(Shortcut::Redo));
        assert_eq!(Shortcut::from_key("z", false, true, false, true), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key("y", false, true, true, true), Some(Shortcut::Redo));
        assert_eq!(Shortcut::from_key("y", false, true, false, true), None);
        assert_eq!(Shortcut::from_key("z", false, true, false, false), None);
        assert_eq!(Shortcut::from_key("a", true, false, false, false), None);
    }

    #[test]
    fn detects_mac_platform_strings() {
        assert!(Shortcut::is_mac_platform("MacIntel"));
        assert!(!Shortcut::is_mac_platform("Win32"));
    }
}
