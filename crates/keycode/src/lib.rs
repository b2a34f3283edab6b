//! keycode: symbolic key/button names and Windows virtual-key codes.
//!
//! - [`VirtualKey`]: a Windows virtual-key code (`VK_*` value).
//! - [`MouseButton`]: the five pollable mouse buttons.
//! - [`resolve`]: case-insensitive lookup from a symbolic token
//!   (`"F1"`, `"a"`, `"XBUTTON1"`) to a `VirtualKey`.
//!
//! Resolution is pure and total-or-`None`: an unknown token never panics,
//! it simply fails to resolve, and callers treat that as a no-op.

/// A Windows virtual-key code.
///
/// Virtual-key codes identify logical keys: `VK_A` is `0x41` on every
/// layout. Mouse buttons occupy the low codes (`VK_LBUTTON` = `0x01` and
/// friends) and are pollable through the same key-state API as keyboard
/// keys, which is why this type covers both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VirtualKey(u16);

impl VirtualKey {
    /// Construct from a raw virtual-key value.
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The raw virtual-key value.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// If this code names a mouse button, which one.
    pub const fn mouse_button(self) -> Option<MouseButton> {
        match self.0 {
            0x01 => Some(MouseButton::Left),   // VK_LBUTTON
            0x02 => Some(MouseButton::Right),  // VK_RBUTTON
            0x04 => Some(MouseButton::Middle), // VK_MBUTTON
            0x05 => Some(MouseButton::X1),     // VK_XBUTTON1
            0x06 => Some(MouseButton::X2),     // VK_XBUTTON2
            _ => None,
        }
    }
}

/// A pollable mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// First extended (side) button, also known as MOUSE4.
    X1,
    /// Second extended (side) button, also known as MOUSE5.
    X2,
}

/// Resolves a symbolic token to a virtual-key code.
///
/// Tokens are matched case-insensitively. The vocabulary covers F1–F12,
/// A–Z, 0–9, the named control and navigation keys, the five mouse
/// buttons (with MOUSE4/MOUSE5 as aliases for the extended buttons), and
/// the numeric keypad digits. Returns `None` for anything else.
pub fn resolve(token: &str) -> Option<VirtualKey> {
    let upper = token.trim().to_ascii_uppercase();

    // Single-character tokens: letters and digits carry their ASCII value.
    if upper.len() == 1 {
        let c = upper.as_bytes()[0];
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            return Some(VirtualKey(c as u16));
        }
        return None;
    }

    // Function keys F1-F12 (VK_F1 = 0x70).
    if let Some(n) = upper.strip_prefix('F')
        && let Ok(n) = n.parse::<u16>()
        && (1..=12).contains(&n)
    {
        return Some(VirtualKey(0x6F + n));
    }

    // Keypad digits NUMPAD0-NUMPAD9 (VK_NUMPAD0 = 0x60).
    if let Some(n) = upper.strip_prefix("NUMPAD")
        && n.len() == 1
        && let Ok(n) = n.parse::<u16>()
    {
        return Some(VirtualKey(0x60 + n));
    }

    let code: u16 = match upper.as_str() {
        "SPACE" => 0x20,    // VK_SPACE
        "ENTER" => 0x0D,    // VK_RETURN
        "TAB" => 0x09,      // VK_TAB
        "ESC" => 0x1B,      // VK_ESCAPE
        "SHIFT" => 0x10,    // VK_SHIFT
        "CTRL" => 0x11,     // VK_CONTROL
        "ALT" => 0x12,      // VK_MENU
        "LEFT" => 0x25,     // VK_LEFT
        "UP" => 0x26,       // VK_UP
        "RIGHT" => 0x27,    // VK_RIGHT
        "DOWN" => 0x28,     // VK_DOWN
        "LBUTTON" => 0x01,  // VK_LBUTTON
        "RBUTTON" => 0x02,  // VK_RBUTTON
        "MBUTTON" => 0x04,  // VK_MBUTTON
        "XBUTTON1" | "MOUSE4" => 0x05, // VK_XBUTTON1
        "XBUTTON2" | "MOUSE5" => 0x06, // VK_XBUTTON2
        _ => return None,
    };
    Some(VirtualKey(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every token in the defined vocabulary, for exhaustive checks.
    fn vocabulary() -> Vec<String> {
        let mut v: Vec<String> = Vec::new();
        for n in 1..=12 {
            v.push(format!("F{}", n));
        }
        for c in 'A'..='Z' {
            v.push(c.to_string());
        }
        for c in '0'..='9' {
            v.push(c.to_string());
        }
        for n in 0..=9 {
            v.push(format!("NUMPAD{}", n));
        }
        for s in [
            "SPACE", "ENTER", "TAB", "ESC", "SHIFT", "CTRL", "ALT", "LEFT", "RIGHT", "UP", "DOWN",
            "LBUTTON", "RBUTTON", "MBUTTON", "XBUTTON1", "XBUTTON2", "MOUSE4", "MOUSE5",
        ] {
            v.push(s.to_string());
        }
        v
    }

    #[test]
    fn whole_vocabulary_resolves_case_insensitively() {
        for token in vocabulary() {
            let upper = resolve(&token);
            assert!(upper.is_some(), "{} did not resolve", token);
            assert_eq!(
                upper,
                resolve(&token.to_ascii_lowercase()),
                "case mismatch for {}",
                token
            );
        }
    }

    #[test]
    fn letters_and_digits_carry_ascii_values() {
        assert_eq!(resolve("A"), Some(VirtualKey::new(0x41)));
        assert_eq!(resolve("z"), Some(VirtualKey::new(0x5A)));
        assert_eq!(resolve("0"), Some(VirtualKey::new(0x30)));
        assert_eq!(resolve("9"), Some(VirtualKey::new(0x39)));
    }

    #[test]
    fn function_and_keypad_ranges() {
        assert_eq!(resolve("F1"), Some(VirtualKey::new(0x70)));
        assert_eq!(resolve("f12"), Some(VirtualKey::new(0x7B)));
        assert_eq!(resolve("F13"), None);
        assert_eq!(resolve("F0"), None);
        assert_eq!(resolve("NUMPAD0"), Some(VirtualKey::new(0x60)));
        assert_eq!(resolve("numpad9"), Some(VirtualKey::new(0x69)));
        assert_eq!(resolve("NUMPAD10"), None);
    }

    #[test]
    fn mouse_aliases_and_classification() {
        assert_eq!(resolve("MOUSE4"), resolve("XBUTTON1"));
        assert_eq!(resolve("mouse5"), resolve("XBUTTON2"));
        let lb = resolve("LBUTTON").unwrap();
        assert_eq!(lb.mouse_button(), Some(MouseButton::Left));
        let rb = resolve("RBUTTON").unwrap();
        assert_eq!(rb.mouse_button(), Some(MouseButton::Right));
        assert_eq!(resolve("A").unwrap().mouse_button(), None);
    }

    #[test]
    fn unknown_tokens_do_not_resolve() {
        for s in ["", "??", "FOO", "PRESS", "MOUSE6", "NUMPADX", "F1X", " "] {
            assert_eq!(resolve(s), None, "{:?} should not resolve", s);
        }
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(resolve("  F1 "), Some(VirtualKey::new(0x70)));
        assert_eq!(resolve("\tq\t"), resolve("Q"));
    }
}
