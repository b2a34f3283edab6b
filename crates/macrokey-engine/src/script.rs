//! The macro action mini-language.
//!
//! One instruction per line. The first whitespace-delimited token decides
//! the form:
//!
//! - `Press <TOKEN>` — press and release a key (or button, when the token
//!   names one).
//! - `Click Left` / `Click Right` — mouse click.
//! - `Wait <n>[ms]` — pause; the first run of decimal digits in the
//!   argument is the millisecond count.
//! - A lone `Q`, `W`, `E`, or `R` first token is skill shorthand and
//!   presses that letter, so combo labels like `"Q - Fireball"` work.
//!
//! Anything else does not parse and executes as a silent no-op. Verbs and
//! tokens are matched case-insensitively.

use std::time::Duration;

use keycode::{MouseButton, VirtualKey};

/// One primitive synthesized-input operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Key down, fixed hold, key up.
    Press(VirtualKey),
    /// Button down, fixed hold, button up.
    Click(MouseButton),
    /// Sleep for the given duration, dispatching no input.
    Wait(Duration),
}

/// Parses one action line into a primitive op.
///
/// Returns `None` for empty, unknown, or unresolvable lines; callers
/// treat that as a no-op, never as an error.
pub fn parse_action(action: &str) -> Option<Op> {
    let mut words = action.split_whitespace();
    let verb = words.next()?;

    if verb.eq_ignore_ascii_case("press") {
        let token = words.next()?;
        return press_op(token);
    }

    if verb.eq_ignore_ascii_case("click") {
        let button = words.next()?;
        if button.eq_ignore_ascii_case("left") {
            return Some(Op::Click(MouseButton::Left));
        }
        if button.eq_ignore_ascii_case("right") {
            return Some(Op::Click(MouseButton::Right));
        }
        return None;
    }

    if verb.eq_ignore_ascii_case("wait") {
        let rest: String = words.collect::<Vec<_>>().join(" ");
        let digits: String = rest
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let ms: u64 = digits.parse().ok()?;
        return Some(Op::Wait(Duration::from_millis(ms)));
    }

    // Skill shorthand: the letter must be the entire first token, which
    // keeps labels like "Flame Wave" from matching on an embedded letter.
    if verb.len() == 1 && matches!(verb.to_ascii_uppercase().as_str(), "Q" | "W" | "E" | "R") {
        return press_op(verb);
    }

    None
}

/// Resolve a token and route button codes to clicks.
fn press_op(token: &str) -> Option<Op> {
    let key = keycode::resolve(token)?;
    match key.mouse_button() {
        Some(button) => Some(Op::Click(button)),
        None => Some(Op::Press(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(token: &str) -> Op {
        Op::Press(keycode::resolve(token).unwrap())
    }

    #[test]
    fn press_resolves_its_token() {
        assert_eq!(parse_action("Press Q"), Some(press("Q")));
        assert_eq!(parse_action("press f1"), Some(press("F1")));
        assert_eq!(parse_action("  Press \t SPACE "), Some(press("SPACE")));
        assert_eq!(parse_action("Press"), None);
        assert_eq!(parse_action("Press BOGUS"), None);
    }

    #[test]
    fn press_of_a_button_token_becomes_a_click() {
        assert_eq!(
            parse_action("Press XBUTTON1"),
            Some(Op::Click(MouseButton::X1))
        );
        assert_eq!(
            parse_action("Press LBUTTON"),
            Some(Op::Click(MouseButton::Left))
        );
    }

    #[test]
    fn click_supports_left_and_right_only() {
        assert_eq!(parse_action("Click Left"), Some(Op::Click(MouseButton::Left)));
        assert_eq!(
            parse_action("click RIGHT"),
            Some(Op::Click(MouseButton::Right))
        );
        assert_eq!(parse_action("Click Middle"), None);
        assert_eq!(parse_action("Click"), None);
    }

    #[test]
    fn wait_takes_the_first_digit_run() {
        assert_eq!(
            parse_action("Wait 250"),
            Some(Op::Wait(Duration::from_millis(250)))
        );
        assert_eq!(
            parse_action("Wait 500ms"),
            Some(Op::Wait(Duration::from_millis(500)))
        );
        assert_eq!(
            parse_action("wait about 100 then 200"),
            Some(Op::Wait(Duration::from_millis(100)))
        );
        assert_eq!(parse_action("Wait"), None);
        assert_eq!(parse_action("Wait soon"), None);
    }

    #[test]
    fn skill_shorthand_requires_a_delimited_letter() {
        assert_eq!(parse_action("Q - Fireball"), Some(press("Q")));
        assert_eq!(parse_action("w heal"), Some(press("W")));
        assert_eq!(parse_action("E"), Some(press("E")));
        assert_eq!(parse_action("R - Ultimate"), Some(press("R")));
        // Embedded letters no longer match.
        assert_eq!(parse_action("Flame Wave"), None);
        assert_eq!(parse_action("Quick strike"), None);
        assert_eq!(parse_action("A - Slash"), None);
    }

    #[test]
    fn unmatched_lines_do_not_parse() {
        // "Q-Fireball" fails too: the first token is not a lone letter.
        for s in ["", "   ", "Dance", "hold F1", "Q-Fireball"] {
            assert_eq!(parse_action(s), None, "{:?}", s);
        }
    }
}
