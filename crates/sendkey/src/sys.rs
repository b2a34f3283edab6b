//! Windows event injection via the SendInput API.
//!
//! Keyboard events are posted by virtual-key code, matching how macro
//! tokens resolve; mouse buttons map to the corresponding
//! `MOUSEEVENTF_*` flags, with extended buttons selected through
//! `mouseData`.

use keycode::{MouseButton, VirtualKey};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP,
    MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP, MOUSEINPUT,
    SendInput, VIRTUAL_KEY,
};

use crate::{Error, Injector, Result};

/// Injector backed by SendInput.
pub(crate) struct WinInjector;

fn post(input: INPUT) -> Result<()> {
    // SAFETY: `input` is a fully initialized INPUT value on the stack.
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent == 1 { Ok(()) } else { Err(Error::Inject) }
}

fn key_input(key: VirtualKey, up: bool) -> INPUT {
    let flags = if up {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(key.code()),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn button_input(button: MouseButton, up: bool) -> INPUT {
    // XBUTTON1/XBUTTON2 select the extended button through mouseData.
    let (flags, mouse_data) = match (button, up) {
        (MouseButton::Left, false) => (MOUSEEVENTF_LEFTDOWN, 0),
        (MouseButton::Left, true) => (MOUSEEVENTF_LEFTUP, 0),
        (MouseButton::Right, false) => (MOUSEEVENTF_RIGHTDOWN, 0),
        (MouseButton::Right, true) => (MOUSEEVENTF_RIGHTUP, 0),
        (MouseButton::Middle, false) => (MOUSEEVENTF_MIDDLEDOWN, 0),
        (MouseButton::Middle, true) => (MOUSEEVENTF_MIDDLEUP, 0),
        (MouseButton::X1, false) => (MOUSEEVENTF_XDOWN, 1),
        (MouseButton::X1, true) => (MOUSEEVENTF_XUP, 1),
        (MouseButton::X2, false) => (MOUSEEVENTF_XDOWN, 2),
        (MouseButton::X2, true) => (MOUSEEVENTF_XUP, 2),
    };
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: mouse_data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

impl Injector for WinInjector {
    fn key_down(&self, key: VirtualKey) -> Result<()> {
        post(key_input(key, false))
    }
    fn key_up(&self, key: VirtualKey) -> Result<()> {
        post(key_input(key, true))
    }
    fn button_down(&self, button: MouseButton) -> Result<()> {
        post(button_input(button, false))
    }
    fn button_up(&self, button: MouseButton) -> Result<()> {
        post(button_input(button, true))
    }
}
