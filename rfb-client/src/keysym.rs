//! Named X11 keysyms for composing key events.
//!
//! Printable ASCII characters are their own keysyms; see [`for_char`].

#![allow(missing_docs)]

pub const BACKSPACE: u32 = 0xff08;
pub const TAB: u32 = 0xff09;
pub const RETURN: u32 = 0xff0d;
pub const ESCAPE: u32 = 0xff1b;
pub const HOME: u32 = 0xff50;
pub const LEFT: u32 = 0xff51;
pub const UP: u32 = 0xff52;
pub const RIGHT: u32 = 0xff53;
pub const DOWN: u32 = 0xff54;
pub const PAGE_UP: u32 = 0xff55;
pub const PAGE_DOWN: u32 = 0xff56;
pub const END: u32 = 0xff57;
pub const INSERT: u32 = 0xff63;
pub const DELETE: u32 = 0xffff;

pub const F1: u32 = 0xffbe;
pub const F2: u32 = 0xffbf;
pub const F3: u32 = 0xffc0;
pub const F4: u32 = 0xffc1;
pub const F5: u32 = 0xffc2;
pub const F6: u32 = 0xffc3;
pub const F7: u32 = 0xffc4;
pub const F8: u32 = 0xffc5;
pub const F9: u32 = 0xffc6;
pub const F10: u32 = 0xffc7;
pub const F11: u32 = 0xffc8;
pub const F12: u32 = 0xffc9;

pub const SHIFT_L: u32 = 0xffe1;
pub const SHIFT_R: u32 = 0xffe2;
pub const CONTROL_L: u32 = 0xffe3;
pub const CONTROL_R: u32 = 0xffe4;
pub const CAPS_LOCK: u32 = 0xffe5;
pub const ALT_L: u32 = 0xffe9;
pub const ALT_R: u32 = 0xffea;
pub const SUPER_L: u32 = 0xffeb;
pub const SUPER_R: u32 = 0xffec;

const NAMED: &[(&str, u32)] = &[
    ("BackSpace", BACKSPACE),
    ("Tab", TAB),
    ("Return", RETURN),
    ("Escape", ESCAPE),
    ("Home", HOME),
    ("Left", LEFT),
    ("Up", UP),
    ("Right", RIGHT),
    ("Down", DOWN),
    ("Page_Up", PAGE_UP),
    ("Page_Down", PAGE_DOWN),
    ("End", END),
    ("Insert", INSERT),
    ("Delete", DELETE),
    ("F1", F1),
    ("F2", F2),
    ("F3", F3),
    ("F4", F4),
    ("F5", F5),
    ("F6", F6),
    ("F7", F7),
    ("F8", F8),
    ("F9", F9),
    ("F10", F10),
    ("F11", F11),
    ("F12", F12),
    ("Shift_L", SHIFT_L),
    ("Shift_R", SHIFT_R),
    ("Control_L", CONTROL_L),
    ("Control_R", CONTROL_R),
    ("Caps_Lock", CAPS_LOCK),
    ("Alt_L", ALT_L),
    ("Alt_R", ALT_R),
    ("Super_L", SUPER_L),
    ("Super_R", SUPER_R),
];

/// Keysym for a printable ASCII character (space through `~`), `None` for
/// control characters and anything outside ASCII.
pub fn for_char(c: char) -> Option<u32> {
    (c == ' ' || c.is_ascii_graphic()).then_some(c as u32)
}

/// Look up a keysym by its X11 name (`"Return"`, `"F5"`) or a single ASCII
/// character.
pub fn from_name(name: &str) -> Option<u32> {
    if let Some(&(_, sym)) = NAMED.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        return Some(sym);
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => for_char(c),
        _ => None,
    }
}
