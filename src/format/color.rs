// src/format/color.rs

//! ANSI truecolor escape generation; pure helpers.

use crate::e_err;

/// An 8-bit RGB triple.
pub type Rgb = (u8, u8, u8);

/// Fallback color for unknown color names.
pub const RGB_WHITE: Rgb = (255, 255, 255);

/// SGR reset, emitted after every colored span.
pub const SGR_RESET: &str = "\x1b[0m";

/// The fixed color-name to hex table recognized in `level_colors` maps.
///
/// Sorted by name; unknown names fall back to white
/// (see [`sgr_color_prefix`]).
pub const COLOR_NAME_HEX_TABLE: [(&str, &str); 12] = [
    ("black", "#000000"),
    ("blue", "#3465A4"),
    ("cyan", "#06989A"),
    ("gray", "#808080"),
    ("green", "#4E9A06"),
    ("magenta", "#75507B"),
    ("orange", "#FFA500"),
    ("pink", "#FFC0CB"),
    ("purple", "#800080"),
    ("red", "#CC0000"),
    ("white", "#FFFFFF"),
    ("yellow", "#C4A000"),
];

/// Decode `"#RRGGBB"` to an RGB triple. Returns `None` for anything else.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits: &str = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r: u8 = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g: u8 = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b: u8 = u8::from_str_radix(&digits[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Look up a color name in [`COLOR_NAME_HEX_TABLE`].
pub fn color_name_to_rgb(name: &str) -> Option<Rgb> {
    let index: usize = COLOR_NAME_HEX_TABLE
        .binary_search_by_key(&name, |(name_, _hex)| name_)
        .ok()?;

    hex_to_rgb(COLOR_NAME_HEX_TABLE[index].1)
}

/// The SGR prefix selecting 24-bit foreground color `rgb`.
pub fn sgr_rgb_prefix(rgb: Rgb) -> String {
    let (r, g, b) = rgb;

    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

/// The SGR prefix for color name `name`.
///
/// An unknown name falls back to white and emits a stderr diagnostic;
/// rendering is a diagnostic tool, it must not abort.
pub fn sgr_color_prefix(name: &str) -> String {
    let rgb: Rgb = match color_name_to_rgb(name) {
        Some(val) => val,
        None => {
            e_err!("color {:?} not found, using default color \"white\" instead", name);
            RGB_WHITE
        }
    };

    sgr_rgb_prefix(rgb)
}
