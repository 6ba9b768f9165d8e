//! Style and colour helpers
//!
//! Presentation properties can be written either as attributes
//! (`fill="red"`) or inside the `style` attribute (`style="fill:red"`). The
//! style declaration wins when both are present.

use lasertrace_core::ParseError;
use roxmltree::Node;
use std::fmt;

/// Colour used when an element specifies no fill
pub const DEFAULT_FILL: &str = "#000000";

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("silver", Color::rgb(192, 192, 192)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("navy", Color::rgb(0, 0, 128)),
    ("orange", Color::rgb(255, 165, 0)),
];

/// Looks up a declaration in an inline `style` string.
fn declaration<'s>(style: &'s str, key: &str) -> Option<&'s str> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim() == key).then(|| value.trim())
    })
}

/// Reads a presentation property from the `style` attribute, falling back to
/// the attribute of the same name.
pub fn style_property<'a>(node: &Node<'a, '_>, key: &str) -> Option<&'a str> {
    node.attribute("style")
        .and_then(|style| declaration(style, key))
        .or_else(|| node.attribute(key).map(str::trim))
}

/// Checks whether a property is set to `value`, either way it can be written.
pub fn has_style(node: &Node<'_, '_>, key: &str, value: &str) -> bool {
    node.attribute(key).map(str::trim) == Some(value)
        || node
            .attribute("style")
            .and_then(|style| declaration(style, key))
            == Some(value)
}

/// An opaque sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a basic colour keyword.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let trimmed = value.trim();
        let invalid = || ParseError::InvalidColor {
            value: value.to_string(),
        };

        if let Some(hex) = trimmed.strip_prefix('#') {
            let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
            return match hex.len() {
                3 if hex.is_ascii() => {
                    let expand = |i: usize| channel(&hex[i..i + 1]).map(|c| c * 17);
                    Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
                }
                6 if hex.is_ascii() => Ok(Self::rgb(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                )),
                _ => Err(invalid()),
            };
        }

        if let Some(args) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let channels: Vec<u8> = args
                .split(',')
                .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
                .collect::<Result<_, _>>()?;
            return match channels.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                _ => Err(invalid()),
            };
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, color)| *color)
            .ok_or_else(invalid)
    }

    /// Perceptual brightness in `[0, 255]`
    pub fn luma(&self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    /// Pure red marks a cutting pass
    pub fn is_cut(&self) -> bool {
        *self == Self::rgb(255, 0, 0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Classifies a fill value; anything that is not pure red, including an
/// unparseable colour, is a drawing pass.
pub fn is_cut_color(fill: &str) -> bool {
    Color::parse(fill).map(|c| c.is_cut()).unwrap_or(false)
}
