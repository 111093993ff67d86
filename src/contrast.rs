//! Background color parsing and legible-foreground selection.
//!
//! A color changer publishes the foreground it picked for its background into
//! a [`ContrastRegistry`], keyed by its id, so that unrelated components can
//! style themselves to match without holding a reference to it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use palette::Srgb;

/// Foreground for light backgrounds.
pub const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);

/// Foreground for dark backgrounds.
pub const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);

/// Perceived luminance at or above which text switches to black.
pub const LUMINANCE_THRESHOLD: f32 = 128.0;

// ============================================================================
// CssColor
// ============================================================================

/// A parsed background color with its alpha channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssColor {
    pub rgb: Srgb<u8>,
    /// Opacity in 0.0-1.0.
    pub alpha: f32,
}

impl CssColor {
    pub fn opaque(rgb: Srgb<u8>) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb()`, `rgba()`, `transparent`, or a
    /// CSS named color. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return None;
        }
        if s == "transparent" {
            return Some(Self {
                rgb: BLACK,
                alpha: 0.0,
            });
        }
        if s.starts_with('#') {
            return s.parse::<Srgb<u8>>().ok().map(Self::opaque);
        }
        if let Some(args) = functional_args(&s, "rgba").or_else(|| functional_args(&s, "rgb")) {
            return parse_rgb_args(args);
        }
        palette::named::from_str(&s).map(Self::opaque)
    }
}

/// Returns the text between `name(` and `)`.
fn functional_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_args(args: &str) -> Option<CssColor> {
    // Accept both `r, g, b[, a]` and `r g b[ / a]`.
    let normalized = args.replace(['/', ','], " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |p: &str| -> Option<u8> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? * 2.55,
            None => p.parse::<f32>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(p) => match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => p.parse::<f32>().ok()?,
        },
        None => 1.0,
    };

    Some(CssColor {
        rgb: Srgb::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?),
        alpha: alpha.clamp(0.0, 1.0),
    })
}

// ============================================================================
// Contrast
// ============================================================================

/// Perceived luminance on a 0-255 scale.
pub fn luminance(rgb: Srgb<u8>) -> f32 {
    0.299 * rgb.red as f32 + 0.587 * rgb.green as f32 + 0.114 * rgb.blue as f32
}

/// Black for light backgrounds, white for dark ones.
pub fn contrast_for(rgb: Srgb<u8>) -> Srgb<u8> {
    if luminance(rgb) >= LUMINANCE_THRESHOLD {
        BLACK
    } else {
        WHITE
    }
}

/// Computes the foreground for a CSS background value.
///
/// Returns `None` when the value is absent, unparseable, or fully
/// transparent; callers keep their previous foreground in that case.
pub fn contrast_for_css(background: &str) -> Option<Srgb<u8>> {
    let color = CssColor::parse(background)?;
    if color.is_transparent() {
        return None;
    }
    Some(contrast_for(color.rgb))
}

/// Formats a color as uppercase `#RRGGBB`.
pub fn to_hex(rgb: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
}

// ============================================================================
// ContrastRegistry
// ============================================================================

/// Shared id → foreground table.
#[derive(Debug, Clone, Default)]
pub struct ContrastRegistry {
    entries: Rc<RefCell<BTreeMap<String, Srgb<u8>>>>,
}

impl ContrastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the foreground chosen for `id`.
    pub fn publish(&self, id: &str, color: Srgb<u8>) {
        self.entries.borrow_mut().insert(id.to_string(), color);
    }

    /// Removes the entry for `id`, if any.
    pub fn withdraw(&self, id: &str) {
        self.entries.borrow_mut().remove(id);
    }

    pub fn get(&self, id: &str) -> Option<Srgb<u8>> {
        self.entries.borrow().get(id).copied()
    }

    /// The published color as `#RRGGBB`.
    pub fn get_hex(&self, id: &str) -> Option<String> {
        self.get(id).map(to_hex)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
