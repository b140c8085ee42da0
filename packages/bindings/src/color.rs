//! Hex color math for derived tokens.

/// Linear sRGB channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Parse `#rgb` or `#rrggbb`
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .ok()
                .map(|v| f64::from(v) / 255.0)
        };
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// WCAG relative luminance
    pub fn luminance(&self) -> f64 {
        let linear = |c: f64| {
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Mix toward white by `amount` (0 = unchanged, 1 = white)
    pub fn lighten(&self, amount: f64) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |c: f64| c + (1.0 - c) * amount;
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }
}

/// Text color readable on `background`: black on light, white on dark
pub fn foreground_for(background: &str) -> Option<&'static str> {
    let rgb = Rgb::from_hex(background)?;
    Some(if rgb.luminance() > 0.5 {
        "#000000"
    } else {
        "#ffffff"
    })
}

pub fn lighten(value: &str, amount: f64) -> Option<String> {
    Rgb::from_hex(value).map(|rgb| rgb.lighten(amount).to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_by_luminance() {
        assert_eq!(foreground_for("#000000"), Some("#ffffff"));
        assert_eq!(foreground_for("#ffffff"), Some("#000000"));
        assert_eq!(foreground_for("#fde047"), Some("#000000"));
        assert_eq!(foreground_for("#1e3a8a"), Some("#ffffff"));
        assert_eq!(foreground_for("blue"), None);
    }

    #[test]
    fn test_short_hex_and_lighten() {
        assert_eq!(Rgb::from_hex("#fff").map(|c| c.to_hex()), Some("#ffffff".to_string()));
        assert_eq!(lighten("#000000", 0.5), Some("#808080".to_string()));
        assert_eq!(lighten("#123456", 0.0), Some("#123456".to_string()));
    }
}
