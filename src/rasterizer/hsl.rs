//! RGB <-> HSL conversion, used to darken faces without shifting hue

use super::types::Color;

/// Hue in degrees [0, 360), saturation and lightness in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn from_color(color: Color) -> Self {
        let r = color.r as f32 / 255.0;
        let g = color.g as f32 / 255.0;
        let b = color.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) * 0.5;

        if delta == 0.0 {
            return Self { h: 0.0, s: 0.0, l };
        }

        let s = if l <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let mut hue = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        } / 6.0;
        if hue < 0.0 {
            hue += 1.0;
        }

        Self { h: hue * 360.0, s, l }
    }

    pub fn to_color(self) -> Color {
        let l = self.l.clamp(0.0, 1.0);
        let s = self.s.clamp(0.0, 1.0);
        let to_byte = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;

        if s == 0.0 {
            let v = to_byte(l);
            return Color::new(v, v, v);
        }

        let v2 = if l < 0.5 { l * (1.0 + s) } else { (l + s) - l * s };
        let v1 = 2.0 * l - v2;
        let hue = self.h / 360.0;

        Color::new(
            to_byte(hue_to_channel(v1, v2, hue + 1.0 / 3.0)),
            to_byte(hue_to_channel(v1, v2, hue)),
            to_byte(hue_to_channel(v1, v2, hue - 1.0 / 3.0)),
        )
    }
}

fn hue_to_channel(v1: f32, v2: f32, mut h: f32) -> f32 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if 6.0 * h < 1.0 {
        v1 + (v2 - v1) * 6.0 * h
    } else if 2.0 * h < 1.0 {
        v2
    } else if 3.0 * h < 2.0 {
        v1 + (v2 - v1) * (2.0 / 3.0 - h) * 6.0
    } else {
        v1
    }
}
