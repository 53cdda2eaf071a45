use std::collections::{hash_map::Entry::*, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::clamp;

const COLORS_JSON: &str = include_str!("colordata.json");

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("not a hex color: {input:?}")]
    InvalidHex { input: String },
}

/// Canonicalizes user-supplied hex colors to lowercase `#rrggbb`.
///
/// Blank input maps to black, a missing `#` is added, and 3-digit shorthand is expanded. Anything
/// past the seventh character is dropped. The result is not guaranteed to be valid hex; use
/// [`Rgb::parse`] for that.
pub fn normalize_hex(hex: &str) -> String {
    let hex = hex.trim();
    if hex.is_empty() {
        return "#000000".to_string();
    }
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let digits: String = if digits.chars().count() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.chars().take(6).collect()
    };
    format!("#{}", digits.to_lowercase())
}

/// An opaque sRGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([0xff, 0xff, 0xff]);

    pub fn parse(input: &str) -> Result<Rgb, ColorError> {
        let normalized = normalize_hex(input);
        let mut buf = [0u8; 3];
        hex::decode_to_slice(&normalized[1..], &mut buf).map_err(|_| ColorError::InvalidHex {
            input: input.to_string(),
        })?;
        Ok(Rgb(buf))
    }

    /// Like [`Rgb::parse`], but substitutes `fallback` for unparseable input.
    pub fn parse_or(input: &str, fallback: Rgb) -> Rgb {
        Rgb::parse(input).unwrap_or(fallback)
    }

    pub fn r(self) -> u8 {
        self.0[0]
    }
    pub fn g(self) -> u8 {
        self.0[1]
    }
    pub fn b(self) -> u8 {
        self.0[2]
    }

    pub fn to_hsl(self) -> Hsl {
        let [r, g, b] = self.0.map(|c| f64::from(c) / 255.0);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return Hsl { h: 0.0, s: 0.0, l };
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Hsl { h: h / 6.0, s, l }
    }

    /// Adjusts lightness only, clamped to `[0, 1]`.
    pub fn shade(self, lightness_delta: f64) -> Rgb {
        let Hsl { h, s, l } = self.to_hsl();
        Hsl {
            h,
            s,
            l: clamp(l + lightness_delta, 0.0, 1.0),
        }
        .to_rgb()
    }

    /// Adjusts lightness and saturation, each clamped to `[0, 1]` independently.
    pub fn jitter(self, lightness_delta: f64, saturation_delta: f64) -> Rgb {
        let Hsl { h, s, l } = self.to_hsl();
        Hsl {
            h,
            s: clamp(s + saturation_delta, 0.0, 1.0),
            l: clamp(l + lightness_delta, 0.0, 1.0),
        }
        .to_rgb()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        let mut buf = [0u8; 6];
        hex::encode_to_slice(self.0, &mut buf).map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Hue, saturation and lightness, each normalized to `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn to_rgb(self) -> Rgb {
        let Hsl { h, s, l } = self;
        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };
        let byte = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb([byte(r), byte(g), byte(b)])
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Hex-string front end to [`Rgb::to_hsl`]. Unparseable input is treated as black.
pub fn hex_to_hsl(hex: &str) -> Hsl {
    Rgb::parse_or(hex, Rgb::BLACK).to_hsl()
}

pub fn hsl_to_hex(hsl: Hsl) -> String {
    hsl.to_rgb().to_string()
}

pub fn shade(hex: &str, lightness_delta: f64) -> String {
    Rgb::parse_or(hex, Rgb::BLACK)
        .shade(lightness_delta)
        .to_string()
}

pub fn jitter(hex: &str, lightness_delta: f64, saturation_delta: f64) -> String {
    Rgb::parse_or(hex, Rgb::BLACK)
        .jitter(lightness_delta, saturation_delta)
        .to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WirePreset {
    name: String,
    color: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSkinTone {
    name: String,
    color: String,
    nail_default: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireColorDb {
    presets: Vec<WirePreset>,
    skin_tones: Vec<WireSkinTone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub name: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkinTone {
    pub name: String,
    pub color: Rgb,
    pub nail_default: Rgb,
}

/// Named glitter colors and skin tones offered by the configurator.
#[derive(Debug, Serialize)]
pub struct ColorDb {
    presets: Vec<Preset>,
    skin_tones: Vec<SkinTone>,
    names_by_color: HashMap<Rgb, usize>,
}

#[derive(thiserror::Error, Debug)]
pub enum WireFormatError {
    #[error("color {name:?} has invalid value {value:?}")]
    InvalidColor { name: String, value: String },
    #[error("duplicate color value for {name:?}")]
    DuplicateColor { name: String },
    #[error("no skin tones defined")]
    NoSkinTones,
}

impl ColorDb {
    pub fn from_bundle() -> Self {
        let wire: WireColorDb =
            serde_json::from_str(COLORS_JSON).expect("bundled data is invalid JSON");
        ColorDb::from_wire(wire).expect("bundled data is not a valid database")
    }

    pub fn from_wire(wire: WireColorDb) -> Result<Self, WireFormatError> {
        let parse = |name: &str, value: &str| {
            Rgb::parse(value).map_err(|_| WireFormatError::InvalidColor {
                name: name.to_string(),
                value: value.to_string(),
            })
        };

        let mut db = ColorDb {
            presets: Vec::with_capacity(wire.presets.len()),
            skin_tones: Vec::with_capacity(wire.skin_tones.len()),
            names_by_color: HashMap::with_capacity(wire.presets.len()),
        };

        for WirePreset { name, color } in wire.presets {
            let color = parse(&name, &color)?;
            match db.names_by_color.entry(color) {
                Occupied(_) => return Err(WireFormatError::DuplicateColor { name }),
                Vacant(v) => v.insert(db.presets.len()),
            };
            db.presets.push(Preset { name, color });
        }

        for tone in wire.skin_tones {
            let color = parse(&tone.name, &tone.color)?;
            let nail_default = parse(&tone.name, &tone.nail_default)?;
            db.skin_tones.push(SkinTone {
                name: tone.name,
                color,
                nail_default,
            });
        }
        if db.skin_tones.is_empty() {
            return Err(WireFormatError::NoSkinTones);
        }

        Ok(db)
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Presets ordered by hue, red through violet.
    pub fn presets_by_hue(&self) -> Vec<&Preset> {
        let mut sorted: Vec<&Preset> = self.presets.iter().collect();
        sorted.sort_by(|a, b| a.color.to_hsl().h.total_cmp(&b.color.to_hsl().h));
        sorted
    }

    pub fn skin_tones(&self) -> &[SkinTone] {
        &self.skin_tones
    }

    pub fn skin_tone(&self, name: &str) -> Option<&SkinTone> {
        self.skin_tones
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// The preset name for `color`, if it is one of the presets.
    pub fn color_name(&self, color: Rgb) -> Option<&str> {
        let index = *self.names_by_color.get(&color)?;
        Some(self.presets[index].name.as_str())
    }

    pub fn preset_by_name(&self, name: &str) -> Option<&Preset> {
        let wanted = normalize_name(name);
        self.presets.iter().find(|p| normalize_name(&p.name) == wanted)
    }
}

/// Case- and whitespace-insensitive form of a color name, for comparisons.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
