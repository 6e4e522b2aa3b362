use crate::libsoru::document::Tone;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("invalid colour {0:?}, expected #RRGGBB")]
    BadColour(String),
    #[error("cannot read theme file")]
    Read(#[from] std::io::Error),
    #[error("malformed theme file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// An sRGB colour, written as `#RRGGBB` in theme files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl TryFrom<&str> for Rgb {
    type Error = ThemeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let bad = || ThemeError::BadColour(value.to_string());
        let hex = value.trim().strip_prefix('#').ok_or_else(bad)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::try_from(value.as_str())
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Colours used by the shells. Passed in at construction; the question store
/// and document builder never see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub navy_primary: Rgb,
    pub navy_accent: Rgb,
    pub red_primary: Rgb,
    pub red_accent: Rgb,
    pub white: Rgb,
    pub off_white: Rgb,
    pub text_on_dark: Rgb,
    pub text_on_light: Rgb,
    pub border: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            navy_primary: Rgb(0x0A, 0x22, 0x40),
            navy_accent: Rgb(0x1A, 0x38, 0x73),
            red_primary: Rgb(0xC0, 0x00, 0x00),
            red_accent: Rgb(0xE0, 0x40, 0x40),
            white: Rgb(0xFF, 0xFF, 0xFF),
            off_white: Rgb(0xF4, 0xF6, 0xF8),
            text_on_dark: Rgb(0xFF, 0xFF, 0xFF),
            text_on_light: Rgb(0x21, 0x21, 0x21),
            border: Rgb(0xB0, 0xBE, 0xC5),
        }
    }
}

impl Theme {
    /// Loads a theme from a JSON file. Missing keys keep their default.
    pub fn load(path: &Path) -> Result<Theme, ThemeError> {
        let json = std::fs::read_to_string(path)?;
        let theme = serde_json::from_str(&json)?;
        info!("[Theme] Loaded theme from {:?}", path);
        Ok(theme)
    }

    /// Colour for a semantic document tone.
    pub fn tone(&self, tone: Tone) -> Rgb {
        match tone {
            Tone::Title | Tone::Header => self.navy_primary,
            Tone::Body => self.text_on_light,
            Tone::Correct => self.red_primary,
            Tone::Accent => self.navy_accent,
        }
    }
}
