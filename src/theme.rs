// src/theme.rs
use crate::errors::ThemeError;
use ratatui::style::Color;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// `#rrggbb` or `#aarrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColor {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ThemeColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { alpha: 0xff, red, green, blue }
    }

    pub const fn argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self { alpha, red, green, blue }
    }

    /// Terminal colour, with any transparency blended over `background`.
    pub fn blend_over(self, background: ThemeColor) -> Color {
        let a = self.alpha as u16;
        let mix = |fg: u8, bg: u8| ((fg as u16 * a + bg as u16 * (255 - a)) / 255) as u8;
        Color::Rgb(
            mix(self.red, background.red),
            mix(self.green, background.green),
            mix(self.blue, background.blue),
        )
    }
}

impl FromStr for ThemeColor {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ThemeError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(ThemeColor::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(ThemeColor::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.alpha, self.red, self.green, self.blue)
        }
    }
}

impl<'de> Deserialize<'de> for ThemeColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ThemePreset {
    #[default]
    Desktop,
    Mobile,
}

/// Overrides read from a theme file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ThemeOverrides {
    scale: Option<f64>,
    switcher_width: Option<f64>,
    header_height: Option<f64>,
    list_item_height: Option<f64>,
    icon_size: Option<f64>,
    fade_height: Option<f64>,
    quick_transition: Option<u64>,
    slow_transition: Option<u64>,
    fade_transition: Option<u64>,
    select_color: Option<ThemeColor>,
    new_color: Option<ThemeColor>,
    download_color: Option<ThemeColor>,
    playback_color: Option<ThemeColor>,
    base_color: Option<ThemeColor>,
    offline_color: Option<ThemeColor>,
    window_width: Option<u32>,
    window_height: Option<u32>,
}

/// Spacing, sizes, colours and transition timings shared by the views.
///
/// Pixel dimensions are stored unscaled and multiplied by `scale` on access.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub scale: f64,
    switcher_width: f64,
    header_height: f64,
    list_item_height: f64,
    icon_size: f64,
    fade_height: f64,
    /// Milliseconds.
    pub quick_transition: u64,
    pub slow_transition: u64,
    pub fade_transition: u64,
    pub select_color: ThemeColor,
    pub new_color: ThemeColor,
    pub download_color: ThemeColor,
    pub playback_color: ThemeColor,
    pub base_color: ThemeColor,
    pub offline_color: ThemeColor,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::desktop()
    }
}

impl Theme {
    pub fn desktop() -> Self {
        Self {
            scale: 1.0,
            switcher_width: 90.0,
            header_height: 56.0,
            list_item_height: 70.0,
            icon_size: 36.0,
            fade_height: 26.0,
            quick_transition: 50,
            slow_transition: 150,
            fade_transition: 300,
            select_color: ThemeColor::rgb(0x7f, 0x57, 0x85),
            new_color: ThemeColor::rgb(0xcf, 0x65, 0xde),
            download_color: ThemeColor::rgb(0x8a, 0xe2, 0x34),
            playback_color: ThemeColor::rgb(0x72, 0x9f, 0xcf),
            base_color: ThemeColor::rgb(0x2b, 0x2b, 0x2b),
            offline_color: ThemeColor::rgb(0x4b, 0x4b, 0x4b),
            window_width: 640,
            window_height: 480,
        }
    }

    pub fn mobile() -> Self {
        Self {
            header_height: 25.0,
            list_item_height: 50.0,
            select_color: ThemeColor::argb(0xa0, 0x7f, 0x57, 0x85),
            download_color: ThemeColor::argb(0xa0, 0x8a, 0xe2, 0x34),
            playback_color: ThemeColor::argb(0xa0, 0x72, 0x9f, 0xcf),
            ..Theme::desktop()
        }
    }

    pub fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Desktop => Theme::desktop(),
            ThemePreset::Mobile => Theme::mobile(),
        }
    }

    /// Applies the overrides of a JSON theme document on top of `self`.
    pub fn with_overrides_from_str(mut self, json: &str) -> Result<Self, ThemeError> {
        let o: ThemeOverrides = serde_json::from_str(json)?;
        macro_rules! apply {
            ($($field:ident),*) => { $( if let Some(v) = o.$field { self.$field = v; } )* };
        }
        apply!(
            scale,
            switcher_width,
            header_height,
            list_item_height,
            icon_size,
            fade_height,
            quick_transition,
            slow_transition,
            fade_transition,
            select_color,
            new_color,
            download_color,
            playback_color,
            base_color,
            offline_color,
            window_width,
            window_height
        );
        Ok(self)
    }

    pub fn with_overrides_from_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ThemeError> {
        let json = std::fs::read_to_string(path)?;
        self.with_overrides_from_str(&json)
    }

    pub fn small_spacing(&self) -> f64 {
        7.0 * self.scale
    }

    pub fn large_spacing(&self) -> f64 {
        self.small_spacing() * 2.0
    }

    pub fn switcher_width(&self) -> f64 {
        self.switcher_width * self.scale
    }

    pub fn header_height(&self) -> f64 {
        self.header_height * self.scale
    }

    pub fn list_item_height(&self) -> f64 {
        self.list_item_height * self.scale
    }

    pub fn icon_size(&self) -> f64 {
        self.icon_size * self.scale
    }

    pub fn fade_height(&self) -> f64 {
        self.fade_height * self.scale
    }

    pub fn list_item_big_text(&self) -> f64 {
        self.list_item_height() * 0.35
    }

    pub fn list_item_small_text(&self) -> f64 {
        self.list_item_height() * 0.25
    }

    pub fn quick(&self) -> Duration {
        Duration::from_millis(self.quick_transition)
    }

    // Terminal colours
    pub fn background(&self) -> Color {
        self.base_color.blend_over(self.base_color)
    }

    pub fn selection(&self) -> Color {
        self.select_color.blend_over(self.base_color)
    }

    pub fn highlight(&self) -> Color {
        self.new_color.blend_over(self.base_color)
    }

    pub fn playback(&self) -> Color {
        self.playback_color.blend_over(self.base_color)
    }

    pub fn download(&self) -> Color {
        self.download_color.blend_over(self.base_color)
    }

    pub fn muted(&self) -> Color {
        self.offline_color.blend_over(self.base_color)
    }
}
