use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_SIZE_PIXELS: u32 = 128;
pub const MAX_SIZE_PIXELS: u32 = 1024;
pub const DEFAULT_SIZE_PIXELS: u32 = 256;
pub const MAX_TEXT_CHARS: usize = 2000;
/// Quiet zone around the symbol, in modules.
pub const QR_MARGIN_MODULES: u32 = 1;
pub const DOWNLOAD_FILE_NAME: &str = "qr.png";
pub const DEFAULT_FOREGROUND: &str = "#000000";
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(GenerationId);

impl GenerationId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrectionLevel {
    pub const ALL: [ErrorCorrectionLevel; 4] = [Self::L, Self::M, Self::Q, Self::H];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::L => "L (7%)",
            Self::M => "M (15%)",
            Self::Q => "Q (25%)",
            Self::H => "H (30%)",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Some(Self::L),
            "M" | "MEDIUM" => Some(Self::M),
            "Q" | "QUARTILE" => Some(Self::Q),
            "H" | "HIGH" => Some(Self::H),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub dark: String,
    pub light: String,
}

/// Options handed to the encoder. Serializes to the
/// `{width, margin, errorCorrectionLevel, color: {dark, light}}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub width: u32,
    pub margin: u32,
    pub error_correction_level: ErrorCorrectionLevel,
    pub color: ColorPalette,
}

/// Raw form contents as the user typed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub text: String,
    pub size_input: String,
    pub error_correction: ErrorCorrectionLevel,
    pub foreground: String,
    pub background: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            text: String::new(),
            size_input: DEFAULT_SIZE_PIXELS.to_string(),
            error_correction: ErrorCorrectionLevel::M,
            foreground: DEFAULT_FOREGROUND.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSeverity {
    Info,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: StatusSeverity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Info,
        }
    }

    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Ok,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Error,
        }
    }
}

/// Parses the size field the way a lenient numeric input does: skip leading
/// whitespace, accept an optional sign, then take the longest digit run.
/// Returns `None` when no digits follow.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let digits = &rest[..digits_len];
    let value = match digits.parse::<i64>() {
        Ok(v) => v,
        // Digit run longer than i64 allows.
        Err(_) => i64::MAX,
    };
    Some(if negative { -value } else { value })
}

pub fn clamp_size(value: Option<i64>) -> u32 {
    match value {
        None => MIN_SIZE_PIXELS,
        Some(n) => n.clamp(MIN_SIZE_PIXELS as i64, MAX_SIZE_PIXELS as i64) as u32,
    }
}

pub fn clamp_size_input(raw: &str) -> u32 {
    clamp_size(parse_leading_int(raw))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub fn rgb(self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0;
        if a == 0xff {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`; the `#` is optional.
pub fn parse_hex_color(raw: &str) -> Option<Rgba8> {
    let hex = raw.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let alpha = if expanded.len() == 8 { channel(6)? } else { 0xff };
    Some(Rgba8([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
