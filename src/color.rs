use image::Rgba;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pixel value with the given alpha.
    pub fn with_alpha(self, a: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, a])
    }
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_pixel(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl From<Rgb> for Rgba8 {
    fn from(c: Rgb) -> Self {
        Rgba8::new(c.r, c.g, c.b, 255)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c: Rgba8 = s.parse()?;
        Ok(Rgb::new(c.r, c.g, c.b))
    }
}

/// Accepts `#RRGGBB`, `#AARRGGBB`, `rgb(r,g,b)` and `rgba(r,g,b,a)`.
impl FromStr for Rgba8 {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ColorParseError(s.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            let byte = |i: usize| {
                hex.get(i..i + 2)
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(err)
            };
            return match hex.len() {
                6 => Ok(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, 255)),
                8 => Ok(Rgba8::new(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
                _ => Err(err()),
            };
        }

        let lower = trimmed.to_ascii_lowercase();
        let (body, expected) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest, 4)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest, 3)
        } else {
            return Err(err());
        };
        let body = body.strip_suffix(')').ok_or_else(err)?;
        let parts = body
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.len() != expected {
            return Err(err());
        }
        let alpha = parts.get(3).copied().unwrap_or(255);
        Ok(Rgba8::new(parts[0], parts[1], parts[2], alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_rgb() {
        let c: Rgb = "#FF8000".parse().unwrap();
        assert_eq!(c, Rgb::new(255, 128, 0));
        assert_eq!(c.to_string(), "#FF8000");
    }

    #[test]
    fn test_parse_hex_argb() {
        let c: Rgba8 = "#80000000".parse().unwrap();
        assert_eq!(c, Rgba8::new(0, 0, 0, 128));
    }

    #[test]
    fn test_parse_functional() {
        let c: Rgba8 = "rgba(0, 0, 0, 128)".parse().unwrap();
        assert_eq!(c, Rgba8::new(0, 0, 0, 128));
        assert_eq!(c.to_string(), "rgba(0,0,0,128)");

        let c: Rgba8 = "rgb(10,20,30)".parse().unwrap();
        assert_eq!(c, Rgba8::new(10, 20, 30, 255));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("red".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("rgba(1,2,3)".parse::<Rgba8>().is_err());
        assert!("rgb(1,2,300)".parse::<Rgba8>().is_err());
    }

    #[test]
    fn test_parse_error_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new("teal".parse::<Rgb>().unwrap_err());
        assert_eq!(err.to_string(), "Invalid color: teal");
    }
}
