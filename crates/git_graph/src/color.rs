use std::fmt::{self, Display, Formatter};

use anyhow::{Context as _, bail};

/// An 8-bit-per-channel color parsed from a palette entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Rgba { r, g, b, a: 0xff }
    }
}

impl Display for Rgba {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl TryFrom<&'_ str> for Rgba {
    type Error = anyhow::Error;

    fn try_from(value: &'_ str) -> Result<Self, Self::Error> {
        const RGB: usize = "rgb".len();
        const RGBA: usize = "rgba".len();
        const RRGGBB: usize = "rrggbb".len();
        const RRGGBBAA: usize = "rrggbbaa".len();

        const EXPECTED_FORMATS: &str = "Expected #rgb, #rgba, #rrggbb, or #rrggbbaa";

        let Some(("", hex)) = value.trim().split_once('#') else {
            bail!("invalid RGBA hex color: '{value}'. {EXPECTED_FORMATS}");
        };
        if !hex.is_ascii() {
            bail!("invalid unicode characters in color: '{value}'");
        }

        let component = |range: std::ops::Range<usize>| -> anyhow::Result<u8> {
            let digits = &hex[range];
            u8::from_str_radix(digits, 16)
                .with_context(|| format!("invalid hex digits '{digits}' in color '{value}'"))
        };

        /// Duplicates a given hex digit.
        /// E.g., `0xf` -> `0xff`.
        const fn duplicate(value: u8) -> u8 {
            (value << 4) | value
        }

        let (r, g, b, a) = match hex.len() {
            RGB | RGBA => {
                let a = if hex.len() == RGBA {
                    component(3..4)?
                } else {
                    0xf
                };
                (
                    duplicate(component(0..1)?),
                    duplicate(component(1..2)?),
                    duplicate(component(2..3)?),
                    duplicate(a),
                )
            }
            RRGGBB | RRGGBBAA => {
                let a = if hex.len() == RRGGBBAA {
                    component(6..8)?
                } else {
                    0xff
                };
                (component(0..2)?, component(2..4)?, component(4..6)?, a)
            }
            _ => bail!("invalid RGBA hex color: '{value}'. {EXPECTED_FORMATS}"),
        };

        Ok(Rgba { r, g, b, a })
    }
}
