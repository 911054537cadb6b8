// Frame colors and the fixed colors used by the strip and polaroid renderers.

use crate::error::{BoothError, BoothResult};

named_ids! {
    /// Pastel border color chosen for a photo.
    pub enum FrameColor {
        PastelPink => "pastel-pink",
        StrawberryRed => "strawberry-red",
        PastelBlue => "pastel-blue",
        PastelPurple => "pastel-purple",
        PastelMint => "pastel-mint",
        PastelPeach => "pastel-peach",
    }
}

impl Default for FrameColor {
    fn default() -> Self {
        FrameColor::PastelPink
    }
}

impl FrameColor {
    pub fn hex(self) -> &'static str {
        match self {
            FrameColor::PastelPink => "#ffc0cb",
            FrameColor::StrawberryRed => "#ff4757",
            FrameColor::PastelBlue => "#b0e0e6",
            FrameColor::PastelPurple => "#dda0dd",
            FrameColor::PastelMint => "#b0f2b6",
            FrameColor::PastelPeach => "#ffdab9",
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        // The table above is constant and well-formed.
        parse_hex(self.hex()).unwrap_or([0xff, 0xc0, 0xcb])
    }
}

pub const STRIP_GRADIENT_TOP: [u8; 3] = [0xff, 0xee, 0xf8];
pub const STRIP_GRADIENT_BOTTOM: [u8; 3] = [0xff, 0xf5, 0xf7];
pub const STRIP_CAPTION: [u8; 3] = [0xff, 0x69, 0xb4];
pub const POLAROID_CAPTION: [u8; 3] = [0x66, 0x66, 0x66];

/// Parse `#rrggbb` (or `#rgb`) into RGB bytes.
pub fn parse_hex(s: &str) -> BoothResult<[u8; 3]> {
    let digits = s
        .strip_prefix('#')
        .ok_or_else(|| BoothError::validation(format!("color '{s}' must start with '#'")))?;
    let bad = || BoothError::validation(format!("invalid color '{s}'"));
    match digits.len() {
        6 => {
            let mut out = [0u8; 3];
            for (i, c) in out.iter_mut().enumerate() {
                *c = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| bad())?;
            }
            Ok(out)
        }
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in out.iter_mut().enumerate() {
                let v = u8::from_str_radix(&digits[i..i + 1], 16).map_err(|_| bad())?;
                *c = v * 17;
            }
            Ok(out)
        }
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_frame_color_parses() {
        for &frame in FrameColor::ALL {
            assert!(parse_hex(frame.hex()).is_ok(), "{frame}");
        }
        assert_eq!(FrameColor::StrawberryRed.rgb(), [0xff, 0x47, 0x57]);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for &frame in FrameColor::ALL {
            assert_eq!(frame.name().parse::<FrameColor>().unwrap(), frame);
        }
        assert!("neon-green".parse::<FrameColor>().is_err());
    }

    #[test]
    fn serde_uses_kebab_names() {
        let json = serde_json::to_string(&FrameColor::PastelMint).unwrap();
        assert_eq!(json, "\"pastel-mint\"");
    }

    #[test]
    fn cycling_wraps() {
        assert_eq!(FrameColor::PastelPeach.next(), FrameColor::PastelPink);
        assert_eq!(FrameColor::PastelPink.prev(), FrameColor::PastelPeach);
    }

    #[test]
    fn short_hex_expands() {
        assert_eq!(parse_hex("#666").unwrap(), [0x66, 0x66, 0x66]);
        assert!(parse_hex("ff0000").is_err());
        assert!(parse_hex("#zz0000").is_err());
    }
}
