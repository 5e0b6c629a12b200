//! Color lookup.
//!
//! Accepts the SVG named colors (case-insensitive), `#RGB`, `#RRGGBB` and
//! `rgb(r, g, b)` with integer or percentage channels.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack as `0xBBGGRR`, the channel order of `&HBBGGRR&` color tags.
    pub const fn to_bgr(self) -> u32 {
        (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }
}

lazy_static! {
    static ref NAMED_COLORS: HashMap<&'static str, Color> = {
        let mut m = HashMap::with_capacity(147);
        m.insert("aliceblue", Color::from_rgb(240, 248, 255));
        m.insert("antiquewhite", Color::from_rgb(250, 235, 215));
        m.insert("aqua", Color::from_rgb(0, 255, 255));
        m.insert("aquamarine", Color::from_rgb(127, 255, 212));
        m.insert("azure", Color::from_rgb(240, 255, 255));
        m.insert("beige", Color::from_rgb(245, 245, 220));
        m.insert("bisque", Color::from_rgb(255, 228, 196));
        m.insert("black", Color::from_rgb(0, 0, 0));
        m.insert("blanchedalmond", Color::from_rgb(255, 235, 205));
        m.insert("blue", Color::from_rgb(0, 0, 255));
        m.insert("blueviolet", Color::from_rgb(138, 43, 226));
        m.insert("brown", Color::from_rgb(165, 42, 42));
        m.insert("burlywood", Color::from_rgb(222, 184, 135));
        m.insert("cadetblue", Color::from_rgb(95, 158, 160));
        m.insert("chartreuse", Color::from_rgb(127, 255, 0));
        m.insert("chocolate", Color::from_rgb(210, 105, 30));
        m.insert("coral", Color::from_rgb(255, 127, 80));
        m.insert("cornflowerblue", Color::from_rgb(100, 149, 237));
        m.insert("cornsilk", Color::from_rgb(255, 248, 220));
        m.insert("crimson", Color::from_rgb(220, 20, 60));
        m.insert("cyan", Color::from_rgb(0, 255, 255));
        m.insert("darkblue", Color::from_rgb(0, 0, 139));
        m.insert("darkcyan", Color::from_rgb(0, 139, 139));
        m.insert("darkgoldenrod", Color::from_rgb(184, 134, 11));
        m.insert("darkgray", Color::from_rgb(169, 169, 169));
        m.insert("darkgreen", Color::from_rgb(0, 100, 0));
        m.insert("darkgrey", Color::from_rgb(169, 169, 169));
        m.insert("darkkhaki", Color::from_rgb(189, 183, 107));
        m.insert("darkmagenta", Color::from_rgb(139, 0, 139));
        m.insert("darkolivegreen", Color::from_rgb(85, 107, 47));
        m.insert("darkorange", Color::from_rgb(255, 140, 0));
        m.insert("darkorchid", Color::from_rgb(153, 50, 204));
        m.insert("darkred", Color::from_rgb(139, 0, 0));
        m.insert("darksalmon", Color::from_rgb(233, 150, 122));
        m.insert("darkseagreen", Color::from_rgb(143, 188, 143));
        m.insert("darkslateblue", Color::from_rgb(72, 61, 139));
        m.insert("darkslategray", Color::from_rgb(47, 79, 79));
        m.insert("darkslategrey", Color::from_rgb(47, 79, 79));
        m.insert("darkturquoise", Color::from_rgb(0, 206, 209));
        m.insert("darkviolet", Color::from_rgb(148, 0, 211));
        m.insert("deeppink", Color::from_rgb(255, 20, 147));
        m.insert("deepskyblue", Color::from_rgb(0, 191, 255));
        m.insert("dimgray", Color::from_rgb(105, 105, 105));
        m.insert("dimgrey", Color::from_rgb(105, 105, 105));
        m.insert("dodgerblue", Color::from_rgb(30, 144, 255));
        m.insert("firebrick", Color::from_rgb(178, 34, 34));
        m.insert("floralwhite", Color::from_rgb(255, 250, 240));
        m.insert("forestgreen", Color::from_rgb(34, 139, 34));
        m.insert("fuchsia", Color::from_rgb(255, 0, 255));
        m.insert("gainsboro", Color::from_rgb(220, 220, 220));
        m.insert("ghostwhite", Color::from_rgb(248, 248, 255));
        m.insert("gold", Color::from_rgb(255, 215, 0));
        m.insert("goldenrod", Color::from_rgb(218, 165, 32));
        m.insert("gray", Color::from_rgb(128, 128, 128));
        m.insert("grey", Color::from_rgb(128, 128, 128));
        m.insert("green", Color::from_rgb(0, 128, 0));
        m.insert("greenyellow", Color::from_rgb(173, 255, 47));
        m.insert("honeydew", Color::from_rgb(240, 255, 240));
        m.insert("hotpink", Color::from_rgb(255, 105, 180));
        m.insert("indianred", Color::from_rgb(205, 92, 92));
        m.insert("indigo", Color::from_rgb(75, 0, 130));
        m.insert("ivory", Color::from_rgb(255, 255, 240));
        m.insert("khaki", Color::from_rgb(240, 230, 140));
        m.insert("lavender", Color::from_rgb(230, 230, 250));
        m.insert("lavenderblush", Color::from_rgb(255, 240, 245));
        m.insert("lawngreen", Color::from_rgb(124, 252, 0));
        m.insert("lemonchiffon", Color::from_rgb(255, 250, 205));
        m.insert("lightblue", Color::from_rgb(173, 216, 230));
        m.insert("lightcoral", Color::from_rgb(240, 128, 128));
        m.insert("lightcyan", Color::from_rgb(224, 255, 255));
        m.insert("lightgoldenrodyellow", Color::from_rgb(250, 250, 210));
        m.insert("lightgray", Color::from_rgb(211, 211, 211));
        m.insert("lightgreen", Color::from_rgb(144, 238, 144));
        m.insert("lightgrey", Color::from_rgb(211, 211, 211));
        m.insert("lightpink", Color::from_rgb(255, 182, 193));
        m.insert("lightsalmon", Color::from_rgb(255, 160, 122));
        m.insert("lightseagreen", Color::from_rgb(32, 178, 170));
        m.insert("lightskyblue", Color::from_rgb(135, 206, 250));
        m.insert("lightslategray", Color::from_rgb(119, 136, 153));
        m.insert("lightslategrey", Color::from_rgb(119, 136, 153));
        m.insert("lightsteelblue", Color::from_rgb(176, 196, 222));
        m.insert("lightyellow", Color::from_rgb(255, 255, 224));
        m.insert("lime", Color::from_rgb(0, 255, 0));
        m.insert("limegreen", Color::from_rgb(50, 205, 50));
        m.insert("linen", Color::from_rgb(250, 240, 230));
        m.insert("magenta", Color::from_rgb(255, 0, 255));
        m.insert("maroon", Color::from_rgb(128, 0, 0));
        m.insert("mediumaquamarine", Color::from_rgb(102, 205, 170));
        m.insert("mediumblue", Color::from_rgb(0, 0, 205));
        m.insert("mediumorchid", Color::from_rgb(186, 85, 211));
        m.insert("mediumpurple", Color::from_rgb(147, 112, 219));
        m.insert("mediumseagreen", Color::from_rgb(60, 179, 113));
        m.insert("mediumslateblue", Color::from_rgb(123, 104, 238));
        m.insert("mediumspringgreen", Color::from_rgb(0, 250, 154));
        m.insert("mediumturquoise", Color::from_rgb(72, 209, 204));
        m.insert("mediumvioletred", Color::from_rgb(199, 21, 133));
        m.insert("midnightblue", Color::from_rgb(25, 25, 112));
        m.insert("mintcream", Color::from_rgb(245, 255, 250));
        m.insert("mistyrose", Color::from_rgb(255, 228, 225));
        m.insert("moccasin", Color::from_rgb(255, 228, 181));
        m.insert("navajowhite", Color::from_rgb(255, 222, 173));
        m.insert("navy", Color::from_rgb(0, 0, 128));
        m.insert("oldlace", Color::from_rgb(253, 245, 230));
        m.insert("olive", Color::from_rgb(128, 128, 0));
        m.insert("olivedrab", Color::from_rgb(107, 142, 35));
        m.insert("orange", Color::from_rgb(255, 165, 0));
        m.insert("orangered", Color::from_rgb(255, 69, 0));
        m.insert("orchid", Color::from_rgb(218, 112, 214));
        m.insert("palegoldenrod", Color::from_rgb(238, 232, 170));
        m.insert("palegreen", Color::from_rgb(152, 251, 152));
        m.insert("paleturquoise", Color::from_rgb(175, 238, 238));
        m.insert("palevioletred", Color::from_rgb(219, 112, 147));
        m.insert("papayawhip", Color::from_rgb(255, 239, 213));
        m.insert("peachpuff", Color::from_rgb(255, 218, 185));
        m.insert("peru", Color::from_rgb(205, 133, 63));
        m.insert("pink", Color::from_rgb(255, 192, 203));
        m.insert("plum", Color::from_rgb(221, 160, 221));
        m.insert("powderblue", Color::from_rgb(176, 224, 230));
        m.insert("purple", Color::from_rgb(128, 0, 128));
        m.insert("red", Color::from_rgb(255, 0, 0));
        m.insert("rosybrown", Color::from_rgb(188, 143, 143));
        m.insert("royalblue", Color::from_rgb(65, 105, 225));
        m.insert("saddlebrown", Color::from_rgb(139, 69, 19));
        m.insert("salmon", Color::from_rgb(250, 128, 114));
        m.insert("sandybrown", Color::from_rgb(244, 164, 96));
        m.insert("seagreen", Color::from_rgb(46, 139, 87));
        m.insert("seashell", Color::from_rgb(255, 245, 238));
        m.insert("sienna", Color::from_rgb(160, 82, 45));
        m.insert("silver", Color::from_rgb(192, 192, 192));
        m.insert("skyblue", Color::from_rgb(135, 206, 235));
        m.insert("slateblue", Color::from_rgb(106, 90, 205));
        m.insert("slategray", Color::from_rgb(112, 128, 144));
        m.insert("slategrey", Color::from_rgb(112, 128, 144));
        m.insert("snow", Color::from_rgb(255, 250, 250));
        m.insert("springgreen", Color::from_rgb(0, 255, 127));
        m.insert("steelblue", Color::from_rgb(70, 130, 180));
        m.insert("tan", Color::from_rgb(210, 180, 140));
        m.insert("teal", Color::from_rgb(0, 128, 128));
        m.insert("thistle", Color::from_rgb(216, 191, 216));
        m.insert("tomato", Color::from_rgb(255, 99, 71));
        m.insert("turquoise", Color::from_rgb(64, 224, 208));
        m.insert("violet", Color::from_rgb(238, 130, 238));
        m.insert("wheat", Color::from_rgb(245, 222, 179));
        m.insert("white", Color::from_rgb(255, 255, 255));
        m.insert("whitesmoke", Color::from_rgb(245, 245, 245));
        m.insert("yellow", Color::from_rgb(255, 255, 0));
        m.insert("yellowgreen", Color::from_rgb(154, 205, 50));
        m
    };
}

/// Parse a color value. Returns `None` for anything unrecognized.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(inner) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(inner);
    }

    NAMED_COLORS.get(lower.as_str()).copied()
}

/// Color lookup with the black sentinel for unknown input.
pub fn color_of(s: &str) -> Color {
    parse_color(s).unwrap_or(Color::BLACK)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Color::from_rgb(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::from_rgb(r, g, b))
        }
        _ => None,
    }
}

fn parse_rgb_function(inner: &str) -> Option<Color> {
    let channels: Vec<u8> = inner
        .split(',')
        .map(parse_channel)
        .collect::<Option<Vec<_>>>()?;
    match channels.as_slice() {
        &[r, g, b] => Some(Color::from_rgb(r, g, b)),
        _ => None,
    }
}

fn parse_channel(s: &str) -> Option<u8> {
    let s = s.trim();
    let value = match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? * 255.0 / 100.0,
        None => s.parse::<f64>().ok()?,
    };
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_color("red"), Some(Color::from_rgb(255, 0, 0)));
        assert_eq!(parse_color("CornflowerBlue"), Some(Color::from_rgb(100, 149, 237)));
        assert_eq!(parse_color(" yellowgreen "), Some(Color::from_rgb(154, 205, 50)));
        assert_eq!(NAMED_COLORS.len(), 147);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color("#ff8000"), Some(Color::from_rgb(255, 128, 0)));
        assert_eq!(parse_color("#F80"), Some(Color::from_rgb(255, 136, 0)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gg0000"), None);
    }

    #[test]
    fn test_rgb_function() {
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::from_rgb(1, 2, 3)));
        assert_eq!(parse_color("RGB(100%, 0%, 50%)"), Some(Color::from_rgb(255, 0, 128)));
        assert_eq!(parse_color("rgb(300, -4, 0)"), Some(Color::from_rgb(255, 0, 0)));
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_unknown_is_black() {
        assert_eq!(parse_color("notacolor"), None);
        assert_eq!(color_of("notacolor"), Color::BLACK);
        assert_eq!(color_of("url(#gradient)").to_bgr(), 0);
    }

    #[test]
    fn test_bgr_packing() {
        assert_eq!(Color::from_rgb(0x12, 0x34, 0x56).to_bgr(), 0x563412);
    }
}
