//! Fixed registry of biome palettes.
//!
//! Themes are immutable `'static` data; selecting a different key triggers a
//! full scene rebuild in [`crate::Stage::set_theme`].

use crate::error::BiomeError;
use std::fmt;
use std::str::FromStr;

/// Linear-ish RGB triple in the \[0, 1\] range.
pub type Rgb = [f32; 3];

/// Convert a `0xRRGGBB` literal into an [`Rgb`] triple.
pub const fn hex_rgb(hex: u32) -> Rgb {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeKey {
    Cosmic,
    Infernal,
    Diamond,
    Ethereal,
}

impl ThemeKey {
    /// Every key in display order.
    pub const ALL: [ThemeKey; 4] = [
        ThemeKey::Cosmic,
        ThemeKey::Infernal,
        ThemeKey::Diamond,
        ThemeKey::Ethereal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKey::Cosmic => "cosmic",
            ThemeKey::Infernal => "infernal",
            ThemeKey::Diamond => "diamond",
            ThemeKey::Ethereal => "ethereal",
        }
    }

    pub fn theme(self) -> &'static Theme {
        match self {
            ThemeKey::Cosmic => &COSMIC,
            ThemeKey::Infernal => &INFERNAL,
            ThemeKey::Diamond => &DIAMOND,
            ThemeKey::Ethereal => &ETHEREAL,
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeKey {
    type Err = BiomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ThemeKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BiomeError::UnknownThemeKey(s.to_string()))
    }
}

/// Geometry used for the node core and its glow layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Sphere,
    Octahedron,
}

/// Scene background: the solid color is always present and doubles as the
/// fallback when the image cannot be loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Background {
    pub color: Rgb,
    pub image_url: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub key: ThemeKey,
    pub name: &'static str,
    pub background: Background,
    pub node_core: Rgb,
    pub node_glow: Rgb,
    pub node_outer: Rgb,
    pub edge: Rgb,
    pub accent: Option<Rgb>,
    pub particle: Rgb,
    pub fog_color: Rgb,
    pub fog_density: f32,
    pub node_shape: NodeShape,
}

impl Theme {
    /// Color of the ribbon at creation index `i`; accents fall back to the edge
    /// color when the theme has none.
    pub fn ribbon_color(&self, accent: bool) -> Rgb {
        match (accent, self.accent) {
            (true, Some(c)) => c,
            _ => self.edge,
        }
    }
}

/// Look up a theme by biome key.
pub fn get_theme(key: &str) -> Result<&'static Theme, BiomeError> {
    key.parse::<ThemeKey>().map(ThemeKey::theme)
}

const FOG_DENSITY: f32 = 0.015;

static COSMIC: Theme = Theme {
    key: ThemeKey::Cosmic,
    name: "Cosmic Flow",
    background: Background {
        color: hex_rgb(0x0a0a1a),
        image_url: Some("biomes/cosmic.jpg"),
    },
    node_core: hex_rgb(0x88ccff),
    node_glow: hex_rgb(0x4488ff),
    node_outer: hex_rgb(0x2244aa),
    edge: hex_rgb(0xaaddff),
    accent: Some(hex_rgb(0xffe08a)),
    particle: hex_rgb(0xffffcc),
    fog_color: hex_rgb(0x0a0a1a),
    fog_density: FOG_DENSITY,
    node_shape: NodeShape::Sphere,
};

static INFERNAL: Theme = Theme {
    key: ThemeKey::Infernal,
    name: "Infernal Grid",
    background: Background {
        color: hex_rgb(0x1a0808),
        image_url: None,
    },
    node_core: hex_rgb(0xff4422),
    node_glow: hex_rgb(0xff2200),
    node_outer: hex_rgb(0x881100),
    edge: hex_rgb(0x331111),
    accent: Some(hex_rgb(0xffaa33)),
    particle: hex_rgb(0xff6644),
    fog_color: hex_rgb(0x1a0808),
    fog_density: FOG_DENSITY,
    node_shape: NodeShape::Sphere,
};

static DIAMOND: Theme = Theme {
    key: ThemeKey::Diamond,
    name: "Diamond Web",
    background: Background {
        color: hex_rgb(0x050510),
        image_url: None,
    },
    node_core: hex_rgb(0xffffff),
    node_glow: hex_rgb(0x8888ff),
    node_outer: hex_rgb(0x4444aa),
    edge: hex_rgb(0x4466aa),
    accent: None,
    particle: hex_rgb(0xffffff),
    fog_color: hex_rgb(0x050510),
    fog_density: FOG_DENSITY,
    node_shape: NodeShape::Octahedron,
};

static ETHEREAL: Theme = Theme {
    key: ThemeKey::Ethereal,
    name: "Ethereal Nebula",
    background: Background {
        color: hex_rgb(0x0f0f2a),
        image_url: Some("biomes/ethereal.jpg"),
    },
    node_core: hex_rgb(0xffaaff),
    node_glow: hex_rgb(0xaa66ff),
    node_outer: hex_rgb(0x5533aa),
    edge: hex_rgb(0x88aaff),
    accent: Some(hex_rgb(0xffffaa)),
    particle: hex_rgb(0xffffaa),
    fog_color: hex_rgb(0x0f0f2a),
    fog_density: FOG_DENSITY,
    node_shape: NodeShape::Sphere,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_key_round_trips() {
        for key in ThemeKey::ALL {
            let theme = get_theme(key.as_str()).unwrap();
            assert_eq!(theme.key, key);
        }
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(get_theme(" Cosmic ").unwrap().name, "Cosmic Flow");
        assert_eq!(get_theme("DIAMOND").unwrap().node_shape, NodeShape::Octahedron);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(
            get_theme("tundra"),
            Err(BiomeError::UnknownThemeKey("tundra".into()))
        );
        assert!(get_theme("").is_err());
    }

    #[test]
    fn hex_conversion_splits_channels() {
        assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_rgb(0x00ff00), [0.0, 1.0, 0.0]);
        assert_eq!(hex_rgb(0x0000ff), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn accent_falls_back_to_edge_color() {
        let diamond = ThemeKey::Diamond.theme();
        assert_eq!(diamond.ribbon_color(true), diamond.edge);
        let cosmic = ThemeKey::Cosmic.theme();
        assert_eq!(cosmic.ribbon_color(true), cosmic.accent.unwrap());
        assert_eq!(cosmic.ribbon_color(false), cosmic.edge);
    }
}
