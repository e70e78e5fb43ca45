//! Retained style state for one animated element, and its CSS serialization.

use std::collections::BTreeSet;

use glam::{Vec2, Vec3, Vec4};

/// A color with sRGB channels in 0–255 and alpha in 0–1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba(pub Vec4);

impl Rgba {
    pub const BLACK: Rgba = Rgba(Vec4::new(0.0, 0.0, 0.0, 1.0));
    pub const WHITE: Rgba = Rgba(Vec4::new(255.0, 255.0, 255.0, 1.0));
    pub const TRANSPARENT: Rgba = Rgba(Vec4::ZERO);

    /// An opaque color.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self(Vec4::new(r as f32, g as f32, b as f32, 1.0))
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)` or `transparent`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Some(Self::TRANSPARENT);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let inner = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut channels = inner.split(',').map(|c| c.trim().parse::<f32>());
        let r = channels.next()?.ok()?;
        let g = channels.next()?.ok()?;
        let b = channels.next()?.ok()?;
        let a = match channels.next() {
            Some(a) => a.ok()?,
            None => 1.0,
        };
        let rgb = Vec3::new(r, g, b).clamp(Vec3::ZERO, Vec3::splat(255.0));
        Some(Self(rgb.extend(a.clamp(0.0, 1.0))))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
        match hex.len() {
            3 => Some(Self::new(digit(0, 1)? * 17, digit(1, 1)? * 17, digit(2, 1)? * 17)),
            6 => Some(Self::new(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
            _ => None,
        }
    }

    pub fn alpha(self) -> f32 {
        self.0.w
    }

    /// Component-wise blend, alpha included.
    pub fn lerp(self, to: Rgba, t: f32) -> Rgba {
        Rgba(self.0.lerp(to.0, t))
    }

    /// CSS `rgb(...)` when opaque, `rgba(...)` otherwise. Channels are rounded.
    pub fn css(self) -> String {
        let c = self.0.truncate().round();
        let a = (self.alpha() * 1000.0).round() / 1000.0;
        if a >= 1.0 {
            format!("rgb({}, {}, {})", c.x as u8, c.y as u8, c.z as u8)
        } else {
            format!("rgba({}, {}, {}, {})", c.x as u8, c.y as u8, c.z as u8, a)
        }
    }
}

/// One inline declaration an element may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Declaration {
    Opacity,
    Transform,
    Visibility,
    Color,
    BackgroundColor,
    ZIndex,
}

/// Animatable style of a single element.
///
/// Fields hold the element's current value, seeded from the document. Only
/// declarations a tween has written are serialized; everything else stays
/// with the stylesheet and inheritance.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    pub opacity: f32,
    /// x, y, z translation in px.
    pub translate: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// rotationX, rotationY, rotation (z) in degrees.
    pub rotation: Vec3,
    /// skewX, skewY in degrees.
    pub skew: Vec2,
    pub visibility: Option<String>,
    pub color: Option<Rgba>,
    pub background_color: Option<Rgba>,
    pub z_index: Option<i32>,
    touched: BTreeSet<Declaration>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate: Vec3::ZERO,
            scale: 1.0,
            rotation: Vec3::ZERO,
            skew: Vec2::ZERO,
            visibility: None,
            color: None,
            background_color: None,
            z_index: None,
            touched: BTreeSet::new(),
        }
    }
}

impl ElementStyle {
    /// Mark a declaration as owned by the animation.
    pub fn touch(&mut self, declaration: Declaration) {
        self.touched.insert(declaration);
    }

    pub fn is_touched(&self, declaration: Declaration) -> bool {
        self.touched.contains(&declaration)
    }

    /// Same values, nothing touched. Used to seed derived elements.
    pub fn untouched(&self) -> Self {
        Self {
            touched: BTreeSet::new(),
            ..self.clone()
        }
    }

    /// CSS `transform` value. Order matches the animation library the page
    /// was authored against: translate, rotate z/y/x, skew, scale.
    pub fn css_transform(&self) -> String {
        let t = self.translate;
        let r = self.rotation;
        format!(
            "translate3d({}px, {}px, {}px) rotate({}deg) rotateY({}deg) rotateX({}deg) skew({}deg, {}deg) scale({})",
            t.x, t.y, t.z, r.z, r.y, r.x, self.skew.x, self.skew.y, self.scale
        )
    }

    /// Inline declarations the host should set, as (property, value) pairs.
    /// Only touched declarations with a value are listed.
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        self.touched
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Opacity => Some(("opacity", self.opacity.to_string())),
                Declaration::Transform => Some(("transform", self.css_transform())),
                Declaration::Visibility => self.visibility.clone().map(|v| ("visibility", v)),
                Declaration::Color => self.color.map(|c| ("color", c.css())),
                Declaration::BackgroundColor => {
                    self.background_color.map(|c| ("background-color", c.css()))
                }
                Declaration::ZIndex => self.z_index.map(|z| ("z-index", z.to_string())),
            })
            .collect()
    }
}

/// Computed style strings as a browser reports them (`getComputedStyle`).
/// Only the non-transform properties the timeline can animate are read.
#[derive(Debug, Clone, Default)]
pub struct ComputedStyle {
    pub opacity: String,
    pub visibility: String,
    pub color: String,
    pub background_color: String,
}

impl From<ComputedStyle> for ElementStyle {
    fn from(computed: ComputedStyle) -> Self {
        let keyword = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            opacity: computed.opacity.trim().parse().unwrap_or(1.0),
            visibility: keyword(&computed.visibility),
            color: Rgba::parse(&computed.color),
            background_color: Rgba::parse(&computed.background_color),
            ..Default::default()
        }
    }
}
