// timeline/props.rs
//
// CSS-like property bags for tweens, and how each property reads from and
// writes to an ElementStyle.

use crate::core::style::{Declaration, ElementStyle, Rgba};
use crate::extensions::easing::{lerp, Easing};

/// A property the timeline can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Opacity,
    X,
    Y,
    Z,
    Scale,
    /// Rotation around z (also `rotationZ`).
    Rotation,
    RotationX,
    RotationY,
    SkewX,
    SkewY,
    Visibility,
    Color,
    BackgroundColor,
    ZIndex,
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f32),
    Color(Rgba),
    /// Non-interpolable value such as `visible`.
    Keyword(String),
}

impl Value {
    /// Blend from `self` to `to`. `eased` drives numbers and colors;
    /// keywords switch as soon as the tween has made any progress.
    pub fn blend(&self, to: &Value, eased: f32, progress: f32) -> Value {
        match (self, to) {
            (Value::Number(a), Value::Number(b)) => Value::Number(lerp(*a, *b, eased)),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(*b, eased)),
            _ if progress > 0.0 => to.clone(),
            _ => self.clone(),
        }
    }
}

impl Property {
    /// Current value of this property on a style.
    pub fn read(self, style: &ElementStyle) -> Value {
        match self {
            Property::Opacity => Value::Number(style.opacity),
            Property::X => Value::Number(style.translate.x),
            Property::Y => Value::Number(style.translate.y),
            Property::Z => Value::Number(style.translate.z),
            Property::Scale => Value::Number(style.scale),
            Property::Rotation => Value::Number(style.rotation.z),
            Property::RotationX => Value::Number(style.rotation.x),
            Property::RotationY => Value::Number(style.rotation.y),
            Property::SkewX => Value::Number(style.skew.x),
            Property::SkewY => Value::Number(style.skew.y),
            Property::Visibility => {
                Value::Keyword(style.visibility.clone().unwrap_or_else(|| "inherit".to_string()))
            }
            Property::Color => Value::Color(style.color.unwrap_or(Rgba::BLACK)),
            Property::BackgroundColor => Value::Color(style.background_color.unwrap_or(Rgba::TRANSPARENT)),
            Property::ZIndex => Value::Number(style.z_index.unwrap_or(0) as f32),
        }
    }

    /// The inline declaration this property ends up in.
    pub fn declaration(self) -> Declaration {
        match self {
            Property::Opacity => Declaration::Opacity,
            Property::X
            | Property::Y
            | Property::Z
            | Property::Scale
            | Property::Rotation
            | Property::RotationX
            | Property::RotationY
            | Property::SkewX
            | Property::SkewY => Declaration::Transform,
            Property::Visibility => Declaration::Visibility,
            Property::Color => Declaration::Color,
            Property::BackgroundColor => Declaration::BackgroundColor,
            Property::ZIndex => Declaration::ZIndex,
        }
    }

    /// Write a value and mark its declaration as animated. Values of the
    /// wrong kind are ignored.
    pub fn write(self, style: &mut ElementStyle, value: &Value) {
        match (self, value) {
            (Property::Opacity, Value::Number(v)) => style.opacity = *v,
            (Property::X, Value::Number(v)) => style.translate.x = *v,
            (Property::Y, Value::Number(v)) => style.translate.y = *v,
            (Property::Z, Value::Number(v)) => style.translate.z = *v,
            (Property::Scale, Value::Number(v)) => style.scale = *v,
            (Property::Rotation, Value::Number(v)) => style.rotation.z = *v,
            (Property::RotationX, Value::Number(v)) => style.rotation.x = *v,
            (Property::RotationY, Value::Number(v)) => style.rotation.y = *v,
            (Property::SkewX, Value::Number(v)) => style.skew.x = *v,
            (Property::SkewY, Value::Number(v)) => style.skew.y = *v,
            (Property::Visibility, Value::Keyword(k)) => style.visibility = Some(k.clone()),
            (Property::Color, Value::Color(c)) => style.color = Some(*c),
            (Property::BackgroundColor, Value::Color(c)) => style.background_color = Some(*c),
            (Property::ZIndex, Value::Number(v)) => style.z_index = Some(v.round() as i32),
            (property, value) => {
                log::debug!("ignoring {:?} for {:?}", value, property);
                return;
            }
        }
        style.touch(self.declaration());
    }
}

/// A set of property values plus tween options (ease, repeat).
///
/// ```ignore
/// let fade_up = Props::new().opacity(0.0).y(10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    values: Vec<(Property, Value)>,
    /// Easing override; the timeline default applies when `None`.
    pub ease: Option<Easing>,
    /// Extra plays after the first.
    pub repeat: u32,
    /// Seconds between repeats.
    pub repeat_delay: f32,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an earlier value for it.
    pub fn set(mut self, property: Property, value: Value) -> Self {
        self.values.retain(|(p, _)| *p != property);
        self.values.push((property, value));
        self
    }

    pub fn opacity(self, v: f32) -> Self {
        self.set(Property::Opacity, Value::Number(v))
    }

    pub fn x(self, v: f32) -> Self {
        self.set(Property::X, Value::Number(v))
    }

    pub fn y(self, v: f32) -> Self {
        self.set(Property::Y, Value::Number(v))
    }

    pub fn z(self, v: f32) -> Self {
        self.set(Property::Z, Value::Number(v))
    }

    pub fn scale(self, v: f32) -> Self {
        self.set(Property::Scale, Value::Number(v))
    }

    /// Rotation around z, in degrees.
    pub fn rotation(self, deg: f32) -> Self {
        self.set(Property::Rotation, Value::Number(deg))
    }

    pub fn rotation_x(self, deg: f32) -> Self {
        self.set(Property::RotationX, Value::Number(deg))
    }

    pub fn rotation_y(self, deg: f32) -> Self {
        self.set(Property::RotationY, Value::Number(deg))
    }

    pub fn rotation_z(self, deg: f32) -> Self {
        self.rotation(deg)
    }

    pub fn skew_x(self, deg: f32) -> Self {
        self.set(Property::SkewX, Value::Number(deg))
    }

    pub fn skew_y(self, deg: f32) -> Self {
        self.set(Property::SkewY, Value::Number(deg))
    }

    pub fn visibility(self, keyword: &str) -> Self {
        self.set(Property::Visibility, Value::Keyword(keyword.to_string()))
    }

    pub fn color(self, color: Rgba) -> Self {
        self.set(Property::Color, Value::Color(color))
    }

    pub fn background_color(self, color: Rgba) -> Self {
        self.set(Property::BackgroundColor, Value::Color(color))
    }

    pub fn z_index(self, z: i32) -> Self {
        self.set(Property::ZIndex, Value::Number(z as f32))
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.ease = Some(easing);
        self
    }

    /// Play `count` more times, waiting `delay` seconds between plays.
    pub fn repeat(mut self, count: u32, delay: f32) -> Self {
        self.repeat = count;
        self.repeat_delay = delay.max(0.0);
        self
    }

    pub fn values(&self) -> &[(Property, Value)] {
        &self.values
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.values.iter().map(|(p, _)| *p)
    }

    /// Value for a property, if set.
    pub fn get(&self, property: Property) -> Option<&Value> {
        self.values.iter().find(|(p, _)| *p == property).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
