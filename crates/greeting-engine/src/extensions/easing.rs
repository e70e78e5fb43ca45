// extensions/easing.rs
//
// Easing curves for timeline tweens. Pure math, no scene access.

use std::f32::consts::PI;

/// Shape of a tween's progress curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Quadratic slow end. The timeline default.
    QuadOut,
    /// Exponential slow end, most of the motion up front.
    ExpoOut,
    /// Elastic spring. `amplitude` >= 1 scales the overshoot, `period` sets the wobble length.
    ElasticOut { amplitude: f32, period: f32 },
}

impl Easing {
    /// Map normalized time `t` in [0, 1] to eased progress. Elastic curves
    /// overshoot 1 on the way.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::ExpoOut => {
                if t == 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * t) }
            }
            Easing::ElasticOut { amplitude, period } => elastic_out(t, amplitude, period),
        }
    }
}

#[inline]
fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let amplitude = amplitude.max(1.0);
    let period = if period > 0.0 { period } else { 0.3 };
    let shift = period / (2.0 * PI) * (1.0 / amplitude).asin();
    amplitude * 2.0_f32.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / period).sin() + 1.0
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_curve_hits_both_endpoints() {
        let spring = Easing::ElasticOut { amplitude: 1.0, period: 0.3 };
        for easing in [Easing::Linear, Easing::QuadOut, Easing::ExpoOut, spring] {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
    }

    #[test]
    fn quad_out_decelerates() {
        assert_eq!(Easing::QuadOut.apply(0.5), 0.75);
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn elastic_overshoots_then_settles() {
        let soft = Easing::ElasticOut { amplitude: 1.0, period: 0.5 };
        let peak = (1..20).map(|i| soft.apply(i as f32 / 20.0)).fold(0.0_f32, f32::max);
        assert!(peak > 1.0, "elastic should overshoot, peak {}", peak);
        assert!((soft.apply(0.999) - 1.0).abs() < 0.01);
    }

    #[test]
    fn expo_out_is_front_loaded() {
        assert!(Easing::ExpoOut.apply(0.2) > 0.7);
    }

    #[test]
    fn lerp_blends_linearly() {
        assert_eq!(lerp(100.0, 200.0, 0.25), 125.0);
    }
}
