//! The greeting page's choreography.

use crate::core::style::Rgba;
use crate::extensions::easing::Easing;
use super::props::Props;
use super::schedule::{Effect, Schedule};

/// Text blocks split into one span per character before the timeline is built.
pub const SEGMENTED_SELECTORS: [&str; 2] = [".hbd-chatbox", ".wish-hbd"];

/// Selector addressing the spans produced by segmenting `selector`.
pub fn span_selector(selector: &str) -> String {
    format!("{} span", selector)
}

fn fade_down() -> Props {
    Props::new().opacity(0.0).y(10.0)
}

fn idea_enter() -> Props {
    Props::new().opacity(0.0).y(-20.0).rotation_x(5.0).skew_x(15.0)
}

fn idea_leave() -> Props {
    Props::new().opacity(0.0).y(20.0).rotation_y(5.0).skew_x(-15.0)
}

fn pop() -> Props {
    Props::new().scale(0.2).opacity(0.0)
}

/// The full greeting schedule. With `with_gallery`, the gallery starts at
/// the same checkpoint where the main track takes over.
pub fn greeting_schedule(with_gallery: bool) -> Schedule {
    let schedule = Schedule::new()
        .to(".container", 0.1, Props::new().visibility("visible"))
        .from(".one", 0.7, fade_down())
        .from(".two", 0.4, fade_down())
        .to(".one", 0.7, fade_down())
        .at("+=2.5")
        .to(".two", 0.7, fade_down())
        .at("-=1")
        .from(".three", 0.7, fade_down())
        .to(".three", 0.7, fade_down())
        .at("+=2")
        .from(".four", 0.7, pop())
        .from(".fake-btn", 0.3, pop())
        .stagger_to(".hbd-chatbox span", 0.5, Props::new().visibility("visible"), 0.05)
        .to(".fake-btn", 0.1, Props::new().background_color(Rgba::new(127, 206, 248)))
        .to(".four", 0.5, pop().y(-150.0))
        .at("+=0.7")
        .from(".idea-1", 0.7, idea_enter())
        .to(".idea-1", 0.7, idea_leave())
        .at("+=1.5")
        .from(".idea-2", 0.7, idea_enter())
        .to(".idea-2", 0.7, idea_leave())
        .at("+=1.5")
        .from(".idea-3", 0.7, idea_enter())
        .to(
            ".idea-3 strong",
            0.5,
            Props::new()
                .scale(1.2)
                .x(10.0)
                .background_color(Rgba::new(21, 161, 237))
                .color(Rgba::WHITE),
        )
        .to(".idea-3", 0.7, idea_leave())
        .at("+=1.5")
        .from(".idea-4", 0.7, idea_enter())
        .to(".idea-4", 0.7, idea_leave())
        .at("+=1.5")
        .from(
            ".idea-5",
            0.7,
            Props::new()
                .rotation_x(15.0)
                .rotation_z(-10.0)
                .skew_y(-5.0)
                .y(50.0)
                .z(10.0)
                .opacity(0.0),
        )
        .at("+=0.5")
        .to(".idea-5 span", 0.7, Props::new().rotation(90.0).x(8.0))
        .at("+=0.4")
        .to(".idea-5", 0.7, pop())
        .at("+=2")
        .stagger_from(
            ".idea-6 span",
            0.8,
            Props::new().scale(3.0).opacity(0.0).rotation(15.0).ease(Easing::ExpoOut),
            0.2,
        )
        .stagger_to(
            ".idea-6 span",
            0.8,
            Props::new().scale(3.0).opacity(0.0).rotation(-15.0).ease(Easing::ExpoOut),
            0.2,
        )
        .at("+=1")
        .stagger_from_to(
            ".baloons img",
            2.5,
            Props::new().opacity(0.9).y(1400.0),
            Props::new().opacity(1.0).y(-1000.0),
            0.2,
        )
        .from(
            ".girl-dp",
            0.5,
            Props::new().scale(3.5).opacity(0.0).x(25.0).y(-25.0).rotation_z(-45.0),
        )
        .at("-=2")
        .call(Effect::SwitchToMain);

    let schedule = if with_gallery {
        schedule.call(Effect::StartGallery)
    } else {
        schedule
    };

    schedule
        .stagger_from(
            ".wish-hbd span",
            0.7,
            Props::new()
                .opacity(0.0)
                .y(-50.0)
                .rotation(150.0)
                .skew_x(30.0)
                .ease(Easing::ElasticOut { amplitude: 1.0, period: 0.5 }),
            0.1,
        )
        .stagger_from_to(
            ".wish-hbd span",
            0.7,
            Props::new().scale(1.4).rotation_y(150.0),
            Props::new()
                .scale(1.0)
                .rotation_y(0.0)
                .color(Rgba::new(255, 105, 180))
                .ease(Easing::ExpoOut),
            0.1,
        )
        .at("party")
        .from(".wish h5", 0.5, Props::new().opacity(0.0).y(10.0).skew_x(-15.0))
        .at("party")
        .stagger_to(
            ".eight svg",
            1.5,
            Props::new()
                .visibility("visible")
                .opacity(0.0)
                .scale(80.0)
                .repeat(3, 1.4),
            0.3,
        )
        .to(".six", 0.5, Props::new().opacity(0.0).y(30.0).z_index(-1))
        .stagger_from(".nine p", 1.0, idea_enter(), 1.2)
        .to(".last-smile", 0.5, Props::new().rotation(90.0))
        .at("+=1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::Scene;
    use crate::timeline::sequence::Timeline;

    fn page_scene() -> Scene {
        let mut scene = Scene::new();
        for selector in greeting_schedule(true).selectors() {
            scene.register(selector, 1);
        }
        scene.register(".hbd-chatbox span", 20);
        scene.register(".wish-hbd span", 14);
        scene.register(".baloons img", 6);
        scene
    }

    #[test]
    fn switch_point_follows_balloons() {
        let mut scene = page_scene();
        let tl = Timeline::compile(&greeting_schedule(false), &mut scene);
        let switch = tl.effect_time(Effect::SwitchToMain).unwrap();
        // The portrait overlaps the balloons, so the switch lands at the balloons' end:
        // 6 balloons, 0.2s apart, 2.5s each.
        let balloons = tl.step_start(26).unwrap();
        assert!((switch - (balloons + 5.0 * 0.2 + 2.5)).abs() < 1e-3);
        assert!(tl.effect_time(Effect::StartGallery).is_none());
        assert!(switch > 20.0 && switch < tl.duration());
    }

    #[test]
    fn gallery_checkpoint_matches_switch_point() {
        let mut scene = page_scene();
        let tl = Timeline::compile(&greeting_schedule(true), &mut scene);
        assert_eq!(
            tl.effect_time(Effect::StartGallery),
            tl.effect_time(Effect::SwitchToMain)
        );
    }

    #[test]
    fn party_label_sits_after_wish_stagger() {
        let mut scene = page_scene();
        let tl = Timeline::compile(&greeting_schedule(false), &mut scene);
        let switch = tl.effect_time(Effect::SwitchToMain).unwrap();
        let party = tl.label("party").unwrap();
        // 14 spans, 0.1s apart, 0.7s each.
        assert!((party - (switch + 13.0 * 0.1 + 0.7)).abs() < 1e-3);
    }

    #[test]
    fn segmented_text_starts_hidden_until_revealed() {
        let mut scene = page_scene();
        let _ = Timeline::compile(&greeting_schedule(false), &mut scene);
        // `from` steps render immediately: the first section is faded out before play.
        assert_eq!(scene.get(".one", 0).unwrap().opacity, 0.0);
        assert_eq!(span_selector(".wish-hbd"), ".wish-hbd span");
    }
}
