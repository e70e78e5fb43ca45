use std::cell::RefCell;
use std::rc::Rc;

use greeting_engine::timeline::greeting_schedule;
use greeting_engine::{
    AudioOp, Channel, GestureKind, GestureTarget, HostCommand, InputEvent, Page, PageConfig,
    PlayResult,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, EventTarget, HtmlAudioElement, HtmlImageElement, PageTransitionEvent};

use crate::dom::{WebDom, OVERLAY_ID, REPLAY_ID};
use crate::raf::RafLoop;

/// Events produced by promise and load callbacks, drained each frame.
type Inbox = Rc<RefCell<Vec<InputEvent>>>;

struct DomListener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Drives a [`Page`] against the real document: applies its commands and
/// styles, forwards gestures, and resolves play and preload outcomes.
///
/// Stored in a `thread_local!` by the crate root; DOM callbacks reach it
/// through `with_runner`.
pub struct PageRunner {
    page: Page,
    dom: WebDom,
    inbox: Inbox,
    raf: Option<RafLoop>,
    listeners: Vec<DomListener>,
    last_frame_ms: Option<f64>,
}

impl PageRunner {
    pub fn new(config: PageConfig, dom: WebDom) -> Self {
        Self {
            page: Page::new(config),
            dom,
            inbox: Rc::new(RefCell::new(Vec::new())),
            raf: None,
            listeners: Vec::new(),
            last_frame_ms: None,
        }
    }

    /// Snapshot the document, initialize the page and start the frame loop.
    pub fn start(&mut self) -> Result<(), JsValue> {
        let schedule = greeting_schedule(self.page.config().gallery.is_some());
        let layout = self.dom.layout(schedule.selectors());
        self.page.init(layout);
        self.flush();

        self.bind_gestures()?;

        let raf = RafLoop::new(|timestamp_ms| {
            crate::with_runner(|r| r.frame(timestamp_ms));
        });
        raf.start();
        self.raf = Some(raf);
        Ok(())
    }

    fn bind_gestures(&mut self) -> Result<(), JsValue> {
        let document: EventTarget = self.dom.document().clone().into();
        for kind in [GestureKind::Click, GestureKind::TouchStart] {
            let closure = Closure::wrap(Box::new(move |event: Event| {
                let target = gesture_target(&event);
                crate::with_runner(|r| {
                    r.page.push_input(InputEvent::Gesture { target, kind });
                    // Play requests must run inside the gesture handler to inherit its activation.
                    r.pump();
                });
            }) as Box<dyn FnMut(Event)>);
            self.listen(document.clone(), kind.event_name(), closure)?;
        }

        if let Some(window) = web_sys::window() {
            let window: EventTarget = window.into();
            let hide = Closure::wrap(Box::new(move |event: Event| {
                // A page entering the back/forward cache may come back.
                if persisted(&event) {
                    crate::with_runner(|r| r.suspend());
                } else {
                    crate::with_runner(|r| r.teardown());
                }
            }) as Box<dyn FnMut(Event)>);
            self.listen(window.clone(), "pagehide", hide)?;

            let show = Closure::wrap(Box::new(move |event: Event| {
                if persisted(&event) {
                    crate::with_runner(|r| r.resume());
                }
            }) as Box<dyn FnMut(Event)>);
            self.listen(window, "pageshow", show)?;
        }
        Ok(())
    }

    fn listen(
        &mut self,
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    ) -> Result<(), JsValue> {
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push(DomListener { target, event, closure });
        Ok(())
    }

    fn frame(&mut self, timestamp_ms: f64) {
        let dt = match self.last_frame_ms {
            Some(last) => ((timestamp_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(timestamp_ms);
        self.collect_inbox();
        self.page.tick(dt);
        self.flush();
    }

    /// Handle pending input right away, without moving the clock.
    fn pump(&mut self) {
        self.collect_inbox();
        self.page.tick(0.0);
        self.flush();
    }

    fn collect_inbox(&mut self) {
        let events = std::mem::take(&mut *self.inbox.borrow_mut());
        for event in events {
            self.page.push_input(event);
        }
    }

    pub fn replay(&mut self) {
        self.page.replay();
        self.flush();
    }

    /// Pause the frame loop; the page keeps its state.
    fn suspend(&mut self) {
        if let Some(raf) = &self.raf {
            raf.stop();
        }
        log::debug!("page suspended");
    }

    /// Restart the frame loop after a back/forward cache restore. The time
    /// spent in the cache does not count as a frame.
    fn resume(&mut self) {
        self.last_frame_ms = None;
        self.page.resume();
        self.flush();
        if let Some(raf) = &self.raf {
            raf.start();
        }
    }

    /// Stop the frame loop and dispose every page handle and DOM listener.
    pub fn teardown(&mut self) {
        if let Some(raf) = &self.raf {
            raf.stop();
        }
        self.page.teardown();
        // Closures stay owned: one of them may be the caller.
        for l in &self.listeners {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.event, l.closure.as_ref().unchecked_ref());
        }
    }

    fn flush(&mut self) {
        for command in self.page.drain_commands() {
            self.apply(command);
        }
        for update in self.page.drain_styles() {
            self.dom.apply_style(&update);
        }
    }

    fn apply(&mut self, command: HostCommand) {
        match command {
            HostCommand::Audio { channel, op } => self.apply_audio(channel, op),
            HostCommand::SetInnerHtml { selector, html } => self.dom.set_inner_html(&selector, &html),
            HostCommand::OverlayVisible(visible) => self.dom.set_overlay_visible(visible),
            HostCommand::OverlayText(text) => self.dom.set_overlay_text(&text),
            HostCommand::ImageClass { element_id, class, present } => {
                self.dom.set_class(&element_id, &class, present)
            }
            HostCommand::ImageSource { element_id, uri } => {
                if let Some(element) = self.dom.by_id(&element_id) {
                    let _ = element.set_attribute("src", &uri);
                }
            }
            HostCommand::Preload { uri, generation } => self.preload(&uri, generation),
        }
    }

    fn apply_audio(&mut self, channel: Channel, op: AudioOp) {
        let Some(audio) = self.dom.audio(channel) else {
            log::debug!("no <audio id={:?}>", channel.element_id());
            if let AudioOp::Play { request } = op {
                self.settle(channel, request, PlayResult::Rejected);
            }
            return;
        };
        match op {
            AudioOp::Play { request } => self.play(audio, channel, request),
            AudioOp::Pause => {
                let _ = audio.pause();
            }
            AudioOp::Rewind => audio.set_current_time(0.0),
            AudioOp::SetMuted(muted) => audio.set_muted(muted),
            AudioOp::SetVolume(volume) => audio.set_volume(f64::from(volume)),
        }
    }

    fn settle(&self, channel: Channel, request: u32, result: PlayResult) {
        self.inbox
            .borrow_mut()
            .push(InputEvent::PlaySettled { channel, request, result });
    }

    fn play(&mut self, audio: HtmlAudioElement, channel: Channel, request: u32) {
        let promise: js_sys::Promise = match audio.play() {
            Ok(promise) => promise,
            Err(err) => {
                log::warn!("{:?} play() threw: {:?}", channel, err);
                self.settle(channel, request, PlayResult::Rejected);
                return;
            }
        };
        let inbox = Rc::clone(&self.inbox);
        wasm_bindgen_futures::spawn_local(async move {
            let result = match JsFuture::from(promise).await {
                Ok(_) => PlayResult::Started,
                Err(err) => {
                    log::debug!("{:?} play() rejected: {:?}", channel, err);
                    PlayResult::Rejected
                }
            };
            inbox
                .borrow_mut()
                .push(InputEvent::PlaySettled { channel, request, result });
        });
    }

    fn preload(&mut self, uri: &str, generation: u32) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                log::warn!("cannot create preload image: {:?}", err);
                self.inbox
                    .borrow_mut()
                    .push(InputEvent::ImageSettled { generation, loaded: false });
                return;
            }
        };
        for loaded in [true, false] {
            let inbox = Rc::clone(&self.inbox);
            let callback = Closure::once_into_js(move || {
                inbox
                    .borrow_mut()
                    .push(InputEvent::ImageSettled { generation, loaded });
            });
            if loaded {
                image.set_onload(Some(callback.unchecked_ref()));
            } else {
                image.set_onerror(Some(callback.unchecked_ref()));
            }
        }
        image.set_src(uri);
    }
}

fn persisted(event: &Event) -> bool {
    event
        .dyn_ref::<PageTransitionEvent>()
        .map_or(false, PageTransitionEvent::persisted)
}

/// Which part of the page a gesture landed on.
fn gesture_target(event: &Event) -> GestureTarget {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return GestureTarget::Document;
    };
    let inside = |id: &str| matches!(element.closest(&format!("#{}", id)), Ok(Some(_)));
    if inside(OVERLAY_ID) {
        GestureTarget::Overlay
    } else if inside(REPLAY_ID) {
        GestureTarget::Replay
    } else {
        GestureTarget::Document
    }
}
