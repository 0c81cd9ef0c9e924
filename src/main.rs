//! Radio Maze entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Element, EventTarget, HtmlCanvasElement, KeyboardEvent, PageTransitionEvent};

    use radio_maze::audio::WebAudioMixer;
    use radio_maze::platform::HeldKeys;
    use radio_maze::platform::input::is_movement_key;
    use radio_maze::renderer::RenderState;
    use radio_maze::{ActivationStep, AudioError, Session, Settings, Viewport};

    /// A registered DOM listener, removable on teardown
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl Listener {
        fn detach(&self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }

    /// Page-level game instance
    struct Game {
        session: Session<WebAudioMixer>,
        render_state: Option<RenderState>,
        keys: HeldKeys,
        last_time: Option<f64>,
        canvas: HtmlCanvasElement,
        prompt: Option<Element>,
        prompt_visible: Option<bool>,
        frame_handle: Option<i32>,
        listeners: Vec<Listener>,
        closed: bool,
    }

    impl Game {
        fn new(settings: Settings, canvas: HtmlCanvasElement, prompt: Option<Element>) -> Self {
            Self {
                session: Session::new(settings),
                render_state: None,
                keys: HeldKeys::new(),
                last_time: None,
                canvas,
                prompt,
                prompt_visible: None,
                frame_handle: None,
                listeners: Vec::new(),
                closed: false,
            }
        }

        /// Match the canvas backing store to its CSS box and resize everything
        fn update_size(&mut self) {
            let window = web_sys::window().expect("no window");
            let viewport = Viewport::new(
                self.canvas.client_width() as f32,
                self.canvas.client_height() as f32,
                window.device_pixel_ratio() as f32,
            );
            let (width, height) = viewport.physical_size();
            self.canvas.set_width(width);
            self.canvas.set_height(height);

            self.session.resize(viewport);
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(viewport);
            }
        }

        fn frame(&mut self, time: f64) {
            let elapsed = self
                .last_time
                .map_or(0.0, |last| ((time - last) / 1000.0) as f32);
            self.last_time = Some(time);

            let input = self.keys.to_input();
            let Some(frame) = self.session.tick(elapsed, &input) else {
                return;
            };
            let awaiting_activation = frame.awaiting_activation;

            if let Some(render_state) = self.render_state.as_mut() {
                match render_state.render(&frame) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            self.show_prompt(awaiting_activation);
        }

        /// Toggle the DOM "start the radio" prompt, touching the DOM only on change
        fn show_prompt(&mut self, visible: bool) {
            if self.prompt_visible == Some(visible) {
                return;
            }
            self.prompt_visible = Some(visible);
            if let Some(el) = &self.prompt {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        }

        /// Stop the loop, release audio and detach every listener
        fn teardown(&mut self) {
            if self.closed {
                return;
            }
            self.closed = true;

            if let Some(handle) = self.frame_handle.take()
                && let Some(window) = web_sys::window()
            {
                let _ = window.cancel_animation_frame(handle);
            }

            self.session.teardown();
            self.keys.clear();

            let listeners = std::mem::take(&mut self.listeners);
            for listener in &listeners {
                listener.detach();
            }
            // We may be running inside one of these closures; free them afterwards
            wasm_bindgen_futures::spawn_local(async move {
                drop(listeners);
            });

            log::info!("Radio Maze stopped");
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Radio Maze starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load(&canvas);
        let prompt = document.get_element_by_id("activate-prompt");
        let game = Rc::new(RefCell::new(Game::new(settings, canvas.clone(), prompt)));
        game.borrow_mut().update_size();

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let viewport = Viewport::new(
            canvas.client_width() as f32,
            canvas.client_height() as f32,
            window.device_pixel_ratio() as f32,
        );
        match RenderState::new(surface, &adapter, viewport).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            // Keep simulating and playing audio even without a picture
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        setup_listeners(&window, &canvas, &game);

        request_animation_frame(game);

        log::info!("Radio Maze running!");
    }

    fn listen(
        game: &Rc<RefCell<Game>>,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        game.borrow_mut().listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    fn setup_listeners(window: &web_sys::Window, canvas: &HtmlCanvasElement, game: &Rc<RefCell<Game>>) {
        // Viewport changes regenerate the maze on the next frame
        {
            let game_ref = game.clone();
            listen(game, window, "resize", move |_event| {
                game_ref.borrow_mut().update_size();
            });
        }

        // Keyboard
        {
            let game_ref = game.clone();
            listen(game, window, "keydown", move |event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    let key = event.key();
                    if is_movement_key(&key) {
                        event.prevent_default();
                    }
                    game_ref.borrow_mut().keys.press(&key);
                }
            });
        }
        {
            let game_ref = game.clone();
            listen(game, window, "keyup", move |event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    game_ref.borrow_mut().keys.release(&event.key());
                }
            });
        }

        // Key-up events never arrive once focus is gone
        {
            let game_ref = game.clone();
            listen(game, window, "blur", move |_event| {
                game_ref.borrow_mut().keys.clear();
            });
        }

        // Every interaction may (re)try starting the audio
        {
            let game_ref = game.clone();
            listen(game, canvas, "pointerdown", move |_event| {
                activate_audio(&game_ref);
            });
        }

        {
            let game_ref = game.clone();
            listen(game, window, "pagehide", move |event| {
                // Pages entering the back/forward cache come back via pageshow as-is
                let persisted = event
                    .dyn_ref::<PageTransitionEvent>()
                    .is_some_and(|e| e.persisted());
                if persisted {
                    log::info!("Page cached, keeping session");
                    return;
                }
                game_ref.borrow_mut().teardown();
            });
        }
    }

    /// Resume the existing graph, or build one inside the gesture handler,
    /// then await the context starting
    fn activate_audio(game: &Rc<RefCell<Game>>) {
        let step = game.borrow_mut().session.request_activation();
        let promise = match step {
            None => return,
            Some(ActivationStep::Resume(promise)) => promise,
            Some(ActivationStep::Build(ticket)) => {
                let mut g = game.borrow_mut();
                let result = WebAudioMixer::build(g.session.settings());
                if !g.session.complete_activation(ticket, result) {
                    return;
                }
                // A fresh context normally starts suspended
                match g.session.request_activation() {
                    Some(ActivationStep::Resume(promise)) => promise,
                    _ => return,
                }
            }
        };

        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => log::info!("Audio context running"),
                Err(e) => log::warn!("Audio resume rejected: {}", AudioError::describe(&e)),
            }
        });
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let game_ref = game.clone();
        let callback = Closure::once_into_js(move |time: f64| {
            game_loop(game_ref, time);
        });
        let handle = window.request_animation_frame(callback.unchecked_ref()).ok();
        game.borrow_mut().frame_handle = handle;
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame_handle = None;
            if g.closed {
                return;
            }
            g.frame(time);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Radio Maze (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    headless_walk();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a session with the native mixer: walk toward the radio and report
/// how the master gain follows.
#[cfg(not(target_arch = "wasm32"))]
fn headless_walk() {
    use radio_maze::audio::MixerGraph;
    use radio_maze::platform::HeldKeys;
    use radio_maze::{ActivationStep, Session, Settings, Viewport};

    const SAMPLE_RATE: u32 = 48_000;
    const FRAME_DT: f32 = 1.0 / 60.0;
    const SECONDS: u32 = 6;

    let settings = Settings::load();
    let mut session: Session<MixerGraph> = Session::new(settings);
    session.resize(Viewport::new(800.0, 600.0, 1.0));

    let mixer = MixerGraph::start(SAMPLE_RATE, session.settings(), &mut rand::rng());
    if let Some(ActivationStep::Build(ticket)) = session.request_activation() {
        session.complete_activation(ticket, Ok(mixer));
    }

    let mut keys = HeldKeys::new();
    keys.press("ArrowRight");
    keys.press("ArrowDown");

    let block = (SAMPLE_RATE as f32 * FRAME_DT).round() as usize;
    let mut out = vec![0.0f32; block];
    let mut peak = 0.0f32;

    for frame_index in 0..SECONDS * 60 {
        let Some(frame) = session.tick(FRAME_DT, &keys.to_input()) else {
            log::error!("Session never reached the running state");
            return;
        };
        let (player, volume) = (frame.player, frame.volume);

        if let Some(mixer) = session.audio_mut() {
            mixer.render(&mut out);
            peak = out.iter().fold(peak, |m, s| m.max(s.abs()));
        }

        if frame_index % 60 == 0 {
            let gain = session.audio().map_or(0.0, |m| m.gain());
            log::info!(
                "t={:.1}s player=({:.2}, {:.2}) volume={:.3} gain={:.3}",
                frame_index as f32 * FRAME_DT,
                player.x,
                player.y,
                volume,
                gain
            );
        }
    }

    log::info!("Peak output sample: {:.4}", peak);
    session.teardown();
}
