//! Browser host.
//!
//! Everything runs in Rust; the page needs one line of JavaScript:
//!
//! ```text
//! import init, { initScinapseLab } from './pkg/scinapse.js';
//! await init();
//! const lab = initScinapseLab("lab-canvas", "pendulum");
//! // on unmount
//! lab.destroy();
//! ```
//!
//! Expected DOM ids (all optional except the canvas):
//! - `start-btn`, `reset-btn`: start/pause toggle and reset
//! - `sim-pendulum`, `sim-projectile`, `sim-wave`: switch simulation while idle
//! - `param-<name>`: range inputs for each slider (e.g. `param-length_cm`)
//! - `wave-type`: select with `sine`/`square`
//! - `readout-<label>`: text targets, label lowercased with spaces as dashes

mod canvas;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::driver::{
    AnimationDriver, CallbackSlot, DriverConfig, FrameHandle, FrameOutcome, FrameScheduler,
};
use crate::engine::{SimTime, TickSource};
use crate::error::{LabError, LabResult};
use crate::render::{Painter, Surface};
use crate::sims::{AnyConfig, AnySimulation, Simulation, SimulationKind, WaveType};

pub use canvas::CanvasPainter;

type FrameCallback = Closure<dyn FnMut(f64)>;
type WebDriver = AnimationDriver<AnySimulation, PerformanceClock, RafScheduler>;

/// `performance.now()` as a tick source.
pub struct PerformanceClock {
    performance: web_sys::Performance,
}

impl PerformanceClock {
    /// Clock bound to the window's performance timer.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Config` outside a browser window.
    pub fn new(window: &web_sys::Window) -> LabResult<Self> {
        let performance = window
            .performance()
            .ok_or_else(|| LabError::config("window.performance unavailable"))?;
        Ok(Self { performance })
    }
}

impl TickSource for PerformanceClock {
    fn now(&mut self) -> SimTime {
        SimTime::from_millis_f64(self.performance.now())
    }
}

/// `requestAnimationFrame` / `cancelAnimationFrame` scheduler.
///
/// The callback slot is filled after the driver exists, since the callback
/// itself needs the driver.
pub struct RafScheduler {
    window: web_sys::Window,
    callback: CallbackSlot<FrameCallback>,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> LabResult<FrameHandle> {
        let window = &self.window;
        let id = self
            .callback
            .with(|callback| window.request_animation_frame(callback.as_ref().unchecked_ref()))
            .ok_or_else(|| LabError::scheduler("frame callback not installed"))?
            .map_err(|e| LabError::scheduler(format!("{e:?}")))?;
        Ok(FrameHandle(i64::from(id)))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let Ok(id) = i32::try_from(handle.0) else {
            return;
        };
        if let Err(e) = self.window.cancel_animation_frame(id) {
            tracing::warn!(?e, "cancelAnimationFrame failed");
        }
    }
}

/// Page state shared by event handlers and the frame callback.
struct LabApp {
    driver: WebDriver,
    painter: CanvasPainter,
    document: web_sys::Document,
}

impl LabApp {
    fn paint(&mut self) {
        if let Err(e) = self.painter.paint(self.driver.frame()) {
            tracing::warn!(error = %e, "paint failed");
        }
        self.update_readouts();
    }

    fn update_readouts(&self) {
        for readout in self.driver.readouts() {
            let id = format!(
                "readout-{}",
                readout.label.to_lowercase().replace(' ', "-")
            );
            set_text(&self.document, &id, &readout.display_value());
        }
        set_text(
            &self.document,
            "start-btn",
            if self.driver.is_running() { "Pause" } else { "Start" },
        );
    }

    fn sync_sliders(&self) {
        let config = self.driver.sim().config();
        for slider in config.sliders() {
            if let Some(value) = config.param(slider.name) {
                set_input_value(&self.document, &format!("param-{}", slider.name), value);
            }
        }
    }

    fn apply(&mut self, config: AnyConfig) {
        if !self.driver.set_config(config) {
            // Locked while running: snap the inputs back.
            self.sync_sliders();
        }
        self.paint();
    }

    fn switch(&mut self, kind: SimulationKind) {
        if self.driver.is_running() {
            return;
        }
        self.apply(AnySimulation::default_for(kind).config());
        self.sync_sliders();
    }
}

fn set_text(document: &web_sys::Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn set_input_value(document: &web_sys::Document, id: &str, value: f64) {
    if let Some(input) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
    {
        input.set_value(&value.to_string());
    }
}

fn input_value(event: &web_sys::Event) -> Option<String> {
    event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value())
}

fn select_value(event: &web_sys::Event) -> Option<String> {
    event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        .map(|select| select.value())
}

/// An event listener the lab installed, kept so it can be removed.
struct Listener {
    target: web_sys::Element,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn remove(self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref())
        {
            tracing::warn!(?e, kind = self.kind, "removeEventListener failed");
        }
    }
}

fn on_event<F>(
    document: &web_sys::Document,
    id: &str,
    kind: &'static str,
    mut callback: F,
) -> Result<Option<Listener>, JsValue>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let Some(target) = document.get_element_by_id(id) else {
        return Ok(None);
    };
    let closure = Closure::wrap(Box::new(move |e: web_sys::Event| {
        callback(e);
    }) as Box<dyn FnMut(_)>);

    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    Ok(Some(Listener {
        target,
        kind,
        closure,
    }))
}

fn to_js(e: LabError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A running lab, returned to JavaScript.
///
/// Call `destroy()` (or `free()`) when the canvas is unmounted: it cancels
/// the pending animation frame, removes the DOM listeners and releases the
/// frame callback. A second lab on the same canvas should only be created
/// after the first is destroyed.
#[wasm_bindgen]
pub struct ScinapseLab {
    app: Option<Rc<RefCell<LabApp>>>,
    callback: CallbackSlot<FrameCallback>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl ScinapseLab {
    /// Stop the animation loop and release every callback. Idempotent.
    pub fn destroy(&mut self) {
        let Some(app) = self.app.take() else {
            return;
        };
        app.borrow_mut().driver.teardown();
        for listener in self.listeners.drain(..) {
            listener.remove();
        }
        // Dropping the closure breaks the app -> driver -> scheduler -> closure cycle.
        self.callback.release();
        tracing::debug!("lab destroyed");
    }

    /// Whether `destroy()` has not been called yet.
    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        self.app.is_some()
    }
}

impl Drop for ScinapseLab {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Initialize the lab on a canvas - call from JavaScript
///
/// # Errors
///
/// Returns an error if the canvas is missing or the simulation name is unknown.
#[wasm_bindgen(js_name = initScinapseLab)]
pub fn init_scinapse_lab(canvas_id: &str, simulation: &str) -> Result<ScinapseLab, JsValue> {
    console_error_panic_hook::set_once();

    let kind: SimulationKind = simulation.parse().map_err(to_js)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;

    let config = DriverConfig {
        surface: Surface::new(f64::from(canvas.width()), f64::from(canvas.height())),
        ..DriverConfig::default()
    };
    let painter = CanvasPainter::new(&canvas).map_err(to_js)?;
    let callback = CallbackSlot::new();
    let scheduler = RafScheduler {
        window: window.clone(),
        callback: callback.clone(),
    };
    let clock = PerformanceClock::new(&window).map_err(to_js)?;
    let driver = AnimationDriver::new(AnySimulation::default_for(kind), clock, scheduler, &config);

    let app = Rc::new(RefCell::new(LabApp {
        driver,
        painter,
        document: document.clone(),
    }));

    // Frame callback: fires only for the handle the driver is waiting on.
    callback.install(Closure::new({
        let app = Rc::clone(&app);
        move |_timestamp: f64| {
            let mut app = app.borrow_mut();
            let Some(handle) = app.driver.pending_frame() else {
                return;
            };
            match app.driver.on_frame(handle) {
                Ok(FrameOutcome::Ignored) => {}
                Ok(_) => app.paint(),
                Err(e) => {
                    tracing::warn!(error = %e, "frame failed");
                    app.paint();
                }
            }
        }
    }));

    {
        let mut app = app.borrow_mut();
        app.paint();
        app.sync_sliders();
    }

    // Owned from here on: an early return drops it, which unwinds everything.
    let mut lab = ScinapseLab {
        app: Some(Rc::clone(&app)),
        callback,
        listeners: Vec::new(),
    };

    lab.listeners.extend(on_event(&document, "start-btn", "click", {
        let app = Rc::clone(&app);
        move |_| {
            let mut app = app.borrow_mut();
            if let Err(e) = app.driver.toggle() {
                tracing::warn!(error = %e, "start failed");
            }
            app.paint();
        }
    })?);

    lab.listeners.extend(on_event(&document, "reset-btn", "click", {
        let app = Rc::clone(&app);
        move |_| {
            let mut app = app.borrow_mut();
            app.driver.reset();
            app.paint();
        }
    })?);

    for kind in SimulationKind::ALL {
        lab.listeners.extend(on_event(&document, &format!("sim-{kind}"), "click", {
            let app = Rc::clone(&app);
            move |_| app.borrow_mut().switch(kind)
        })?);
    }

    let names: BTreeSet<&'static str> = SimulationKind::ALL
        .iter()
        .flat_map(|k| AnySimulation::default_for(*k).config().sliders())
        .map(|slider| slider.name)
        .collect();
    for name in names {
        lab.listeners.extend(on_event(&document, &format!("param-{name}"), "input", {
            let app = Rc::clone(&app);
            move |e| {
                let Some(value) = input_value(&e).and_then(|v| v.parse::<f64>().ok()) else {
                    return;
                };
                let mut app = app.borrow_mut();
                let current = app.driver.sim().config();
                if current.param(name).is_none() {
                    return;
                }
                match current.with_param(name, value) {
                    Ok(next) => app.apply(next),
                    Err(e) => tracing::debug!(error = %e, "slider rejected"),
                }
            }
        })?);
    }

    lab.listeners.extend(on_event(&document, "wave-type", "change", {
        let app = Rc::clone(&app);
        move |e| {
            let wave_type = match select_value(&e).as_deref() {
                Some("square") => WaveType::Square,
                _ => WaveType::Sine,
            };
            let mut app = app.borrow_mut();
            if let AnyConfig::Wave(mut config) = app.driver.sim().config() {
                config.wave_type = wave_type;
                app.apply(AnyConfig::Wave(config));
            }
        }
    })?);

    if let Some(loading) = document.get_element_by_id("loading") {
        loading.set_attribute("style", "display: none")?;
    }

    tracing::debug!(%kind, "lab initialised");
    Ok(lab)
}
