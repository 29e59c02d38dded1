mod animal;
mod camera;
mod config;
mod cube;
mod dome;
mod draw;
mod error;
mod frame;
mod hud;
mod input;
mod lighting;
mod matrix;
mod scene;
mod shader;
mod vao;
mod vbo;
mod vertex;

pub use crate::config::ViewerConfig;
pub use crate::dome::{tessellate, DomeParams};
pub use crate::error::{GeometryError, RenderError, ViewerError};
pub use crate::lighting::{shade, Fragment, LightingUniforms, TextureSelector};
pub use crate::vertex::{Mesh, TriangleBatch, Vertex};

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, Performance, WebGl2RenderingContext as GL};

use crate::draw::WebGlTarget;
use crate::frame::{Clock, FrameOrchestrator, FrameOutcome};
use crate::hud::DomHud;
use crate::input::{InputSink, KeyAction, UiAction};
use crate::shader::ShaderProgram;

/// `performance.now()`, or the wall clock where the page has no
/// performance API.
struct PerformanceClock {
    performance: Option<Performance>,
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }
}

struct Viewer {
    frame: FrameOrchestrator,
    target: WebGlTarget,
    hud: DomHud,
    canvas: HtmlCanvasElement,
    clock: PerformanceClock,
}

impl Viewer {
    fn viewport(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn tick(&mut self, time: f64) -> FrameOutcome {
        let viewport = self.viewport();
        self.frame
            .tick(time, viewport, &mut self.target, &mut self.hud, &self.clock)
    }

    // Once the loop has stopped, input still has to show up on screen.
    fn redraw_if_stopped(&mut self) {
        if self.frame.is_running() {
            return;
        }
        let viewport = self.viewport();
        self.frame
            .render(viewport, &mut self.target, &mut self.hud, &self.clock);
    }
}

impl InputSink for Viewer {
    fn key(&mut self, action: KeyAction) {
        log::debug!("key {:?}", action);
        self.frame.apply_key(action);
        self.redraw_if_stopped();
    }

    fn ui(&mut self, action: UiAction) {
        log::debug!("ui {:?}", action);
        self.frame.apply_ui(action);
        self.redraw_if_stopped();
    }

    fn drag(&mut self, dx: f64) {
        self.frame.apply_drag(dx);
        self.redraw_if_stopped();
    }
}

fn create_viewer(canvas: HtmlCanvasElement, config: ViewerConfig) -> error::Result<Viewer> {
    let window = web_sys::window().ok_or_else(|| ViewerError::Dom("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ViewerError::Dom("no document".into()))?;

    let gl: GL = canvas
        .get_context("webgl2")?
        .ok_or_else(|| ViewerError::Context("webgl2 is not available".into()))?
        .dyn_into::<GL>()
        .map_err(|_| ViewerError::Context("context is not WebGL2".into()))?;
    gl.viewport(0, 0, canvas.width() as i32, canvas.height() as i32);

    let shader = ShaderProgram::new(&gl)?;
    let target = WebGlTarget::new(gl, shader, config.clear_color)?;

    Ok(Viewer {
        frame: FrameOrchestrator::new(config),
        target,
        hud: DomHud::new(document),
        canvas,
        clock: PerformanceClock {
            performance: window.performance(),
        },
    })
}

/// Entry point called from the page. `config_json` may be omitted or empty
/// for the defaults.
#[wasm_bindgen]
pub fn start_viewer(canvas: HtmlCanvasElement, config_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config = ViewerConfig::from_json(config_json.as_deref().unwrap_or(""))?;
    if console_log::init_with_level(config.log_level()?).is_err() {
        log::debug!("logger already installed");
    }
    log::info!(
        "starting viewer: dome {} segments, radius {}",
        config.dome_segments,
        config.dome_radius
    );

    let viewer = create_viewer(canvas.clone(), config)?;
    log::info!("scene objects: {:?}", viewer.frame.object_names());
    let viewer = Rc::new(RefCell::new(viewer));

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    input::bind_controls(&document, viewer.clone())?;
    input::enable_keyboard_controls(&document, viewer.clone())?;
    input::enable_mouse_controls(&canvas, viewer.clone())?;

    animate(viewer);
    Ok(())
}

fn request_animation_frame(f: &Closure<dyn FnMut(f64)>) {
    let Some(window) = web_sys::window() else {
        log::error!("no window to schedule a frame on");
        return;
    };
    if let Err(err) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {:?}", err);
    }
}

fn animate(viewer: Rc<RefCell<Viewer>>) {
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    let closure = Closure::wrap(Box::new(move |time: f64| {
        if viewer.borrow_mut().tick(time) == FrameOutcome::Stop {
            return;
        }

        // Schedule next frame
        if let Some(next) = f.borrow().as_ref() {
            request_animation_frame(next);
        }
    }) as Box<dyn FnMut(f64)>);

    *g.borrow_mut() = Some(closure);

    if let Some(first) = g.borrow().as_ref() {
        request_animation_frame(first);
    };
}
