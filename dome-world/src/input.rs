use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, HtmlInputElement};

use crate::scene::{Axis, Channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    MoveForward,
    MoveBackwards,
    MoveLeft,
    MoveRight,
    PanLeft,
    PanRight,
    ToggleNormals,
    ToggleLight,
}

impl KeyAction {
    /// Maps a `KeyboardEvent.key` value, ignoring case.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "w" => Some(KeyAction::MoveForward),
            "s" => Some(KeyAction::MoveBackwards),
            "a" => Some(KeyAction::MoveLeft),
            "d" => Some(KeyAction::MoveRight),
            "q" => Some(KeyAction::PanLeft),
            "e" => Some(KeyAction::PanRight),
            "n" => Some(KeyAction::ToggleNormals),
            "l" => Some(KeyAction::ToggleLight),
            _ => None,
        }
    }
}

/// A change requested through the page controls. Slider values are raw
/// slider units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    Reset,
    NormalVisualization(bool),
    Light(bool),
    LightSlider(Axis, f32),
    LightColorSlider(Channel, f32),
    Spotlight(bool),
    SpotlightCutoff(f32),
    Animate(bool),
}

/// Receiver of decoded input.
pub trait InputSink {
    fn key(&mut self, action: KeyAction);
    fn ui(&mut self, action: UiAction);
    /// Horizontal mouse drag of `dx` pixels.
    fn drag(&mut self, dx: f64);
}

/// Mouse-drag tracking: only horizontal motion while the button is held
/// produces a delta.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DragState {
    down: bool,
    last_x: f64,
}

impl DragState {
    pub fn press(&mut self, x: f64) {
        self.down = true;
        self.last_x = x;
    }

    pub fn release(&mut self) {
        self.down = false;
    }

    pub fn move_to(&mut self, x: f64) -> Option<f64> {
        if !self.down {
            return None;
        }
        let dx = x - self.last_x;
        self.last_x = x;
        if dx == 0.0 {
            None
        } else {
            Some(dx)
        }
    }
}

const BUTTONS: [(&str, UiAction); 9] = [
    ("resetButton", UiAction::Reset),
    ("normalOn", UiAction::NormalVisualization(true)),
    ("normalOff", UiAction::NormalVisualization(false)),
    ("lightOn", UiAction::Light(true)),
    ("lightOff", UiAction::Light(false)),
    ("spotlightOn", UiAction::Spotlight(true)),
    ("spotlightOff", UiAction::Spotlight(false)),
    ("animationOnButton", UiAction::Animate(true)),
    ("animationOffButton", UiAction::Animate(false)),
];

const SLIDERS: [&str; 7] = [
    "lightSlideX",
    "lightSlideY",
    "lightSlideZ",
    "lightColorR",
    "lightColorG",
    "lightColorB",
    "spotlightCutoff",
];

/// The action a slider with this id produces for `value`.
pub fn slider_action(id: &str, value: f32) -> Option<UiAction> {
    match id {
        "lightSlideX" => Some(UiAction::LightSlider(Axis::X, value)),
        "lightSlideY" => Some(UiAction::LightSlider(Axis::Y, value)),
        "lightSlideZ" => Some(UiAction::LightSlider(Axis::Z, value)),
        "lightColorR" => Some(UiAction::LightColorSlider(Channel::R, value)),
        "lightColorG" => Some(UiAction::LightColorSlider(Channel::G, value)),
        "lightColorB" => Some(UiAction::LightColorSlider(Channel::B, value)),
        "spotlightCutoff" => Some(UiAction::SpotlightCutoff(value)),
        _ => None,
    }
}

/// Wires the page buttons and sliders. Missing elements are logged and
/// skipped.
pub fn bind_controls<S: InputSink + 'static>(
    document: &Document,
    sink: Rc<RefCell<S>>,
) -> Result<(), JsValue> {
    for (id, action) in BUTTONS {
        let Some(element) = document.get_element_by_id(id) else {
            log::warn!("missing UI element #{}", id);
            continue;
        };
        let sink = sink.clone();
        let on_click = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            sink.borrow_mut().ui(action);
        }) as Box<dyn FnMut(_)>);
        element.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    for id in SLIDERS {
        let Some(element) = document.get_element_by_id(id) else {
            log::warn!("missing UI element #{}", id);
            continue;
        };
        let input: HtmlInputElement = match element.dyn_into() {
            Ok(input) => input,
            Err(_) => {
                log::warn!("#{} is not an input element", id);
                continue;
            }
        };
        let sink = sink.clone();
        let slider = input.clone();
        let on_input = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            match slider.value().parse::<f32>() {
                Ok(value) => {
                    if let Some(action) = slider_action(id, value) {
                        sink.borrow_mut().ui(action);
                    }
                }
                Err(_) => log::warn!("#{} has non-numeric value '{}'", id, slider.value()),
            }
        }) as Box<dyn FnMut(_)>);
        input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
        on_input.forget();
    }

    Ok(())
}

pub fn enable_keyboard_controls<S: InputSink + 'static>(
    document: &Document,
    sink: Rc<RefCell<S>>,
) -> Result<(), JsValue> {
    let on_key_down = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        let key = event.key();
        // keep space from scrolling the page
        if key == " " {
            event.prevent_default();
        }
        if let Some(action) = KeyAction::from_key(&key) {
            sink.borrow_mut().key(action);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", on_key_down.as_ref().unchecked_ref())?;
    on_key_down.forget();
    Ok(())
}

pub fn enable_mouse_controls<S: InputSink + 'static>(
    canvas: &HtmlCanvasElement,
    sink: Rc<RefCell<S>>,
) -> Result<(), JsValue> {
    let drag = Rc::new(RefCell::new(DragState::default()));

    // Mouse down event
    let drag_clone = drag.clone();
    let on_mouse_down = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        drag_clone.borrow_mut().press(event.client_x() as f64);
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousedown", on_mouse_down.as_ref().unchecked_ref())?;
    on_mouse_down.forget();

    // Mouse move event
    let drag_clone = drag.clone();
    let on_mouse_move = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        let dx = drag_clone.borrow_mut().move_to(event.client_x() as f64);
        if let Some(dx) = dx {
            sink.borrow_mut().drag(dx);
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousemove", on_mouse_move.as_ref().unchecked_ref())?;
    on_mouse_move.forget();

    // Mouse up event
    let on_mouse_up = Closure::wrap(Box::new(move |_event: web_sys::MouseEvent| {
        drag.borrow_mut().release();
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mouseup", on_mouse_up.as_ref().unchecked_ref())?;
    on_mouse_up.forget();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_case_insensitively() {
        assert_eq!(KeyAction::from_key("w"), Some(KeyAction::MoveForward));
        assert_eq!(KeyAction::from_key("W"), Some(KeyAction::MoveForward));
        assert_eq!(KeyAction::from_key("E"), Some(KeyAction::PanRight));
        assert_eq!(KeyAction::from_key("l"), Some(KeyAction::ToggleLight));
        assert_eq!(KeyAction::from_key(" "), None);
        assert_eq!(KeyAction::from_key("ArrowUp"), None);
    }

    #[test]
    fn drag_only_reports_while_pressed() {
        let mut drag = DragState::default();
        assert_eq!(drag.move_to(10.0), None);
        drag.press(10.0);
        assert_eq!(drag.move_to(14.0), Some(4.0));
        assert_eq!(drag.move_to(14.0), None);
        assert_eq!(drag.move_to(9.0), Some(-5.0));
        drag.release();
        assert_eq!(drag.move_to(100.0), None);
    }

    #[test]
    fn sliders_map_to_actions() {
        for id in SLIDERS {
            assert!(slider_action(id, 1.0).is_some(), "{} unmapped", id);
        }
        assert_eq!(slider_action("lightSlideX", 150.0), Some(UiAction::LightSlider(Axis::X, 150.0)));
        assert_eq!(slider_action("spotlightCutoff", 45.0), Some(UiAction::SpotlightCutoff(45.0)));
        assert_eq!(slider_action("volume", 1.0), None);
    }
}
