use web_sys::Document;

pub const TIMING_REGION: &str = "numdot";
pub const INSTRUCTIONS_REGION: &str = "instructions";
pub const INSTRUCTIONS: &str =
    "WASD: Move | Q/E: Rotate | N: Normal Vis | L: Toggle Light | Mouse: Look around";

/// Somewhere to put the per-frame diagnostic text.
pub trait Hud {
    fn show(&mut self, region: &str, text: &str);
}

/// Frame time and the frame rate it implies, one decimal place.
pub fn timing_text(duration_ms: f64) -> String {
    if duration_ms <= 0.0 {
        return " ms: 0 fps: -".to_string();
    }
    let fps = (10000.0 / duration_ms).floor() / 10.0;
    format!(" ms: {} fps: {}", duration_ms.floor(), fps)
}

/// Writes into elements of the page by id.
pub struct DomHud {
    document: Document,
}

impl DomHud {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl Hud for DomHud {
    fn show(&mut self, region: &str, text: &str) {
        match self.document.get_element_by_id(region) {
            Some(element) => element.set_inner_html(text),
            None => log::warn!("failed to get {} from HTML", region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_text_formats_ms_and_fps() {
        assert_eq!(timing_text(16.0), " ms: 16 fps: 62.5");
        assert_eq!(timing_text(3.7), " ms: 3 fps: 270.2");
        assert_eq!(timing_text(1000.0), " ms: 1000 fps: 1");
    }

    #[test]
    fn zero_duration_has_no_rate() {
        assert_eq!(timing_text(0.0), " ms: 0 fps: -");
    }
}
