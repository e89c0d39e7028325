use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

pub mod animation;
pub mod bloom;
pub mod data;
pub mod error;
pub mod growth;
pub mod math;
pub mod render;
pub mod reveal;
pub mod scene;
pub mod snapshot;
pub mod visual;

// Re-export visual analyzer for JavaScript
pub use visual::metrics::VisualAnalyzer;

pub use animation::{Engine, Phase};
pub use data::EngineConfig;
pub use error::{EngineError, EngineResult};

use render::{Rect, WebCanvas};
use reveal::{Elapsed, Typewriter};

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One card bound to a browser canvas
#[wasm_bindgen]
pub struct BloomCard {
    engine: Engine<WebCanvas>,
}

#[wasm_bindgen]
impl BloomCard {
    /// Create a card on `canvas`. Without a YAML config the shipped card is used.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, width: u32, height: u32, config_yaml: Option<String>) -> Result<BloomCard, JsValue> {
        let config = match config_yaml {
            Some(yaml) => EngineConfig::from_yaml(&yaml),
            None => EngineConfig::card(),
        }
        .map_err(to_js)?;

        let surface = WebCanvas::from_canvas(&canvas, width, height).map_err(to_js)?;
        let engine = Engine::new(surface, width, height, config).map_err(to_js)?;
        Ok(Self { engine })
    }

    /// Redraw the waiting seed; a no-op once started
    #[wasm_bindgen]
    pub fn draw_idle(&mut self) -> Result<(), JsValue> {
        if self.engine.phase() != Phase::Idle {
            return Ok(());
        }
        self.engine.draw_idle().map_err(to_js)
    }

    /// Begin the sequence. Returns false when it was already running.
    #[wasm_bindgen]
    pub fn start(&mut self) -> Result<bool, JsValue> {
        self.engine.start().map_err(to_js)
    }

    /// Run one cadence step and return the phase name afterwards
    #[wasm_bindgen]
    pub fn tick(&mut self) -> Result<String, JsValue> {
        self.engine.tick().map(|phase| phase.to_string()).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        self.engine.phase().to_string()
    }

    #[wasm_bindgen]
    pub fn is_done(&self) -> bool {
        self.engine.is_done()
    }

    #[wasm_bindgen]
    pub fn can_scale(&self) -> bool {
        self.engine.can_scale()
    }

    #[wasm_bindgen]
    pub fn scale(&mut self, factor: f32) -> Result<(), JsValue> {
        self.engine.scale(factor).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn can_move(&self) -> bool {
        self.engine.can_move()
    }

    #[wasm_bindgen]
    pub fn move_seed(&mut self, dx: f32, dy: f32) -> Result<(), JsValue> {
        self.engine.move_seed(dx, dy).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn draw_footer(&mut self) -> Result<(), JsValue> {
        self.engine.draw_footer().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn can_grow(&self) -> bool {
        self.engine.can_grow()
    }

    #[wasm_bindgen]
    pub fn grow(&mut self) -> Result<bool, JsValue> {
        self.engine.grow().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn can_flower(&self) -> bool {
        self.engine.can_flower()
    }

    #[wasm_bindgen]
    pub fn flower(&mut self, batch: usize) -> Result<bool, JsValue> {
        self.engine.flower(batch).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn snapshot(&mut self, name: &str, x: i32, y: i32, width: i32, height: i32) -> Result<(), JsValue> {
        self.engine.snapshot(name, Rect::new(x, y, width, height)).map_err(to_js)
    }

    /// Slide a snapshot one step; true while it has further to go
    #[wasm_bindgen]
    pub fn pan(&mut self, name: &str, dx: i32, dy: i32) -> Result<bool, JsValue> {
        self.engine.pan(name, dx, dy).map_err(to_js)
    }

    /// Whether a pointer at (x, y) is over the seed (for a hand cursor)
    #[wasm_bindgen]
    pub fn seed_contains(&self, x: f32, y: f32) -> bool {
        self.engine.seed_contains(x, y)
    }

    /// Current status as JSON
    #[wasm_bindgen]
    pub fn status(&self) -> String {
        format!(
            r#"{{"phase":"{}","blooms":{},"snapshots":{}}}"#,
            escape_json(&self.engine.phase().to_string()),
            self.engine.blooms().count(),
            self.engine.snapshots().len()
        )
    }

    /// Counter text for the time since `start_ms` (milliseconds since the epoch)
    #[wasm_bindgen]
    pub fn elapsed_since(start_ms: f64) -> String {
        Elapsed::between_millis(start_ms, js_sys::Date::now()).to_string()
    }

    /// CSS scale that fits the card into the viewport
    #[wasm_bindgen]
    pub fn fit_scale(viewport_width: f32, viewport_height: f32, width: f32, height: f32) -> f32 {
        reveal::fit_scale(viewport_width, viewport_height, width, height)
    }
}

/// Typewriter reveal of the closing message
#[wasm_bindgen]
pub struct MessageReveal {
    typewriter: Typewriter,
}

#[wasm_bindgen]
impl MessageReveal {
    #[wasm_bindgen(constructor)]
    pub fn new(markup: &str) -> MessageReveal {
        Self {
            typewriter: Typewriter::new(markup),
        }
    }

    /// Reveal the next character; false once everything is shown
    #[wasm_bindgen]
    pub fn step(&mut self) -> bool {
        self.typewriter.step()
    }

    /// Markup to assign to `innerHTML`
    #[wasm_bindgen]
    pub fn render(&self) -> String {
        self.typewriter.render()
    }

    #[wasm_bindgen]
    pub fn is_done(&self) -> bool {
        self.typewriter.is_done()
    }
}

/// Escape special characters for JSON
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
