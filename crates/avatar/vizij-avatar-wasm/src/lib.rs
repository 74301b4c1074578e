use js_sys::JSON;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_avatar_core::{parse_rig_json, AudioEvent, Avatar, Config, LoadOutcome, LoadTicket};

#[wasm_bindgen]
pub struct VizijAvatar {
    core: Avatar,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn parse_config(config: JsValue) -> Result<Config, JsError> {
    let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
        Config::default()
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
    };
    cfg.validate()
        .map_err(|e| JsError::new(&format!("config error: {e}")))?;
    Ok(cfg)
}

fn outcome_str(outcome: LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Bound => "bound",
        LoadOutcome::Discarded => "discarded",
        LoadOutcome::Failed => "failed",
    }
    .to_string()
}

/// Snapshot of the animation state returned by `state()`.
#[derive(Serialize)]
struct StateView<'a> {
    speaking: bool,
    elapsed: f64,
    mouth_openness: f32,
    blink: f32,
    happy: f32,
    model_url: Option<&'a str>,
    pending_load: Option<u32>,
    skeletal: bool,
}

#[wasm_bindgen]
impl VizijAvatar {
    /// Create an avatar. Pass a JSON config object or undefined/null for
    /// defaults. Example:
    ///   new VizijAvatar({ pose: { arm_rest_angle: 1.0 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijAvatar, JsError> {
        console_error_panic_hook::set_once();
        Ok(VizijAvatar {
            core: Avatar::new(parse_config(config)?),
        })
    }

    /// Replace the tuning config. Takes effect on the next update.
    #[wasm_bindgen(js_name = set_config)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let cfg = parse_config(config)?;
        self.core
            .set_config(cfg)
            .map_err(|e| JsError::new(&format!("config error: {e}")))
    }

    /// Request a model by URL (null/undefined/"" clears it). Returns the load
    /// ticket to pass back to `complete_load`/`fail_load`, or undefined when
    /// nothing needs loading.
    #[wasm_bindgen(js_name = set_model)]
    pub fn set_model(&mut self, url: Option<String>) -> Option<u32> {
        self.core.set_model(url.as_deref()).map(|t| t.0)
    }

    /// Hand back a fetched and decoded rig description (see the fixtures for
    /// the shape: `{ name, joints: [{ name, parent?, rotation? }], expressions }`).
    /// Returns "bound", "discarded" (superseded request) or "failed".
    #[wasm_bindgen(js_name = complete_load)]
    pub fn complete_load(&mut self, ticket: u32, rig: JsValue) -> Result<String, JsError> {
        if jsvalue_is_undefined_or_null(&rig) {
            return Err(JsError::new("complete_load: rig is null/undefined"));
        }
        // Stringify the JS object so we can reuse the core parser (expects &str)
        let s = JSON::stringify(&rig)
            .map_err(|e| JsError::new(&format!("complete_load stringify error: {:?}", e)))?
            .as_string()
            .ok_or_else(|| JsError::new("complete_load: stringify produced non-string"))?;
        let outcome = self.core.complete_load(LoadTicket(ticket), parse_rig_json(&s));
        Ok(outcome_str(outcome))
    }

    /// Report that fetching/decoding the model for `ticket` failed.
    #[wasm_bindgen(js_name = fail_load)]
    pub fn fail_load(&mut self, ticket: u32, reason: String) -> String {
        outcome_str(self.core.fail_load(LoadTicket(ticket), reason))
    }

    #[wasm_bindgen(js_name = set_speaking)]
    pub fn set_speaking(&mut self, speaking: bool) {
        self.core.set_speaking(speaking);
    }

    /// Forward a media element event by name: "play", "ended" or "pause".
    #[wasm_bindgen(js_name = audio_event)]
    pub fn audio_event(&mut self, name: &str) -> Result<(), JsError> {
        let event: AudioEvent = name.parse().map_err(|e: String| JsError::new(&e))?;
        self.core.handle_audio_event(event);
        Ok(())
    }

    /// Step by dt (seconds). Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f32) -> Result<JsValue, JsError> {
        let out = self.core.update(dt);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Apply speaking/model and step once. Returns Outputs JSON; a ticket
    /// raised by a model change is reported in its `LoadStarted` event.
    #[wasm_bindgen]
    pub fn render(
        &mut self,
        speaking: bool,
        model: Option<String>,
        dt: f32,
    ) -> Result<JsValue, JsError> {
        let out = self.core.render(speaking, model.as_deref(), dt);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        let s = self.core.state();
        let view = StateView {
            speaking: s.speaking,
            elapsed: s.elapsed,
            mouth_openness: s.mouth_openness,
            blink: s.expressions.blink,
            happy: s.expressions.happy,
            model_url: self.core.model_url(),
            pending_load: self.core.pending_load().map(|t| t.0),
            skeletal: self.core.body().is_skeletal(),
        };
        swb::to_value(&view).map_err(|e| JsError::new(&format!("state error: {e}")))
    }

    /// Cancel pending loads and dispose the model. Returns the remaining
    /// events as a JSON array.
    #[wasm_bindgen]
    pub fn unmount(&mut self) -> Result<JsValue, JsError> {
        let events = self.core.unmount();
        swb::to_value(&events).map_err(|e| JsError::new(&format!("events error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
