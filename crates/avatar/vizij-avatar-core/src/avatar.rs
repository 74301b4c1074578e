//! Avatar: owns the animation state, the pending load and the active body,
//! and exposes the per-frame update.
//!
//! Methods:
//! - new, set_model (last request wins), complete_load / fail_load,
//!   set_speaking / handle_audio_event, update, render, unmount

use log::{debug, info, warn};

use crate::binding::bind;
use crate::config::Config;
use crate::error::AvatarError;
use crate::expression;
use crate::ids::{LoadTicket, LoadTracker};
use crate::inputs::AudioEvent;
use crate::outputs::{AvatarEvent, Outputs, Visual};
use crate::primitive::PrimitiveBody;
use crate::skeletal::SkeletalBody;
use crate::skeleton::Skeleton;
use crate::smoothing::sanitize_dt;
use crate::state::{AnimationState, Transition};
use crate::Result;

/// Capability shared by every avatar variant: advance one frame from the
/// shared animation state and describe what to draw.
pub trait AvatarBody {
    fn animate(&mut self, state: &AnimationState, cfg: &Config, dt: f32, out: &mut Visual);
}

/// The active avatar variant. Skeletal only while a bound asset exists;
/// primitive whenever no asset is bound (none requested, pending or failed).
#[derive(Debug)]
pub enum Body {
    Skeletal(Box<SkeletalBody>),
    Primitive(PrimitiveBody),
}

impl AvatarBody for Body {
    fn animate(&mut self, state: &AnimationState, cfg: &Config, dt: f32, out: &mut Visual) {
        match self {
            Body::Skeletal(b) => b.as_mut().animate(state, cfg, dt, out),
            Body::Primitive(b) => b.animate(state, cfg, dt, out),
        }
    }
}

impl Body {
    pub fn as_skeletal(&self) -> Option<&SkeletalBody> {
        match self {
            Body::Skeletal(b) => Some(&**b),
            Body::Primitive(_) => None,
        }
    }

    pub fn is_skeletal(&self) -> bool {
        matches!(self, Body::Skeletal(_))
    }
}

/// What happened to a completed load.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LoadOutcome {
    /// The skeleton was bound and is now rendered.
    Bound,
    /// A newer request superseded this one; nothing changed.
    Discarded,
    /// The load failed or the asset was unbindable; the fallback stays.
    Failed,
}

#[derive(Debug)]
pub struct Avatar {
    cfg: Config,
    state: AnimationState,
    loads: LoadTracker,
    model_url: Option<String>,
    body: Body,

    // Raised between updates, handed out with the next one.
    events: Vec<AvatarEvent>,
    outputs: Outputs,
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Avatar {
    /// Create an avatar showing the primitive body. The config is used as-is;
    /// call [`Config::validate`] first for untrusted input.
    pub fn new(cfg: Config) -> Self {
        Self {
            body: Body::Primitive(PrimitiveBody::new(&cfg)),
            cfg,
            state: AnimationState::new(),
            loads: LoadTracker::new(),
            model_url: None,
            events: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Replace the config. Takes effect on the next update; an existing
    /// binding is kept.
    pub fn set_config(&mut self, cfg: Config) -> Result<()> {
        cfg.validate()?;
        self.cfg = cfg;
        Ok(())
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn model_url(&self) -> Option<&str> {
        self.model_url.as_deref()
    }

    pub fn pending_load(&self) -> Option<LoadTicket> {
        self.loads.pending()
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.body.as_skeletal().map(|b| b.skeleton())
    }

    /// Request a new model. The current skeleton (if any) is disposed and any
    /// in-flight load is superseded. Returns the ticket the host must hand
    /// back to [`Avatar::complete_load`]; `None` when nothing needs loading.
    ///
    /// Requesting the URL that is already shown or pending is a no-op.
    pub fn set_model(&mut self, url: Option<&str>) -> Option<LoadTicket> {
        let url = url.filter(|u| !u.is_empty());
        if url == self.model_url.as_deref() {
            return None;
        }

        if let Some(stale) = self.loads.cancel() {
            debug!("avatar: superseding in-flight load {stale:?}");
        }
        self.dispose_skeleton();
        self.model_url = url.map(str::to_string);

        let url = url?;
        let ticket = self.loads.begin(url);
        self.events.push(AvatarEvent::LoadStarted {
            url: url.to_string(),
            ticket,
        });
        Some(ticket)
    }

    /// Hand a finished load back. Stale tickets are discarded silently; the
    /// current one is bound atomically or falls back to the primitive body.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: core::result::Result<Skeleton, AvatarError>,
    ) -> LoadOutcome {
        let Some(url) = self.loads.resolve(ticket) else {
            debug!("avatar: discarding stale load {ticket:?}");
            return LoadOutcome::Discarded;
        };

        let bound = result.and_then(|mut skeleton| {
            let binding = bind(
                &mut skeleton,
                &self.cfg.binding,
                &self.cfg.expression.channels,
                &self.cfg.pose,
            )?;
            Ok((skeleton, binding))
        });

        match bound {
            Ok((skeleton, binding)) => {
                self.events.push(AvatarEvent::SkeletonBound {
                    url: url.clone(),
                    bound: binding.roles.bound().map(|(r, _)| r).collect(),
                    missing: binding.roles.missing().collect(),
                    channels: binding.expressions.len(),
                });
                self.body = Body::Skeletal(Box::new(SkeletalBody::new(url, skeleton, binding)));
                LoadOutcome::Bound
            }
            Err(e) => {
                warn!("avatar: load of '{url}' failed: {e}");
                self.events.push(AvatarEvent::LoadFailed {
                    url,
                    reason: e.to_string(),
                });
                LoadOutcome::Failed
            }
        }
    }

    /// Report a failed fetch/decode for `ticket`.
    pub fn fail_load(&mut self, ticket: LoadTicket, reason: impl ToString) -> LoadOutcome {
        let url = self.loads.pending_url().unwrap_or_default().to_string();
        self.complete_load(ticket, Err(AvatarError::asset_load(url, reason)))
    }

    pub fn set_speaking(&mut self, speaking: bool) {
        match self.state.set_speaking(speaking) {
            Some(Transition::Started) => self.events.push(AvatarEvent::SpeakingStarted),
            Some(Transition::Stopped) => self.events.push(AvatarEvent::SpeakingStopped),
            None => {}
        }
    }

    pub fn handle_audio_event(&mut self, event: AudioEvent) {
        self.set_speaking(event.speaking());
    }

    /// Advance one frame by `dt` seconds and describe what to draw.
    pub fn update(&mut self, dt: f32) -> &Outputs {
        let dt = sanitize_dt(dt, self.cfg.max_frame_delta);
        self.state.advance_clock(dt);
        expression::step(&mut self.state, dt, &self.cfg.expression, &self.cfg.rates);
        self.body
            .animate(&self.state, &self.cfg, dt, &mut self.outputs.visual);

        self.outputs.clear_events();
        self.outputs.events.append(&mut self.events);
        &self.outputs
    }

    /// Single-call contract for hosts that re-render declaratively: apply the
    /// current inputs, then advance one frame.
    pub fn render(&mut self, speaking: bool, model: Option<&str>, dt: f32) -> &Outputs {
        self.set_model(model);
        self.set_speaking(speaking);
        self.update(dt)
    }

    /// Last outputs produced by [`Avatar::update`].
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Tear down: cancel any in-flight load and dispose the skeleton.
    /// Returns the events raised since the last update.
    pub fn unmount(&mut self) -> Vec<AvatarEvent> {
        self.loads.cancel();
        self.dispose_skeleton();
        self.model_url = None;
        std::mem::take(&mut self.events)
    }

    fn dispose_skeleton(&mut self) {
        if let Body::Skeletal(b) = &self.body {
            info!("avatar: disposing model '{}'", b.url());
            self.events.push(AvatarEvent::ModelDisposed {
                url: b.url().to_string(),
            });
            self.body = Body::Primitive(PrimitiveBody::new(&self.cfg));
        }
    }
}
