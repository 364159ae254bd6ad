//! The hazard arbiter: one owned state struct behind every entry point.
//!
//! Every call runs to completion and returns what the display, the speaker
//! and the transition log should see. The arbiter owns no clock: callers pass
//! a logical `now_ms` and drive [`HazardArbiter::advance`] at
//! [`HazardArbiter::next_deadline`].

mod arbitrated;
mod direct;
mod expiry;

use crate::assets::Image;
use crate::audio::{AudioRequest, AudioSelector};
use crate::blink::{BlinkMachine, BlinkTarget};
use crate::config::{ArbiterConfig, SuppressionFlags};
use crate::directive::{DirectiveEmitter, Dispatch, DisplayDirective, HazardSource, TransitionEvent};
use crate::error::ArbiterResult;
use crate::event::{HazardEvent, HazardKind};
use crate::message::{self, InboundMessage};
use crate::queue::ArbitrationQueue;
use crate::substate::{PedestrianCrossingState, RailCrossingState, Rung, SeverityTracker, TransitZones};
use crate::timer::{DwellTimerRegistry, TimerKey};
use std::collections::BTreeMap;

/// Output collected while one entry point runs.
#[derive(Debug, Default)]
struct Cycle {
    transitions: Vec<TransitionEvent>,
    audio: AudioRequest,
    source: Option<HazardSource>,
}

impl Cycle {
    fn for_event(event: &HazardEvent) -> Self {
        Self {
            source: Some(HazardSource::from(event)),
            ..Self::default()
        }
    }

    fn log(&mut self, pre_state: Image, post_state: Image) {
        self.transitions.push(TransitionEvent {
            pre_state,
            post_state,
            source: self.source.clone(),
        });
    }
}

/// Arbitration state for one display session.
#[derive(Debug)]
pub struct HazardArbiter {
    config: ArbiterConfig,
    flags: SuppressionFlags,
    connected: bool,

    queue: ArbitrationQueue,
    timers: DwellTimerRegistry,

    pedestrian: PedestrianCrossingState,
    pedestrian_shown: bool,
    transit: TransitZones,
    rail: RailCrossingState,
    turning: SeverityTracker,
    forward: SeverityTracker,
    brake: SeverityTracker,
    curve: SeverityTracker,

    background: Image,
    surface: Image,
    banner: Option<String>,
    overlay_blink: Option<BlinkMachine>,
    surface_blink: Option<BlinkMachine>,
    timed: BTreeMap<TimerKey, Image>,

    audio: AudioSelector,
    emitter: DirectiveEmitter,
}

impl HazardArbiter {
    /// Create an arbiter showing the splash image until [`Self::connect`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ArbiterConfig) -> ArbiterResult<Self> {
        config.validate()?;
        Ok(Self {
            audio: AudioSelector::new(config.audio_hold_ms),
            config,
            flags: SuppressionFlags::default(),
            connected: false,
            queue: ArbitrationQueue::new(),
            timers: DwellTimerRegistry::new(),
            pedestrian: PedestrianCrossingState::new(),
            pedestrian_shown: false,
            transit: TransitZones::new(),
            rail: RailCrossingState::new(),
            turning: SeverityTracker::new(),
            forward: SeverityTracker::new(),
            brake: SeverityTracker::new(),
            curve: SeverityTracker::new(),
            background: Image::SystemReady,
            surface: Image::Splash,
            banner: None,
            overlay_blink: None,
            surface_blink: None,
            timed: BTreeMap::new(),
            emitter: DirectiveEmitter::new(),
        })
    }

    /// Create an arbiter with suppression flags already set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_flags(config: ArbiterConfig, flags: SuppressionFlags) -> ArbiterResult<Self> {
        let mut arbiter = Self::new(config)?;
        arbiter.flags = flags;
        Ok(arbiter)
    }

    /// Decode and handle one raw inbound envelope.
    ///
    /// Malformed and unroutable input is logged and dropped.
    pub fn handle_message(&mut self, raw: &str, now_ms: u64) -> Dispatch {
        match message::decode(raw) {
            Ok(InboundMessage::Hazard(event)) => self.handle_event(event, now_ms),
            Ok(InboundMessage::Config(entries)) => {
                for entry in entries {
                    tracing::info!(name = %entry.name, value = %entry.value, "host config entry");
                }
                Dispatch::default()
            }
            Ok(InboundMessage::ModuleStatus(status)) => {
                tracing::trace!(status = %status, "module status");
                Dispatch::default()
            }
            Ok(InboundMessage::Ignored(header)) => {
                tracing::trace!(header = %header, "ignoring message");
                Dispatch::default()
            }
            Err(err) => {
                tracing::debug!(error = %err, "dropping inbound message");
                Dispatch::default()
            }
        }
    }

    /// Handle one hazard event.
    ///
    /// Timers due before `now_ms` are not fired here; call
    /// [`Self::advance`] first.
    pub fn handle_event(&mut self, event: HazardEvent, now_ms: u64) -> Dispatch {
        tracing::debug!(
            hazard = %event.hazard_type,
            code = %event.event_code,
            instance = %event.instance_id,
            severity = event.severity,
            "hazard event"
        );
        let mut cycle = Cycle::for_event(&event);
        match event.hazard_type.kind() {
            HazardKind::PedestrianCrossing
            | HazardKind::VehicleTurning
            | HazardKind::TransitStopPedestrian
            | HazardKind::RedLightViolation => self.arbitrate(event, now_ms, &mut cycle),
            HazardKind::ForwardCollision => self.forward_collision(&event, now_ms, &mut cycle),
            HazardKind::EmergencyBrakeLight => self.brake_light(&event, now_ms, &mut cycle),
            HazardKind::CurveSpeed => self.curve_speed(&event, now_ms, &mut cycle),
            HazardKind::RailCrossing => self.rail_crossing(&event, now_ms, &mut cycle),
        }
        self.finish(cycle, now_ms)
    }

    /// Session connected: show the idle background.
    pub fn connect(&mut self, now_ms: u64) -> Dispatch {
        tracing::info!(background = ?self.background, "display session connected");
        self.connected = true;
        self.emitter.forget();
        self.hide_pedestrian();
        self.set_surface(self.background);
        self.finish(Cycle::default(), now_ms)
    }

    /// Session lost: drop every hazard, timer and sub-state and show the splash.
    pub fn disconnect(&mut self, now_ms: u64) -> Dispatch {
        tracing::info!(
            active = ?self.queue.active_kind(),
            pending = self.queue.pending_len(),
            "display session disconnected, clearing all hazards"
        );
        self.connected = false;
        self.queue.clear();
        self.timers.cancel_all();
        self.timed.clear();
        self.pedestrian = PedestrianCrossingState::new();
        self.transit.reset();
        self.rail = RailCrossingState::new();
        for tracker in [
            &mut self.turning,
            &mut self.forward,
            &mut self.brake,
            &mut self.curve,
        ] {
            tracker.exit();
        }
        self.hide_pedestrian();
        self.background = Image::SystemReady;
        self.banner = None;
        self.set_surface(Image::Splash);

        let mut cycle = Cycle::default();
        cycle.audio.stop();
        self.finish(cycle, now_ms)
    }

    /// Replace the suppression flags, re-sending the frame if output reopened.
    pub fn set_flags(&mut self, flags: SuppressionFlags, now_ms: u64) -> Dispatch {
        if flags != self.flags {
            tracing::info!(flags = ?flags, "suppression flags changed");
        }
        self.flags = flags;
        self.finish(Cycle::default(), now_ms)
    }

    /// Earliest instant at which [`Self::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        [
            self.timers.next_deadline(),
            self.overlay_blink.as_ref().map(BlinkMachine::next_flip_ms),
            self.surface_blink.as_ref().map(BlinkMachine::next_flip_ms),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Hazard currently displayed.
    pub fn active(&self) -> Option<&HazardEvent> {
        self.queue.active()
    }

    /// Pending hazards, front first.
    pub fn pending(&self) -> impl Iterator<Item = &HazardEvent> {
        self.queue.pending()
    }

    /// Idle background the surface falls back to.
    pub fn background(&self) -> Image {
        self.background
    }

    /// Surface image as currently drawn, including the blink phase.
    pub fn surface_image(&self) -> Image {
        self.surface_blink
            .as_ref()
            .and_then(BlinkMachine::surface_frame)
            .unwrap_or(self.surface)
    }

    /// Frame the arbiter would draw right now.
    pub fn current_display(&self) -> DisplayDirective {
        self.compose()
    }

    /// Whether a transit-stop episode is active.
    pub fn is_transit_active(&self) -> bool {
        self.transit.is_active()
    }

    /// Current rail-crossing rung.
    pub fn rail_rung(&self) -> Rung {
        self.rail.rung()
    }

    /// Pedestrian-crossing slots.
    pub fn pedestrian(&self) -> &PedestrianCrossingState {
        &self.pedestrian
    }

    /// Number of live dwell timers.
    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    /// Whether the display session is connected.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Active suppression flags.
    pub fn flags(&self) -> SuppressionFlags {
        self.flags
    }

    /// Active configuration.
    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    fn compose(&self) -> DisplayDirective {
        let mut visible_zones = Vec::new();
        if self.pedestrian_shown
            && self
                .overlay_blink
                .as_ref()
                .is_none_or(BlinkMachine::overlays_visible)
        {
            visible_zones.extend(self.pedestrian.overlays());
        }
        visible_zones.extend(self.transit.visible_images());

        DisplayDirective {
            surface_image: self.surface_image(),
            visible_zones,
            blink_interval_ms: self
                .surface_blink
                .as_ref()
                .or(self.overlay_blink.as_ref())
                .map(BlinkMachine::interval_ms),
            bottom_banner_text: self.banner.clone(),
        }
    }

    fn finish(&mut self, cycle: Cycle, now_ms: u64) -> Dispatch {
        let audio = self
            .audio
            .select(cycle.audio, now_ms, self.flags.audio_allowed());
        let composed = self.compose();
        self.emitter.emit(composed, cycle.transitions, audio, self.flags)
    }

    /// Put `image` on the surface, ending any surface blink.
    ///
    /// Returns the image that was drawn before.
    fn set_surface(&mut self, image: Image) -> Image {
        let previous = self.surface_image();
        self.surface_blink = None;
        self.surface = image;
        previous
    }

    /// Set the surface and log the change when it is visible.
    fn show_surface(&mut self, image: Image, cycle: &mut Cycle) {
        let previous = self.set_surface(image);
        if previous != image {
            cycle.log(previous, image);
        }
    }

    fn start_surface_blink(&mut self, a: Image, b: Image, now_ms: u64) {
        self.surface = a;
        self.surface_blink = Some(BlinkMachine::start(
            BlinkTarget::Surface { a, b },
            self.config.rail_blink_interval_ms,
            now_ms,
        ));
    }

    fn hide_pedestrian(&mut self) {
        self.pedestrian_shown = false;
        self.overlay_blink = None;
    }

    /// Show `image` until its instance timer expires.
    fn show_timed(&mut self, event: &HazardEvent, image: Image, now_ms: u64, cycle: &mut Cycle) {
        let key = TimerKey::Instance(event.hazard_type.kind(), event.instance_id.clone());
        self.show_surface(image, cycle);
        self.timers.arm(
            key.clone(),
            now_ms,
            event.effective_dwell_ms(self.config.timed_image_dwell_ms),
        );
        self.timed.insert(key, image);
    }
}
