//! Trigger-volume detection sensor.
//!
//! A [`DetectionSensor`] sits on an entity that also owns a trigger
//! [`Collider`](crate::components::collider::Collider). When another entity
//! enters the volume, the sensor classifies it according to its
//! [`DetectionMethod`]:
//!
//! - `Tag`: the entity's [`Tag`] equals the configured tag
//! - `Layer`: the entity's [`PhysicsLayer`] is a member of the configured mask
//! - `GameObject`: the entity is exactly the configured target
//!
//! A match sets the detected flag, cancels any pending forget timer and
//! selects one of six [`DetectionSlot`]s from the method and whether line of
//! sight is required. When a matching entity leaves the volume, a forget timer
//! of `leave_duration` seconds is scheduled; only the most recent one can
//! clear the flag.
//!
//! The sensor never touches the ECS directly. It talks to the colliding
//! entity through [`DetectionSubject`] and to the timer queue through
//! [`ResetScheduler`], so the whole state machine can be driven by hand.
//!
//! # Related
//!
//! - [`crate::systems::detection`] – observers feeding trigger events into the sensor
//! - [`crate::components::detectionhandlers::DetectionHandlers`] – per-slot handlers
//! - [`crate::resources::leavetimers::LeaveTimers`] – the forget timer queue

use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::{Component, Entity};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::layer::{LayerMask, PhysicsLayer};
use crate::components::tag::Tag;
use crate::error::SensorConfigError;
use crate::resources::leavetimers::{ResetScheduler, TimerHandle};
use crate::systems::lineofsight::LineOfSightOutcome;

/// Default number of seconds before a sensor forgets a departed target.
pub const DEFAULT_LEAVE_DURATION: f32 = 2.0;
/// Default tag the first ray hit must carry for line of sight to be clear.
pub const DEFAULT_LINE_OF_SIGHT_TAG: &str = "Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    #[default]
    Tag,
    Layer,
    #[serde(alias = "game_object", alias = "entity")]
    GameObject,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Tag => "tag",
            DetectionMethod::Layer => "layer",
            DetectionMethod::GameObject => "gameobject",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionMethod {
    type Err = SensorConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tag" => Ok(DetectionMethod::Tag),
            "layer" => Ok(DetectionMethod::Layer),
            "gameobject" | "game_object" | "entity" => Ok(DetectionMethod::GameObject),
            other => Err(SensorConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// One of the six notification slots, keyed by (method, line of sight required).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionSlot {
    TagWithoutLineOfSight,
    TagWithLineOfSight,
    LayerWithoutLineOfSight,
    LayerWithLineOfSight,
    GameObjectWithoutLineOfSight,
    GameObjectWithLineOfSight,
}

impl DetectionSlot {
    pub const COUNT: usize = 6;

    pub const ALL: [DetectionSlot; Self::COUNT] = [
        DetectionSlot::TagWithoutLineOfSight,
        DetectionSlot::TagWithLineOfSight,
        DetectionSlot::LayerWithoutLineOfSight,
        DetectionSlot::LayerWithLineOfSight,
        DetectionSlot::GameObjectWithoutLineOfSight,
        DetectionSlot::GameObjectWithLineOfSight,
    ];

    pub fn new(method: DetectionMethod, line_of_sight_required: bool) -> Self {
        match (method, line_of_sight_required) {
            (DetectionMethod::Tag, false) => DetectionSlot::TagWithoutLineOfSight,
            (DetectionMethod::Tag, true) => DetectionSlot::TagWithLineOfSight,
            (DetectionMethod::Layer, false) => DetectionSlot::LayerWithoutLineOfSight,
            (DetectionMethod::Layer, true) => DetectionSlot::LayerWithLineOfSight,
            (DetectionMethod::GameObject, false) => DetectionSlot::GameObjectWithoutLineOfSight,
            (DetectionMethod::GameObject, true) => DetectionSlot::GameObjectWithLineOfSight,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn method(self) -> DetectionMethod {
        match self {
            DetectionSlot::TagWithoutLineOfSight | DetectionSlot::TagWithLineOfSight => {
                DetectionMethod::Tag
            }
            DetectionSlot::LayerWithoutLineOfSight | DetectionSlot::LayerWithLineOfSight => {
                DetectionMethod::Layer
            }
            DetectionSlot::GameObjectWithoutLineOfSight
            | DetectionSlot::GameObjectWithLineOfSight => DetectionMethod::GameObject,
        }
    }

    pub fn requires_line_of_sight(self) -> bool {
        matches!(
            self,
            DetectionSlot::TagWithLineOfSight
                | DetectionSlot::LayerWithLineOfSight
                | DetectionSlot::GameObjectWithLineOfSight
        )
    }
}

/// The minimal view of a colliding entity the classifier needs.
pub trait DetectionSubject {
    fn entity(&self) -> Entity;
    fn tag(&self) -> Option<&str>;
    fn layer(&self) -> Option<PhysicsLayer>;
}

/// [`DetectionSubject`] built from ECS query results.
#[derive(Debug, Clone, Copy)]
pub struct SubjectView<'a> {
    pub entity: Entity,
    pub tag: Option<&'a Tag>,
    pub layer: Option<&'a PhysicsLayer>,
}

impl DetectionSubject for SubjectView<'_> {
    fn entity(&self) -> Entity {
        self.entity
    }

    fn tag(&self) -> Option<&str> {
        self.tag.map(Tag::name)
    }

    fn layer(&self) -> Option<PhysicsLayer> {
        self.layer.copied()
    }
}

#[derive(Component, Debug, Clone)]
pub struct DetectionSensor {
    pub method: DetectionMethod,
    /// Tag compared against in [`DetectionMethod::Tag`] mode.
    pub tag: String,
    /// Layers accepted in [`DetectionMethod::Layer`] mode.
    pub layer_mask: LayerMask,
    /// Entity to detect in [`DetectionMethod::GameObject`] mode. Also the
    /// preferred line-of-sight target in every mode.
    pub target: Option<Entity>,
    pub line_of_sight_required: bool,
    /// Entity whose position is the origin of line-of-sight rays.
    pub line_of_sight_origin: Option<Entity>,
    /// Tag the first ray hit must carry for line of sight to be clear.
    pub line_of_sight_tag: String,
    /// Seconds a departed target stays detected.
    pub leave_duration: f32,
    detected: bool,
    pending_reset: Option<TimerHandle>,
    last_detected: Option<Entity>,
    last_line_of_sight: Option<LineOfSightOutcome>,
}

impl Default for DetectionSensor {
    fn default() -> Self {
        Self {
            method: DetectionMethod::Tag,
            tag: String::new(),
            layer_mask: LayerMask::NONE,
            target: None,
            line_of_sight_required: false,
            line_of_sight_origin: None,
            line_of_sight_tag: DEFAULT_LINE_OF_SIGHT_TAG.to_string(),
            leave_duration: DEFAULT_LEAVE_DURATION,
            detected: false,
            pending_reset: None,
            last_detected: None,
            last_line_of_sight: None,
        }
    }
}

impl DetectionSensor {
    /// Sensor that detects entities carrying `tag`.
    pub fn by_tag(tag: impl Into<String>) -> Self {
        Self {
            method: DetectionMethod::Tag,
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Sensor that detects entities whose layer is in `mask`.
    pub fn by_layer(mask: LayerMask) -> Self {
        Self {
            method: DetectionMethod::Layer,
            layer_mask: mask,
            ..Self::default()
        }
    }

    /// Sensor that detects exactly `target`.
    pub fn by_entity(target: Entity) -> Self {
        Self {
            method: DetectionMethod::GameObject,
            target: Some(target),
            ..Self::default()
        }
    }

    /// Require line of sight, casting rays from `origin`.
    pub fn with_line_of_sight(mut self, origin: Entity) -> Self {
        self.line_of_sight_required = true;
        self.line_of_sight_origin = Some(origin);
        self
    }

    pub fn with_line_of_sight_tag(mut self, tag: impl Into<String>) -> Self {
        self.line_of_sight_tag = tag.into();
        self
    }

    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_leave_duration(mut self, seconds: f32) -> Self {
        self.leave_duration = seconds;
        self
    }

    /// Start in the detected state.
    pub fn initially_detected(mut self, detected: bool) -> Self {
        self.detected = detected;
        self
    }

    /// Check that this configuration can ever work.
    pub fn validate(&self) -> Result<(), SensorConfigError> {
        match self.method {
            DetectionMethod::Tag if self.tag.is_empty() => {
                return Err(SensorConfigError::EmptyTag);
            }
            DetectionMethod::Layer if self.layer_mask.is_empty() => {
                return Err(SensorConfigError::EmptyLayerMask);
            }
            DetectionMethod::GameObject if self.target.is_none() => {
                return Err(SensorConfigError::MissingTarget);
            }
            _ => {}
        }
        if !self.leave_duration.is_finite() || self.leave_duration < 0.0 {
            return Err(SensorConfigError::InvalidLeaveDuration(self.leave_duration));
        }
        if self.line_of_sight_required && self.line_of_sight_origin.is_none() {
            return Err(SensorConfigError::MissingLineOfSightOrigin);
        }
        Ok(())
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    pub fn pending_reset(&self) -> Option<TimerHandle> {
        self.pending_reset
    }

    /// Most recent entity that matched this sensor.
    pub fn last_detected(&self) -> Option<Entity> {
        self.last_detected
    }

    pub fn last_line_of_sight(&self) -> Option<LineOfSightOutcome> {
        self.last_line_of_sight
    }

    pub(crate) fn record_line_of_sight(&mut self, outcome: LineOfSightOutcome) {
        self.last_line_of_sight = Some(outcome);
    }

    /// The slot this sensor notifies on every detection.
    pub fn slot(&self) -> DetectionSlot {
        DetectionSlot::new(self.method, self.line_of_sight_required)
    }

    /// Whether `subject` is what this sensor is looking for.
    pub fn classify(&self, subject: &impl DetectionSubject) -> bool {
        match self.method {
            DetectionMethod::Tag => subject.tag() == Some(self.tag.as_str()),
            DetectionMethod::Layer => subject
                .layer()
                .is_some_and(|layer| self.layer_mask.contains(layer)),
            DetectionMethod::GameObject => self.target == Some(subject.entity()),
        }
    }

    /// Handle `subject` entering the volume.
    ///
    /// Returns the slot to notify when the subject matches. A match also
    /// cancels any pending forget timer.
    pub fn on_enter(
        &mut self,
        subject: &impl DetectionSubject,
        timers: &mut impl ResetScheduler,
    ) -> Option<DetectionSlot> {
        if !self.classify(subject) {
            return None;
        }
        self.detected = true;
        self.last_detected = Some(subject.entity());
        self.cancel_pending(timers);
        Some(self.slot())
    }

    /// Handle `subject` leaving the volume.
    ///
    /// A matching subject (re)starts the forget timer owned by `owner`, even
    /// when none was pending. Returns the new handle.
    pub fn on_exit(
        &mut self,
        owner: Entity,
        subject: &impl DetectionSubject,
        timers: &mut impl ResetScheduler,
    ) -> Option<TimerHandle> {
        if !self.classify(subject) {
            return None;
        }
        self.cancel_pending(timers);
        let handle = timers.schedule(self.leave_duration, owner);
        debug!(
            "Sensor {:?}: {:?} left, forgetting in {}s",
            owner,
            subject.entity(),
            self.leave_duration
        );
        self.pending_reset = Some(handle);
        Some(handle)
    }

    /// Handle an expired forget timer. Clears the flag only for the handle
    /// that is currently pending; returns whether the flag was cleared.
    pub fn on_reset_elapsed(&mut self, handle: TimerHandle) -> bool {
        if self.pending_reset != Some(handle) {
            return false;
        }
        self.pending_reset = None;
        let was_detected = self.detected;
        self.detected = false;
        was_detected
    }

    fn cancel_pending(&mut self, timers: &mut impl ResetScheduler) {
        if let Some(handle) = self.pending_reset.take() {
            timers.cancel(handle);
        }
    }
}

/// Marks a sensor whose configuration failed validation. Such sensors never
/// detect anything.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct InvalidSensor(pub SensorConfigError);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::leavetimers::LeaveTimers;
    use bevy_ecs::world::World;

    struct Subject {
        entity: Entity,
        tag: Option<&'static str>,
        layer: Option<u8>,
    }

    impl DetectionSubject for Subject {
        fn entity(&self) -> Entity {
            self.entity
        }
        fn tag(&self) -> Option<&str> {
            self.tag
        }
        fn layer(&self) -> Option<PhysicsLayer> {
            self.layer.map(PhysicsLayer)
        }
    }

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn subject(entity: Entity, tag: Option<&'static str>, layer: Option<u8>) -> Subject {
        Subject { entity, tag, layer }
    }

    #[test]
    fn test_slot_table_is_complete_and_distinct() {
        for (i, slot) in DetectionSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert_eq!(
                DetectionSlot::new(slot.method(), slot.requires_line_of_sight()),
                *slot
            );
        }
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("Tag".parse::<DetectionMethod>(), Ok(DetectionMethod::Tag));
        assert_eq!(" layer ".parse::<DetectionMethod>(), Ok(DetectionMethod::Layer));
        assert_eq!(
            "GameObject".parse::<DetectionMethod>(),
            Ok(DetectionMethod::GameObject)
        );
        assert_eq!(
            "radar".parse::<DetectionMethod>(),
            Err(SensorConfigError::UnknownMethod("radar".to_string()))
        );
    }

    #[test]
    fn test_tag_classification_is_exact() {
        let e = entities(1)[0];
        let sensor = DetectionSensor::by_tag("Player");
        assert!(sensor.classify(&subject(e, Some("Player"), None)));
        assert!(!sensor.classify(&subject(e, Some("player"), None)));
        assert!(!sensor.classify(&subject(e, None, None)));
    }

    #[test]
    fn test_layer_classification_uses_membership() {
        let e = entities(1)[0];
        let sensor = DetectionSensor::by_layer(LayerMask::from_layers(&[2, 5]));
        assert!(sensor.classify(&subject(e, None, Some(5))));
        assert!(!sensor.classify(&subject(e, None, Some(3))));
        assert!(!sensor.classify(&subject(e, Some("Player"), None)));
    }

    #[test]
    fn test_entity_classification_uses_identity() {
        let ids = entities(2);
        let sensor = DetectionSensor::by_entity(ids[0]);
        assert!(sensor.classify(&subject(ids[0], None, None)));
        assert!(!sensor.classify(&subject(ids[1], Some("Player"), Some(0))));
    }

    #[test]
    fn test_non_matching_enter_changes_nothing() {
        let ids = entities(2);
        let mut timers = LeaveTimers::new();
        let mut sensor = DetectionSensor::by_tag("Player");
        assert_eq!(
            sensor.on_enter(&subject(ids[1], Some("Enemy"), None), &mut timers),
            None
        );
        assert!(!sensor.is_detected());
        assert!(sensor.last_detected().is_none());
    }

    #[test]
    fn test_matching_enter_selects_exactly_one_slot() {
        let ids = entities(3);
        let mut timers = LeaveTimers::new();

        let mut plain = DetectionSensor::by_tag("Player");
        let slot = plain.on_enter(&subject(ids[1], Some("Player"), None), &mut timers);
        assert_eq!(slot, Some(DetectionSlot::TagWithoutLineOfSight));
        assert!(plain.is_detected());
        assert_eq!(plain.last_detected(), Some(ids[1]));

        let mut sighted = DetectionSensor::by_tag("Player").with_line_of_sight(ids[2]);
        let slot = sighted.on_enter(&subject(ids[1], Some("Player"), None), &mut timers);
        assert_eq!(slot, Some(DetectionSlot::TagWithLineOfSight));
    }

    #[test]
    fn test_exit_schedules_forget_and_it_clears_flag() {
        let ids = entities(2);
        let (owner, player) = (ids[0], subject(ids[1], Some("Player"), None));
        let mut timers = LeaveTimers::new();
        let mut sensor = DetectionSensor::by_tag("Player").with_leave_duration(2.0);

        sensor.on_enter(&player, &mut timers);
        let handle = sensor.on_exit(owner, &player, &mut timers).unwrap();
        assert_eq!(sensor.pending_reset(), Some(handle));

        assert!(timers.advance(1.5).is_empty());
        assert!(sensor.is_detected());

        let fired = timers.advance(0.5);
        assert_eq!(fired.as_slice(), &[(handle, owner)]);
        assert!(sensor.on_reset_elapsed(handle));
        assert!(!sensor.is_detected());
        assert!(sensor.pending_reset().is_none());
    }

    #[test]
    fn test_reenter_before_timeout_keeps_detection() {
        let ids = entities(2);
        let (owner, player) = (ids[0], subject(ids[1], Some("Player"), None));
        let duration = 2.0;
        let mut timers = LeaveTimers::new();
        let mut sensor = DetectionSensor::by_tag("Player").with_leave_duration(duration);
        sensor.on_enter(&player, &mut timers);

        // Reset scheduled at t = 0, re-entry at t = 0.5 * duration.
        sensor.on_exit(owner, &player, &mut timers);
        assert!(timers.advance(0.5 * duration).is_empty());
        sensor.on_enter(&player, &mut timers);
        assert!(sensor.pending_reset().is_none());
        assert!(timers.is_empty());

        assert!(timers.advance(0.7 * duration).is_empty());
        assert!(sensor.is_detected());
    }

    #[test]
    fn test_rapid_cycles_keep_a_single_timer() {
        let ids = entities(2);
        let (owner, player) = (ids[0], subject(ids[1], Some("Player"), None));
        let mut timers = LeaveTimers::new();
        let mut sensor = DetectionSensor::by_tag("Player");

        let mut handles = Vec::new();
        for _ in 0..10 {
            sensor.on_enter(&player, &mut timers);
            handles.push(sensor.on_exit(owner, &player, &mut timers).unwrap());
            handles.push(sensor.on_exit(owner, &player, &mut timers).unwrap());
            assert_eq!(timers.pending_for(owner), 1);
        }
        let last = *handles.last().unwrap();
        for stale in &handles[..handles.len() - 1] {
            assert!(!sensor.on_reset_elapsed(*stale));
            assert!(sensor.is_detected());
        }
        assert!(sensor.on_reset_elapsed(last));
    }

    #[test]
    fn test_exit_without_prior_timer_still_schedules() {
        let ids = entities(2);
        let mut timers = LeaveTimers::new();
        let mut sensor = DetectionSensor::by_entity(ids[1]).initially_detected(true);
        assert!(sensor.is_detected());
        let handle = sensor.on_exit(ids[0], &subject(ids[1], None, None), &mut timers);
        assert!(handle.is_some());
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_non_matching_exit_is_ignored() {
        let ids = entities(2);
        let mut timers = LeaveTimers::new();
        let mut sensor = DetectionSensor::by_tag("Player");
        assert!(sensor
            .on_exit(ids[0], &subject(ids[1], Some("Enemy"), None), &mut timers)
            .is_none());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_validation_failures() {
        let ids = entities(1);
        assert_eq!(
            DetectionSensor::by_tag("").validate(),
            Err(SensorConfigError::EmptyTag)
        );
        assert_eq!(
            DetectionSensor::by_layer(LayerMask::NONE).validate(),
            Err(SensorConfigError::EmptyLayerMask)
        );
        let mut unassigned = DetectionSensor::by_entity(ids[0]);
        unassigned.target = None;
        assert_eq!(unassigned.validate(), Err(SensorConfigError::MissingTarget));
        assert_eq!(
            DetectionSensor::by_tag("Player")
                .with_leave_duration(-1.0)
                .validate(),
            Err(SensorConfigError::InvalidLeaveDuration(-1.0))
        );
        let mut no_origin = DetectionSensor::by_tag("Player");
        no_origin.line_of_sight_required = true;
        assert_eq!(
            no_origin.validate(),
            Err(SensorConfigError::MissingLineOfSightOrigin)
        );
        assert_eq!(DetectionSensor::by_tag("Player").validate(), Ok(()));
    }
}
