//! Per-frame gesture pipeline
//!
//! `GestureController` owns the classifier, stabilizer, navigation tracker,
//! signal estimator and dispatcher. Each `process` call classifies every
//! hand, advances the hold timers, fires gesture events for poses that
//! cleared their cooldowns, and returns the continuous control signal.

use crate::clock::{Clock, MonotonicClock};
use crate::config::{ConfigResult, GestureConfig};
use crate::events::{EventDispatcher, EventType, GestureEvent, ListenerId};
use crate::input::types::Frame;
use crate::processing::signals::{ControlSignal, SignalEstimator};
use crate::recognition::classifier::{PoseClassifier, PoseTag};
use crate::recognition::navigation::NavigationTracker;
use crate::recognition::stabilizer::{CooldownTable, PoseStabilizer, SlotKey};
use std::sync::mpsc;

pub struct GestureController<C: Clock = MonotonicClock> {
    config: GestureConfig,
    classifier: PoseClassifier,
    stabilizer: PoseStabilizer,
    navigation: Option<NavigationTracker>,
    signals: SignalEstimator,
    dispatcher: EventDispatcher,
    clock: C,
}

impl GestureController<MonotonicClock> {
    /// Validate `config` and build a controller on the monotonic clock
    pub fn new(config: GestureConfig) -> ConfigResult<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> GestureController<C> {
    pub fn with_clock(config: GestureConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;
        let classifier = PoseClassifier::new(&config)?;
        let rules = classifier.rules();
        let cooldowns = CooldownTable::new(&config, &rules.emitted_tags());
        let navigation = rules
            .contains(PoseTag::LShape)
            .then(|| NavigationTracker::new(config.navigation));

        tracing::info!(
            "Gesture controller ready: poses {:?}, slots {:?}, navigation {:?}",
            rules.poses(),
            config.slot_policy,
            navigation.as_ref().map(|n| n.mode())
        );

        Ok(Self {
            stabilizer: PoseStabilizer::new(&config, cooldowns),
            signals: SignalEstimator::new(&config),
            classifier,
            navigation,
            dispatcher: EventDispatcher::new(),
            clock,
            config,
        })
    }

    /// Process a frame stamped with the controller's clock
    pub fn process(&mut self, frame: &Frame) -> ControlSignal {
        let now_ms = self.clock.now_ms();
        self.process_at(frame, now_ms)
    }

    /// Process a frame observed at `now_ms`
    pub fn process_at(&mut self, frame: &Frame, now_ms: f64) -> ControlSignal {
        let mut fired = Vec::new();
        let mut seen: Vec<SlotKey> = Vec::with_capacity(frame.hands.len());
        let mut active_pose = None;
        // Label of the last hand holding a stable l_shape
        let mut navigating_hand = None;

        for (index, points) in frame.hands.iter().enumerate() {
            let label = frame.handedness_of(index);
            // Malformed hands classify as nothing and reset their slot
            let pose = self.classifier.classify_points(points);

            let slot = self.stabilizer.slot_for(index, label);
            if !seen.contains(&slot) {
                seen.push(slot);
            }

            let outcome = self.stabilizer.observe(slot, pose, now_ms);
            let Some(stable) = outcome.stable else {
                continue;
            };
            active_pose = Some(stable);
            if outcome.fired {
                fired.push(stable);
            }

            if stable == PoseTag::LShape {
                navigating_hand = Some(label);
            }
        }
        self.stabilizer.end_frame(&seen);

        if let Some(nav) = &mut self.navigation {
            // At most one handedness navigation per frame; the last l_shape hand wins
            if let Some(label) = navigating_hand {
                if let Some(direction) =
                    nav.fire_for_hand(label, now_ms, self.stabilizer.cooldowns_mut())
                {
                    fired.push(direction);
                }
            }

            let centers: Vec<f64> = frame.valid_hands().map(|(_, hand, _)| hand.center().y).collect();
            let center_y = if centers.is_empty() {
                0.0
            } else {
                centers.iter().sum::<f64>() / centers.len() as f64
            };
            let active = active_pose == Some(PoseTag::LShape) && !centers.is_empty();
            if let Some(direction) =
                nav.track_motion(active, center_y, now_ms, self.stabilizer.cooldowns_mut())
            {
                fired.push(direction);
            }
        }

        let signal = self.signals.update(frame);

        for pose in fired {
            tracing::debug!("Gesture {} at {:.0}ms", pose, now_ms);
            self.dispatcher
                .dispatch(EventType::Gesture, &GestureEvent { pose });
        }

        signal
    }

    /// Return to idle: hold timers, navigation anchor and signal tracking.
    /// Cooldowns and listeners are kept.
    pub fn reset(&mut self) {
        self.stabilizer.reset();
        if let Some(nav) = &mut self.navigation {
            nav.reset();
        }
        self.signals.reset();
    }

    pub fn add_listener<F>(&self, event_type: EventType, handler: F) -> ListenerId
    where
        F: Fn(&GestureEvent) + Send + Sync + 'static,
    {
        self.dispatcher.add_listener(event_type, handler)
    }

    pub fn remove_listener(&self, event_type: EventType, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(event_type, id)
    }

    pub fn subscribe(&self, event_type: EventType) -> (ListenerId, mpsc::Receiver<GestureEvent>) {
        self.dispatcher.subscribe(event_type)
    }

    /// Shared handle to the listener registry
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn classifier(&self) -> &PoseClassifier {
        &self.classifier
    }

    pub fn stabilizer(&self) -> &PoseStabilizer {
        &self.stabilizer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
