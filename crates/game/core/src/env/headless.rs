//! In-memory presentation for tests, tools and headless runs.
//!
//! Tweens complete instantly, effects are tracked in a list, and the dialogue
//! box prints instantly and advances on its own unless told otherwise.

use std::collections::HashMap;

use super::stage::{
    AnimationStage, AudioPlayer, DialogueDisplay, EffectSpawn, Rgba, Transform, Tween, VisualId,
    VisualTarget,
};

/// Spawned effect as seen by [`HeadlessStage`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedVisual {
    pub id: VisualId,
    pub spawn: EffectSpawn,
    pub active: bool,
    pub despawned: bool,
}

/// Recording presentation double.
#[derive(Clone, Debug)]
pub struct HeadlessStage {
    transforms: HashMap<VisualTarget, Transform>,
    colors: HashMap<VisualTarget, Rgba>,
    pub effects: Vec<SpawnedVisual>,
    pub tweens: Vec<(VisualTarget, Tween)>,
    pub triggers: Vec<(VisualTarget, String)>,
    pub animation_states: Vec<(VisualTarget, String, bool)>,
    pub animation_speeds: Vec<(VisualTarget, f32)>,
    pub sounds: Vec<String>,
    /// Every line the dialogue box started printing, in order.
    pub dialogue: Vec<String>,
    text: String,
    printing: bool,
    typewriter: bool,
    box_ready: bool,
    auto_advance: bool,
    pending_advance: bool,
}

impl Default for HeadlessStage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessStage {
    pub fn new() -> Self {
        Self {
            transforms: HashMap::new(),
            colors: HashMap::new(),
            effects: Vec::new(),
            tweens: Vec::new(),
            triggers: Vec::new(),
            animation_states: Vec::new(),
            animation_speeds: Vec::new(),
            sounds: Vec::new(),
            dialogue: Vec::new(),
            text: String::new(),
            printing: false,
            typewriter: false,
            box_ready: true,
            auto_advance: true,
            pending_advance: false,
        }
    }

    /// Builder: require explicit [`press_advance`](Self::press_advance) calls.
    pub fn manual_advance(mut self) -> Self {
        self.auto_advance = false;
        self
    }

    /// Builder: keep printing until an advance completes the text.
    ///
    /// Implies manual advance.
    pub fn slow_typewriter(mut self) -> Self {
        self.typewriter = true;
        self.auto_advance = false;
        self
    }

    /// Places a visual at a transform.
    pub fn place(&mut self, target: VisualTarget, transform: Transform) {
        self.transforms.insert(target, transform);
    }

    pub fn set_box_ready(&mut self, ready: bool) {
        self.box_ready = ready;
    }

    /// Queues one advance input.
    pub fn press_advance(&mut self) {
        self.pending_advance = true;
    }

    /// Text currently shown in the dialogue box.
    pub fn shown_text(&self) -> &str {
        &self.text
    }

    /// Effects that have not been despawned.
    pub fn live_effects(&self) -> impl Iterator<Item = &SpawnedVisual> {
        self.effects.iter().filter(|visual| !visual.despawned)
    }

    fn effect_mut(&mut self, id: VisualId) -> Option<&mut SpawnedVisual> {
        self.effects.iter_mut().find(|visual| visual.id == id)
    }
}

impl AnimationStage for HeadlessStage {
    fn transform(&self, target: VisualTarget) -> Option<Transform> {
        match target {
            VisualTarget::Entity(_) => {
                Some(self.transforms.get(&target).copied().unwrap_or_default())
            }
            VisualTarget::Effect(_) => self.transforms.get(&target).copied(),
        }
    }

    fn set_transform(&mut self, target: VisualTarget, transform: Transform) {
        self.transforms.insert(target, transform);
    }

    fn color(&self, target: VisualTarget) -> Option<Rgba> {
        Some(self.colors.get(&target).copied().unwrap_or_default())
    }

    fn set_color(&mut self, target: VisualTarget, color: Rgba) {
        self.colors.insert(target, color);
    }

    fn schedule_tween(&mut self, target: VisualTarget, tween: Tween) {
        self.tweens.push((target, tween));
        let mut transform = self.transform(target).unwrap_or_default();
        match tween {
            Tween::Move { to, .. } => transform.position = to,
            Tween::Rotate { to, .. } => transform.rotation = to,
            Tween::Scale { to, .. } => transform.scale = to,
            Tween::Color { to, .. } => {
                self.colors.insert(target, to);
                return;
            }
            Tween::Shake { .. } => return,
        }
        self.transforms.insert(target, transform);
    }

    fn trigger_animation(&mut self, target: VisualTarget, trigger: &str) {
        self.triggers.push((target, trigger.to_owned()));
    }

    fn set_animation_state(&mut self, target: VisualTarget, name: &str, value: bool) {
        self.animation_states.push((target, name.to_owned(), value));
    }

    fn set_animation_speed(&mut self, target: VisualTarget, speed: f32) {
        self.animation_speeds.push((target, speed));
    }

    fn spawn_effect(&mut self, spawn: EffectSpawn) -> VisualId {
        let id = VisualId(self.effects.len() as u32);
        let transform = Transform::at(spawn.position).with_scale(spawn.scale);
        self.transforms.insert(VisualTarget::Effect(id), transform);
        self.effects.push(SpawnedVisual {
            id,
            spawn,
            active: true,
            despawned: false,
        });
        id
    }

    fn set_effect_active(&mut self, id: VisualId, active: bool) {
        if let Some(visual) = self.effect_mut(id) {
            visual.active = active;
        }
    }

    fn despawn_effect(&mut self, id: VisualId) {
        if let Some(visual) = self.effect_mut(id) {
            visual.active = false;
            visual.despawned = true;
        }
        self.transforms.remove(&VisualTarget::Effect(id));
    }
}

impl AudioPlayer for HeadlessStage {
    fn play_sound(&mut self, name: &str) {
        self.sounds.push(name.to_owned());
    }
}

impl DialogueDisplay for HeadlessStage {
    fn dialogue_ready(&self) -> bool {
        self.box_ready
    }

    fn clear_dialogue(&mut self) {
        self.text.clear();
        self.printing = false;
    }

    fn begin_dialogue(&mut self, text: &str) {
        self.dialogue.push(text.to_owned());
        self.text = text.to_owned();
        self.printing = self.typewriter;
    }

    fn dialogue_printing(&self) -> bool {
        self.printing
    }

    fn complete_dialogue(&mut self, text: &str) {
        self.text = text.to_owned();
        self.printing = false;
    }

    fn take_advance(&mut self) -> bool {
        if self.auto_advance {
            return true;
        }
        core::mem::take(&mut self.pending_advance)
    }
}
