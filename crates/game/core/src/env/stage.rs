//! Presentation capabilities consumed by sequences.
//!
//! Rendering, tweening, audio and the dialogue typewriter belong to the host.
//! Sequences only see these narrow traits, addressed through [`VisualTarget`].

use core::ops::{Add, Mul};

use crate::state::EntityId;

// ============================================================================
// Value Types
// ============================================================================

/// Three-component vector used for positions, euler rotations and scales.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// RGBA color with unit-range channels.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Position, euler rotation (degrees) and scale of a visual.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Builder: set scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Horizontal and vertical facing signs derived from the scale.
    ///
    /// A negatively scaled axis mirrors every scripted delta on that axis.
    pub fn facing(&self) -> (f32, f32) {
        (sign(self.scale.x), sign(self.scale.y))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn sign(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

/// Handle to a visual effect spawned through [`AnimationStage::spawn_effect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisualId(pub u32);

/// Anything a script can address on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisualTarget {
    Entity(EntityId),
    Effect(VisualId),
}

/// Timed interpolation scheduled on a visual.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tween {
    Move { to: Vec3, duration: f32 },
    Rotate { to: Vec3, duration: f32 },
    Scale { to: Vec3, duration: f32 },
    Color { to: Rgba, duration: f32 },
    Shake { strength: Vec3, vibrato: i32, duration: f32 },
}

impl Tween {
    pub fn duration(&self) -> f32 {
        match *self {
            Tween::Move { duration, .. }
            | Tween::Rotate { duration, .. }
            | Tween::Scale { duration, .. }
            | Tween::Color { duration, .. }
            | Tween::Shake { duration, .. } => duration,
        }
    }
}

/// Request to instantiate a visual effect asset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpawn {
    /// Asset path identifier understood by the host.
    pub path: String,
    /// World position after jitter.
    pub position: Vec3,
    pub scale: Vec3,
    /// Combatant the effect follows, if any.
    pub parent: Option<EntityId>,
}

// ============================================================================
// Capabilities
// ============================================================================

/// Sprite, animator and effect control.
pub trait AnimationStage {
    /// Current transform of a visual, `None` if it does not exist.
    fn transform(&self, target: VisualTarget) -> Option<Transform>;

    /// Snaps a visual to a transform immediately.
    fn set_transform(&mut self, target: VisualTarget, transform: Transform);

    fn color(&self, target: VisualTarget) -> Option<Rgba>;

    fn set_color(&mut self, target: VisualTarget, color: Rgba);

    /// Schedules a timed interpolation.
    fn schedule_tween(&mut self, target: VisualTarget, tween: Tween);

    /// Fires a named animator trigger.
    fn trigger_animation(&mut self, target: VisualTarget, trigger: &str);

    /// Sets a named boolean animator flag.
    fn set_animation_state(&mut self, target: VisualTarget, name: &str, value: bool);

    /// Scales the animator playback rate.
    fn set_animation_speed(&mut self, target: VisualTarget, speed: f32);

    fn spawn_effect(&mut self, spawn: EffectSpawn) -> VisualId;

    fn set_effect_active(&mut self, id: VisualId, active: bool);

    fn despawn_effect(&mut self, id: VisualId);
}

/// Sound playback.
pub trait AudioPlayer {
    fn play_sound(&mut self, name: &str);
}

/// Dialogue text box with a typewriter animation and an advance input.
pub trait DialogueDisplay {
    /// Whether the text box has finished opening.
    fn dialogue_ready(&self) -> bool;

    fn clear_dialogue(&mut self);

    /// Starts printing `text` character by character.
    fn begin_dialogue(&mut self, text: &str);

    /// Whether the typewriter is still printing.
    fn dialogue_printing(&self) -> bool;

    /// Stops the typewriter and shows the full text.
    fn complete_dialogue(&mut self, text: &str);

    /// Consumes a pending "advance" input, if any.
    fn take_advance(&mut self) -> bool;
}

/// Everything a sequence may drive.
pub trait Presentation: AnimationStage + AudioPlayer + DialogueDisplay {}

impl<T: AnimationStage + AudioPlayer + DialogueDisplay + ?Sized> Presentation for T {}
