//! Frame-stepped animation script player.
//!
//! Each tick advances the frame counter by one and fires every line scheduled
//! for the new frame, in script order. Loops rewind the counter to the frame
//! of their `BeginLoop`, so the `BeginLoop` line itself runs once and the
//! lines after it repeat.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::params::{Address, DispatchError, Values};
use super::{ActionKind, AnimationScript, ScriptLine, Sequence, SequenceStatus};
use crate::context::BattleContext;
use crate::env::{
    AnimationStage, AudioPlayer, EffectSpawn, Presentation, Rgba, Transform, Tween, Vec3, VisualId,
    VisualTarget,
};
use crate::error::report;
use crate::state::{CastId, EntityId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LoopFrame {
    start_frame: u32,
    count: i32,
    iterations: i32,
}

/// Visual state of a combatant captured when the sequence starts.
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    target: VisualTarget,
    transform: Transform,
    color: Rgba,
}

/// Plays an [`AnimationScript`] for a user and an optional target.
#[derive(Debug)]
pub struct AnimationSequence {
    script: Arc<AnimationScript>,
    user: EntityId,
    target: Option<EntityId>,
    cast: Option<CastId>,
    /// Iterations of a `BeginLoop` with a negative count.
    hits: i32,

    frame: u32,
    running: bool,
    loops: Vec<LoopFrame>,
    looping: bool,
    direction: (f32, f32),
    snapshots: Vec<Snapshot>,
    effects: Vec<VisualId>,
}

impl AnimationSequence {
    pub fn new(script: Arc<AnimationScript>, user: EntityId, target: Option<EntityId>) -> Self {
        Self {
            script,
            user,
            target,
            cast: None,
            hits: 1,
            frame: 0,
            running: false,
            loops: Vec::new(),
            looping: false,
            direction: (1.0, 1.0),
            snapshots: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Binds the sequence to a cast so that `ApplyDamage` deals its hits and
    /// `BeginLoop|-1` repeats once per hit.
    pub fn with_cast(mut self, cast: CastId, hits: usize) -> Self {
        self.cast = Some(cast);
        self.hits = i32::try_from(hits).unwrap_or(i32::MAX);
        self
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    fn snapshot(&mut self, stage: &dyn Presentation, entity: EntityId) {
        let target = VisualTarget::Entity(entity);
        self.snapshots.push(Snapshot {
            target,
            transform: stage.transform(target).unwrap_or_default(),
            color: stage.color(target).unwrap_or_default(),
        });
    }

    fn run_line(
        &mut self,
        line: &ScriptLine,
        ctx: &mut BattleContext<'_>,
        stage: &mut dyn Presentation,
    ) -> Result<(), DispatchError> {
        let param = line.param.as_deref();
        trace!(frame = line.frame, action = %line.action, ?param, "script action");

        match line.action {
            ActionKind::ChangeUserAnimation => {
                let name = param.ok_or(DispatchError::MissingParam {
                    action: line.action,
                })?;
                stage.trigger_animation(VisualTarget::Entity(self.user), name.trim());
            }
            ActionKind::ChangeTargetAnimation => {
                let name = param.ok_or(DispatchError::MissingParam {
                    action: line.action,
                })?;
                let target = self.target_entity(line.action)?;
                stage.trigger_animation(VisualTarget::Entity(target), name.trim());
            }
            ActionKind::TerminateAnimation => self.running = false,
            ActionKind::GenerateEffect => self.generate_effect(line.action, param, ctx, stage)?,
            ActionKind::TerminateEffect => {
                let values = Values::split(line.action, param, 1)?;
                let index = values.i32(0)?;
                let id = self.effect_slot(line.action, usize::try_from(index).unwrap_or(usize::MAX))?;
                stage.set_effect_active(id, false);
            }
            ActionKind::Move => {
                let values = Values::split(line.action, param, 5)?;
                let (visual, current) = self.resolve(line.action, values.address(0, 5)?, stage)?;
                let (dir_x, dir_y) = self.direction;
                let to = Vec3::new(
                    values.f32(2)? * dir_x + current.position.x,
                    values.f32(3)? * dir_y + current.position.y,
                    values.f32(4)? + current.position.z,
                );
                let duration = ctx.config.frames_to_seconds(values.f32(1)?);
                stage.schedule_tween(visual, Tween::Move { to, duration });
            }
            ActionKind::Rotate => {
                let values = Values::split(line.action, param, 5)?;
                let (visual, _) = self.resolve(line.action, values.address(0, 5)?, stage)?;
                let to = Vec3::new(
                    values.f32(2)?,
                    values.f32(3)?,
                    values.f32(4)? * self.direction.0,
                );
                let duration = ctx.config.frames_to_seconds(values.f32(1)?);
                stage.schedule_tween(visual, Tween::Rotate { to, duration });
            }
            ActionKind::Scale => {
                let values = Values::split(line.action, param, 5)?;
                let address = values.address(0, 5)?;
                let (visual, current) = self.resolve(line.action, address, stage)?;
                let (x, y, z) = (values.f32(2)?, values.f32(3)?, values.f32(4)?);
                let to = if address.is_combatant() {
                    let (dir_x, dir_y) = self.direction;
                    Vec3::new(
                        x * dir_x * current.scale.x.abs(),
                        y * dir_y * current.scale.y.abs(),
                        z,
                    )
                } else {
                    Vec3::new(x, y, z)
                };
                let duration = ctx.config.frames_to_seconds(values.f32(1)?);
                stage.schedule_tween(visual, Tween::Scale { to, duration });
            }
            ActionKind::Color => {
                let values = Values::split(line.action, param, 6)?;
                let (visual, _) = self.resolve(line.action, values.address(0, 6)?, stage)?;
                let to = Rgba::new(
                    values.f32(2)?,
                    values.f32(3)?,
                    values.f32(4)?,
                    values.f32(5)?,
                );
                let duration = ctx.config.frames_to_seconds(values.f32(1)?);
                stage.schedule_tween(visual, Tween::Color { to, duration });
            }
            ActionKind::Vibrate => {
                let values = Values::split(line.action, param, 5)?;
                let (visual, _) = self.resolve(line.action, values.address(0, 5)?, stage)?;
                let strength = Vec3::new(values.f32(2)?, values.f32(3)?, 0.0);
                let vibrato = values.i32(4)?;
                let duration = ctx.config.frames_to_seconds(values.f32(1)?);
                stage.schedule_tween(
                    visual,
                    Tween::Shake {
                        strength,
                        vibrato,
                        duration,
                    },
                );
            }
            ActionKind::ChangeAnimationSpeed => {
                let values = Values::split(line.action, param, 2)?;
                let (visual, _) = self.resolve(line.action, values.address(0, 2)?, stage)?;
                stage.set_animation_speed(visual, values.f32(1)?);
            }
            ActionKind::ChangeAnimationState => {
                let values = Values::split(line.action, param, 3)?;
                let (visual, _) = self.resolve(line.action, values.address(0, 3)?, stage)?;
                stage.set_animation_state(visual, values.text(1)?, values.bool(2)?);
            }
            ActionKind::PlaySound => {
                let name = param.ok_or(DispatchError::MissingParam {
                    action: line.action,
                })?;
                stage.play_sound(name.trim());
            }
            ActionKind::BeginLoop => {
                let values = Values::split(line.action, param, 1)?;
                let requested = values.i32(0)?;
                let count = if requested < 0 { self.hits } else { requested };
                self.loops.push(LoopFrame {
                    start_frame: self.frame,
                    count,
                    iterations: 0,
                });
                self.looping = true;
            }
            ActionKind::EndLoop => {
                let innermost = self.loops.last_mut().ok_or(DispatchError::UnbalancedLoop)?;
                innermost.iterations += 1;
                if innermost.iterations < innermost.count {
                    self.frame = innermost.start_frame;
                } else {
                    self.loops.pop();
                }
                self.looping = !self.loops.is_empty();
            }
            ActionKind::ApplyDamage => {
                let cast = self.cast.ok_or(DispatchError::NoCast {
                    action: line.action,
                })?;
                let target = self.target_entity(line.action)?;
                let damage = ctx
                    .state
                    .cast_mut(cast)
                    .map_or(0, |cast| cast.next_hit_damage());
                ctx.deal_damage(target, damage);
            }
        }
        Ok(())
    }

    fn generate_effect(
        &mut self,
        action: ActionKind,
        param: Option<&str>,
        ctx: &mut BattleContext<'_>,
        stage: &mut dyn Presentation,
    ) -> Result<(), DispatchError> {
        let values = Values::split(action, param, 12)?;
        let path = values.text(0)?;
        let relative = values.text(1)?;
        let offset = Vec3::new(values.f32(2)?, values.f32(3)?, values.f32(4)?);
        let scale = Vec3::new(values.f32(5)?, values.f32(6)?, values.f32(7)?);
        let matched = values.bool(8)?;
        let variance = Vec3::new(values.f32(9)?, values.f32(10)?, values.f32(11)?) * 0.5;
        let (dir_x, dir_y) = self.direction;

        let anchor = match relative {
            "User" => Some(self.user),
            "Target" => Some(self.target_entity(action)?),
            _ => None,
        };
        let mut position = match anchor {
            Some(entity) => {
                let base = stage
                    .transform(VisualTarget::Entity(entity))
                    .unwrap_or_default()
                    .position;
                Vec3::new(
                    base.x + offset.x * dir_x,
                    base.y + offset.y * dir_y,
                    base.z + offset.z,
                )
            }
            None => offset,
        };
        position = position
            + Vec3::new(
                ctx.rng.range_f32(-variance.x, variance.x),
                ctx.rng.range_f32(-variance.y, variance.y),
                ctx.rng.range_f32(-variance.z, variance.z),
            );

        let spawn = EffectSpawn {
            path: path.to_owned(),
            position,
            scale: if matched {
                Vec3::new(scale.x * dir_x, scale.y * dir_y, scale.z)
            } else {
                scale
            },
            parent: anchor.filter(|_| matched),
        };
        let id = stage.spawn_effect(spawn);
        debug!(path, slot = self.effects.len(), "spawned sequence effect");
        self.effects.push(id);
        Ok(())
    }

    fn target_entity(&self, action: ActionKind) -> Result<EntityId, DispatchError> {
        self.target.ok_or(DispatchError::NoTarget { action })
    }

    fn effect_slot(&self, action: ActionKind, index: usize) -> Result<VisualId, DispatchError> {
        self.effects
            .get(index)
            .copied()
            .ok_or(DispatchError::UnknownEffectSlot {
                action,
                index,
                spawned: self.effects.len(),
            })
    }

    fn resolve(
        &self,
        action: ActionKind,
        address: Address,
        stage: &dyn Presentation,
    ) -> Result<(VisualTarget, Transform), DispatchError> {
        let visual = match address {
            Address::User => VisualTarget::Entity(self.user),
            Address::Target => VisualTarget::Entity(self.target_entity(action)?),
            Address::Effect(index) => VisualTarget::Effect(self.effect_slot(action, index)?),
        };
        Ok((visual, stage.transform(visual).unwrap_or_default()))
    }
}

impl Sequence for AnimationSequence {
    fn name(&self) -> &str {
        &self.script.name
    }

    fn start(&mut self, _ctx: &mut BattleContext<'_>, stage: &mut dyn Presentation) {
        self.snapshots.clear();
        self.snapshot(stage, self.user);
        if let Some(target) = self.target {
            self.snapshot(stage, target);
        }
        self.direction = stage
            .transform(VisualTarget::Entity(self.user))
            .unwrap_or_default()
            .facing();
        self.frame = 0;
        self.running = true;
        debug!(script = %self.script.name, user = %self.user, "animation started");
    }

    fn tick(
        &mut self,
        ctx: &mut BattleContext<'_>,
        stage: &mut dyn Presentation,
    ) -> SequenceStatus {
        if !self.running {
            return SequenceStatus::Finished;
        }

        self.frame += 1;
        let frame = self.frame;
        let script = Arc::clone(&self.script);
        for line in script.lines_at(frame) {
            if let Err(err) = self.run_line(line, ctx, stage) {
                report(&err, "sequence.dispatch");
                warn!(script = %script.name, frame, action = %line.action, "script line skipped");
            }
        }

        if self.running && self.loops.is_empty() && self.frame > script.last_frame() {
            warn!(script = %script.name, frame, "script ended without TerminateAnimation");
            self.running = false;
        }
        if self.running {
            SequenceStatus::Running
        } else {
            SequenceStatus::Finished
        }
    }

    fn end(&mut self, _ctx: &mut BattleContext<'_>, stage: &mut dyn Presentation) {
        for snapshot in self.snapshots.drain(..) {
            stage.set_transform(snapshot.target, snapshot.transform);
            stage.set_color(snapshot.target, snapshot.color);
        }
        for id in self.effects.drain(..) {
            stage.despawn_effect(id);
        }
        self.loops.clear();
        self.looping = false;
        debug!(script = %self.script.name, frames = self.frame, "animation finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::HeadlessStage;
    use crate::spell::{OffensiveParams, Spell, SpellCast, SpellKind};
    use crate::testing::Fixture;

    fn script(text: &str) -> Arc<AnimationScript> {
        Arc::new(AnimationScript::parse("test", text).unwrap())
    }

    fn play(
        sequence: &mut AnimationSequence,
        fx: &mut Fixture,
        stage: &mut HeadlessStage,
        max_ticks: usize,
    ) -> usize {
        let mut ctx = fx.context();
        sequence.start(&mut ctx, stage);
        for tick in 1..=max_ticks {
            if sequence.tick(&mut ctx, stage) == SequenceStatus::Finished {
                sequence.end(&mut ctx, stage);
                return tick;
            }
        }
        max_ticks
    }

    fn three_hit_cast(fx: &mut Fixture) -> CastId {
        let spell = Arc::new(Spell::new(
            "Flurry",
            SpellKind::Offensive(OffensiveParams::default()),
        ));
        let id = fx.state.allocate_cast();
        let mut cast = SpellCast::new(id, spell, EntityId(0), EntityId(1));
        cast.set_hits(vec![5, 6, 7], vec![false; 3]);
        fx.state.insert_cast(cast);
        id
    }

    #[test]
    fn move_is_relative_and_timed_in_frames() {
        let mut fx = Fixture::duel();
        let mut stage = HeadlessStage::new();
        let mut sequence = AnimationSequence::new(
            script("3|Move|User,30,0,5,0\n4|TerminateAnimation"),
            EntityId(0),
            Some(EntityId(1)),
        );

        play(&mut sequence, &mut fx, &mut stage, 10);

        let (visual, tween) = stage.tweens[0];
        assert_eq!(visual, VisualTarget::Entity(EntityId(0)));
        let Tween::Move { to, duration } = tween else {
            panic!("expected a move tween, got {tween:?}");
        };
        assert!((to.x - 0.0).abs() < 1e-5);
        assert!((to.y - 5.0).abs() < 1e-5);
        assert!((to.z - 0.0).abs() < 1e-5);
        assert!((duration - 0.5).abs() < 1e-5);
    }

    #[test]
    fn facing_mirrors_horizontal_motion() {
        let mut fx = Fixture::duel();
        let mut stage = HeadlessStage::new();
        stage.place(
            VisualTarget::Entity(EntityId(1)),
            Transform::at(Vec3::new(4.0, 0.0, 0.0)).with_scale(Vec3::new(-1.0, 1.0, 1.0)),
        );
        let mut sequence = AnimationSequence::new(
            script("1|Move|User,6,2,0,0\n2|TerminateAnimation"),
            EntityId(1),
            Some(EntityId(0)),
        );

        play(&mut sequence, &mut fx, &mut stage, 5);

        let Tween::Move { to, .. } = stage.tweens[0].1 else {
            panic!("expected a move tween");
        };
        assert!((to.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn hit_loop_applies_every_hit_once() {
        let mut fx = Fixture::duel();
        let cast = three_hit_cast(&mut fx);
        let slime_hp = fx.state.entity(EntityId(1)).unwrap().hp;
        let mut stage = HeadlessStage::new();
        let mut sequence = AnimationSequence::new(
            script("1|BeginLoop|-1\n2|ApplyDamage\n3|EndLoop\n4|TerminateAnimation"),
            EntityId(0),
            Some(EntityId(1)),
        )
        .with_cast(cast, 3);

        let ticks = play(&mut sequence, &mut fx, &mut stage, 50);

        assert_eq!(ticks, 8);
        assert_eq!(fx.state.entity(EntityId(1)).unwrap().hp, slime_hp - 18);
        assert_eq!(fx.state.cast(cast).unwrap().current_hit(), 0);
    }

    #[test]
    fn nested_loops_multiply() {
        let mut fx = Fixture::duel();
        let mut stage = HeadlessStage::new();
        let mut sequence = AnimationSequence::new(
            script(
                "1|BeginLoop|2\n2|BeginLoop|3\n3|PlaySound|tick\n4|EndLoop\n5|EndLoop\n6|TerminateAnimation",
            ),
            EntityId(0),
            None,
        );

        play(&mut sequence, &mut fx, &mut stage, 100);

        assert_eq!(stage.sounds.len(), 6);
        assert!(!sequence.is_looping());
    }

    #[test]
    fn malformed_params_are_skipped() {
        let mut fx = Fixture::duel();
        let mut stage = HeadlessStage::new();
        let mut sequence = AnimationSequence::new(
            script("1|Move\n1|Move|A,B\n1|TerminateEffect|3\n2|EndLoop\n2|PlaySound|ok\n3|TerminateAnimation"),
            EntityId(0),
            Some(EntityId(1)),
        );

        let ticks = play(&mut sequence, &mut fx, &mut stage, 10);

        assert_eq!(ticks, 3);
        assert!(stage.tweens.is_empty());
        assert_eq!(stage.sounds, vec!["ok".to_owned()]);
    }

    #[test]
    fn end_restores_visuals_and_despawns_effects() {
        let mut fx = Fixture::duel();
        let mut stage = HeadlessStage::new();
        let home = Transform::at(Vec3::new(-3.0, 0.0, 0.0));
        stage.place(VisualTarget::Entity(EntityId(0)), home);
        let mut sequence = AnimationSequence::new(
            script(
                "1|GenerateEffect|fx/spark,Target,0,1,0,1,1,1,true,0,0,0\n\
                 2|Move|User,10,4,0,0\n\
                 2|Color|0,10,1,0,0,1\n\
                 3|TerminateAnimation",
            ),
            EntityId(0),
            Some(EntityId(1)),
        );

        play(&mut sequence, &mut fx, &mut stage, 10);

        assert_eq!(stage.effects.len(), 1);
        assert_eq!(stage.effects[0].spawn.parent, Some(EntityId(1)));
        assert_eq!(stage.effects[0].spawn.position, Vec3::new(0.0, 1.0, 0.0));
        assert!(matches!(stage.tweens[1].1, Tween::Color { .. }));
        assert_eq!(stage.live_effects().count(), 0);
        assert_eq!(
            stage.transform(VisualTarget::Entity(EntityId(0))),
            Some(home)
        );
    }
}
