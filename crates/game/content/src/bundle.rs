//! Resolving parsed definitions into a ready-to-fight catalog.
//!
//! Building runs in dependency order (scripts, effects, spells, entities,
//! pool, encounter) and every cross reference is checked on the way, so a
//! bundle that builds never hits an unknown name at battle time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use battle_core::{
    AnimationScript, BattleConfig, Catalog, Effect, EffectAnimations, EffectChance,
    EffectGroup, EnemyPool, EntityTemplate, PlayerLoadout, Spell,
};
use tracing::{debug, info};

use crate::defs::{EffectDef, EncounterDef, EntityDef, PoolEntryDef, SpellDef};
use crate::error::ContentError;

pub type LoadResult<T> = anyhow::Result<T>;

/// Raw text of every content file, before parsing.
#[derive(Clone, Debug, Default)]
pub struct ContentSources {
    /// `config.toml`; defaults apply when absent.
    pub config: Option<String>,
    pub effects: String,
    pub spells: String,
    pub entities: String,
    pub enemy_pool: String,
    pub encounter: String,
    /// `(name, text)` of every animation script.
    pub scripts: Vec<(String, String)>,
}

/// The player side of the opening encounter.
#[derive(Clone, Debug)]
pub struct PlayerSpec {
    pub template: Arc<EntityTemplate>,
    pub loadout: PlayerLoadout,
}

/// Validated content, ready to hand to a battle engine.
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub config: BattleConfig,
    pub catalog: Catalog,
    pub player: PlayerSpec,
    /// Enemies present when the battle opens.
    pub enemies: Vec<Arc<EntityTemplate>>,
}

impl ContentBundle {
    /// Parses and validates every source.
    pub fn build(sources: &ContentSources) -> LoadResult<Self> {
        let config = match &sources.config {
            Some(text) => toml::from_str(text).context("failed to parse config.toml")?,
            None => BattleConfig::default(),
        };

        let effects: Vec<EffectDef> =
            ron::from_str(&sources.effects).context("failed to parse effects.ron")?;
        let spells: Vec<SpellDef> =
            ron::from_str(&sources.spells).context("failed to parse spells.ron")?;
        let entities: Vec<EntityDef> =
            ron::from_str(&sources.entities).context("failed to parse entities.ron")?;
        let pool: Vec<PoolEntryDef> =
            ron::from_str(&sources.enemy_pool).context("failed to parse enemy_pool.ron")?;
        let encounter: EncounterDef =
            ron::from_str(&sources.encounter).context("failed to parse encounter.ron")?;

        let bundle = Resolver::default().resolve(
            config,
            &sources.scripts,
            &effects,
            &spells,
            &entities,
            &pool,
            &encounter,
        )?;
        info!(
            effects = effects.len(),
            spells = spells.len(),
            entities = entities.len(),
            pool = pool.len(),
            "content loaded"
        );
        Ok(bundle)
    }
}

#[derive(Default)]
struct Resolver {
    scripts: HashMap<String, Arc<AnimationScript>>,
    effects: HashMap<String, Arc<Effect>>,
    spells: HashMap<String, Arc<Spell>>,
    entities: HashMap<String, Arc<EntityTemplate>>,
}

impl Resolver {
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        mut self,
        config: BattleConfig,
        scripts: &[(String, String)],
        effects: &[EffectDef],
        spells: &[SpellDef],
        entities: &[EntityDef],
        pool: &[PoolEntryDef],
        encounter: &EncounterDef,
    ) -> Result<ContentBundle, ContentError> {
        for (name, text) in scripts {
            let script = AnimationScript::parse(name.as_str(), text).map_err(|source| {
                ContentError::Script {
                    name: name.clone(),
                    source,
                }
            })?;
            unique("animation script", name, self.scripts.contains_key(name))?;
            self.scripts.insert(name.clone(), Arc::new(script));
        }

        let spell_names: HashSet<&str> = spells.iter().map(|def| def.name.as_str()).collect();
        let effect_names: HashSet<&str> = effects.iter().map(|def| def.name.as_str()).collect();
        for def in effects {
            let effect = self.effect(def, &effect_names, &spell_names)?;
            unique("effect", &def.name, self.effects.contains_key(&def.name))?;
            self.effects.insert(def.name.clone(), Arc::new(effect));
        }

        for def in spells {
            let spell = self.spell(def)?;
            unique("spell", &def.name, self.spells.contains_key(&def.name))?;
            self.spells.insert(def.name.clone(), Arc::new(spell));
        }

        for def in entities {
            let name = &def.params.name;
            let moves = def
                .moves
                .iter()
                .map(|spell| self.lookup_spell(name, spell))
                .collect::<Result<Vec<_>, _>>()?;
            unique("entity", name, self.entities.contains_key(name))?;
            self.entities.insert(
                name.clone(),
                Arc::new(EntityTemplate {
                    params: def.params.clone(),
                    moves,
                }),
            );
        }

        let mut enemy_pool = EnemyPool::default();
        for entry in pool {
            let template = self.lookup_entity("enemy pool", &entry.entity)?;
            enemy_pool.push(template, entry.odds);
        }

        let def = &encounter.player;
        let owner = "encounter";
        let player = PlayerSpec {
            template: self.lookup_entity(owner, &def.entity)?,
            loadout: PlayerLoadout {
                attack: self.lookup_spell(owner, &def.attack)?,
                defend: self.lookup_spell(owner, &def.defend)?,
                spells: def
                    .spells
                    .iter()
                    .map(|spell| self.lookup_spell(owner, spell))
                    .collect::<Result<Vec<_>, _>>()?,
            },
        };
        let enemies = encounter
            .enemies
            .iter()
            .map(|name| self.lookup_entity(owner, name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut catalog = Catalog::new();
        self.effects.into_values().for_each(|e| catalog.insert_effect(e));
        self.spells.into_values().for_each(|s| catalog.insert_spell(s));
        self.entities.into_values().for_each(|t| catalog.insert_entity(t));
        catalog.enemy_pool = enemy_pool;

        Ok(ContentBundle {
            config,
            catalog,
            player,
            enemies,
        })
    }

    fn effect(
        &self,
        def: &EffectDef,
        effect_names: &HashSet<&str>,
        spell_names: &HashSet<&str>,
    ) -> Result<Effect, ContentError> {
        for (hook, op) in def.hooks.iter() {
            if op.is_gate() && !hook.is_check() {
                return Err(ContentError::GateOutsideCheckHook {
                    effect: def.name.clone(),
                    hook,
                    op: format!("{op:?}"),
                });
            }
            if let Some(name) = op.effect_reference() {
                known(&def.name, "effect", name, effect_names.contains(name))?;
            }
            if let Some(name) = op.spell_reference() {
                known(&def.name, "spell", name, spell_names.contains(name))?;
            }
        }

        let script = |name: &Option<String>| -> Result<Option<Arc<AnimationScript>>, ContentError> {
            name.as_deref()
                .map(|name| self.lookup_script(&def.name, name))
                .transpose()
        };
        let animations = EffectAnimations {
            activation: script(&def.animations.activation)?,
            deactivation: script(&def.animations.deactivation)?,
            misc: script(&def.animations.misc)?,
        };
        for (_, op) in def.hooks.iter() {
            if let battle_core::EffectOp::PlayAnimation(slot) = op {
                if animations.get(*slot).is_none() {
                    return Err(ContentError::MissingEffectAnimation {
                        effect: def.name.clone(),
                        slot: *slot,
                    });
                }
            }
        }

        debug!(effect = %def.name, ops = def.hooks.iter().count(), "resolved effect");
        Ok(Effect {
            name: def.name.clone(),
            stackable: def.stackable,
            hooks: def.hooks.clone(),
            animations,
        })
    }

    fn spell(&self, def: &SpellDef) -> Result<Spell, ContentError> {
        let mut spell = Spell::new(def.name.clone(), def.kind.clone()).with_cost(def.cost);
        if let Some(name) = &def.animation {
            spell = spell.with_animation(self.lookup_script(&def.name, name)?);
        }
        for group in &def.effects {
            chance(&def.name, group.chance)?;
            let options = group
                .options
                .iter()
                .map(|option| {
                    chance(&def.name, option.chance)?;
                    Ok(EffectChance {
                        chance: option.chance,
                        effect: self.lookup_effect(&def.name, &option.effect)?,
                    })
                })
                .collect::<Result<Vec<_>, ContentError>>()?;
            spell = spell.with_effect(EffectGroup {
                chance: group.chance,
                options,
            });
        }
        for name in &def.properties {
            spell = spell.with_property(self.lookup_effect(&def.name, name)?);
        }
        Ok(spell)
    }

    fn lookup_script(&self, owner: &str, name: &str) -> Result<Arc<AnimationScript>, ContentError> {
        lookup(&self.scripts, owner, "animation script", name)
    }

    fn lookup_effect(&self, owner: &str, name: &str) -> Result<Arc<Effect>, ContentError> {
        lookup(&self.effects, owner, "effect", name)
    }

    fn lookup_spell(&self, owner: &str, name: &str) -> Result<Arc<Spell>, ContentError> {
        lookup(&self.spells, owner, "spell", name)
    }

    fn lookup_entity(&self, owner: &str, name: &str) -> Result<Arc<EntityTemplate>, ContentError> {
        lookup(&self.entities, owner, "entity", name)
    }
}

fn lookup<T>(
    table: &HashMap<String, Arc<T>>,
    owner: &str,
    kind: &'static str,
    name: &str,
) -> Result<Arc<T>, ContentError> {
    table
        .get(name)
        .cloned()
        .ok_or_else(|| ContentError::UnknownReference {
            owner: owner.to_owned(),
            kind,
            name: name.to_owned(),
        })
}

fn known(owner: &str, kind: &'static str, name: &str, found: bool) -> Result<(), ContentError> {
    if found {
        return Ok(());
    }
    Err(ContentError::UnknownReference {
        owner: owner.to_owned(),
        kind,
        name: name.to_owned(),
    })
}

fn unique(kind: &'static str, name: &str, taken: bool) -> Result<(), ContentError> {
    if taken {
        return Err(ContentError::DuplicateName {
            kind,
            name: name.to_owned(),
        });
    }
    Ok(())
}

fn chance(owner: &str, value: f32) -> Result<(), ContentError> {
    if (0.0..=1.0).contains(&value) {
        return Ok(());
    }
    Err(ContentError::ChanceOutOfRange {
        owner: owner.to_owned(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use battle_core::{AnimationSlot, BattleError, Hook};

    fn sources() -> ContentSources {
        builtin::sources()
    }

    fn content_error(err: anyhow::Error) -> ContentError {
        err.downcast::<ContentError>().expect("content error")
    }

    #[test]
    fn builtin_content_resolves() {
        let bundle = ContentBundle::build(&sources()).unwrap();
        assert_eq!(bundle.player.template.params.name, "Hero");
        assert_eq!(bundle.player.loadout.attack.name, "Strike");
        assert!(!bundle.enemies.is_empty());
        assert!(!bundle.catalog.enemy_pool.is_empty());

        let fireball = bundle.catalog.spell("Fireball").unwrap();
        assert!(fireball.animation.is_some());
        assert_eq!(fireball.effects[0].options[0].effect.name, "Burn");
        assert!(bundle.catalog.effect("Guarded").is_some());
    }

    #[test]
    fn gates_are_rejected_outside_check_hooks() {
        let mut sources = sources();
        sources.effects = r#"[(name: "Odd", hooks: (on_turn_end: [UserLastMoveSucceeded]))]"#.into();

        let err = content_error(ContentBundle::build(&sources).unwrap_err());
        assert_eq!(
            err,
            ContentError::GateOutsideCheckHook {
                effect: "Odd".into(),
                hook: Hook::OnTurnEnd,
                op: "UserLastMoveSucceeded".into(),
            }
        );
        assert_eq!(err.error_code(), "CONTENT_GATE_OUTSIDE_CHECK_HOOK");
    }

    #[test]
    fn unknown_references_name_their_owner() {
        let mut sources = sources();
        sources.spells = sources.spells.replacen("\"Burn\"", "\"Scorch\"", 1);

        let err = content_error(ContentBundle::build(&sources).unwrap_err());
        assert_eq!(
            err,
            ContentError::UnknownReference {
                owner: "Fireball".into(),
                kind: "effect",
                name: "Scorch".into(),
            }
        );
    }

    #[test]
    fn granted_properties_must_exist() {
        let mut sources = sources();
        sources.effects =
            r#"[(name: "Focus", hooks: (on_activate: [GrantPropertyToUser("Nowhere")]))]"#.into();

        let err = content_error(ContentBundle::build(&sources).unwrap_err());
        assert!(matches!(err, ContentError::UnknownReference { kind: "effect", .. }));
    }

    #[test]
    fn played_animations_must_be_defined() {
        let mut sources = sources();
        sources.effects = r#"[(name: "Glow", hooks: (on_activate: [PlayAnimation(Misc)]))]"#.into();

        let err = content_error(ContentBundle::build(&sources).unwrap_err());
        assert_eq!(
            err,
            ContentError::MissingEffectAnimation {
                effect: "Glow".into(),
                slot: AnimationSlot::Misc,
            }
        );
    }

    #[test]
    fn malformed_scripts_are_reported_by_name() {
        let mut sources = sources();
        sources.scripts.push(("broken".into(), "1|Fly|User".into()));

        let err = content_error(ContentBundle::build(&sources).unwrap_err());
        assert!(matches!(err, ContentError::Script { ref name, .. } if name == "broken"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut sources = sources();
        let doubled = sources.scripts[0].clone();
        sources.scripts.push(doubled);

        let err = content_error(ContentBundle::build(&sources).unwrap_err());
        assert!(matches!(err, ContentError::DuplicateName { kind: "animation script", .. }));
    }

    #[test]
    fn config_falls_back_to_defaults() {
        let mut sources = sources();
        sources.config = None;
        let bundle = ContentBundle::build(&sources).unwrap();
        assert_eq!(bundle.config, BattleConfig::default());

        sources.config = Some("hand_size = 3\n".into());
        let bundle = ContentBundle::build(&sources).unwrap();
        assert_eq!(bundle.config.hand_size, 3);
        assert_eq!(bundle.config.damage_constant, BattleConfig::DAMAGE_CONSTANT);
    }
}
