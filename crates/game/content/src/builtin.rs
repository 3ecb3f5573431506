//! Content compiled into the binary.

use crate::bundle::{ContentBundle, ContentSources, LoadResult};

const SCRIPTS: [(&str, &str); 5] = [
    ("burn", include_str!("../data/animations/burn.anim")),
    ("fireball", include_str!("../data/animations/fireball.anim")),
    ("shards", include_str!("../data/animations/shards.anim")),
    ("strike", include_str!("../data/animations/strike.anim")),
    ("tackle", include_str!("../data/animations/tackle.anim")),
];

/// Raw text of the built-in content.
pub fn sources() -> ContentSources {
    ContentSources {
        config: Some(include_str!("../data/config.toml").to_owned()),
        effects: include_str!("../data/effects.ron").to_owned(),
        spells: include_str!("../data/spells.ron").to_owned(),
        entities: include_str!("../data/entities.ron").to_owned(),
        enemy_pool: include_str!("../data/enemy_pool.ron").to_owned(),
        encounter: include_str!("../data/encounter.ron").to_owned(),
        scripts: SCRIPTS
            .iter()
            .map(|(name, text)| ((*name).to_owned(), (*text).to_owned()))
            .collect(),
    }
}

/// Builds the built-in content.
pub fn load() -> LoadResult<ContentBundle> {
    ContentBundle::build(&sources())
}
