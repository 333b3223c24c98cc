//! SpecDb: content store for ability balance data.
//!
//! Records are shared immutably (`Arc`) with every Spell that references them.
//! Content errors (duplicate names, identity collisions, bad tables) surface
//! here at load time rather than during simulation.

use crate::{loader, spell::SpellData};
use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Default, Debug)]
pub struct SpecDb {
    spells: HashMap<String, Arc<SpellData>>,
    by_id: HashMap<u32, String>,
}

impl SpecDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` under the workspace `data/spells`.
    pub fn load_default() -> Result<Self> {
        Self::load_dir(loader::data_root().join("spells"))
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut db = SpecDb::default();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        // Deterministic load order so collision errors are reproducible
        paths.sort();
        for path in paths {
            let data = loader::load_spell_data(&path)?;
            db.insert(data)?;
        }
        log::info!("specdb: loaded {} spells from {}", db.len(), dir.display());
        Ok(db)
    }

    pub fn insert(&mut self, data: SpellData) -> Result<()> {
        data.validate()?;
        if self.spells.contains_key(&data.name) {
            bail!("duplicate spell data: {}", data.name);
        }
        let id = data.ability_id();
        if let Some(other) = self.by_id.get(&id) {
            bail!("ability id {id:#010x} of '{}' collides with '{other}'", data.name);
        }
        self.by_id.insert(id, data.name.clone());
        self.spells.insert(data.name.clone(), Arc::new(data));
        Ok(())
    }

    pub fn get_spell_data(&self, name: &str) -> Option<Arc<SpellData>> {
        self.spells.get(name).cloned()
    }

    pub fn name_for_id(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}
