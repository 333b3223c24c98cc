//! Data loaders. Paths resolve under the workspace `data/` directory.

use crate::spell::SpellData;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn data_root() -> PathBuf {
    // Prefer top-level workspace `data/` so tests and tools can run from any crate.
    if let Ok(p) = std::env::var("SIM_DATA_ROOT") {
        return PathBuf::from(p);
    }
    let here = Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

/// Read a raw JSON file under `data/` and return its string. Absolute paths
/// are read as-is.
pub fn read_json(rel: impl AsRef<Path>) -> Result<String> {
    let rel = rel.as_ref();
    let path = if rel.is_absolute() { rel.to_path_buf() } else { data_root().join(rel) };
    let s = fs::read_to_string(&path).with_context(|| format!("read data: {}", path.display()))?;
    Ok(s)
}

/// Load and deserialize a spell JSON (from data/spells/*).
pub fn load_spell_data(rel: impl AsRef<Path>) -> Result<SpellData> {
    let rel = rel.as_ref();
    let txt = read_json(rel)?;
    let data: SpellData = serde_json::from_str(&txt)
        .with_context(|| format!("parse spell json: {}", rel.display()))?;
    data.validate()?;
    Ok(data)
}
