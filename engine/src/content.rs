use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};

use crate::Scalar;
use crate::item::Item;
use crate::names::NameList;

pub fn builtin_names() -> HashMap<&'static str, &'static str> {
    HashMap::from([("default", include_str!("../content/names.json"))])
}

pub fn builtin_items() -> HashMap<&'static str, &'static str> {
    HashMap::from([("starter", include_str!("../content/starter.yaml"))])
}

pub fn load_names(id: &str) -> Result<NameList> {
    let text = builtin_names()
        .get(id)
        .copied()
        .ok_or_else(|| anyhow!("no built-in name list '{}'", id))?;
    serde_json::from_str(text).with_context(|| format!("failed to parse name list: {}", id))
}

pub fn load_items<T: Scalar>(id: &str) -> Result<Vec<Item<T>>> {
    let text = builtin_items()
        .get(id)
        .copied()
        .ok_or_else(|| anyhow!("no built-in item set '{}'", id))?;
    serde_yaml::from_str(text).with_context(|| format!("failed to parse item set: {}", id))
}
