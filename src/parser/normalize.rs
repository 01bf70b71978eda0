//! Persisted config to editable model.

use crate::error::{ConfigureError, ConfigureResult};
use crate::locales::KeyNameTable;
use crate::models::{
    Animation, Animations, ConfigModel, CustomKll, Define, Headers, Key, Led, Macro, Macros,
    MatrixItem, MatrixItemId, PersistedAnimation, PersistedDefine, PersistedKey, PersistedMacro,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Matrix entry as persisted: per-layer keys plus pass-through fields.
#[derive(Debug, Deserialize)]
struct PersistedMatrixItem {
    #[serde(default)]
    layers: BTreeMap<String, PersistedKey>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Converts a persisted config into the editable model.
///
/// Fields missing from `raw` stay `None`. A non-object `raw` is treated as an
/// empty config. Key names the table cannot resolve, or every key name when
/// `table` is `None`, become placeholder keys.
///
/// # Errors
///
/// Returns [`ConfigureError::InvalidConfig`] if a present field has the
/// wrong shape.
///
/// # Examples
///
/// ```
/// use kllconf::locales::Locales;
/// use kllconf::parser::normalize;
/// use serde_json::json;
///
/// let locales = Locales::load().unwrap();
/// let raw = json!({
///     "header": { "Name": "Demo" },
///     "matrix": [{ "code": "0x01", "layers": { "0": { "key": "ESC", "label": "Esc" } } }]
/// });
/// let model = normalize(&raw, locales.get("en-us")).unwrap();
/// assert_eq!(model.matrix.unwrap()[0].key_on(0).unwrap().label, "Esc");
/// assert!(model.macros.is_none());
/// ```
pub fn normalize(raw: &Value, table: Option<&KeyNameTable>) -> ConfigureResult<ConfigModel> {
    let Some(raw) = raw.as_object() else {
        return Ok(ConfigModel::default());
    };

    let header: Option<Headers> = field(raw, "header")?;

    let matrix = field::<Vec<PersistedMatrixItem>>(raw, "matrix")?.map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                let layers = item
                    .layers
                    .into_iter()
                    .map(|(layer, key)| (layer, resolve_key(table, key)))
                    .collect();
                #[allow(clippy::cast_possible_truncation)]
                let id = MatrixItemId(idx as u32);
                Arc::new(MatrixItem {
                    id,
                    layers,
                    extra: item.extra,
                })
            })
            .collect()
    });

    let defines = field::<Vec<PersistedDefine>>(raw, "defines")?.map(|defines| {
        let ids = unique_ids(defines.iter().map(|d| d.id.as_deref()), |idx| {
            format!("define-{idx}")
        });
        defines
            .into_iter()
            .zip(ids)
            .map(|(d, id)| Define {
                id,
                name: d.name,
                value: d.value,
                persisted_id: d.id.is_some(),
                extra: d.extra,
            })
            .collect()
    });

    let leds: Option<Vec<Led>> = field(raw, "leds")?;
    let custom: Option<CustomKll> = field(raw, "custom")?;

    let animations = field::<BTreeMap<String, PersistedAnimation>>(raw, "animations")?.map(|anims| {
        anims
            .into_iter()
            .map(|(name, anim)| (name, Animation::from(anim)))
            .collect::<Animations>()
    });

    let macros = field::<BTreeMap<String, Vec<PersistedMacro>>>(raw, "macros")?.map(|layers| {
        layers
            .into_iter()
            .map(|(layer, macros)| {
                let ids = unique_ids(macros.iter().map(|m| m.id.as_deref()), |idx| {
                    format!("macro-{layer}-{idx}")
                });
                let macros = macros
                    .into_iter()
                    .zip(ids)
                    .map(|(m, id)| Macro {
                        id,
                        name: m.name,
                        trigger: resolve_sequence(table, m.trigger),
                        output: resolve_sequence(table, m.output),
                        persisted_id: m.id.is_some(),
                        extra: m.extra,
                    })
                    .collect();
                (layer, macros)
            })
            .collect::<Macros>()
    });

    Ok(ConfigModel {
        header,
        matrix,
        defines,
        leds,
        custom,
        animations,
        macros,
    })
}

/// Assigns one id per entry, pairwise distinct within the collection.
///
/// The first occurrence of each persisted id keeps it. Entries without an id
/// get `fallback(index)`, and repeated persisted ids are re-minted; either
/// takes a `-1`, `-2`, ... suffix when the base id is already taken. The
/// result depends only on the input, so reloading an export yields the same
/// ids.
fn unique_ids<'a>(
    persisted: impl Iterator<Item = Option<&'a str>>,
    fallback: impl Fn(usize) -> String,
) -> Vec<String> {
    let persisted: Vec<Option<&str>> = persisted.collect();
    let mut taken: HashSet<String> = HashSet::new();
    let claimed: Vec<bool> = persisted
        .iter()
        .map(|id| id.is_some_and(|id| taken.insert(id.to_string())))
        .collect();

    persisted
        .iter()
        .zip(claimed)
        .enumerate()
        .map(|(idx, (id, claimed))| {
            if let (Some(id), true) = (id, claimed) {
                return (*id).to_string();
            }
            let base = id.map_or_else(|| fallback(idx), str::to_string);
            let mut candidate = base.clone();
            let mut suffix = 0;
            while taken.contains(&candidate) {
                suffix += 1;
                candidate = format!("{base}-{suffix}");
            }
            if id.is_some() {
                warn!("Duplicate id '{base}' at index {idx}; using '{candidate}'");
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// Deserializes an optional top-level field.
fn field<T: DeserializeOwned>(raw: &Map<String, Value>, name: &'static str) -> ConfigureResult<Option<T>> {
    match raw.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|source| ConfigureError::InvalidConfig { field: name, source }),
    }
}

/// Resolves one persisted key, falling back to a placeholder.
fn resolve_key(table: Option<&KeyNameTable>, persisted: PersistedKey) -> Key {
    let resolved = match table {
        Some(table) => table.resolve(&persisted.key),
        None => Err(ConfigureError::UnknownKeyCode(persisted.key.clone())),
    };

    match resolved {
        Ok(key) => key.with_extra(persisted.extra),
        Err(err) => {
            warn!("{err}; keeping placeholder");
            Key::placeholder(persisted.key, persisted.label).with_extra(persisted.extra)
        }
    }
}

/// Resolves a macro sequence of key-name combos.
fn resolve_sequence(table: Option<&KeyNameTable>, sequence: Vec<Vec<String>>) -> Vec<Vec<Key>> {
    sequence
        .into_iter()
        .map(|combo| {
            combo
                .into_iter()
                .map(|code| {
                    resolve_key(
                        table,
                        PersistedKey {
                            key: code,
                            label: None,
                            extra: Map::new(),
                        },
                    )
                })
                .collect()
        })
        .collect()
}
