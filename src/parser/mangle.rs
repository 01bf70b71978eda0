//! Editable model back to persisted config fragments.

use crate::error::{ConfigureError, ConfigureResult};
use crate::models::{ConfigModel, PersistedAnimation, PersistedKey, PersistedMacro};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Matrix entry as written back: pass-through fields plus per-layer keys.
#[derive(Serialize)]
struct MangledMatrixItem<'a> {
    layers: BTreeMap<&'a str, PersistedKey>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

/// Converts the editable model into persisted-format fields.
///
/// Only fields present in `model` are emitted. Define and macro ids are
/// written only when they were read from the document.
///
/// # Errors
///
/// Returns [`ConfigureError::Export`] if a field fails to serialize.
pub fn mangle(model: &ConfigModel) -> ConfigureResult<Map<String, Value>> {
    let mut out = Map::new();

    if let Some(header) = &model.header {
        put(&mut out, "header", header)?;
    }

    if let Some(matrix) = &model.matrix {
        let items: Vec<MangledMatrixItem<'_>> = matrix
            .iter()
            .map(|item| MangledMatrixItem {
                layers: item
                    .layers
                    .iter()
                    .map(|(layer, key)| (layer.as_str(), key.to_persisted()))
                    .collect(),
                extra: &item.extra,
            })
            .collect();
        put(&mut out, "matrix", &items)?;
    }

    if let Some(defines) = &model.defines {
        let defines: Vec<_> = defines.iter().map(|d| d.to_persisted()).collect();
        put(&mut out, "defines", &defines)?;
    }

    if let Some(leds) = &model.leds {
        put(&mut out, "leds", leds)?;
    }

    if let Some(custom) = &model.custom {
        put(&mut out, "custom", custom)?;
    }

    if let Some(animations) = &model.animations {
        let animations: BTreeMap<&str, PersistedAnimation> = animations
            .iter()
            .map(|(name, anim)| (name.as_str(), anim.to_persisted()))
            .collect();
        put(&mut out, "animations", &animations)?;
    }

    if let Some(macros) = &model.macros {
        let macros: BTreeMap<&str, Vec<PersistedMacro>> = macros
            .iter()
            .map(|(layer, list)| (layer.as_str(), list.iter().map(|m| m.to_persisted()).collect()))
            .collect();
        put(&mut out, "macros", &macros)?;
    }

    Ok(out)
}

/// Overlays mangled fields on the raw document.
///
/// Mangled fields win; every other raw field passes through. A missing or
/// non-object `raw` merges over an empty object.
pub fn merge_over(raw: Option<&Value>, mangled: Map<String, Value>) -> Value {
    let mut merged = raw
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    merged.extend(mangled);
    Value::Object(merged)
}

fn put<T: Serialize + ?Sized>(
    out: &mut Map<String, Value>,
    name: &'static str,
    value: &T,
) -> ConfigureResult<()> {
    let value = serde_json::to_value(value)
        .map_err(|source| ConfigureError::Export { field: name, source })?;
    out.insert(name.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Animation, Define, Key, Macro, MatrixItem, MatrixItemId};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_mangle_empty_model_emits_nothing() {
        assert!(mangle(&ConfigModel::default()).unwrap().is_empty());
    }

    #[test]
    fn test_mangle_matrix_keeps_extra_fields() {
        let mut item = MatrixItem::new(MatrixItemId(0)).with_key(0, Key::new("A", "A"));
        item.extra.insert("code".to_string(), json!("0x04"));
        item.extra.insert("x".to_string(), json!(1.5));
        let model = ConfigModel {
            matrix: Some(vec![Arc::new(item)]),
            ..ConfigModel::default()
        };

        let out = mangle(&model).unwrap();
        assert_eq!(
            out["matrix"],
            json!([{ "code": "0x04", "x": 1.5, "layers": { "0": { "key": "A", "label": "A" } } }])
        );
    }

    #[test]
    fn test_mangle_omits_session_ids() {
        let mut m = Macro::new("m-1");
        m.trigger = vec![vec![Key::new("A", "A")]];
        let model = ConfigModel {
            defines: Some(vec![Define::new("d-1", "FOO", "1")]),
            macros: Some([("0".to_string(), vec![m])].into_iter().collect()),
            ..ConfigModel::default()
        };

        let out = mangle(&model).unwrap();
        assert_eq!(out["defines"], json!([{ "name": "FOO", "value": "1" }]));
        assert_eq!(
            out["macros"],
            json!({ "0": [{ "name": "New Macro", "trigger": [["A"]], "output": [[]] }] })
        );
    }

    #[test]
    fn test_mangle_splits_animation_frames() {
        let model = ConfigModel {
            animations: Some(
                [("blink".to_string(), Animation::new("loop", "a\nb"))]
                    .into_iter()
                    .collect(),
            ),
            ..ConfigModel::default()
        };
        assert_eq!(
            mangle(&model).unwrap()["animations"],
            json!({ "blink": { "settings": "loop", "frames": ["a", "b"] } })
        );
    }

    #[test]
    fn test_merge_over_prefers_mangled() {
        let raw = json!({ "header": { "Name": "old" }, "version": 3 });
        let mut mangled = Map::new();
        mangled.insert("header".to_string(), json!({ "Name": "new" }));

        let merged = merge_over(Some(&raw), mangled);
        assert_eq!(merged, json!({ "header": { "Name": "new" }, "version": 3 }));
    }

    #[test]
    fn test_merge_over_missing_raw() {
        let mut mangled = Map::new();
        mangled.insert("custom".to_string(), json!({ "0": "" }));
        assert_eq!(merge_over(None, mangled), json!({ "custom": { "0": "" } }));
    }
}
