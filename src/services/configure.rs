//! Editing operations over the configuration store.
//!
//! Every operation reads the fields it needs, builds a new value without
//! touching the old one, and writes it back through the store. Matrix items
//! that an edit does not touch keep their `Arc`, so earlier snapshots and
//! render trees stay valid.

use crate::config::Settings;
use crate::error::{ConfigureError, ConfigureResult, TargetKind};
use crate::ids::{IdSource, UuidSource};
use crate::locales::Locales;
use crate::models::{
    layer_key, Animation, AnimationPatch, ConfigModel, Define, Key, Macro, Matrix, MatrixItem,
    MatrixItemId,
};
use crate::parser::{mangle, merge_over, normalize};
use crate::state::{fields, ConfigureStore, Field, StateKey};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// One editing session: the store, the key-name tables it normalizes with,
/// and the id source for new defines and macros.
pub struct Configurator {
    store: ConfigureStore,
    locales: Locales,
    ids: Box<dyn IdSource>,
}

impl std::fmt::Debug for Configurator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configurator")
            .field("store", &self.store)
            .field("locales", &self.locales.ids())
            .finish_non_exhaustive()
    }
}

/// Borrows a loaded field or reports which field is not loaded.
fn loaded<F, T>(store: &ConfigureStore) -> ConfigureResult<&Arc<T>>
where
    F: Field<Value = Option<Arc<T>>>,
{
    store
        .get::<F>()
        .as_ref()
        .ok_or(ConfigureError::NotLoaded(F::KEY))
}

impl Configurator {
    /// Creates a session with random UUID ids and default UI constants.
    #[must_use]
    pub fn new(locales: Locales) -> Self {
        Self::with_ids(locales, Box::new(UuidSource))
    }

    /// Creates a session drawing new ids from `ids`.
    #[must_use]
    pub fn with_ids(locales: Locales, ids: Box<dyn IdSource>) -> Self {
        Self {
            store: ConfigureStore::default(),
            locales,
            ids,
        }
    }

    /// Creates a session whose store uses the UI constants from `settings`.
    #[must_use]
    pub fn with_settings(locales: Locales, settings: &Settings) -> Self {
        Self {
            store: ConfigureStore::new(settings.ui),
            locales,
            ids: Box::new(UuidSource),
        }
    }

    /// The underlying store, for reads and subscriptions.
    #[must_use]
    pub fn store(&self) -> &ConfigureStore {
        &self.store
    }

    /// Mutable access to the store, for subscriptions.
    pub fn store_mut(&mut self) -> &mut ConfigureStore {
        &mut self.store
    }

    /// The key-name tables.
    #[must_use]
    pub fn locales(&self) -> &Locales {
        &self.locales
    }

    /// Clears the editing session (disconnect, keyboard switch).
    pub fn reset(&mut self) {
        info!("Resetting configuration session");
        self.store.reset();
    }

    /// Loads a persisted config, replacing `raw` and every editable field.
    ///
    /// An unregistered `locale` normalizes without a key-name table, so every
    /// key becomes a placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureError::InvalidConfig`] if a field of `raw` is
    /// malformed; the store is left untouched in that case.
    pub fn update_config(&mut self, raw: Value, locale: &str) -> ConfigureResult<()> {
        let table = self.locales.get(locale);
        if table.is_none() {
            debug!("No key-name table for locale '{locale}'");
        }
        let model = normalize(&raw, table)?;

        info!(
            "Loaded config: {} matrix items, {} defines, locale {}",
            model.matrix.as_ref().map_or(0, Vec::len),
            model.defines.as_ref().map_or(0, Vec::len),
            locale
        );

        self.store.set::<fields::Raw>(Some(Arc::new(raw)));
        self.store.set::<fields::Headers>(model.header.map(Arc::new));
        self.store.set::<fields::Matrix>(model.matrix.map(Arc::new));
        self.store.set::<fields::Defines>(model.defines.map(Arc::new));
        self.store.set::<fields::Leds>(model.leds.map(Arc::new));
        self.store.set::<fields::Custom>(model.custom.map(Arc::new));
        self.store.set::<fields::Animations>(model.animations.map(Arc::new));
        self.store.set::<fields::Macros>(model.macros.map(Arc::new));

        // A selection from a previous config may not exist in this matrix
        if let Some(selected) = *self.store.get::<fields::Selected>() {
            if self.find_item(selected).is_none() {
                self.store.set::<fields::Selected>(None);
            }
        }
        Ok(())
    }

    /// Editable fields as a model, for export.
    #[must_use]
    pub fn model(&self) -> ConfigModel {
        let state = self.store.state();
        ConfigModel {
            header: state.headers.as_deref().cloned(),
            matrix: state.matrix.as_deref().cloned(),
            defines: state.defines.as_deref().cloned(),
            leds: state.leds.as_deref().cloned(),
            custom: state.custom.as_deref().cloned(),
            animations: state.animations.as_deref().cloned(),
            macros: state.macros.as_deref().cloned(),
        }
    }

    /// Exports the current config: the mangled editable fields laid over
    /// the raw document. Does not modify the store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureError::Export`] if a field fails to serialize.
    pub fn current_config(&self) -> ConfigureResult<Value> {
        let mangled = mangle(&self.model())?;
        Ok(merge_over(self.store.get::<fields::Raw>().as_deref(), mangled))
    }

    /// Sets the active editing layer.
    pub fn set_layer(&mut self, layer: u32) {
        debug!("Switching to layer {layer}");
        self.store.set::<fields::Layer>(layer);
    }

    /// Sets the physical layout name.
    pub fn set_layout(&mut self, layout: Option<String>) {
        self.store.set::<fields::Layout>(layout);
    }

    /// Collapses or expands the keyboard view.
    pub fn set_keyboard_hidden(&mut self, hidden: bool) {
        self.store.set::<fields::KeyboardHidden>(hidden);
    }

    /// Marks a load in progress.
    pub fn set_loading(&mut self, loading: bool) {
        self.store.set::<fields::Loading>(loading);
    }

    /// Looks up a matrix item by handle.
    #[must_use]
    pub fn find_item(&self, id: MatrixItemId) -> Option<&Arc<MatrixItem>> {
        self.store
            .get::<fields::Matrix>()
            .as_ref()?
            .iter()
            .find(|item| item.id == id)
    }

    /// Selects a matrix item.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureError::TargetNotFound`] if `id` is not in the
    /// matrix; the selection is left unchanged.
    pub fn select_key(&mut self, id: MatrixItemId) -> ConfigureResult<()> {
        loaded::<fields::Matrix, _>(&self.store)?;
        if self.find_item(id).is_none() {
            return Err(ConfigureError::TargetNotFound {
                kind: TargetKind::MatrixItem,
                id: id.to_string(),
            });
        }
        self.store.set::<fields::Selected>(Some(id));
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.store.set::<fields::Selected>(None);
    }

    /// The selected matrix item, if any.
    #[must_use]
    pub fn selected_item(&self) -> Option<&Arc<MatrixItem>> {
        self.find_item((*self.store.get::<fields::Selected>())?)
    }

    /// Assigns `key` on the current layer of the selected item.
    ///
    /// Returns the rebuilt item, or `None` when nothing is selected.
    pub fn update_selected(&mut self, key: Key) -> ConfigureResult<Option<Arc<MatrixItem>>> {
        let Some(selected) = *self.store.get::<fields::Selected>() else {
            debug!("No key selected; ignoring keymap update");
            return Ok(None);
        };
        let updated = self.update_keymap(selected, key)?;
        self.store.set::<fields::Selected>(Some(selected));
        Ok(updated)
    }

    /// Replaces `target`'s entry on the current layer with `key`.
    ///
    /// Every other item keeps its `Arc`, and the target's other layers are
    /// carried over. Returns the rebuilt item, or `None` if `target` is not
    /// in the matrix (the matrix is then unchanged).
    pub fn update_keymap(
        &mut self,
        target: MatrixItemId,
        key: Key,
    ) -> ConfigureResult<Option<Arc<MatrixItem>>> {
        loaded::<fields::Matrix, _>(&self.store)?;
        let layer = *self.store.get::<fields::Layer>();

        let mut rebuilt = None;
        self.store.update::<fields::Matrix>(|matrix| {
            matrix.as_ref().map(|matrix| {
                let items: Matrix = matrix
                    .iter()
                    .map(|item| {
                        if item.id != target {
                            return Arc::clone(item);
                        }
                        let updated = Arc::new(item.with_key(layer, key.clone()));
                        rebuilt = Some(Arc::clone(&updated));
                        updated
                    })
                    .collect();
                Arc::new(items)
            })
        });

        match &rebuilt {
            Some(_) => debug!("Assigned {} to {target} on layer {layer}", key.key),
            None => debug!("Matrix item {target} not found; keymap unchanged"),
        }
        Ok(rebuilt)
    }

    /// Sets the custom KLL fragment of the current layer.
    pub fn update_custom_kll(&mut self, kll: impl Into<String>) -> ConfigureResult<()> {
        loaded::<fields::Custom, _>(&self.store)?;
        let layer = layer_key(*self.store.get::<fields::Layer>());
        let kll = kll.into();

        debug!("Updating custom KLL for layer {layer}");
        self.store.update::<fields::Custom>(|custom| {
            custom.as_ref().map(|custom| {
                let mut next = (**custom).clone();
                next.insert(layer, kll);
                Arc::new(next)
            })
        });
        Ok(())
    }

    /// Inserts or overwrites one header entry.
    pub fn update_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ConfigureResult<()> {
        loaded::<fields::Headers, _>(&self.store)?;
        let (name, value) = (name.into(), value.into());

        self.store.update::<fields::Headers>(|headers| {
            headers.as_ref().map(|headers| {
                let mut next = (**headers).clone();
                next.insert(name, value);
                Arc::new(next)
            })
        });
        Ok(())
    }

    /// Replaces the name and value of the define with `id`, keeping its
    /// pass-through fields.
    ///
    /// Returns false, leaving the defines unchanged, if no define has `id`.
    pub fn update_define(
        &mut self,
        id: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ConfigureResult<bool> {
        let defines = loaded::<fields::Defines, _>(&self.store)?;
        if !defines.iter().any(|d| d.id == id) {
            debug!("Define '{id}' not found; defines unchanged");
            return Ok(false);
        }

        let (name, value) = (name.into(), value.into());
        self.store.update::<fields::Defines>(|defines| {
            defines.as_ref().map(|defines| {
                let next: Vec<Define> = defines
                    .iter()
                    .map(|d| {
                        if d.id == id {
                            d.renamed(name.clone(), value.clone())
                        } else {
                            d.clone()
                        }
                    })
                    .collect();
                Arc::new(next)
            })
        });
        Ok(true)
    }

    /// Appends a define with a fresh id and returns the id.
    pub fn add_define(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ConfigureResult<String> {
        loaded::<fields::Defines, _>(&self.store)?;
        let define = Define::new(self.ids.new_id(), name, value);
        let id = define.id.clone();

        debug!("Adding define '{}' as {id}", define.name);
        self.store.update::<fields::Defines>(|defines| {
            defines.as_ref().map(|defines| {
                let mut next = (**defines).clone();
                next.push(define);
                Arc::new(next)
            })
        });
        Ok(id)
    }

    /// Removes every define with `id`.
    pub fn delete_define(&mut self, id: &str) -> ConfigureResult<()> {
        loaded::<fields::Defines, _>(&self.store)?;
        self.store.update::<fields::Defines>(|defines| {
            defines.as_ref().map(|defines| {
                Arc::new(defines.iter().filter(|d| d.id != id).cloned().collect::<Vec<_>>())
            })
        });
        Ok(())
    }

    /// Inserts an empty animation under `name`, replacing any existing one.
    pub fn add_animation(&mut self, name: impl Into<String>) -> ConfigureResult<()> {
        loaded::<fields::Animations, _>(&self.store)?;
        let name = name.into();

        self.store.update::<fields::Animations>(|animations| {
            animations.as_ref().map(|animations| {
                let mut next = (**animations).clone();
                next.insert(name, Animation::default());
                Arc::new(next)
            })
        });
        Ok(())
    }

    /// Moves the animation `prev` to `updated`, overwriting any animation
    /// already named `updated`.
    ///
    /// Returns false, leaving the animations unchanged, if `prev` is absent.
    pub fn rename_animation(&mut self, prev: &str, updated: impl Into<String>) -> ConfigureResult<bool> {
        let animations = loaded::<fields::Animations, _>(&self.store)?;
        if !animations.contains_key(prev) {
            debug!("Animation '{prev}' not found; nothing to rename");
            return Ok(false);
        }
        let updated = updated.into();

        self.store.update::<fields::Animations>(|animations| {
            animations.as_ref().map(|animations| {
                let mut next = (**animations).clone();
                if let Some(animation) = next.remove(prev) {
                    next.insert(updated, animation);
                }
                Arc::new(next)
            })
        });
        Ok(true)
    }

    /// Applies `patch` over the animation `name`.
    ///
    /// A missing animation is created from the patch, with unset fields
    /// empty.
    pub fn update_animation(&mut self, name: &str, patch: AnimationPatch) -> ConfigureResult<()> {
        loaded::<fields::Animations, _>(&self.store)?;

        self.store.update::<fields::Animations>(|animations| {
            animations.as_ref().map(|animations| {
                let mut next = (**animations).clone();
                let merged = next.get(name).cloned().unwrap_or_default().merged(&patch);
                next.insert(name.to_string(), merged);
                Arc::new(next)
            })
        });
        Ok(())
    }

    /// Removes the animation `name`, if present.
    pub fn delete_animation(&mut self, name: &str) -> ConfigureResult<()> {
        loaded::<fields::Animations, _>(&self.store)?;
        self.store.update::<fields::Animations>(|animations| {
            animations.as_ref().map(|animations| {
                let mut next = (**animations).clone();
                next.remove(name);
                Arc::new(next)
            })
        });
        Ok(())
    }

    /// Replaces the macro `macro_id` on `layer` with `updated`, keeping its
    /// position, its id and its pass-through fields.
    ///
    /// Returns false, leaving the macros unchanged, if the layer has no such
    /// macro.
    pub fn update_macro(&mut self, layer: u32, macro_id: &str, updated: Macro) -> ConfigureResult<bool> {
        let macros = loaded::<fields::Macros, _>(&self.store)?;
        let layer = layer_key(layer);
        let Some(idx) = macros
            .get(&layer)
            .and_then(|list| list.iter().position(|m| m.id == macro_id))
        else {
            debug!("Macro '{macro_id}' not found on layer {layer}; macros unchanged");
            return Ok(false);
        };

        let original = &macros[&layer][idx];
        let replacement = Macro {
            id: original.id.clone(),
            persisted_id: original.persisted_id,
            extra: original.extra.clone(),
            ..updated
        };
        self.store.update::<fields::Macros>(|macros| {
            macros.as_ref().map(|macros| {
                let mut next = (**macros).clone();
                if let Some(list) = next.get_mut(&layer) {
                    list[idx] = replacement;
                }
                Arc::new(next)
            })
        });
        Ok(true)
    }

    /// Appends a new empty macro to `layer` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureError::MissingMacroLayer`] if `layer` has no macro
    /// list.
    pub fn add_macro(&mut self, layer: u32) -> ConfigureResult<String> {
        let macros = loaded::<fields::Macros, _>(&self.store)?;
        let layer = layer_key(layer);
        if !macros.contains_key(&layer) {
            return Err(ConfigureError::MissingMacroLayer(layer));
        }

        let new_macro = Macro::new(self.ids.new_id());
        let id = new_macro.id.clone();

        debug!("Adding macro {id} to layer {layer}");
        self.store.update::<fields::Macros>(|macros| {
            macros.as_ref().map(|macros| {
                let mut next = (**macros).clone();
                next.entry(layer).or_default().push(new_macro);
                Arc::new(next)
            })
        });
        Ok(id)
    }

    /// Removes the first macro with `macro_id` from `layer`, if present.
    pub fn delete_macro(&mut self, layer: u32, macro_id: &str) -> ConfigureResult<()> {
        loaded::<fields::Macros, _>(&self.store)?;
        let layer = layer_key(layer);

        self.store.update::<fields::Macros>(|macros| {
            macros.as_ref().map(|macros| {
                let mut next = (**macros).clone();
                if let Some(list) = next.get_mut(&layer) {
                    if let Some(idx) = list.iter().position(|m| m.id == macro_id) {
                        list.remove(idx);
                    }
                }
                Arc::new(next)
            })
        });
        Ok(())
    }

    /// Looks up a define by id.
    pub fn define(&self, id: &str) -> ConfigureResult<&Define> {
        loaded::<fields::Defines, _>(&self.store)?
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ConfigureError::TargetNotFound {
                kind: TargetKind::Define,
                id: id.to_string(),
            })
    }

    /// Looks up an animation by name.
    pub fn animation(&self, name: &str) -> ConfigureResult<&Animation> {
        loaded::<fields::Animations, _>(&self.store)?
            .get(name)
            .ok_or_else(|| ConfigureError::TargetNotFound {
                kind: TargetKind::Animation,
                id: name.to_string(),
            })
    }

    /// Looks up a macro by id within `layer`.
    pub fn macro_on(&self, layer: u32, macro_id: &str) -> ConfigureResult<&Macro> {
        loaded::<fields::Macros, _>(&self.store)?
            .get(&layer_key(layer))
            .and_then(|list| list.iter().find(|m| m.id == macro_id))
            .ok_or_else(|| ConfigureError::TargetNotFound {
                kind: TargetKind::Macro,
                id: macro_id.to_string(),
            })
    }

    /// Layer numbers in use across the matrix, custom KLL and macros,
    /// ascending. Layer 0 is always included.
    #[must_use]
    pub fn layers(&self) -> Vec<u32> {
        let state = self.store.state();
        let mut layers: BTreeSet<u32> = BTreeSet::from([0]);

        let matrix_layers = state
            .matrix
            .iter()
            .flat_map(|m| m.iter())
            .flat_map(|item| item.layers.keys());
        let custom_layers = state.custom.iter().flat_map(|c| c.keys());
        let macro_layers = state.macros.iter().flat_map(|m| m.keys());

        layers.extend(
            matrix_layers
                .chain(custom_layers)
                .chain(macro_layers)
                .filter_map(|key| key.parse::<u32>().ok()),
        );
        layers.into_iter().collect()
    }

    /// Whether the field named by `key` holds a value. UI actions check this
    /// before dispatching a mutation.
    #[must_use]
    pub fn is_loaded(&self, key: StateKey) -> bool {
        let state = self.store.state();
        match key {
            StateKey::Raw => state.raw.is_some(),
            StateKey::Headers => state.headers.is_some(),
            StateKey::Matrix => state.matrix.is_some(),
            StateKey::Defines => state.defines.is_some(),
            StateKey::Leds => state.leds.is_some(),
            StateKey::Custom => state.custom.is_some(),
            StateKey::Animations => state.animations.is_some(),
            StateKey::Macros => state.macros.is_some(),
            StateKey::Layout => state.layout.is_some(),
            StateKey::Selected => state.selected.is_some(),
            StateKey::Loading | StateKey::Layer | StateKey::KeyboardHidden | StateKey::Ui => true,
        }
    }
}
