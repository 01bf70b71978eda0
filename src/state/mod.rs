//! Observable configuration store.
//!
//! [`ConfigureStore`] holds the editable model and the UI-only session fields
//! behind a fixed schema. Each schema entry is a [`Field`] marker type in
//! [`fields`], so reads and writes are typed:
//!
//! ```
//! use kllconf::config::UiConfig;
//! use kllconf::state::{fields, ConfigureStore};
//!
//! let mut store = ConfigureStore::new(UiConfig::default());
//! store.set::<fields::Layer>(2);
//! store.update::<fields::Layer>(|layer| layer + 1);
//! assert_eq!(*store.get::<fields::Layer>(), 3);
//! ```
//!
//! Collection fields are `Arc`-shared: writing a field swaps the whole value,
//! so a [`snapshot`](ConfigureStore::snapshot) taken earlier stays valid.

use crate::config::UiConfig;
use crate::models::{Animations, CustomKll, Define, Headers, Led, Macros, Matrix, MatrixItemId};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Names of the store fields, used for subscriptions and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// A config is being loaded
    Loading,
    /// Name of the physical layout
    Layout,
    /// Active editing layer
    Layer,
    /// Persisted document the session was loaded from
    Raw,
    /// Header entries
    Headers,
    /// Matrix items
    Matrix,
    /// Defines
    Defines,
    /// LEDs
    Leds,
    /// Custom KLL per layer
    Custom,
    /// Animations
    Animations,
    /// Macros per layer
    Macros,
    /// Selected matrix item
    Selected,
    /// Keyboard view collapsed
    KeyboardHidden,
    /// UI sizing constants
    Ui,
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::Layout => "layout",
            Self::Layer => "layer",
            Self::Raw => "raw",
            Self::Headers => "headers",
            Self::Matrix => "matrix",
            Self::Defines => "defines",
            Self::Leds => "leds",
            Self::Custom => "custom",
            Self::Animations => "animations",
            Self::Macros => "macros",
            Self::Selected => "selected",
            Self::KeyboardHidden => "keyboardHidden",
            Self::Ui => "ui",
        };
        f.write_str(name)
    }
}

/// Current values of every store field.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureState {
    /// A config is being loaded
    pub loading: bool,
    /// Name of the physical layout
    pub layout: Option<String>,
    /// Active editing layer
    pub layer: u32,
    /// Persisted document the session was loaded from
    pub raw: Option<Arc<Value>>,
    /// Header entries
    pub headers: Option<Arc<Headers>>,
    /// Matrix items
    pub matrix: Option<Arc<Matrix>>,
    /// Defines
    pub defines: Option<Arc<Vec<Define>>>,
    /// LEDs
    pub leds: Option<Arc<Vec<Led>>>,
    /// Custom KLL per layer
    pub custom: Option<Arc<CustomKll>>,
    /// Animations
    pub animations: Option<Arc<Animations>>,
    /// Macros per layer
    pub macros: Option<Arc<Macros>>,
    /// Selected matrix item; always present in `matrix` when set
    pub selected: Option<MatrixItemId>,
    /// Keyboard view collapsed
    pub keyboard_hidden: bool,
    /// UI sizing constants
    pub ui: UiConfig,
}

impl ConfigureState {
    /// Initial state: nothing loaded, layer 0.
    #[must_use]
    pub fn new(ui: UiConfig) -> Self {
        Self {
            loading: false,
            layout: None,
            layer: 0,
            raw: None,
            headers: None,
            matrix: None,
            defines: None,
            leds: None,
            custom: None,
            animations: None,
            macros: None,
            selected: None,
            keyboard_hidden: false,
            ui,
        }
    }
}

/// A typed entry of the store schema.
pub trait Field {
    /// Key reported to subscribers
    const KEY: StateKey;
    /// Stored value type
    type Value;

    /// Borrows this field from a state.
    fn slot(state: &ConfigureState) -> &Self::Value;

    /// Mutably borrows this field from a state.
    fn slot_mut(state: &mut ConfigureState) -> &mut Self::Value;
}

macro_rules! fields {
    ($($(#[$doc:meta])* $name:ident => $field:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl Field for $name {
                const KEY: StateKey = StateKey::$name;
                type Value = $ty;

                fn slot(state: &ConfigureState) -> &Self::Value {
                    &state.$field
                }

                fn slot_mut(state: &mut ConfigureState) -> &mut Self::Value {
                    &mut state.$field
                }
            }
        )*
    };
}

/// Marker types for each store field.
pub mod fields {
    use super::{Arc, ConfigureState, Field, MatrixItemId, StateKey, UiConfig, Value};
    use crate::models;

    fields! {
        /// `loading` flag
        Loading => loading: bool;
        /// Layout name
        Layout => layout: Option<String>;
        /// Active layer
        Layer => layer: u32;
        /// Raw persisted document
        Raw => raw: Option<Arc<Value>>;
        /// Header entries
        Headers => headers: Option<Arc<models::Headers>>;
        /// Matrix items
        Matrix => matrix: Option<Arc<models::Matrix>>;
        /// Defines
        Defines => defines: Option<Arc<Vec<models::Define>>>;
        /// LEDs
        Leds => leds: Option<Arc<Vec<models::Led>>>;
        /// Custom KLL
        Custom => custom: Option<Arc<models::CustomKll>>;
        /// Animations
        Animations => animations: Option<Arc<models::Animations>>;
        /// Macros
        Macros => macros: Option<Arc<models::Macros>>;
        /// Selected item
        Selected => selected: Option<MatrixItemId>;
        /// Keyboard hidden flag
        KeyboardHidden => keyboard_hidden: bool;
        /// UI sizing constants
        Ui => ui: UiConfig;
    }
}

/// Handle returned by [`ConfigureStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(StateKey, &ConfigureState)>;

struct Subscriber {
    id: SubscriptionId,
    key: StateKey,
    callback: Callback,
}

/// Authoritative mutable state for one editing session.
///
/// All writes go through [`set`](Self::set) or [`update`](Self::update),
/// which notify the subscribers of the written key synchronously.
pub struct ConfigureStore {
    state: ConfigureState,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl fmt::Debug for ConfigureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for ConfigureStore {
    fn default() -> Self {
        Self::new(UiConfig::default())
    }
}

impl ConfigureStore {
    /// Creates an empty store with the given UI sizing constants.
    #[must_use]
    pub fn new(ui: UiConfig) -> Self {
        Self {
            state: ConfigureState::new(ui),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current value of field `F`.
    #[must_use]
    pub fn get<F: Field>(&self) -> &F::Value {
        F::slot(&self.state)
    }

    /// Replaces field `F` and notifies its subscribers.
    pub fn set<F: Field>(&mut self, value: F::Value) {
        *F::slot_mut(&mut self.state) = value;
        self.notify(F::KEY);
    }

    /// Read-modify-write of field `F`.
    ///
    /// `updater` runs synchronously with the current value; its return value
    /// becomes the new value.
    pub fn update<F: Field>(&mut self, updater: impl FnOnce(&F::Value) -> F::Value) {
        let next = updater(F::slot(&self.state));
        self.set::<F>(next);
    }

    /// Borrows every field at once.
    #[must_use]
    pub fn state(&self) -> &ConfigureState {
        &self.state
    }

    /// Copies every field. Collections are shared, so this is cheap, and the
    /// copy is unaffected by later writes.
    #[must_use]
    pub fn snapshot(&self) -> ConfigureState {
        self.state.clone()
    }

    /// Restores the editing-session fields to their initial values.
    ///
    /// `ui` and `loading` are kept.
    pub fn reset(&mut self) {
        self.set::<fields::Layer>(0);
        self.set::<fields::Layout>(None);
        self.set::<fields::Selected>(None);
        self.set::<fields::KeyboardHidden>(false);
        self.set::<fields::Raw>(None);
        self.set::<fields::Headers>(None);
        self.set::<fields::Matrix>(None);
        self.set::<fields::Defines>(None);
        self.set::<fields::Leds>(None);
        self.set::<fields::Custom>(None);
        self.set::<fields::Animations>(None);
        self.set::<fields::Macros>(None);
    }

    /// Registers `callback` to run after every write to `key`.
    pub fn subscribe<C>(&mut self, key: StateKey, callback: C) -> SubscriptionId
    where
        C: FnMut(StateKey, &ConfigureState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            key,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a subscription. Returns false if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, key: StateKey) {
        let state = &self.state;
        for subscriber in self.subscribers.iter_mut().filter(|s| s.key == key) {
            (subscriber.callback)(key, state);
        }
    }
}
