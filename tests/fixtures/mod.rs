//! Shared test fixtures for configuration session tests.
#![allow(dead_code)] // Not every test file uses every fixture

use kllconf::ids::SequentialIds;
use kllconf::locales::Locales;
use kllconf::services::Configurator;
use serde_json::{json, Value};

/// A persisted config exercising every field the normalizer reads, plus a
/// field it does not (`generator`). Labels match the en-us table so the
/// document survives an export unchanged.
pub fn sample_config() -> Value {
    json!({
        "generator": "test-suite",
        "header": {
            "Name": "Test Keyboard",
            "Layout": "TKL",
            "Author": "Test Suite"
        },
        "matrix": [
            {
                "code": "0x01",
                "x": 0,
                "y": 0,
                "w": 1,
                "h": 1,
                "layers": {
                    "0": { "key": "ESC", "label": "Esc" },
                    "1": { "key": "LAYER_SHIFT1", "label": "Shift 1" }
                }
            },
            {
                "code": "0x02",
                "x": 1.5,
                "y": 0,
                "w": 1,
                "h": 1,
                "layers": {
                    "0": { "key": "1", "label": "1" }
                }
            },
            {
                "code": "0x03",
                "x": 2.5,
                "y": 0,
                "w": 2.25,
                "h": 1,
                "layers": {
                    "0": { "key": "LSHIFT", "label": "Shift" }
                }
            }
        ],
        "defines": [
            { "name": "DEBOUNCE_MS", "value": "5" },
            { "name": "ISSI_CHIPS", "value": "2" }
        ],
        "leds": [
            { "id": 1, "x": 0, "y": 0, "scanCode": "0x01" },
            { "id": 2, "x": 1, "y": 0, "scanCode": "0x02" }
        ],
        "custom": {
            "0": "U\"A\" : U\"B\";",
            "1": ""
        },
        "animations": {
            "blink": { "settings": "loop", "frames": ["A[1](255)", "A[1](0)"] }
        },
        "macros": {
            "0": [
                { "name": "Hello", "trigger": [["LSHIFT", "A"]], "output": [["B"], ["C"]] }
            ],
            "1": []
        }
    })
}

/// A persisted config whose defines, macros and animations carry ids and
/// fields this library does not interpret. Exporting it without edits must
/// reproduce it exactly.
pub fn annotated_config() -> Value {
    json!({
        "defines": [
            { "id": "debounce", "name": "DEBOUNCE_MS", "value": "5", "comment": "keep me" },
            { "name": "ISSI_CHIPS", "value": "2" }
        ],
        "animations": {
            "glow": { "settings": "", "frames": "A[1](255)\nA[1](0)", "type": "static" }
        },
        "macros": {
            "0": [
                { "id": "mk", "name": "Hello", "trigger": [["A"]], "output": [["B"]], "enabled": true },
                { "name": "Plain", "trigger": [["C"]], "output": [["D"]] }
            ]
        }
    })
}

/// A persisted config whose ids collide: a repeated document id, and a
/// document id equal to the positional id another entry would get.
pub fn colliding_ids_config() -> Value {
    json!({
        "defines": [
            { "id": "define-1", "name": "A", "value": "1" },
            { "name": "B", "value": "2" },
            { "id": "dup", "name": "C", "value": "3" },
            { "id": "dup", "name": "D", "value": "4" }
        ],
        "macros": {
            "0": [
                { "id": "m", "name": "first" },
                { "id": "m", "name": "second" }
            ]
        }
    })
}

/// A session with deterministic ids and no config loaded.
pub fn empty_session() -> Configurator {
    let locales = Locales::load().expect("embedded locales should load");
    Configurator::with_ids(locales, Box::new(SequentialIds::new("new")))
}

/// A session with [`sample_config`] loaded in the en-us locale.
pub fn loaded_session() -> Configurator {
    let mut session = empty_session();
    session
        .update_config(sample_config(), "en-us")
        .expect("sample config should load");
    session
}
