//! LED animation definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Animation frames as persisted: a list of lines, or already-joined text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedFrames {
    /// One entry per frame line
    Lines(Vec<String>),
    /// Newline-separated frames
    Text(String),
}

impl Default for PersistedFrames {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

/// Animation as stored in the persisted config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedAnimation {
    /// Animation settings expression
    #[serde(default)]
    pub settings: String,
    /// Frame definitions
    #[serde(default)]
    pub frames: PersistedFrames,
    /// Fields this layer does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Editable animation. Frames are edited as one block of text, one frame per
/// line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Animation {
    /// Animation settings expression
    pub settings: String,
    /// Newline-separated frames
    pub frames: String,
    /// Frames were persisted as one string and are written back that way
    pub text_frames: bool,
    /// Pass-through fields from the persisted entry
    pub extra: Map<String, Value>,
}

/// Partial animation update; `None` fields keep their current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnimationPatch {
    /// New settings
    pub settings: Option<String>,
    /// New frames
    pub frames: Option<String>,
}

impl AnimationPatch {
    /// Patch that replaces only the settings.
    pub fn settings(settings: impl Into<String>) -> Self {
        Self {
            settings: Some(settings.into()),
            frames: None,
        }
    }

    /// Patch that replaces only the frames.
    pub fn frames(frames: impl Into<String>) -> Self {
        Self {
            settings: None,
            frames: Some(frames.into()),
        }
    }
}

impl Animation {
    /// Creates an animation.
    pub fn new(settings: impl Into<String>, frames: impl Into<String>) -> Self {
        Self {
            settings: settings.into(),
            frames: frames.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with `patch` applied over this animation.
    #[must_use]
    pub fn merged(&self, patch: &AnimationPatch) -> Self {
        Self {
            settings: patch.settings.clone().unwrap_or_else(|| self.settings.clone()),
            frames: patch.frames.clone().unwrap_or_else(|| self.frames.clone()),
            text_frames: self.text_frames,
            extra: self.extra.clone(),
        }
    }

    /// Converts back into the persisted shape: one array entry per line,
    /// unless the frames were read as a single string.
    pub fn to_persisted(&self) -> PersistedAnimation {
        let frames = if self.text_frames {
            PersistedFrames::Text(self.frames.clone())
        } else if self.frames.is_empty() {
            PersistedFrames::Lines(Vec::new())
        } else {
            PersistedFrames::Lines(self.frames.split('\n').map(str::to_string).collect())
        };
        PersistedAnimation {
            settings: self.settings.clone(),
            frames,
            extra: self.extra.clone(),
        }
    }
}

impl From<PersistedAnimation> for Animation {
    fn from(persisted: PersistedAnimation) -> Self {
        let (frames, text_frames) = match persisted.frames {
            PersistedFrames::Lines(lines) => (lines.join("\n"), false),
            PersistedFrames::Text(text) => (text, true),
        };
        Self {
            settings: persisted.settings,
            frames,
            text_frames,
            extra: persisted.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frames_accept_lines_or_text() {
        let lines: PersistedAnimation =
            serde_json::from_value(json!({ "settings": "loop", "frames": ["a", "b"] })).unwrap();
        let text: PersistedAnimation =
            serde_json::from_value(json!({ "settings": "loop", "frames": "a\nb" })).unwrap();

        let lines = Animation::from(lines);
        let text = Animation::from(text);
        assert_eq!(lines, Animation::new("loop", "a\nb"));
        assert_eq!(text.frames, "a\nb");
        assert!(text.text_frames);
    }

    #[test]
    fn test_text_frames_and_extra_survive_export() {
        let raw = json!({ "settings": "", "frames": "a\nb", "type": "static" });
        let persisted: PersistedAnimation = serde_json::from_value(raw.clone()).unwrap();
        let anim = Animation::from(persisted).merged(&AnimationPatch::settings("loop"));

        assert_eq!(
            serde_json::to_value(anim.to_persisted()).unwrap(),
            json!({ "settings": "loop", "frames": "a\nb", "type": "static" })
        );
    }

    #[test]
    fn test_empty_frames_export_as_empty_list() {
        let persisted = Animation::default().to_persisted();
        assert_eq!(persisted.frames, PersistedFrames::Lines(Vec::new()));
    }

    #[test]
    fn test_merged_keeps_unpatched_fields() {
        let anim = Animation::new("s", "f");
        assert_eq!(anim.merged(&AnimationPatch::frames("g")), Animation::new("s", "g"));
        assert_eq!(anim.merged(&AnimationPatch::default()), anim);
    }
}
