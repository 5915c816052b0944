//! The unified timeline: typed, time-ordered events across every modality.

use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// A normalized bounding box, fraction of frame width/height in `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn from_pixels(x: f64, y: f64, width: f64, height: f64, frame_width: f64, frame_height: f64) -> Self {
        Self {
            x: x / frame_width,
            y: y / frame_height,
            width: width / frame_width,
            height: height / frame_height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// The fixed set of modalities a timeline entry can belong to.
///
/// `fixed_order` is the insertion order builders must follow when
/// constructing the unified timeline (§4.3): `scene_change, object, pose,
/// expression, gesture, text_overlay, sticker, speech`. `action` and
/// `background` are not ordered by the original component design; they sort
/// after the eight named modalities, in that fixed relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Object,
    Speech,
    Expression,
    Gesture,
    TextOverlay,
    Sticker,
    SceneChange,
    Pose,
    Action,
    Background,
}

impl Modality {
    /// Position in the fixed cross-modality insertion order (§4.3).
    pub fn fixed_order(self) -> usize {
        match self {
            Modality::SceneChange => 0,
            Modality::Object => 1,
            Modality::Pose => 2,
            Modality::Expression => 3,
            Modality::Gesture => 4,
            Modality::TextOverlay => 5,
            Modality::Sticker => 6,
            Modality::Speech => 7,
            Modality::Action => 8,
            Modality::Background => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeClass {
    S,
    M,
    L,
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerticalPosition {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalPosition {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TextPosition {
    pub vertical: VerticalPosition,
    pub horizontal: HorizontalPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TextCategory {
    Headline,
    Subtitle,
    Cta,
    Caption,
    Number,
    Hashtag,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SceneChangeKind {
    Cut,
    Dissolve,
    Fade,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ObjectPayload {
    pub class: String,
    pub confidence: f64,
    pub bbox: Option<BoundingBox>,
    pub track_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpeechPayload {
    pub text: String,
    pub language: String,
    pub confidence: f64,
    pub words: Option<Vec<Word>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExpressionPayload {
    /// Free-text emotion label; common values include neutral, happy, sad,
    /// surprise, fear, anger, disgust, curious, but the set is open.
    pub emotion: String,
    pub valence: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GesturePayload {
    pub label: String,
    pub target: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TextOverlayPayload {
    pub text: String,
    pub bbox: BoundingBox,
    pub size_class: SizeClass,
    pub position: TextPosition,
    pub category: TextCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StickerPayload {
    pub kind: String,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SceneChangePayload {
    pub kind: SceneChangeKind,
    pub shot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PosePayload {
    pub keypoints: Option<Vec<(f64, f64)>>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActionPayload {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BackgroundPayload {
    pub label: String,
    pub confidence: f64,
}

/// A modality-typed event payload.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "modality", rename_all = "snake_case")]
pub enum Payload {
    Object(ObjectPayload),
    Speech(SpeechPayload),
    Expression(ExpressionPayload),
    Gesture(GesturePayload),
    TextOverlay(TextOverlayPayload),
    Sticker(StickerPayload),
    SceneChange(SceneChangePayload),
    Pose(PosePayload),
    Action(ActionPayload),
    Background(BackgroundPayload),
}

impl Payload {
    pub fn modality(&self) -> Modality {
        match self {
            Payload::Object(_) => Modality::Object,
            Payload::Speech(_) => Modality::Speech,
            Payload::Expression(_) => Modality::Expression,
            Payload::Gesture(_) => Modality::Gesture,
            Payload::TextOverlay(_) => Modality::TextOverlay,
            Payload::Sticker(_) => Modality::Sticker,
            Payload::SceneChange(_) => Modality::SceneChange,
            Payload::Pose(_) => Modality::Pose,
            Payload::Action(_) => Modality::Action,
            Payload::Background(_) => Modality::Background,
        }
    }
}

/// `{start, end?, modality, payload}`.
///
/// Invariant: `start <= duration`; if `end` is present, `start <= end <=
/// duration` (values outside are clamped by the assembler's
/// `validate_entry`, with a warning recorded, never by this type itself).
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimelineEntry {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub payload: Payload,
}

impl TimelineEntry {
    pub fn modality(&self) -> Modality {
        self.payload.modality()
    }
}

/// Time-ordered sequence of typed events across modalities.
///
/// Ordered by `start`; stable for equal starts by insertion order. Callers
/// (the C3 assembler) are responsible for pushing entries in the fixed
/// cross-modality order (§4.3) so that stable sorting produces the
/// specified tie-break.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry without re-sorting. Call [`Timeline::sort`] once all
    /// entries for the fixed insertion pass have been pushed.
    pub fn push(&mut self, entry: TimelineEntry) {
        self.entries.push(entry);
    }

    /// Stable sort by `start`. Stability preserves the insertion order
    /// recorded by [`Timeline::push`] for equal starts.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.start.cmp(&b.start));
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries of one modality, in timeline order.
    pub fn by_modality(&self, modality: Modality) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(move |e| e.modality() == modality)
    }

    /// All entries with `start` in `[from, to)`.
    pub fn in_range(&self, from: Timestamp, to: Timestamp) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(move |e| e.start >= from && e.start < to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: f64, modality: Modality) -> TimelineEntry {
        let payload = match modality {
            Modality::Object => Payload::Object(ObjectPayload { class: "person".into(), confidence: 0.9, bbox: None, track_id: None }),
            Modality::Speech => Payload::Speech(SpeechPayload { text: "hi".into(), language: "en".into(), confidence: 0.9, words: None }),
            _ => Payload::Action(ActionPayload { label: "x".into(), confidence: 0.5 }),
        };
        TimelineEntry { start: Timestamp::from_seconds(start).unwrap(), end: None, payload }
    }

    #[test]
    fn sort_is_stable_for_equal_starts() {
        let mut t = Timeline::new();
        t.push(entry(1.0, Modality::SceneChange));
        t.push(entry(1.0, Modality::Object));
        t.push(entry(0.5, Modality::Speech));
        t.sort();
        let starts: Vec<f64> = t.entries().iter().map(|e| e.start.seconds()).collect();
        assert_eq!(starts, vec![0.5, 1.0, 1.0]);
        // scene_change was pushed before object at the same start: stable
        // sort must keep that relative order.
        assert_eq!(t.entries()[1].modality(), Modality::SceneChange);
        assert_eq!(t.entries()[2].modality(), Modality::Object);
    }

    #[test]
    fn by_modality_filters() {
        let mut t = Timeline::new();
        t.push(entry(0.0, Modality::Object));
        t.push(entry(1.0, Modality::Speech));
        t.sort();
        assert_eq!(t.by_modality(Modality::Speech).count(), 1);
    }
}
