//! Core data model and timestamp/FPS conversion for the rumi video fusion
//! engine: the types every other crate in the workspace builds on.

pub mod error;
pub mod features;
pub mod fps;
pub mod lexicons;
pub mod markers;
pub mod timeline;
pub mod timestamp;
pub mod unified_analysis;
pub mod video;
pub mod warnings;

pub use error::{CoreError, CoreResult};
pub use features::FeatureBundle;
pub use fps::{FpsContext, FpsRegistry};
pub use markers::{CtaWindow, FirstFiveSeconds, MarkersMetadata, TemporalMarkers};
pub use timeline::{
    ActionPayload, BackgroundPayload, BoundingBox, ExpressionPayload, GesturePayload,
    HorizontalPosition, Modality, ObjectPayload, Payload, PosePayload, SceneChangeKind,
    SceneChangePayload, SizeClass, SpeechPayload, StickerPayload, TextCategory,
    TextOverlayPayload, TextPosition, Timeline, TimelineEntry, VerticalPosition, Word,
};
pub use timestamp::{parse, Timestamp};
pub use unified_analysis::{MLAnalysisResult, UnifiedAnalysis};
pub use video::VideoMetadata;
pub use warnings::{WarningCounters, WarningKind};
