//! Inkboard Core Library
//!
//! Shape model, geometry, scene store and interaction state machine for the
//! Inkboard whiteboard, plus local snapshot storage and the persistence client.

pub mod config;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod remote;
pub mod scene;
pub mod shapes;
pub mod storage;
pub mod text_edit;
pub mod text_measure;
pub mod tools;
pub mod whiteboard;

pub use config::{BoardConfig, ConfigError};
pub use input::{ClickTracker, InputEvent, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{Effect, Interaction, InteractionState, OverlayFont};
pub use remote::{HttpPersistence, PersistenceApi, RemoteError, hydrate};
pub use scene::{Action, Page, Scene, StatePatch};
pub use shapes::{PageId, SerializableColor, Shape, ShapeId, ShapePatch};
pub use text_edit::{PLACEHOLDER, TextEditor};
pub use text_measure::{ApproximateMeasure, TextMeasure};
pub use tools::{DrawGesture, ToolKind, ToolStyle};
pub use whiteboard::{Frame, Whiteboard};
