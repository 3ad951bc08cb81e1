//! EyeDraw Core Library
//!
//! Platform-agnostic engine for parametric clinical diagrams: doodle
//! geometry, constrained parameters, pointer interaction and
//! synchronization between linked drawings. Rendering is left to the host.

pub mod camera;
pub mod doodle;
pub mod drawing;
pub mod engine;
pub mod error;
pub mod input;
pub mod interaction;
pub mod notification;
pub mod parameter;
pub mod path;
pub mod point;
pub mod shapes;
pub mod sync;
pub mod transform;
pub mod widget;

pub use camera::Camera;
pub use doodle::{Doodle, DoodleId, DoodleRecord, Squiggle};
pub use drawing::Drawing;
pub use engine::ChangeSource;
pub use error::{Diagnostic, EngineError, Result};
pub use input::{InputState, Key, MouseButton, PointerEvent};
pub use notification::{DoodleRef, Notification, NotificationKind, NotificationPayload};
pub use parameter::{
    DescriptorTable, ParamValue, ParameterDescriptor, ParameterKind, Parameters, Range, ValueType,
};
pub use path::BoundaryPath;
pub use point::Point;
pub use shapes::{Behaviour, ClassRef, DoodleClass, ShapeRegistry, VectorRange};
pub use sync::{DiagramRegistry, SharedRegistry, SyncBroker, SyncConfig};
pub use transform::{AffineTransform, TransformError};
pub use widget::{EditingKind, Handle, InteractionMode, WidgetManager, WidgetState};
