//! Project snapshot model and loading

pub mod loader;
pub mod schema;

pub use loader::ProjectLoader;
pub use schema::{
    Component, DrawingState, GroundBus, GroundSymbol, PointId, PowerBus, PowerSymbol,
    ProjectSnapshot, Stroke, StrokePoint, StrokeType,
};
