//! Design Studio Core
//!
//! GPU-free domain model for the design studio viewport:
//! - SceneStore: id-keyed scene objects, base model and selection
//! - SceneEditor: modification dispatch with snapshot undo/redo
//! - Primitive factory and mesh import/export
//! - Command parsing and remote service contracts

pub mod cancel;
pub mod command;
pub mod constants;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod io;
pub mod material;
pub mod modification;
pub mod object;
pub mod primitive;
pub mod scalar_field;
pub mod scene;
pub mod services;

pub use cancel::*;
pub use command::*;
pub use constants::*;
pub use editor::*;
pub use geometry::*;
pub use history::*;
pub use material::*;
pub use modification::*;
pub use object::*;
pub use scalar_field::*;
pub use scene::*;
pub use services::*;
