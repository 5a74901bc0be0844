mod buffer;
mod control;
mod controller;
mod errors;
mod generator;

pub use buffer::EditBuffer;
pub use control::{ChangeCallback, Control, ControlFactory};
pub use controller::{DialogController, DialogState};
pub use errors::DialogError;
pub use generator::{for_each_node, for_each_node_mut, WidgetNode};
