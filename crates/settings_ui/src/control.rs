use settings::{Descriptor, Value, ValueKind};

use crate::errors::DialogError;

/// Invoked by a control with its new value on every user edit.
pub type ChangeCallback = Box<dyn FnMut(Value)>;

/// One live input widget, owned by the dialog for the lifetime of one
/// invocation.
pub trait Control {
    /// Value currently displayed by the widget.
    fn value(&self) -> Value;

    /// Refreshes the widget display. Must not invoke the change
    /// callback.
    fn set_value(&mut self, value: Value);

    /// Installs the edit callback. Called at most once, during
    /// generation; read-only controls never receive one.
    fn on_change(&mut self, callback: ChangeCallback);

    /// Marks the widget as holding a rejected value.
    fn set_invalid(&mut self, invalid: bool) {
        let _ = invalid;
    }
}

/// The toolkit boundary: one control mapping per value kind.
///
/// Factories are only consulted for leaf descriptors; nesting is
/// expressed by the widget-node tree the generator returns, which a
/// concrete toolkit adapter walks to build containers or tabs.
pub trait ControlFactory {
    /// Whether a control mapping exists for `kind`.
    fn supports(&self, kind: ValueKind) -> bool;

    /// Builds the control for one leaf descriptor. `path` is the full
    /// dotted key, usable as a stable widget id.
    fn make_control(
        &mut self,
        path: &str,
        descriptor: &Descriptor,
    ) -> Result<Box<dyn Control>, DialogError>;
}
