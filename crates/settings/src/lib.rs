mod descriptor;
mod errors;
mod key_path;
mod registry;
mod store;
mod value;

pub use descriptor::Descriptor;
pub use errors::SettingsError;
pub use key_path::KeyPath;
pub use registry::DescriptorRegistry;
pub use store::{ChangeEvent, ObserverId, SettingsStore, SettingsStoreBuilder, Snapshot};
pub use value::{Constraint, Value, ValueKind};
