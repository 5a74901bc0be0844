use settings::{SettingsError, ValueKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DialogError {
    /// A leaf descriptor's kind has no control mapping in the factory.
    /// Raised before any widget is constructed.
    #[error("no control mapping for {0} values")]
    UnsupportedKind(ValueKind),

    #[error("dialog already open")]
    AlreadyOpen,

    #[error("dialog not open")]
    NotOpen,

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
