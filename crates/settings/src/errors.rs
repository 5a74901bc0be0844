use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    /// One entry per offending key, with a reason.
    #[error("validation failed: {}", format_offenders(.0))]
    Validation(Vec<(String, String)>),

    #[error("invalid store configuration: {0}")]
    Config(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
}

impl SettingsError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SettingsError::Validation(vec![(key.into(), reason.into())])
    }
}

fn format_offenders(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(key, reason)| format!("{key}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}
