use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use log::debug;
use settings::{SettingsError, SettingsStore, Value, ValueKind};

use crate::buffer::EditBuffer;
use crate::control::ControlFactory;
use crate::errors::DialogError;
use crate::generator::{self, for_each_node_mut, WidgetNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open,
}

/// The widget tree and edit buffer of one dialog invocation; dropped
/// when the dialog closes, whether committed or cancelled.
struct Session {
    buffer: Rc<RefCell<EditBuffer>>,
    nodes: Vec<WidgetNode>,
}

/// Owns the generated settings dialog's lifecycle.
///
/// `Closed -> Open` via [`open`](Self::open); [`apply`](Self::apply)
/// stays `Open`, [`commit`](Self::commit) and [`cancel`](Self::cancel)
/// return to `Closed`. User edits accumulate in the edit buffer and
/// only reach the store on apply/commit.
pub struct DialogController {
    store: Arc<SettingsStore>,
    factory: Box<dyn ControlFactory>,
    session: Option<Session>,
}

impl DialogController {
    pub fn new(store: Arc<SettingsStore>, factory: impl ControlFactory + 'static) -> Self {
        DialogController {
            store,
            factory: Box::new(factory),
            session: None,
        }
    }

    pub fn state(&self) -> DialogState {
        if self.session.is_some() {
            DialogState::Open
        } else {
            DialogState::Closed
        }
    }

    /// Generated widget tree of the current invocation; empty when
    /// closed.
    pub fn nodes(&self) -> &[WidgetNode] {
        self.session
            .as_ref()
            .map(|session| session.nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn nodes_mut(&mut self) -> &mut [WidgetNode] {
        self.session
            .as_mut()
            .map(|session| session.nodes.as_mut_slice())
            .unwrap_or(&mut [])
    }

    /// Edits staged but not yet applied.
    pub fn pending_edits(&self) -> Vec<(String, Value)> {
        self.session
            .as_ref()
            .map(|session| {
                session
                    .buffer
                    .borrow()
                    .entries()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Builds the widget tree over the registered descriptors and
    /// transitions to `Open`.
    pub fn open(&mut self) -> Result<(), DialogError> {
        if self.session.is_some() {
            return Err(DialogError::AlreadyOpen);
        }
        let buffer = Rc::new(RefCell::new(EditBuffer::new()));
        let nodes = generator::generate(&self.store, self.factory.as_mut(), &buffer)?;
        self.session = Some(Session { buffer, nodes });
        debug!("dialog opened");
        Ok(())
    }

    /// Validates and writes every pending edit, keeping the dialog
    /// open. On failure nothing reaches the store, the error lists all
    /// offending keys, and their controls are marked invalid.
    pub fn apply(&mut self) -> Result<(), DialogError> {
        let Some(session) = self.session.as_mut() else {
            return Err(DialogError::NotOpen);
        };

        let edits: Vec<(String, Value)> = session
            .buffer
            .borrow()
            .entries()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let registry = self.store.registry();
        let mut offenders: Vec<(String, String)> = Vec::new();
        for (key, value) in &edits {
            match registry.resolve(key) {
                Ok(descriptor) => {
                    if let Err(reason) = descriptor.validate(value) {
                        offenders.push((key.clone(), reason));
                    }
                }
                Err(_) => offenders.push((key.clone(), "no matching descriptor".to_string())),
            }
        }

        if !offenders.is_empty() {
            let rejected: HashSet<&str> = offenders.iter().map(|(key, _)| key.as_str()).collect();
            for_each_node_mut(&mut session.nodes, &mut |node| {
                let invalid = rejected.contains(node.path());
                if let Some(control) = node.control_mut() {
                    control.set_invalid(invalid);
                }
            });
            return Err(SettingsError::Validation(offenders).into());
        }

        for (key, value) in edits {
            self.store.set(&key, value)?;
        }
        session.buffer.borrow_mut().clear();
        for_each_node_mut(&mut session.nodes, &mut |node| {
            if let Some(control) = node.control_mut() {
                control.set_invalid(false);
            }
        });
        debug!("edits applied");
        Ok(())
    }

    /// `apply`, then close. A validation failure leaves the dialog
    /// open for correction.
    pub fn commit(&mut self) -> Result<(), DialogError> {
        self.apply()?;
        self.session = None;
        debug!("dialog committed");
        Ok(())
    }

    /// Discards the edit buffer and widget tree unconditionally; the
    /// store is not touched.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            debug!("dialog cancelled");
        }
    }

    /// Stages every visible editable leaf's default value and refreshes
    /// the controls; the store is untouched until apply/commit.
    /// Read-only leaves keep their stored value.
    pub fn reset_to_defaults(&mut self) -> Result<(), DialogError> {
        let Some(session) = self.session.as_mut() else {
            return Err(DialogError::NotOpen);
        };
        let registry = self.store.registry();
        let mut buffer = session.buffer.borrow_mut();
        for_each_node_mut(&mut session.nodes, &mut |node| {
            if node.kind() == ValueKind::Group {
                return;
            }
            let path = node.path().to_string();
            let Ok(descriptor) = registry.resolve(&path) else {
                return;
            };
            if descriptor.is_read_only() {
                return;
            }
            let Some(default) = descriptor.default().cloned() else {
                return;
            };
            buffer.record(path, default.clone());
            if let Some(control) = node.control_mut() {
                control.set_value(default);
            }
        });
        debug!("defaults staged");
        Ok(())
    }
}
