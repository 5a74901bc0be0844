use std::cell::RefCell;
use std::rc::Rc;

use settings::{Descriptor, KeyPath, SettingsStore, ValueKind};

use crate::buffer::EditBuffer;
use crate::control::{Control, ControlFactory};
use crate::errors::DialogError;

/// One generated node: a descriptor paired with its live control, or a
/// container of child nodes for groups.
pub struct WidgetNode {
    path: String,
    label: String,
    kind: ValueKind,
    control: Option<Box<dyn Control>>,
    children: Vec<WidgetNode>,
}

impl WidgetNode {
    /// Full dotted key of the descriptor this node renders.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The live control; `None` for group nodes.
    pub fn control(&self) -> Option<&dyn Control> {
        self.control.as_deref()
    }

    pub fn control_mut(&mut self) -> Option<&mut (dyn Control + 'static)> {
        self.control.as_deref_mut()
    }

    pub fn children(&self) -> &[WidgetNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [WidgetNode] {
        &mut self.children
    }
}

/// Depth-first traversal over `nodes`.
pub fn for_each_node(nodes: &[WidgetNode], f: &mut impl FnMut(&WidgetNode)) {
    for node in nodes {
        f(node);
        for_each_node(&node.children, f);
    }
}

pub fn for_each_node_mut(nodes: &mut [WidgetNode], f: &mut impl FnMut(&mut WidgetNode)) {
    for node in nodes {
        f(node);
        for_each_node_mut(&mut node.children, f);
    }
}

/// Builds one widget node per visible registered descriptor,
/// recursively to arbitrary depth. Controls are pre-filled from the
/// store and wired to write edits into `buffer`; the store itself is
/// never mutated here.
pub(crate) fn generate(
    store: &SettingsStore,
    factory: &mut dyn ControlFactory,
    buffer: &Rc<RefCell<EditBuffer>>,
) -> Result<Vec<WidgetNode>, DialogError> {
    // Fail fast: reject unsupported kinds before any widget exists.
    for root in store.registry().roots() {
        check_supported(factory, root)?;
    }

    let mut nodes = Vec::new();
    for root in store.registry().roots() {
        if root.is_hidden() {
            continue;
        }
        nodes.push(build_node(
            root,
            &KeyPath::root(root.key()),
            store,
            factory,
            buffer,
        )?);
    }
    Ok(nodes)
}

fn check_supported(
    factory: &dyn ControlFactory,
    descriptor: &Descriptor,
) -> Result<(), DialogError> {
    if descriptor.is_hidden() {
        return Ok(());
    }
    if descriptor.is_group() {
        for child in descriptor.children() {
            check_supported(factory, child)?;
        }
    } else if !factory.supports(descriptor.kind()) {
        return Err(DialogError::UnsupportedKind(descriptor.kind()));
    }
    Ok(())
}

fn build_node(
    descriptor: &Descriptor,
    path: &KeyPath,
    store: &SettingsStore,
    factory: &mut dyn ControlFactory,
    buffer: &Rc<RefCell<EditBuffer>>,
) -> Result<WidgetNode, DialogError> {
    let full = path.to_string();
    let mut control = None;
    let mut children = Vec::new();

    if descriptor.is_group() {
        for child in descriptor.children() {
            if child.is_hidden() {
                continue;
            }
            children.push(build_node(
                child,
                &path.child(child.key()),
                store,
                factory,
                buffer,
            )?);
        }
    } else {
        let mut built = factory.make_control(&full, descriptor)?;
        built.set_value(store.get(&full)?);
        if !descriptor.is_read_only() {
            let sink = Rc::clone(buffer);
            let key = full.clone();
            built.on_change(Box::new(move |value| {
                sink.borrow_mut().record(key.clone(), value);
            }));
        }
        control = Some(built);
    }

    Ok(WidgetNode {
        path: full,
        label: descriptor.label().to_string(),
        kind: descriptor.kind(),
        control,
        children,
    })
}
