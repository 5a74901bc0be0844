use std::collections::HashMap;

use crate::descriptor::Descriptor;
use crate::errors::SettingsError;
use crate::key_path::KeyPath;

/// Append-only registry of descriptor trees.
///
/// Registration validates key uniqueness recursively; `resolve` maps a
/// full dotted path back to its descriptor. A tree that fails
/// validation is not installed at all.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    roots: Vec<Descriptor>,
    /// Full path -> child-index chain into `roots`.
    index: HashMap<String, Vec<usize>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tree: Descriptor) -> Result<(), SettingsError> {
        let mut staged: HashMap<String, Vec<usize>> = HashMap::new();
        let trail = vec![self.roots.len()];
        Self::index_tree(
            &tree,
            &KeyPath::root(tree.key()),
            trail,
            &self.index,
            &mut staged,
        )?;
        self.index.extend(staged);
        self.roots.push(tree);
        Ok(())
    }

    fn index_tree(
        node: &Descriptor,
        path: &KeyPath,
        trail: Vec<usize>,
        existing: &HashMap<String, Vec<usize>>,
        staged: &mut HashMap<String, Vec<usize>>,
    ) -> Result<(), SettingsError> {
        let full = path.to_string();
        if existing.contains_key(&full) || staged.insert(full.clone(), trail.clone()).is_some() {
            return Err(SettingsError::DuplicateKey(full));
        }
        for (ix, child) in node.children().iter().enumerate() {
            let mut child_trail = trail.clone();
            child_trail.push(ix);
            Self::index_tree(
                child,
                &path.child(child.key()),
                child_trail,
                existing,
                staged,
            )?;
        }
        Ok(())
    }

    pub fn resolve(&self, full_key: &str) -> Result<&Descriptor, SettingsError> {
        let trail = self
            .index
            .get(full_key)
            .ok_or_else(|| SettingsError::UnknownKey(full_key.to_string()))?;
        let mut node = &self.roots[trail[0]];
        for &ix in &trail[1..] {
            node = &node.children()[ix];
        }
        Ok(node)
    }

    pub fn contains(&self, full_key: &str) -> bool {
        self.index.contains_key(full_key)
    }

    /// Registered top-level descriptors, in registration order.
    pub fn roots(&self) -> &[Descriptor] {
        &self.roots
    }

    /// Document-order walk over every registered descriptor.
    pub fn flatten(&self) -> Vec<(String, &Descriptor)> {
        let mut out = Vec::new();
        for root in &self.roots {
            Self::collect(root, &KeyPath::root(root.key()), &mut out);
        }
        out
    }

    /// Leaf descriptors only (those carrying a value).
    pub fn leaves(&self) -> Vec<(String, &Descriptor)> {
        self.flatten()
            .into_iter()
            .filter(|(_, descriptor)| !descriptor.is_group())
            .collect()
    }

    fn collect<'a>(
        node: &'a Descriptor,
        path: &KeyPath,
        out: &mut Vec<(String, &'a Descriptor)>,
    ) {
        out.push((path.to_string(), node));
        for child in node.children() {
            Self::collect(child, &path.child(child.key()), out);
        }
    }
}
