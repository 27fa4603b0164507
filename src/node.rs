//! Shader Node Trees
//!
//! A resolved, pointer-rich view of an interned paint key. Each key record
//! becomes a [`ShaderNode`] bound to its catalog entry, children resolved
//! and requirement flags aggregated bottom-up. Nodes live in a flat arena
//! ([`ShaderNodes`]) and refer to each other by index, so the forest is a
//! single allocation and trivially `Send`.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::dictionary::ShaderCodeDictionary;
use crate::error::PigmentError;
use crate::key::PaintKey;
use crate::snippet::{ShaderSnippet, SnippetRequirements};

/// Index of a node within its owning [`ShaderNodes`] arena.
pub type NodeIndex = usize;

/// One resolved key record.
pub struct ShaderNode {
    snippet_id: i32,
    entry: Arc<ShaderSnippet>,
    key_index: usize,
    children: SmallVec<[NodeIndex; 4]>,
    requirements: SnippetRequirements,
}

impl ShaderNode {
    #[must_use]
    pub fn snippet_id(&self) -> i32 {
        self.snippet_id
    }

    #[must_use]
    pub fn entry(&self) -> &ShaderSnippet {
        &self.entry
    }

    /// Position of this node's record in the flattened key. Stable across
    /// assemblies of the same key, which makes it usable for name mangling.
    #[must_use]
    pub fn key_index(&self) -> usize {
        self.key_index
    }

    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[must_use]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// This node's requirements unioned with all of its descendants'.
    #[must_use]
    pub fn requirements(&self) -> SnippetRequirements {
        self.requirements
    }
}

/// Arena of resolved nodes for one paint key, roots in key order.
pub struct ShaderNodes {
    nodes: Vec<ShaderNode>,
    roots: SmallVec<[NodeIndex; 2]>,
    aggregate: SnippetRequirements,
}

impl ShaderNodes {
    /// Resolves every record of `key` against `dict`.
    ///
    /// Fails if a record names an unknown snippet id, a node's child count
    /// does not match its catalog arity, or the records do not form
    /// complete trees.
    pub fn from_key(
        dict: &ShaderCodeDictionary,
        key: &PaintKey,
    ) -> Result<Self, PigmentError> {
        let records = key.records();
        if records.is_empty() {
            return Err(PigmentError::MalformedKey);
        }

        let mut arena = Self {
            nodes: Vec::with_capacity(records.len()),
            roots: SmallVec::new(),
            aggregate: SnippetRequirements::empty(),
        };

        let mut pos = 0;
        while pos < records.len() {
            let (root, next) = arena.build_subtree(dict, key, pos)?;
            arena.aggregate |= arena.nodes[root].requirements;
            arena.roots.push(root);
            pos = next;
        }
        Ok(arena)
    }

    fn build_subtree(
        &mut self,
        dict: &ShaderCodeDictionary,
        key: &PaintKey,
        pos: usize,
    ) -> Result<(NodeIndex, usize), PigmentError> {
        let records = key.records();
        let record = records.get(pos).ok_or(PigmentError::MalformedKey)?;
        let entry = dict
            .snippet_for_id(record.snippet_id)
            .ok_or(PigmentError::UnknownSnippet(record.snippet_id))?;
        if usize::from(record.num_children) != usize::from(entry.num_children) {
            return Err(PigmentError::MalformedKey);
        }

        let mut next = pos + 1;
        let mut children: SmallVec<[NodeIndex; 4]> = SmallVec::new();
        let mut requirements = entry.requirements;
        for _ in 0..record.num_children {
            let (child, after) = self.build_subtree(dict, key, next)?;
            requirements |= self.nodes[child].requirements;
            children.push(child);
            next = after;
        }

        let index = self.nodes.len();
        self.nodes.push(ShaderNode {
            snippet_id: record.snippet_id,
            entry,
            key_index: pos,
            children,
            requirements,
        });
        Ok((index, next))
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &ShaderNode {
        &self.nodes[index]
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Union of the requirements of every node in the forest.
    #[must_use]
    pub fn aggregate_requirements(&self) -> SnippetRequirements {
        self.aggregate
    }

    /// Nodes in arena order (children before their parent, roots last
    /// within their tree).
    pub fn iter(&self) -> impl Iterator<Item = &ShaderNode> {
        self.nodes.iter()
    }
}
