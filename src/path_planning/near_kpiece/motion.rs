//! Motions and the arena that owns them

use crate::common::{MotionId, Path};

/// One state of the exploration tree, linked to the motion it was expanded from
#[derive(Debug, Clone)]
pub struct Motion<S> {
    state: S,
    parent: Option<MotionId>,
}

impl<S> Motion<S> {
    pub fn root(state: S) -> Self {
        Self { state, parent: None }
    }

    pub fn with_parent(state: S, parent: MotionId) -> Self {
        Self { state, parent: Some(parent) }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn parent(&self) -> Option<MotionId> {
        self.parent
    }
}

/// Append-only owner of every motion of one search.
///
/// Motions are never mutated or removed once pushed, so a `MotionId` stays
/// valid for the lifetime of the arena.
#[derive(Debug, Clone)]
pub struct MotionArena<S> {
    motions: Vec<Motion<S>>,
}

impl<S: Clone> MotionArena<S> {
    pub fn new() -> Self {
        Self { motions: Vec::new() }
    }

    /// Insert a motion. A parent must already be in the arena.
    pub fn push(&mut self, motion: Motion<S>) -> MotionId {
        debug_assert!(motion.parent.map_or(true, |p| p.0 < self.motions.len()));
        self.motions.push(motion);
        MotionId(self.motions.len() - 1)
    }

    pub fn get(&self, id: MotionId) -> Option<&Motion<S>> {
        self.motions.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    /// Walk parent links from `leaf` up to its root and return the states root first
    pub fn trace_path(&self, leaf: MotionId) -> Path<S> {
        let mut states = Vec::new();
        let mut current = Some(leaf);

        while let Some(id) = current {
            match self.get(id) {
                Some(motion) => {
                    states.push(motion.state.clone());
                    current = motion.parent;
                }
                None => break,
            }
        }

        states.reverse();
        Path::from_states(states)
    }

    /// Flat export of the tree: every state with the index of its parent
    pub fn export_tree(&self) -> Vec<(S, Option<usize>)> {
        self.motions
            .iter()
            .map(|m| (m.state.clone(), m.parent.map(|p| p.0)))
            .collect()
    }
}

impl<S: Clone> Default for MotionArena<S> {
    fn default() -> Self {
        Self::new()
    }
}
