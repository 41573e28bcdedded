//! Arena-backed group forest with resolved parent references.
//!
//! Groups only carry a parent *id*. Building a [`GroupHierarchy`] places every
//! group in a generational arena, rehydrates each `parent_group` reference
//! (roots first, so a resolved parent is itself resolved) and rejects
//! unknown parents, duplicate ids and indirect cycles.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::RepositoryGroup;

/// What to do with a group whose parent id names no known group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingParentPolicy {
    /// Fail the load.
    #[default]
    Error,
    /// Clear the dangling parent id and treat the group as a root.
    Detach,
}

impl fmt::Display for MissingParentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingParentPolicy::Error => write!(f, "error"),
            MissingParentPolicy::Detach => write!(f, "detach"),
        }
    }
}

/// Tree node in the arena.
#[derive(Debug)]
pub struct GroupNode {
    pub group: Arc<RepositoryGroup>,
    /// Index of parent node in the arena, None for root groups
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

/// Forest of repository groups.
#[derive(Debug, Default)]
pub struct GroupHierarchy {
    arena: Arena<GroupNode>,
    roots: Vec<Index>,
    by_id: HashMap<String, Index>,
}

impl GroupHierarchy {
    /// Build the forest from loose groups.
    ///
    /// Input order is kept among siblings.
    #[instrument(level = "debug", skip(groups), fields(count = groups.len()))]
    pub fn build(
        groups: Vec<RepositoryGroup>,
        policy: MissingParentPolicy,
    ) -> ApplicationResult<Self> {
        let mut order = Vec::with_capacity(groups.len());
        let mut pending: HashMap<String, RepositoryGroup> = HashMap::new();
        for group in groups {
            let id = group.id().to_string();
            if pending.contains_key(&id) {
                return Err(ApplicationError::DuplicateId { kind: "group", id });
            }
            order.push(id.clone());
            pending.insert(id, group);
        }

        for id in &order {
            let Some(parent_id) = pending[id].parent_group_id().map(str::to_string) else {
                continue;
            };
            if pending.contains_key(&parent_id) {
                continue;
            }
            match policy {
                MissingParentPolicy::Error => {
                    return Err(ApplicationError::UnknownParent {
                        group: id.clone(),
                        parent: parent_id,
                    });
                }
                MissingParentPolicy::Detach => {
                    warn!(group = %id, parent = %parent_id, "unknown parent, treating group as root");
                    if let Some(group) = pending.get_mut(id) {
                        group.clear_parent();
                    }
                }
            }
        }

        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut root_ids = Vec::new();
        for id in &order {
            match pending[id].parent_group_id() {
                Some(parent) => children_of
                    .entry(parent.to_string())
                    .or_default()
                    .push(id.clone()),
                None => root_ids.push(id.clone()),
            }
        }

        let mut hierarchy = Self::default();
        // reversed so that popping yields input order
        let mut stack: Vec<(String, Option<Index>)> =
            root_ids.into_iter().rev().map(|id| (id, None)).collect();

        while let Some((id, parent_idx)) = stack.pop() {
            let Some(mut group) = pending.remove(&id) else {
                continue;
            };
            if let Some(parent_idx) = parent_idx {
                let parent = hierarchy.arena[parent_idx].group.clone();
                group.resolve_parent(parent)?;
            }
            let idx = hierarchy.insert_node(Arc::new(group), parent_idx);

            if let Some(children) = children_of.get(&id) {
                for child in children.iter().rev() {
                    stack.push((child.clone(), Some(idx)));
                }
            }
        }

        if !pending.is_empty() {
            let cycle = find_cycle(&order, &pending);
            return Err(ApplicationError::CycleDetected(cycle));
        }

        debug!(
            groups = hierarchy.len(),
            roots = hierarchy.roots.len(),
            "group hierarchy built"
        );
        Ok(hierarchy)
    }

    fn insert_node(&mut self, group: Arc<RepositoryGroup>, parent: Option<Index>) -> Index {
        let id = group.id().to_string();
        let idx = self.arena.insert(GroupNode {
            group,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(idx);
                }
            }
            None => self.roots.push(idx),
        }
        self.by_id.insert(id, idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<RepositoryGroup>> {
        self.node(id).map(|n| &n.group)
    }

    pub fn node(&self, id: &str) -> Option<&GroupNode> {
        self.by_id.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn node_at(&self, idx: Index) -> Option<&GroupNode> {
        self.arena.get(idx)
    }

    pub fn root_indices(&self) -> &[Index] {
        &self.roots
    }

    pub fn roots(&self) -> Vec<&Arc<RepositoryGroup>> {
        self.roots.iter().map(|&idx| &self.arena[idx].group).collect()
    }

    pub fn children(&self, id: &str) -> Vec<&Arc<RepositoryGroup>> {
        self.node(id)
            .map(|n| n.children.iter().map(|&c| &self.arena[c].group).collect())
            .unwrap_or_default()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: &str) -> Vec<&Arc<RepositoryGroup>> {
        let mut result = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(idx) = current {
            let node = &self.arena[idx];
            result.push(&node.group);
            current = node.parent;
        }
        result
    }

    /// The group itself followed by everything below it, depth first.
    pub fn descendants(&self, id: &str) -> Vec<&Arc<RepositoryGroup>> {
        let Some(&start) = self.by_id.get(id) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = &self.arena[idx];
            result.push(&node.group);
            stack.extend(node.children.iter().rev());
        }
        result
    }

    /// Human-readable path from the root, e.g. `Platform / Backend`.
    pub fn path(&self, id: &str) -> Option<String> {
        let group = self.get(id)?;
        let mut names: Vec<&str> = self.ancestors(id).iter().map(|g| g.name()).collect();
        names.reverse();
        names.push(group.name());
        Some(names.join(" / "))
    }

    /// Number of levels in the deepest tree.
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        self.arena
            .get(idx)
            .map(|node| {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// All groups, depth first from each root in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RepositoryGroup>> + '_ {
        self.roots
            .iter()
            .flat_map(move |&root| self.descendants(self.arena[root].group.id()))
    }
}

/// Walk parent ids from the first unplaced group until one repeats.
fn find_cycle(order: &[String], unplaced: &HashMap<String, RepositoryGroup>) -> Vec<String> {
    let Some(start) = order.iter().find(|id| unplaced.contains_key(*id)) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut walk = Vec::new();
    let mut current = start.clone();
    loop {
        if !seen.insert(current.clone()) {
            let from = walk.iter().position(|id| *id == current).unwrap_or(0);
            let mut cycle = walk.split_off(from);
            cycle.push(current);
            return cycle;
        }
        walk.push(current.clone());
        match unplaced
            .get(&current)
            .and_then(|g| g.parent_group_id())
        {
            Some(parent) => current = parent.to_string(),
            None => return walk,
        }
    }
}
