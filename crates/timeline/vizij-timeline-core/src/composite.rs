//! Timer trees and composite propagation.
//!
//! Every root timer heads a [`TimerTree`] that owns the root and all
//! composites below it. Composite timers are affine transforms of a parent
//! timer, restricted to an active sub-range of the parent's time. Trees share
//! no nodes, so the table hands out disjoint `&mut` trees that can be stepped
//! on separate workers; propagation walks one tree with an explicit stack.

use serde::{Deserialize, Serialize};

use crate::ids::TimerId;
use crate::range::ActiveRange;
use crate::time::DiscreteTime;
use crate::timer::{RootTimer, Timer, TimerData};

/// Mapping of a composite timer onto its parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeLink {
    pub parent: TimerId,
    pub offset: DiscreteTime,
    pub scale: f64,
    /// Expressed in the parent's time domain.
    pub active_range: ActiveRange,
}

impl CompositeLink {
    /// `time * scale + offset`; deltas and time scale are multiplied by `scale`.
    #[inline]
    pub fn transform(&self, source: &TimerData) -> TimerData {
        TimerData {
            time: source.time.mul_f64(self.scale) + self.offset,
            delta_time: source.delta_time.mul_f64(self.scale),
            time_scale: source.time_scale * self.scale,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimerLink {
    Root(RootTimer),
    Composite(CompositeLink),
}

#[derive(Clone, Debug)]
pub struct TimerNode {
    pub id: TimerId,
    pub name: String,
    pub timer: Timer,
    pub link: TimerLink,
    pub root: TimerId,
    /// Slots of the children within the owning tree.
    children: Vec<usize>,
    /// Composite: parent time inside `active_range`. Root: instance running.
    pub active: bool,
    /// `active` and every ancestor active; what dependents observe.
    pub enabled: bool,
}

impl TimerNode {
    fn new(id: TimerId, name: String, link: TimerLink, root: TimerId) -> Self {
        Self {
            id,
            name,
            timer: Timer::default(),
            link,
            root,
            children: Vec::new(),
            active: false,
            enabled: false,
        }
    }

    pub fn as_root(&self) -> Option<&RootTimer> {
        match &self.link {
            TimerLink::Root(r) => Some(r),
            TimerLink::Composite(_) => None,
        }
    }

    pub fn as_root_mut(&mut self) -> Option<&mut RootTimer> {
        match &mut self.link {
            TimerLink::Root(r) => Some(r),
            TimerLink::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeLink> {
        match &self.link {
            TimerLink::Composite(c) => Some(c),
            TimerLink::Root(_) => None,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.link, TimerLink::Root(_))
    }
}

/// A root timer and its composites. Slot 0 is always the root.
#[derive(Clone, Debug)]
pub struct TimerTree {
    nodes: Vec<TimerNode>,
}

impl TimerTree {
    pub fn root_mut(&mut self) -> Option<&mut TimerNode> {
        self.nodes.first_mut()
    }

    pub fn nodes(&self) -> &[TimerNode] {
        &self.nodes
    }

    /// Pushes the root's current data down the tree, recomputing every
    /// composite. Active-flag flips are appended to `flips` in depth-first
    /// declaration order.
    pub fn propagate(&mut self, flips: &mut Vec<(TimerId, bool)>) {
        let Some(root) = self.nodes.first() else {
            return;
        };
        let mut stack = vec![(0usize, root.timer.data(), root.enabled)];

        while let Some((slot, source, enabled)) = stack.pop() {
            // Reverse so children pop in declaration order.
            for c in (0..self.nodes[slot].children.len()).rev() {
                let child_slot = self.nodes[slot].children[c];
                let child = &mut self.nodes[child_slot];
                let TimerLink::Composite(link) = &child.link else {
                    continue;
                };
                let data = link.transform(&source);
                let active = link.active_range.contains(source.time);
                child.timer.set_data(data);
                if active != child.active {
                    child.active = active;
                    flips.push((child.id, active));
                }
                child.enabled = enabled && active;
                stack.push((child_slot, data, child.enabled));
            }
        }
    }

    /// Forces every node inactive; composites that were active are reported
    /// in `flips`.
    pub fn disable(&mut self, flips: &mut Vec<(TimerId, bool)>) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![0usize];
        while let Some(slot) = stack.pop() {
            let node = &mut self.nodes[slot];
            node.enabled = false;
            if !node.is_root() && node.active {
                node.active = false;
                flips.push((node.id, false));
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct NodeRef {
    tree: usize,
    slot: usize,
}

/// All timers, grouped by root tree and addressable by global [`TimerId`].
#[derive(Debug, Default)]
pub struct TimerTable {
    trees: Vec<TimerTree>,
    index: Vec<NodeRef>,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn trees(&self) -> &[TimerTree] {
        &self.trees
    }

    /// Disjoint trees, in root creation order.
    pub fn trees_mut(&mut self) -> &mut [TimerTree] {
        &mut self.trees
    }

    pub fn get(&self, id: TimerId) -> Option<&TimerNode> {
        let at = self.index.get(id.index())?;
        self.trees.get(at.tree)?.nodes.get(at.slot)
    }

    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut TimerNode> {
        let at = *self.index.get(id.index())?;
        self.trees.get_mut(at.tree)?.nodes.get_mut(at.slot)
    }

    /// Nodes in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &TimerNode> {
        self.index
            .iter()
            .filter_map(|at| self.trees.get(at.tree)?.nodes.get(at.slot))
    }

    /// Next handle `push_root`/`push_composite` will hand out.
    pub fn next_id(&self) -> TimerId {
        TimerId(self.index.len() as u32)
    }

    pub fn push_root(&mut self, name: String, root: RootTimer) -> TimerId {
        let id = self.next_id();
        self.index.push(NodeRef {
            tree: self.trees.len(),
            slot: 0,
        });
        self.trees.push(TimerTree {
            nodes: vec![TimerNode::new(id, name, TimerLink::Root(root), id)],
        });
        id
    }

    /// Adds a composite under an existing parent, in the parent's tree.
    /// Returns `None` when the parent handle is unknown.
    pub fn push_composite(&mut self, name: String, link: CompositeLink) -> Option<TimerId> {
        let id = self.next_id();
        let at = *self.index.get(link.parent.index())?;
        let tree = self.trees.get_mut(at.tree)?;
        let slot = tree.nodes.len();
        let parent = tree.nodes.get_mut(at.slot)?;
        parent.children.push(slot);
        let root = parent.root;
        tree.nodes
            .push(TimerNode::new(id, name, TimerLink::Composite(link), root));
        self.index.push(NodeRef {
            tree: at.tree,
            slot,
        });
        Some(id)
    }
}
