use std::fmt;

use crate::capability::Widget;
use crate::render::error::RenderError;
use crate::render::geometry::Rect;

/// Handle to a node in a [`RenderTree`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct RenderNode {
    label: String,
    widget: Box<dyn Widget>,
    area: Rect,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Redraw requested for this node
    dirty: bool,
    /// Some node at or below this one is dirty
    subtree_dirty: bool,
    visible: bool,
}

/// Nodes to draw this frame and nodes walked to find them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Paint order: parents before children
    pub render: Vec<NodeId>,
    pub visited: Vec<NodeId>,
}

/// Widget hierarchy with per-node dirty tracking.
///
/// A node needs a redraw when it, or any ancestor, was marked dirty since the
/// last completed frame. Marking a node sets a hint on every ancestor so that
/// clean subtrees can be skipped during collection.
pub struct RenderTree {
    nodes: Vec<Option<RenderNode>>,
    root: NodeId,
    focused: Option<NodeId>,
}

impl fmt::Debug for RenderTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTree")
            .field("nodes", &self.len())
            .field("root", &self.root)
            .field("focused", &self.focused)
            .finish()
    }
}

impl RenderTree {
    /// New tree whose root starts dirty.
    pub fn new(label: impl Into<String>, root: Box<dyn Widget>, area: Rect) -> Self {
        let node = RenderNode {
            label: label.into(),
            widget: root,
            area,
            parent: None,
            children: Vec::new(),
            dirty: true,
            subtree_dirty: true,
            visible: true,
        };
        Self { nodes: vec![Some(node)], root: NodeId(0), focused: None }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut RenderNode, RenderError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(RenderError::UnknownNode(id.0))
    }

    /// Append a child; the new node starts dirty.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        widget: Box<dyn Widget>,
        area: Rect,
    ) -> Result<NodeId, RenderError> {
        self.node_mut(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(RenderNode {
            label: label.into(),
            widget,
            area,
            parent: Some(parent),
            children: Vec::new(),
            dirty: false,
            subtree_dirty: false,
            visible: true,
        }));
        self.node_mut(parent)?.children.push(id);
        self.mark_dirty(id);
        Ok(id)
    }

    /// Remove a node and its subtree. The parent is marked dirty so the
    /// vacated area is repainted.
    pub fn remove(&mut self, id: NodeId) -> Result<(), RenderError> {
        if id == self.root {
            return Err(RenderError::RootRemoval);
        }
        let parent = self.node(id).ok_or(RenderError::UnknownNode(id.0))?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
            self.mark_dirty(parent);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(node.children);
            }
            if self.focused == Some(current) {
                self.focused = None;
            }
        }
        Ok(())
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), RenderError> {
        let children = self.node(id).ok_or(RenderError::UnknownNode(id.0))?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.label.as_str())
    }

    pub fn area(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| n.area)
    }

    /// Move or resize a node. The parent repaints the old area.
    pub fn set_area(&mut self, id: NodeId, area: Rect) -> Result<(), RenderError> {
        let node = self.node_mut(id)?;
        if node.area == area {
            return Ok(());
        }
        node.area = area;
        let parent = node.parent;
        self.mark_dirty(parent.unwrap_or(id));
        Ok(())
    }

    pub fn widget(&self, id: NodeId) -> Option<&dyn Widget> {
        self.node(id).map(|n| n.widget.as_ref())
    }

    pub fn widget_mut(&mut self, id: NodeId) -> Option<&mut (dyn Widget + 'static)> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut).map(|n| n.widget.as_mut())
    }

    /// Request a redraw of `id` (and therefore its subtree).
    pub fn mark_dirty(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::as_mut) else {
            return;
        };
        node.dirty = true;
        node.subtree_dirty = true;
        let mut current = node.parent;
        while let Some(ancestor_id) = current {
            match self.nodes.get_mut(ancestor_id.0).and_then(Option::as_mut) {
                Some(ancestor) if !ancestor.subtree_dirty => {
                    ancestor.subtree_dirty = true;
                    current = ancestor.parent;
                }
                _ => break,
            }
        }
    }

    /// Redraw the whole tree on the next frame.
    pub fn invalidate_all(&mut self) {
        self.mark_dirty(self.root);
    }

    /// This node's own dirty flag.
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.dirty)
    }

    /// Dirty itself or through an ancestor.
    pub fn needs_redraw(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) if node.dirty => return true,
                Some(node) => current = node.parent,
                None => return false,
            }
        }
        false
    }

    /// Anything at all waiting to be drawn.
    pub fn has_pending(&self) -> bool {
        self.node(self.root).is_some_and(|n| n.dirty || n.subtree_dirty)
    }

    /// Show or hide a node. The parent repaints the area either way.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), RenderError> {
        let node = self.node_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        let parent = node.parent;
        if let Some(parent) = parent {
            self.mark_dirty(parent);
        }
        if visible {
            self.mark_dirty(id);
        } else if self.focused.is_some_and(|f| self.is_descendant_or_self(f, id)) {
            self.focused = None;
        }
        Ok(())
    }

    /// Visible itself and through every ancestor.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    fn is_descendant_or_self(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, id: Option<NodeId>) {
        self.focused = id;
    }

    /// Visible nodes, parents before children.
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if !node.visible {
                continue;
            }
            order.push(id);
            stack.extend(node.children.iter().rev());
        }
        order
    }

    /// Visible nodes whose widget accepts focus, in paint order.
    pub fn focusable_nodes(&self) -> Vec<NodeId> {
        self.paint_order()
            .into_iter()
            .filter(|id| self.widget(*id).is_some_and(|w| w.focusable()))
            .collect()
    }

    /// Walk the tree for the nodes this frame must draw, skipping subtrees
    /// with nothing dirty and hidden nodes.
    pub fn collect_dirty(&self) -> Collection {
        let mut collection = Collection::default();
        let mut stack = vec![(self.root, false)];
        while let Some((id, inherited)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if !node.visible {
                continue;
            }
            let dirty = inherited || node.dirty;
            if !dirty && !node.subtree_dirty {
                continue;
            }
            collection.visited.push(id);
            if dirty {
                collection.render.push(id);
            }
            stack.extend(node.children.iter().rev().map(|c| (*c, dirty)));
        }
        collection
    }

    /// Clear dirty state of nodes handled by a completed frame.
    pub fn mark_clean(&mut self, nodes: &[NodeId]) {
        for id in nodes {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::as_mut) {
                node.dirty = false;
                node.subtree_dirty = false;
            }
        }
    }
}
