use crate::backend::Cursor;
use crate::click::ClickDetector;
use crate::control::{
    Capabilities, CheckState, ControlEvents, ControlId, ControlNode, ResolvedStyle, StyleTarget,
};
use crate::rect::Point;
use crate::render::{ChildMode, RenderId, RenderObject, RenderTree};
use cgmath::EuclideanSpace;
use std::collections::{HashMap, HashSet};

/// Records a subtree leaving its parent, so whoever tracks controls inside it can react.
#[derive(Debug, Clone, PartialEq)]
pub struct Detached {
    /// The root of the detached subtree.
    pub control: ControlId,
    pub old_parent: ControlId,
    /// Every control in the subtree at the time it was detached.
    pub subtree: Vec<ControlId>,
}

/// A tree of controls and the render objects they own.
#[derive(Debug, Default)]
pub struct ControlTree {
    controls: HashMap<ControlId, ControlNode>,
    render: RenderTree,
    detached: Vec<Detached>,
}

impl ControlTree {
    pub fn new() -> ControlTree {
        ControlTree::default()
    }

    /// Creates a detached control whose primary render object is `object`.
    pub fn create(
        &mut self,
        kind: &'static str,
        child_mode: ChildMode,
        object: Box<dyn RenderObject>,
    ) -> ControlId {
        let id = ControlId::new();
        let render_object = self.render.insert(object);
        self.render.set_control(render_object, Some(id));
        self.controls.insert(
            id,
            ControlNode {
                kind,
                child_mode,
                parent: None,
                children: Vec::new(),
                render_object,
                container: render_object,
                owned_render_objects: Vec::new(),
                cursor: None,
                events: ControlEvents::default(),
                capabilities: Capabilities::default(),
            },
        );
        log::trace!(target: "perch::tree", "created {} {:?}", kind, id);
        id
    }

    /// Adds a render object owned by `id` as the last child of `parent` (one of its render
    /// objects).
    pub fn add_render_object(
        &mut self,
        id: ControlId,
        parent: RenderId,
        object: Box<dyn RenderObject>,
    ) -> RenderId {
        assert!(self.contains(id), "control {:?} does not exist", id);
        let render_object = self.render.insert(object);
        self.render.set_control(render_object, Some(id));
        let index = self.render.children(parent).len();
        self.render.add_child(parent, render_object, index);
        if let Some(node) = self.controls.get_mut(&id) {
            node.owned_render_objects.push(render_object);
        }
        render_object
    }

    /// Sets the render object child controls’ render objects are inserted into.
    ///
    /// # Panics
    /// Panics if the control already has children.
    pub fn set_container(&mut self, id: ControlId, container: RenderId) {
        let node = self
            .node_mut(id)
            .unwrap_or_else(|| panic!("control {:?} does not exist", id));
        assert!(
            node.children.is_empty(),
            "cannot change the container of a control with children"
        );
        node.container = container;
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.controls.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn node(&self, id: ControlId) -> Option<&ControlNode> {
        self.controls.get(&id)
    }

    pub fn node_mut(&mut self, id: ControlId) -> Option<&mut ControlNode> {
        self.controls.get_mut(&id)
    }

    pub fn render(&self) -> &RenderTree {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderTree {
        &mut self.render
    }

    pub fn render_object(&self, id: ControlId) -> Option<RenderId> {
        self.node(id).map(|node| node.render_object)
    }

    pub fn events(&self, id: ControlId) -> Option<&ControlEvents> {
        self.node(id).map(|node| &node.events)
    }

    pub fn events_mut(&mut self, id: ControlId) -> Option<&mut ControlEvents> {
        self.node_mut(id).map(|node| &mut node.events)
    }

    pub fn capabilities_mut(&mut self, id: ControlId) -> Option<&mut Capabilities> {
        self.node_mut(id).map(|node| &mut node.capabilities)
    }

    pub fn click(&self, id: ControlId) -> Option<&ClickDetector> {
        self.node(id)?.capabilities.click.as_ref()
    }

    pub fn click_mut(&mut self, id: ControlId) -> Option<&mut ClickDetector> {
        self.node_mut(id)?.capabilities.click.as_mut()
    }

    pub fn check(&self, id: ControlId) -> Option<CheckState> {
        self.node(id)?.capabilities.check
    }

    pub fn check_mut(&mut self, id: ControlId) -> Option<&mut CheckState> {
        self.node_mut(id)?.capabilities.check.as_mut()
    }

    pub fn set_style_target(&mut self, id: ControlId, target: Box<dyn StyleTarget>) {
        if let Some(capabilities) = self.capabilities_mut(id) {
            capabilities.style = Some(target);
        }
    }

    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.node(id).map_or(&[], |node| &node.children)
    }

    pub fn index_of(&self, id: ControlId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// The control itself, then its ancestors up to the root.
    pub fn ancestors(&self, id: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut current = if self.contains(id) { Some(id) } else { None };
        while let Some(id) = current {
            result.push(id);
            current = self.parent(id);
        }
        result
    }

    /// Returns true if `ancestor` is `id` or one of its ancestors.
    pub fn has_ancestor(&self, id: ControlId, ancestor: ControlId) -> bool {
        let mut current = if self.contains(id) { Some(id) } else { None };
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The topmost ancestor.
    pub fn root_of(&self, id: ControlId) -> Option<ControlId> {
        self.ancestors(id).last().copied()
    }

    /// The nearest control that is (or is an ancestor of) both `a` and `b`.
    pub fn lowest_common_ancestor(&self, a: ControlId, b: ControlId) -> Option<ControlId> {
        let ancestors: HashSet<_> = self.ancestors(a).into_iter().collect();
        self.ancestors(b)
            .into_iter()
            .find(|id| ancestors.contains(id))
    }

    /// Pre-order traversal of the subtree.
    pub fn traverse(&self, id: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        if !self.contains(id) {
            return result;
        }
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        result
    }

    /// Inserts `child` into `parent` at `index`, along with its render object.
    ///
    /// # Panics
    /// Panics if the child already has a parent, the parent does not accept (more) children, the
    /// index is out of range, or the child is an ancestor of the parent.
    pub fn add_child(&mut self, parent: ControlId, child: ControlId, index: usize) {
        let child_node = self
            .node(child)
            .unwrap_or_else(|| panic!("control {:?} does not exist", child));
        assert!(
            child_node.parent.is_none(),
            "{} {:?} already has a parent",
            child_node.kind,
            child
        );
        let child_render = child_node.render_object;
        assert!(
            !self.has_ancestor(parent, child),
            "cannot add a control to its own subtree"
        );

        let node = self
            .node(parent)
            .unwrap_or_else(|| panic!("control {:?} does not exist", parent));
        match node.child_mode {
            ChildMode::None => panic!("{} does not accept children", node.kind),
            ChildMode::Single => assert!(
                node.children.is_empty(),
                "{} accepts only one child",
                node.kind
            ),
            ChildMode::Multiple => (),
        }
        assert!(
            index <= node.children.len(),
            "child index {} out of range (len {})",
            index,
            node.children.len()
        );

        // keep render order in step with control order
        let container = node.container;
        let render_index = match node.children.get(index) {
            Some(next) => self
                .render_object(*next)
                .and_then(|next| self.render.children(container).iter().position(|r| *r == next))
                .unwrap_or_else(|| self.render.children(container).len()),
            None => self.render.children(container).len(),
        };

        if let Some(node) = self.controls.get_mut(&parent) {
            node.children.insert(index, child);
        }
        if let Some(node) = self.controls.get_mut(&child) {
            node.parent = Some(parent);
        }
        self.render.add_child(container, child_render, render_index);
    }

    /// Removes the child at `index` from `parent` and returns it.
    ///
    /// # Panics
    /// Panics if the index is out of range.
    pub fn remove_child(&mut self, parent: ControlId, index: usize) -> ControlId {
        let node = self
            .controls
            .get_mut(&parent)
            .unwrap_or_else(|| panic!("control {:?} does not exist", parent));
        assert!(
            index < node.children.len(),
            "child index {} out of range (len {})",
            index,
            node.children.len()
        );
        let child = node.children.remove(index);
        let container = node.container;

        if let Some(child_render) = self.render_object(child) {
            if let Some(i) = self
                .render
                .children(container)
                .iter()
                .position(|r| *r == child_render)
            {
                self.render.remove_child(container, i);
            }
        }
        if let Some(node) = self.controls.get_mut(&child) {
            node.parent = None;
        }

        let subtree = self.traverse(child);
        self.detached.push(Detached {
            control: child,
            old_parent: parent,
            subtree,
        });
        child
    }

    /// Detaches a control from its parent, if it has one.
    pub fn remove_from_parent(&mut self, id: ControlId) {
        if let (Some(parent), Some(index)) = (self.parent(id), self.index_of(id)) {
            self.remove_child(parent, index);
        }
    }

    /// Deletes a control, its descendants, and all their render objects.
    pub fn delete(&mut self, id: ControlId) {
        if !self.contains(id) {
            return;
        }
        self.remove_from_parent(id);

        for id in self.traverse(id) {
            if let Some(node) = self.controls.remove(&id) {
                for render_object in node.owned_render_objects.iter().rev() {
                    self.render.remove(*render_object);
                }
                self.render.remove(node.render_object);
                log::trace!(target: "perch::tree", "deleted {} {:?}", node.kind, id);
            }
        }
    }

    /// Returns and clears the list of detached subtrees.
    pub fn take_detached(&mut self) -> Vec<Detached> {
        std::mem::take(&mut self.detached)
    }

    /// Detached subtrees not yet taken, oldest first.
    pub fn pending_detached(&self) -> &[Detached] {
        &self.detached
    }

    pub fn cursor(&self, id: ControlId) -> Option<Cursor> {
        self.node(id).and_then(|node| node.cursor)
    }

    pub fn set_cursor(&mut self, id: ControlId, cursor: Option<Cursor>) {
        if let Some(node) = self.node_mut(id) {
            node.cursor = cursor;
        }
    }

    /// The cursor of the closest ancestor (or self) that sets one.
    pub fn find_cursor(&self, id: ControlId) -> Option<Cursor> {
        self.ancestors(id)
            .into_iter()
            .find_map(|id| self.cursor(id))
    }

    /// Like [`ControlTree::find_cursor`], falling back to the arrow.
    pub fn inherited_cursor(&self, id: ControlId) -> Cursor {
        self.find_cursor(id).unwrap_or(Cursor::Arrow)
    }

    /// Finds the control under `point`, given in `root`’s parent coordinates.
    pub fn hit_test(&self, root: ControlId, point: Point) -> Option<ControlId> {
        let render_root = self.render_object(root)?;
        let local = point - self.render.offset(render_root).to_vec();
        let hit = self.render.hit_test(render_root, local)?;
        self.render.owning_control(hit)
    }

    /// Applies a resolved style through the control’s style target.
    ///
    /// Geometry fields apply to the primary render object; everything else is up to the target.
    pub fn apply_style(&mut self, id: ControlId, style: &ResolvedStyle) {
        let render_object = match self.render_object(id) {
            Some(render_object) => render_object,
            None => return,
        };

        if let Some(margin) = style.margin {
            self.render.set_margin(render_object, margin);
        }
        if let Some(padding) = style.padding {
            self.render.set_padding(render_object, padding);
        }
        if let Some(size) = style.preferred_size {
            self.render.set_preferred_size(render_object, size);
        }
        if let Some(cursor) = style.cursor {
            self.set_cursor(id, Some(cursor));
        }

        let target = self
            .capabilities_mut(id)
            .and_then(|capabilities| capabilities.style.take());
        if let Some(mut target) = target {
            target.apply_style(&mut self.render, render_object, style);
            if let Some(capabilities) = self.capabilities_mut(id) {
                capabilities.style = Some(target);
            }
        }
        self.render.invalidate_layout(render_object);
        self.render.invalidate_paint();
    }
}
