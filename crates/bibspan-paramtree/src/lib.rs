//! A declarative mapping engine between streaming element events and a
//! content tree.
//!
//! Callers declare the element paths they care about up front
//! ([`ParameterTree::add_parameter`], [`ParameterTree::add_child`]), then
//! feed element-start / characters / element-end events from any streaming
//! source ([`ParameterTree::prepare`], [`ParameterTree::add_characters`],
//! [`ParameterTree::unprepare`]). Character data accumulates on the declared
//! node matching the event path; everything undeclared is absorbed by
//! throwaway virtual nodes, so schemas stay small no matter how deep the
//! real documents nest. After the stream ends, accumulated content is read
//! back with [`ParameterTree::get_content`].

/// Handle to a declared node. Handles stay valid for the tree's whole
/// lifetime; only virtual nodes are ever freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Declared,
    Virtual,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    /// Element name this node matches (or, for virtual nodes, the element
    /// name it was synthesized for).
    node_name: String,
    /// Required `type` attribute value. `None` matches only elements
    /// carrying no such attribute.
    variant: Option<String>,
    content: String,
    /// Parameter name → node, in declaration order; the first matching
    /// entry wins on lookup.
    children: Vec<(String, usize)>,
    parent: Option<usize>,
}

impl Node {
    fn new(kind: NodeKind, node_name: &str, variant: Option<&str>, parent: Option<usize>) -> Self {
        Self {
            kind,
            node_name: node_name.to_string(),
            variant: variant.map(str::to_string),
            content: String::new(),
            children: Vec::new(),
            parent,
        }
    }

    fn matches(&self, node_name: &str, variant: Option<&str>) -> bool {
        self.node_name == node_name && self.variant.as_deref() == variant
    }
}

/// A forest of declared parameter trees plus the traversal state of one
/// in-flight document.
///
/// At most one node is active at a time. The tree starts "not listening":
/// top-level elements that match no declared root are ignored entirely, and
/// matching resumes at the next element. Once inside a declared root, every
/// undeclared element gets a virtual node so that descent and ascent stay
/// balanced; virtual nodes are discarded as soon as traversal climbs back
/// out of them.
#[derive(Debug, Default)]
pub struct ParameterTree {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    /// Parameter name → root node, in declaration order.
    roots: Vec<(String, usize)>,
    active: Option<usize>,
}

impl ParameterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a root parameter. Roots are matched by any element that
    /// starts while the tree is idle, whatever its nesting depth.
    ///
    /// `name` is the caller-chosen path segment used in [`get_content`]
    /// queries; `node_name` and `variant` are what incoming events are
    /// matched against. On duplicate names the first declaration wins.
    ///
    /// [`get_content`]: ParameterTree::get_content
    pub fn add_parameter(&mut self, name: &str, node_name: &str, variant: Option<&str>) -> NodeId {
        let id = self.alloc(Node::new(NodeKind::Declared, node_name, variant, None));
        self.roots.push((name.to_string(), id));
        NodeId(id)
    }

    /// Declare a child under an already declared node.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        node_name: &str,
        variant: Option<&str>,
    ) -> NodeId {
        let id = self.alloc(Node::new(NodeKind::Declared, node_name, variant, Some(parent.0)));
        self.node_mut(parent.0).children.push((name.to_string(), id));
        NodeId(id)
    }

    /// Element-start event.
    ///
    /// With an active node, descend into its declared child matching
    /// `(node_name, variant)`, or into a fresh virtual node when nothing
    /// matches. With no active node, activate a matching declared root;
    /// unmatched top-level elements leave the tree idle. Never fails.
    pub fn prepare(&mut self, node_name: &str, variant: Option<&str>) {
        match self.active {
            Some(current) => {
                if let Some(child) = self.matching_child(current, node_name, variant) {
                    self.active = Some(child);
                } else {
                    let id = self.alloc(Node::new(
                        NodeKind::Virtual,
                        node_name,
                        variant,
                        Some(current),
                    ));
                    self.node_mut(current).children.push((node_name.to_string(), id));
                    self.active = Some(id);
                }
            }
            None => {
                self.active = self.matching_root(node_name, variant);
            }
        }
    }

    /// Character event: append to the active node's content. No-op while
    /// idle.
    pub fn add_characters(&mut self, chars: &str) {
        if let Some(active) = self.active {
            self.node_mut(active).content.push_str(chars);
        }
    }

    /// Element-end event: ascend to the parent.
    ///
    /// Leaving a virtual node detaches it (subtree and all) from its parent
    /// and then disposes the parent, so a run of virtual nodes is torn down
    /// on the ascent that leaves it. Declared nodes and their declared
    /// children are never touched. Surplus calls while idle are no-ops.
    pub fn unprepare(&mut self) {
        let Some(leaving) = self.active else { return };
        let parent = self.node(leaving).parent;
        let leaving_virtual = self.node(leaving).kind == NodeKind::Virtual;
        self.active = parent;
        if leaving_virtual
            && let Some(parent) = parent
        {
            self.detach_child(parent, leaving);
            self.dispose(parent);
        }
    }

    /// Read accumulated content by a `/`-separated path of parameter names,
    /// root first.
    ///
    /// Returns `None` when any segment fails to resolve to a declared node
    /// or when the addressed node holds no content (never visited counts as
    /// no content).
    pub fn get_content(&self, path: &str) -> Option<&str> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut id = Self::lookup(&self.slots, &self.roots, first)?;
        for segment in segments {
            id = Self::lookup(&self.slots, &self.node(id).children, segment)?;
        }
        let content = self.node(id).content.as_str();
        if content.is_empty() { None } else { Some(content) }
    }

    /// First declared entry with a matching parameter name.
    fn lookup(slots: &[Option<Node>], entries: &[(String, usize)], name: &str) -> Option<usize> {
        entries
            .iter()
            .find(|(entry_name, id)| {
                entry_name == name
                    && slots[*id]
                        .as_ref()
                        .is_some_and(|node| node.kind == NodeKind::Declared)
            })
            .map(|&(_, id)| id)
    }

    /// First declared child of `parent` matching the event.
    fn matching_child(&self, parent: usize, node_name: &str, variant: Option<&str>) -> Option<usize> {
        self.node(parent)
            .children
            .iter()
            .map(|&(_, id)| id)
            .find(|&id| {
                let node = self.node(id);
                node.kind == NodeKind::Declared && node.matches(node_name, variant)
            })
    }

    fn matching_root(&self, node_name: &str, variant: Option<&str>) -> Option<usize> {
        self.roots
            .iter()
            .map(|&(_, id)| id)
            .find(|&id| self.node(id).matches(node_name, variant))
    }

    /// Remove `child` from `parent`'s children and free its whole subtree.
    fn detach_child(&mut self, parent: usize, child: usize) {
        self.node_mut(parent).children.retain(|&(_, id)| id != child);
        self.release_subtree(child);
    }

    /// Disposal pass over the node just ascended into: declared nodes keep
    /// everything, virtual nodes drop all remaining children.
    fn dispose(&mut self, id: usize) {
        if self.node(id).kind == NodeKind::Declared {
            return;
        }
        let children: Vec<usize> = self.node(id).children.iter().map(|&(_, id)| id).collect();
        self.node_mut(id).children.clear();
        for child in children {
            self.release_subtree(child);
        }
    }

    /// Return a subtree's slots to the free list. Virtual subtrees contain
    /// only virtual nodes, so no declared handle can be invalidated here.
    fn release_subtree(&mut self, id: usize) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.slots[id].take() {
                stack.extend(node.children.iter().map(|&(_, child)| child));
                self.free.push(id);
            }
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn node(&self, id: usize) -> &Node {
        self.slots[id].as_ref().expect("node id points at a freed slot")
    }

    fn node_mut(&mut self, id: usize) -> &mut Node {
        self.slots[id].as_mut().expect("node id points at a freed slot")
    }
}
