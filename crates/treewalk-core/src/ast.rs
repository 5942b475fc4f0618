//! Arena-backed syntax tree.
//!
//! Nodes live in a single [`Ast`] arena and are addressed by [`NodeId`].
//! Each node keeps parent, first-child and sibling links plus two lazily
//! computed caches: the child count and the set of token types present in
//! its subtree. Every structural mutation clears the child count of the
//! affected parent and the subtree caches of all ancestors.

use crate::token::{TokenBitSet, TokenType};
use std::cell::OnceCell;

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised by structural mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The node is already linked into the tree.
    #[error("node {0:?} is already attached")]
    AlreadyAttached(NodeId),

    /// The mutation would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Node being attached.
        child: NodeId,
        /// Node it would be attached under.
        parent: NodeId,
    },

    /// The node has no parent, so it cannot take siblings.
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
}

#[derive(Debug)]
struct NodeData {
    token_type: TokenType,
    text: String,
    line: usize,
    column: usize,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    previous_sibling: Option<NodeId>,
    child_count: OnceCell<usize>,
    branch_types: OnceCell<TokenBitSet>,
}

/// A syntax tree for one file.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Ast {
    /// Largest number of nodes a tree can hold.
    pub const MAX_NODES: usize = u32::MAX as usize;

    /// Creates an empty tree (no root), as produced for empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree with a root node.
    #[must_use]
    pub fn with_root(ty: TokenType, text: impl Into<String>, line: usize, column: usize) -> Self {
        let mut ast = Self::new();
        let root = ast.create(ty, text, line, column);
        ast.root = Some(root);
        ast
    }

    /// Returns the root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<Node<'_>> {
        self.root.map(|id| self.node(id))
    }

    /// Returns the root id, if any.
    #[must_use]
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a handle to a node of this tree. Use [`Ast::get`] for ids of
    /// unknown origin.
    #[must_use]
    pub(crate) fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id.index() < self.nodes.len(), "foreign node id {id:?}");
        Node { ast: self, id }
    }

    /// Returns a handle to a node, or `None` for a foreign id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then_some(Node { ast: self, id })
    }

    /// Creates a detached node.
    ///
    /// # Panics
    ///
    /// A tree holds at most [`Ast::MAX_NODES`] nodes; creating one more
    /// panics.
    pub fn create(
        &mut self,
        ty: TokenType,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> NodeId {
        let id = match u32::try_from(self.nodes.len()) {
            Ok(index) if index < u32::MAX => NodeId(index),
            _ => panic!("a tree holds at most {} nodes", Self::MAX_NODES),
        };
        self.nodes.push(NodeData {
            token_type: ty,
            text: text.into(),
            line,
            column,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            previous_sibling: None,
            child_count: OnceCell::new(),
            branch_types: OnceCell::new(),
        });
        id
    }

    /// Creates a node and appends it as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics when the tree already holds [`Ast::MAX_NODES`] nodes.
    pub fn append_new(
        &mut self,
        parent: NodeId,
        ty: TokenType,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> NodeId {
        let child = self.create(ty, text, line, column);
        self.link_last_child(parent, child);
        child
    }

    /// Appends a detached node as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `child` is attached, or is `parent` or one of its ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.ensure_attachable(parent, child)?;
        self.link_last_child(parent, child);
        Ok(())
    }

    /// Replaces all children of `parent` with `child` (or with nothing).
    ///
    /// Previous children become detached.
    ///
    /// # Errors
    ///
    /// Fails if `child` is attached, or is `parent` or one of its ancestors.
    pub fn set_first_child(
        &mut self,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), TreeError> {
        if let Some(child) = child {
            self.ensure_attachable(parent, child)?;
        }
        let mut old = self.data(parent).first_child;
        while let Some(current) = old {
            old = self.data(current).next_sibling;
            self.unlink(current);
        }
        {
            let data = self.data_mut(parent);
            data.first_child = None;
            data.last_child = None;
        }
        if let Some(child) = child {
            self.link_last_child(parent, child);
        }
        self.invalidate_from(parent);
        Ok(())
    }

    /// Replaces every sibling after `node` with `sibling` (or with nothing).
    ///
    /// # Errors
    ///
    /// Fails if `node` has no parent, or `sibling` cannot be attached there.
    pub fn set_next_sibling(
        &mut self,
        node: NodeId,
        sibling: Option<NodeId>,
    ) -> Result<(), TreeError> {
        let parent = self.data(node).parent.ok_or(TreeError::Detached(node))?;
        if let Some(sibling) = sibling {
            self.ensure_attachable(parent, sibling)?;
        }
        let mut old = self.data(node).next_sibling;
        while let Some(current) = old {
            old = self.data(current).next_sibling;
            self.unlink(current);
        }
        self.data_mut(node).next_sibling = sibling;
        if let Some(sibling) = sibling {
            let data = self.data_mut(sibling);
            data.parent = Some(parent);
            data.previous_sibling = Some(node);
        }
        self.data_mut(parent).last_child = Some(sibling.unwrap_or(node));
        self.invalidate_from(parent);
        Ok(())
    }

    /// Inserts a detached node directly after `node`.
    ///
    /// # Errors
    ///
    /// Fails if `node` has no parent, or `sibling` cannot be attached there.
    pub fn add_next_sibling(&mut self, node: NodeId, sibling: NodeId) -> Result<(), TreeError> {
        let parent = self.data(node).parent.ok_or(TreeError::Detached(node))?;
        self.ensure_attachable(parent, sibling)?;
        let following = self.data(node).next_sibling;
        {
            let data = self.data_mut(sibling);
            data.parent = Some(parent);
            data.previous_sibling = Some(node);
            data.next_sibling = following;
        }
        match following {
            Some(following) => self.data_mut(following).previous_sibling = Some(sibling),
            None => self.data_mut(parent).last_child = Some(sibling),
        }
        self.data_mut(node).next_sibling = Some(sibling);
        self.invalidate_from(parent);
        Ok(())
    }

    /// Inserts a detached node directly before `node`.
    ///
    /// # Errors
    ///
    /// Fails if `node` has no parent, or `sibling` cannot be attached there.
    pub fn add_previous_sibling(
        &mut self,
        node: NodeId,
        sibling: NodeId,
    ) -> Result<(), TreeError> {
        let parent = self.data(node).parent.ok_or(TreeError::Detached(node))?;
        self.ensure_attachable(parent, sibling)?;
        let preceding = self.data(node).previous_sibling;
        {
            let data = self.data_mut(sibling);
            data.parent = Some(parent);
            data.previous_sibling = preceding;
            data.next_sibling = Some(node);
        }
        match preceding {
            Some(preceding) => self.data_mut(preceding).next_sibling = Some(sibling),
            None => self.data_mut(parent).first_child = Some(sibling),
        }
        self.data_mut(node).previous_sibling = Some(sibling);
        self.invalidate_from(parent);
        Ok(())
    }

    fn ensure_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let data = self.data(child);
        if data.parent.is_some()
            || data.previous_sibling.is_some()
            || data.next_sibling.is_some()
            || self.root == Some(child)
        {
            return Err(TreeError::AlreadyAttached(child));
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(TreeError::Cycle { child, parent });
            }
            ancestor = self.data(current).parent;
        }
        Ok(())
    }

    fn link_last_child(&mut self, parent: NodeId, child: NodeId) {
        let last = self.data(parent).last_child;
        {
            let data = self.data_mut(child);
            data.parent = Some(parent);
            data.previous_sibling = last;
        }
        match last {
            Some(last) => self.data_mut(last).next_sibling = Some(child),
            None => self.data_mut(parent).first_child = Some(child),
        }
        self.data_mut(parent).last_child = Some(child);
        self.invalidate_from(parent);
    }

    fn unlink(&mut self, id: NodeId) {
        let data = self.data_mut(id);
        data.parent = None;
        data.previous_sibling = None;
        data.next_sibling = None;
    }

    /// Clears the child count of `parent` and the subtree caches of `parent`
    /// and every ancestor above it.
    ///
    /// A subtree cache is only ever filled after the caches of all its
    /// descendants, so the climb stops at the first empty one.
    fn invalidate_from(&mut self, parent: NodeId) {
        self.data_mut(parent).child_count.take();
        let mut current = Some(parent);
        while let Some(id) = current {
            let data = self.data_mut(id);
            if data.branch_types.take().is_none() {
                break;
            }
            current = data.parent;
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Computes (or fetches) the subtree token set without native recursion.
    fn branch_types(&self, id: NodeId) -> Option<&TokenBitSet> {
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            let data = self.data(current);
            if data.branch_types.get().is_some() {
                continue;
            }
            if expanded {
                let mut set = TokenBitSet::new();
                set.insert(data.token_type);
                for child in self.node(current).children() {
                    if let Some(child_set) = self.data(child.id).branch_types.get() {
                        set.union_with(child_set);
                    }
                }
                let _ = data.branch_types.set(set);
            } else {
                stack.push((current, true));
                for child in self.node(current).children() {
                    if self.data(child.id).branch_types.get().is_none() {
                        stack.push((child.id, false));
                    }
                }
            }
        }
        self.data(id).branch_types.get()
    }
}

/// Borrowed handle to a node of an [`Ast`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> Node<'a> {
    fn data(self) -> &'a NodeData {
        self.ast.data(self.id)
    }

    fn wrap(self, id: Option<NodeId>) -> Option<Node<'a>> {
        id.map(|id| Node { ast: self.ast, id })
    }

    /// Id of this node.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Token type of this node.
    #[must_use]
    pub fn token_type(self) -> TokenType {
        self.data().token_type
    }

    /// Matched text.
    #[must_use]
    pub fn text(self) -> &'a str {
        &self.data().text
    }

    /// Line number (1-based).
    #[must_use]
    pub fn line(self) -> usize {
        self.data().line
    }

    /// Column number (0-based).
    #[must_use]
    pub fn column(self) -> usize {
        self.data().column
    }

    /// Parent node.
    #[must_use]
    pub fn parent(self) -> Option<Node<'a>> {
        self.wrap(self.data().parent)
    }

    /// First child.
    #[must_use]
    pub fn first_child(self) -> Option<Node<'a>> {
        self.wrap(self.data().first_child)
    }

    /// Last child.
    #[must_use]
    pub fn last_child(self) -> Option<Node<'a>> {
        self.wrap(self.data().last_child)
    }

    /// Next sibling.
    #[must_use]
    pub fn next_sibling(self) -> Option<Node<'a>> {
        self.wrap(self.data().next_sibling)
    }

    /// Previous sibling.
    #[must_use]
    pub fn previous_sibling(self) -> Option<Node<'a>> {
        self.wrap(self.data().previous_sibling)
    }

    /// Iterates over direct children in order.
    #[must_use]
    pub fn children(self) -> Children<'a> {
        Children {
            next: self.first_child(),
        }
    }

    /// Returns true if this node has at least one child.
    #[must_use]
    pub fn has_children(self) -> bool {
        self.data().first_child.is_some()
    }

    /// Number of direct children (cached).
    #[must_use]
    pub fn child_count(self) -> usize {
        *self
            .data()
            .child_count
            .get_or_init(|| self.children().count())
    }

    /// Number of direct children of the given type.
    #[must_use]
    pub fn child_count_of(self, ty: TokenType) -> usize {
        self.children().filter(|c| c.token_type() == ty).count()
    }

    /// Returns true if a node of type `ty` exists anywhere in this subtree,
    /// this node included.
    #[must_use]
    pub fn branch_contains(self, ty: TokenType) -> bool {
        self.ast
            .branch_types(self.id)
            .is_some_and(|set| set.contains(ty))
    }

    /// First direct child of the given type.
    #[must_use]
    pub fn find_first_token(self, ty: TokenType) -> Option<Node<'a>> {
        self.children().find(|c| c.token_type() == ty)
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("token_type", &self.token_type())
            .field("text", &self.text())
            .field("line", &self.line())
            .field("column", &self.column())
            .finish()
    }
}

impl std::fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}x{}]", self.text(), self.line(), self.column())
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    next: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}
