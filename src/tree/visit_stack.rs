use super::Node;

/// One node on the in-order walk
struct Frame<'a, K> {
    node: &'a Node<K>,
    /// next key offset to emit
    offset: usize,
    depth: usize,
}

impl<K> Clone for Frame<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Frame<'_, K> {}

/// Keeps breadcrumbs of an in-order traversal, the deepest node is on top.
/// The stack never grows past the tree height.
pub(crate) struct VisitStack<'a, K> {
    frames: Vec<Frame<'a, K>>,
}

impl<K> Clone for VisitStack<'_, K> {
    fn clone(&self) -> Self {
        Self {
            frames: self.frames.clone(),
        }
    }
}

impl<'a, K> VisitStack<'a, K> {
    /// Create a stack positioned before the smallest key under `root`
    pub(crate) fn new(root: Option<&'a Node<K>>) -> Self {
        let mut stack = Self { frames: Vec::new() };
        if let Some(root) = root {
            stack.push_leftmost(root, 0);
        }
        stack
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Push `node` and its chain of first children
    fn push_leftmost(&mut self, mut node: &'a Node<K>, mut depth: usize) {
        loop {
            self.frames.push(Frame {
                node,
                offset: 0,
                depth,
            });
            if node.is_leaf() {
                return;
            }
            node = node.child(0);
            depth += 1;
        }
    }

    /// Pop the next key in order along with the depth of the node holding it
    pub(crate) fn next_key(&mut self) -> Option<(usize, &'a K)> {
        loop {
            let frame = self.frames.last_mut()?;
            let Frame {
                node,
                offset,
                depth,
            } = *frame;

            if offset < node.len() {
                frame.offset += 1;
                if !node.is_leaf() {
                    // everything between this key and the next one
                    self.push_leftmost(node.child(offset + 1), depth + 1);
                }
                return Some((depth, node.key(offset)));
            }

            self.frames.pop();
        }
    }
}
