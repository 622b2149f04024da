use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use crate::error::AllocError;
use crate::list::cursor::{Cursor, CursorMut};
use crate::{IntoIter, Iter, IterMut};

pub mod cursor;
pub mod iterator;
pub mod position;

mod algorithms;
mod alloc;

/// A doubly-linked list closed into a ring by a ghost (sentinel) node.
///
/// Every element lives in its own heap node from the moment it is inserted
/// until it is removed, so a [`Position`](crate::Position) naming it stays
/// valid in between. Insertion, removal and splicing at a known position are
/// *O*(1); there is no indexing.
///
/// The ghost node carries links but no element. It is allocated by the list,
/// stays with it for its whole life and is freed when the list is dropped.
/// Its `next` is the front element and its `prev` the back element, or
/// itself when the list is empty.
///
/// With the `length` feature the list also keeps its length:
/// ```text
/// [dependencies]
/// sentinel_list = { features = ["length"] }
/// ```
///
/// # Naming Conventions
///
/// - `front..=back`: the nodes from `front` to `back`, both included;
/// - `first..last`: the nodes from `first` up to `last` excluded, where
///   `last` may be the ghost node.
///
/// # Threads
///
/// A list is `Send` or `Sync` exactly when its elements are:
///
/// ```compile_fail
/// use sentinel_list::List;
/// use std::rc::Rc;
///
/// fn send<S: Send>(_: S) {}
/// send(List::from([Rc::new(1)]));
/// ```
pub struct List<T> {
    ghost: NonNull<Link>,
    #[cfg(feature = "length")]
    pub(crate) len: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

/// The pair of links every node starts with, and all the ghost node has.
#[repr(C)]
pub(crate) struct Link {
    pub(crate) next: NonNull<Link>,
    pub(crate) prev: NonNull<Link>,
}

/// A node holding an element. `link` comes first so that a pointer to the
/// node is also a pointer to its links.
#[repr(C)]
pub(crate) struct Node<T> {
    pub(crate) link: Link,
    pub(crate) element: T,
}

/// A run `front..=back` of value nodes that has been unlinked from its list.
///
/// The run owns its nodes: dropping it frees them, front to back. It is
/// linked into a list again with [`List::attach_nodes`]. The outer links
/// `front.prev` and `back.next` are stale and never read.
pub(crate) struct DetachedNodes<T> {
    front: NonNull<Link>,
    back: NonNull<Link>,
    #[cfg(feature = "length")]
    pub(crate) len: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

/// Make `next` follow `prev`. Every change to the ring goes through here.
///
/// Both nodes must be alive.
#[inline]
pub(crate) unsafe fn connect(prev: NonNull<Link>, next: NonNull<Link>) {
    (*prev.as_ptr()).next = next;
    (*next.as_ptr()).prev = prev;
}

#[inline]
pub(crate) unsafe fn next_of(node: NonNull<Link>) -> NonNull<Link> {
    (*node.as_ptr()).next
}

#[inline]
pub(crate) unsafe fn prev_of(node: NonNull<Link>) -> NonNull<Link> {
    (*node.as_ptr()).prev
}

/// `node` must be a live value node that outlives `'a`.
#[inline]
pub(crate) unsafe fn element<'a, T>(node: NonNull<Link>) -> &'a T {
    &(*node.cast::<Node<T>>().as_ptr()).element
}

/// Like [`element`], and the element must not be borrowed elsewhere.
#[inline]
pub(crate) unsafe fn element_mut<'a, T>(node: NonNull<Link>) -> &'a mut T {
    &mut (*node.cast::<Node<T>>().as_ptr()).element
}

/// Number of nodes in `first..last`.
#[cfg(feature = "length")]
pub(crate) unsafe fn count_run(mut first: NonNull<Link>, last: NonNull<Link>) -> usize {
    let mut len = 0;
    while first != last {
        len += 1;
        first = next_of(first);
    }
    len
}

// Topology helpers.
impl<T> List<T> {
    pub(crate) fn ghost_node(&self) -> NonNull<Link> {
        self.ghost
    }

    pub(crate) fn front_node(&self) -> NonNull<Link> {
        // SAFETY: the ghost node is alive as long as the list.
        unsafe { next_of(self.ghost) }
    }

    pub(crate) fn back_node(&self) -> NonNull<Link> {
        // SAFETY: the ghost node is alive as long as the list.
        unsafe { prev_of(self.ghost) }
    }

    fn from_ghost(ghost: NonNull<Link>) -> Self {
        Self {
            ghost,
            #[cfg(feature = "length")]
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Unlink the value node `node` and hand back its box.
    ///
    /// `node` must be a value node of this list, never the ghost node.
    pub(crate) unsafe fn detach_node(&mut self, node: NonNull<Link>) -> Box<Node<T>> {
        connect(prev_of(node), next_of(node));
        #[cfg(feature = "length")]
        {
            self.len -= 1;
        }
        Box::from_raw(node.cast::<Node<T>>().as_ptr())
    }

    /// Link the detached node `node` between `prev` and `next`.
    ///
    /// `prev` and `next` must be adjacent nodes of this list. Debug builds
    /// check the adjacency.
    pub(crate) unsafe fn attach_node(
        &mut self,
        prev: NonNull<Link>,
        next: NonNull<Link>,
        node: NonNull<Link>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, node);
        connect(node, next);
        #[cfg(feature = "length")]
        {
            self.len += 1;
        }
    }

    /// Unlink `front..=back` and return it as an owned run.
    ///
    /// `front..=back` must be value nodes of this list, with `back`
    /// reachable from `front` without passing the ghost node. With the
    /// `length` feature, `len` must be the number of nodes in the run.
    pub(crate) unsafe fn detach_nodes(
        &mut self,
        front: NonNull<Link>,
        back: NonNull<Link>,
        #[cfg(feature = "length")] len: usize,
    ) -> DetachedNodes<T> {
        connect(prev_of(front), next_of(back));
        #[cfg(feature = "length")]
        {
            self.len -= len;
        }
        DetachedNodes::new(
            front,
            back,
            #[cfg(feature = "length")]
            len,
        )
    }

    /// Link the run `detached` between `prev` and `next`.
    ///
    /// `prev` and `next` must be adjacent nodes of this list. Debug builds
    /// check the adjacency.
    pub(crate) unsafe fn attach_nodes(
        &mut self,
        prev: NonNull<Link>,
        next: NonNull<Link>,
        detached: DetachedNodes<T>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        #[cfg(feature = "length")]
        {
            self.len += detached.len;
        }
        let (front, back) = detached.into_raw();
        connect(prev, front);
        connect(back, next);
    }

    /// Unlink every element at once, leaving the ghost node linked to itself.
    pub(crate) fn detach_all_nodes(&mut self) -> Option<DetachedNodes<T>> {
        if self.is_empty() {
            return None;
        }
        let (front, back) = (self.front_node(), self.back_node());
        // SAFETY: the front and back nodes bound all the elements of the list.
        unsafe {
            Some(self.detach_nodes(
                front,
                back,
                #[cfg(feature = "length")]
                self.len,
            ))
        }
    }

    /// A new list made of the run `detached`, under a fresh ghost node.
    pub(crate) fn from_detached(detached: DetachedNodes<T>) -> Self {
        let mut list = List::new();
        let ghost = list.ghost_node();
        // SAFETY: the ghost node of an empty list is adjacent to itself.
        unsafe { list.attach_nodes(ghost, ghost, detached) };
        list
    }

    /// Consume the list, keeping its elements as a run. The ghost node is
    /// freed with the list.
    pub(crate) fn into_detached(mut self) -> Option<DetachedNodes<T>> {
        self.detach_all_nodes()
    }

    /// Walk the ring once in each direction and check that it is closed,
    /// consistent, and as long as the list claims.
    #[cfg(test)]
    pub(crate) fn assert_well_formed(&self) {
        let ghost = self.ghost_node();
        let mut forward = 0_usize;
        let mut node = ghost;
        loop {
            let next = unsafe { next_of(node) };
            assert_eq!(unsafe { prev_of(next) }, node, "broken back link");
            node = next;
            if node == ghost {
                break;
            }
            forward += 1;
        }
        let mut backward = 0_usize;
        let mut node = unsafe { prev_of(ghost) };
        while node != ghost {
            backward += 1;
            node = unsafe { prev_of(node) };
        }
        assert_eq!(forward, backward);
        assert_eq!(self.is_empty(), forward == 0);
        assert_eq!(self.is_empty(), self.back_node() == ghost);
        #[cfg(feature = "length")]
        assert_eq!(self.len, forward);
    }
}

impl<T> List<T> {
    /// Creates an empty list, allocating its ghost node.
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list: List<u32> = List::new();
    /// assert_eq!(list.begin(), list.end());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::from_ghost(Link::new_ghost())
    }

    /// Creates an empty list, or fails if the ghost node cannot be allocated.
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list: List<u32> = List::try_new().unwrap();
    /// assert!(list.is_empty());
    /// ```
    pub fn try_new() -> Result<Self, AllocError> {
        Link::try_new_ghost().map(Self::from_ghost)
    }

    /// Returns `true` if the ghost node is linked to itself. *O*(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.is_empty());
    /// list.push_back('a');
    /// assert!(!list.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_node() == self.ghost_node()
    }

    /// The number of elements, kept up to date by every edit. *O*(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from(['a', 'b']);
    /// list.push_front('z');
    /// assert_eq!(list.len(), 3);
    /// ```
    #[cfg(feature = "length")]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// The number of elements, counted by walking the ring. *O*(*n*).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from(['a', 'b']);
    /// list.push_front('z');
    /// assert_eq!(list.len(), 3);
    /// ```
    #[cfg(not(feature = "length"))]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Drops every element, front to back. The ghost node, and so the
    /// [`end`](List::end) position, is kept.
    ///
    /// The elements are unlinked before the first one is dropped, so the
    /// list is already empty if a destructor panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2]);
    /// let end = list.end();
    /// list.clear();
    /// assert!(list.is_empty());
    /// assert_eq!(list.begin(), end);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        drop(self.detach_all_nodes());
    }

    /// The front element, or `None` if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.front(), None);
    /// list.push_back(1);
    /// list.push_back(2);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: in a non-empty list the front node holds an element.
        Some(unsafe { element(self.front_node()) })
    }

    /// Mutable access to the front element, or `None` if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2]);
    /// if let Some(x) = list.front_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list, List::from([5, 2]));
    /// ```
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: as in `front`, and `self` is borrowed mutably.
        Some(unsafe { element_mut(self.front_node()) })
    }

    /// The back element, or `None` if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.back(), None);
    /// list.push_front(1);
    /// list.push_front(2);
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: in a non-empty list the back node holds an element.
        Some(unsafe { element(self.back_node()) })
    }

    /// Mutable access to the back element, or `None` if the list is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: as in `back`, and `self` is borrowed mutably.
        Some(unsafe { element_mut(self.back_node()) })
    }

    /// Links `elt` between the ghost node and the front element. *O*(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([2]);
    /// list.push_front(1);
    /// assert_eq!(list, List::from([1, 2]));
    /// ```
    pub fn push_front(&mut self, elt: T) {
        let node = Node::new_detached(elt);
        // SAFETY: the ghost node is followed by the front node.
        unsafe { self.attach_node(self.ghost_node(), self.front_node(), node) }
    }

    /// Like [`List::push_front`], but reports a failed allocation instead of
    /// aborting. The list is unchanged on error.
    pub fn try_push_front(&mut self, elt: T) -> Result<(), AllocError> {
        let node = Node::try_new_detached(elt)?;
        // SAFETY: as in `push_front`.
        unsafe { self.attach_node(self.ghost_node(), self.front_node(), node) };
        Ok(())
    }

    /// Unlinks the front element and returns it, or `None` if the list is
    /// empty. *O*(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from(["a", "b"]);
    /// assert_eq!(list.pop_front(), Some("a"));
    /// assert_eq!(list.pop_front(), Some("b"));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: in a non-empty list the front node holds an element.
        Some(unsafe { self.detach_node(self.front_node()) }.into_element())
    }

    /// Links `elt` between the back element and the ghost node. *O*(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1]);
    /// list.push_back(2);
    /// assert_eq!(list, List::from([1, 2]));
    /// ```
    pub fn push_back(&mut self, elt: T) {
        let node = Node::new_detached(elt);
        // SAFETY: the back node is followed by the ghost node.
        unsafe { self.attach_node(self.back_node(), self.ghost_node(), node) }
    }

    /// Like [`List::push_back`], but reports a failed allocation instead of
    /// aborting. The list is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.try_push_back(1).is_ok());
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    pub fn try_push_back(&mut self, elt: T) -> Result<(), AllocError> {
        let node = Node::try_new_detached(elt)?;
        // SAFETY: as in `push_back`.
        unsafe { self.attach_node(self.back_node(), self.ghost_node(), node) };
        Ok(())
    }

    /// Unlinks the back element and returns it, or `None` if the list is
    /// empty. *O*(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from(["a", "b"]);
    /// assert_eq!(list.pop_back(), Some("b"));
    /// assert_eq!(list, List::from(["a"]));
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: in a non-empty list the back node holds an element.
        Some(unsafe { self.detach_node(self.back_node()) }.into_element())
    }

    /// A read-only cursor on the front node, or on the ghost node if the list
    /// is empty. Use [`List::cursor_at`] to start from a position.
    pub fn cursor_start(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.front_node())
    }

    /// A read-only cursor on the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([1, 2, 3]);
    /// let cursor = list.cursor_end();
    /// assert_eq!(cursor.current(), None);
    /// assert_eq!(cursor.previous(), Some(&3));
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.ghost_node())
    }

    /// An editing cursor on the front node, or on the ghost node if the list
    /// is empty. Use [`List::cursor_at_mut`] to start from a position.
    pub fn cursor_start_mut(&mut self) -> CursorMut<'_, T> {
        let front = self.front_node();
        CursorMut::new(self, front)
    }

    /// An editing cursor on the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2]);
    /// let mut cursor = list.cursor_end_mut();
    /// cursor.insert(3);
    /// assert_eq!(cursor.previous(), Some(&3));
    /// assert_eq!(list, List::from([1, 2, 3]));
    /// ```
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T> {
        let ghost = self.ghost_node();
        CursorMut::new(self, ghost)
    }

    /// Iterates over shared references, front to back.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([3, 1, 2]);
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next_back(), Some(&2));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Iterates over mutable references, front to back.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// list.iter_mut().rev().take(2).for_each(|x| *x = -*x);
    /// assert_eq!(list, List::from([1, -2, -3]));
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    /// Exchanges the contents of two lists in *O*(1).
    ///
    /// Only the links around the two ghost nodes are rewritten. Elements keep
    /// their nodes, so their positions follow them into the other list. The
    /// ghost nodes stay put, so each list keeps its own
    /// [`end`](List::end) position. [`std::mem::swap`] would exchange the
    /// ghost nodes as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut a = List::from([1, 2, 3]);
    /// let mut b = List::new();
    /// let (one, end_a, end_b) = (a.begin(), a.end(), b.end());
    ///
    /// a.swap(&mut b);
    ///
    /// assert!(a.is_empty());
    /// assert_eq!(b, List::from([1, 2, 3]));
    /// assert_eq!(b.begin(), one);
    /// assert_eq!((a.end(), b.end()), (end_a, end_b));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        let (ghost, other_ghost) = (self.ghost_node(), other.ghost_node());
        let (front, back) = (self.front_node(), self.back_node());
        let (other_front, other_back) = (other.front_node(), other.back_node());
        // SAFETY: the boundary nodes are read above, before any link is
        // rewritten, and each case only links live nodes of the two lists.
        unsafe {
            match (self.is_empty(), other.is_empty()) {
                (true, true) => return,
                (true, false) => {
                    connect(ghost, other_front);
                    connect(other_back, ghost);
                    connect(other_ghost, other_ghost);
                }
                (false, true) => {
                    connect(other_ghost, front);
                    connect(back, other_ghost);
                    connect(ghost, ghost);
                }
                (false, false) => {
                    connect(ghost, other_front);
                    connect(other_back, ghost);
                    connect(other_ghost, front);
                    connect(back, other_ghost);
                }
            }
        }
        #[cfg(feature = "length")]
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Moves every element of `other` behind the back element, leaving
    /// `other` empty. *O*(1), no allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut a = List::from(['a']);
    /// let mut b = List::from(['b', 'c']);
    /// let b_front = b.begin();
    ///
    /// a.append(&mut b);
    ///
    /// assert_eq!(a, List::from(['a', 'b', 'c']));
    /// assert!(b.is_empty());
    /// assert_eq!(unsafe { a.begin().next() }, b_front);
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        if let Some(run) = other.detach_all_nodes() {
            // SAFETY: the back node is followed by the ghost node.
            unsafe { self.attach_nodes(self.back_node(), self.ghost_node(), run) }
        }
    }

    /// Moves every element of `other` before the front element, leaving
    /// `other` empty. *O*(1), no allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut a = List::from(['c']);
    /// let mut b = List::from(['a', 'b']);
    ///
    /// a.prepend(&mut b);
    ///
    /// assert_eq!(a, List::from(['a', 'b', 'c']));
    /// assert!(b.is_empty());
    /// ```
    pub fn prepend(&mut self, other: &mut Self) {
        if let Some(run) = other.detach_all_nodes() {
            // SAFETY: the ghost node is followed by the front node.
            unsafe { self.attach_nodes(self.ghost_node(), self.front_node(), run) }
        }
    }
}

impl<T: Debug> Debug for List<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Node<T> {
    pub(crate) fn into_element(self: Box<Self>) -> T {
        self.element
    }
}

impl<T> DetachedNodes<T> {
    /// `front..=back` must be an unlinked run of value nodes that nothing
    /// else owns, `len` nodes long with the `length` feature.
    unsafe fn new(
        front: NonNull<Link>,
        back: NonNull<Link>,
        #[cfg(feature = "length")] len: usize,
    ) -> Self {
        #[cfg(feature = "length")]
        debug_assert!(len > 0, "a detached run is never empty");
        Self {
            front,
            back,
            #[cfg(feature = "length")]
            len,
            _marker: PhantomData,
        }
    }

    /// Give up ownership of the run, returning `(front, back)`.
    fn into_raw(self) -> (NonNull<Link>, NonNull<Link>) {
        let run = ManuallyDrop::new(self);
        (run.front, run.back)
    }
}

impl<T> Drop for DetachedNodes<T> {
    fn drop(&mut self) {
        // SAFETY: the run owns `front..=back`, and is dropped once.
        let released = unsafe { release_nodes::<T>(self.front, self.back) };
        log::trace!("released {} detached nodes", released);
    }
}

/// Free the value nodes `front..=back`, front to back, and return how many
/// were freed.
///
/// A panicking element destructor does not stop the walk: the remaining
/// nodes are freed while unwinding.
///
/// `front..=back` must be an unlinked run of value nodes that nothing else
/// owns.
unsafe fn release_nodes<T>(front: NonNull<Link>, back: NonNull<Link>) -> usize {
    struct Guard<T> {
        next: Option<NonNull<Link>>,
        back: NonNull<Link>,
        released: usize,
        _marker: PhantomData<Box<Node<T>>>,
    }

    impl<T> Guard<T> {
        fn release_next(&mut self) -> Option<Box<Node<T>>> {
            let node = self.next?;
            // Read the successor while `node` is still alive.
            self.next = if node == self.back {
                None
            } else {
                Some(unsafe { next_of(node) })
            };
            self.released += 1;
            Some(unsafe { Box::from_raw(node.cast::<Node<T>>().as_ptr()) })
        }
    }

    impl<T> Drop for Guard<T> {
        // Nodes are only left here when unwinding.
        fn drop(&mut self) {
            while let Some(node) = self.release_next() {
                drop(node);
            }
        }
    }

    let mut guard = Guard::<T> {
        next: Some(front),
        back,
        released: 0,
        _marker: PhantomData,
    };
    while let Some(node) = guard.release_next() {
        drop(node);
    }
    guard.released
}

#[cfg(debug_assertions)]
pub(crate) fn assert_adjacent(prev: NonNull<Link>, next: NonNull<Link>) {
    unsafe {
        assert_eq!(next_of(prev), next, "nodes are not adjacent");
        assert_eq!(prev_of(next), prev, "nodes are not adjacent");
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        struct FreeGhost(NonNull<Link>);

        impl Drop for FreeGhost {
            fn drop(&mut self) {
                // SAFETY: the ghost node is allocated by the list, and freed
                // only here.
                unsafe { drop(Box::from_raw(self.0.as_ptr())) }
            }
        }

        // Armed before the elements are dropped, so a panicking destructor
        // still frees the ghost node.
        let _ghost = FreeGhost(self.ghost);
        self.clear();
    }
}

// SAFETY: the list owns its nodes exclusively, as a `Box<Node<T>>` would, so
// moving it to another thread moves the elements along.
unsafe impl<T: Send> Send for List<T> {}

// SAFETY: a shared list hands out only `&T`, and has no interior mutability.
unsafe impl<T: Sync> Sync for List<T> {}

// `List` and its read-only iterators are covariant in `T`.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: List<&'static str>) -> List<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str>) -> Iter<'i, &'a str> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}
