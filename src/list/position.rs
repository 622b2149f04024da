//! Positions: stable handles to the nodes of a [`List`].
//!
//! A [`Position`] names a node, not an index. It stays valid while its
//! node is linked into some list, no matter what happens to the other
//! nodes, so it survives insertion, erasure of *other* nodes, splicing of
//! its node into another list and [`List::swap`]. The `end` position of a
//! list names its ghost node, and is valid for as long as the list lives.
//!
//! A position does not borrow its list, so the compiler cannot prove that
//! it is still valid. Operations that dereference a position are therefore
//! `unsafe fn`s with the contract spelled out in a `# Safety` section.
//! Everything that only compares positions is safe.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::AllocError;
use crate::list::cursor::{Cursor, CursorMut};
use crate::list::{connect, element, element_mut, next_of, prev_of, Link, List, Node};

/// A handle to a node of a [`List`], either a value node or the ghost node.
///
/// Two positions are equal if and only if they name the same node.
pub struct Position<T> {
    pub(crate) node: NonNull<Link>,
    _marker: PhantomData<*const Node<T>>,
}

impl<T> Position<T> {
    pub(crate) fn new(node: NonNull<Link>) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    /// Returns the position after this one. The successor of the last value
    /// node is the ghost node, and the successor of the ghost node is the
    /// first value node.
    ///
    /// # Safety
    ///
    /// The node of `self` must be linked into a live list.
    pub unsafe fn next(self) -> Self {
        Self::new(next_of(self.node))
    }

    /// Returns the position before this one. See [`Position::next`].
    ///
    /// # Safety
    ///
    /// The node of `self` must be linked into a live list.
    pub unsafe fn prev(self) -> Self {
        Self::new(prev_of(self.node))
    }

    /// Steps forward `steps` times, cyclically.
    ///
    /// # Safety
    ///
    /// The node of `self` must be linked into a live list.
    pub unsafe fn advance(self, steps: usize) -> Self {
        let mut pos = self;
        for _ in 0..steps {
            pos = pos.next();
        }
        pos
    }
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<T> {}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Position<T> {}

impl<T> Hash for Position<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<T> fmt::Debug for Position<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Position").field(&self.node).finish()
    }
}

/// An iterator over the positions of the value nodes of a `List`.
///
/// This `struct` is created by [`List::positions`].
pub struct Positions<'a, T: 'a> {
    start: NonNull<Link>,
    end: NonNull<Link>,
    _marker: PhantomData<&'a List<T>>,
}

impl<'a, T: 'a> Iterator for Positions<'a, T> {
    type Item = Position<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        let pos = Position::new(self.start);
        // SAFETY: `start` is a value node of the borrowed list.
        self.start = unsafe { next_of(self.start) };
        Some(pos)
    }
}

impl<'a, T: 'a> DoubleEndedIterator for Positions<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `end.prev` is a value node of the borrowed list.
        self.end = unsafe { prev_of(self.end) };
        Some(Position::new(self.end))
    }
}

impl<'a, T: 'a> std::iter::FusedIterator for Positions<'a, T> {}

impl<'a, T: 'a> fmt::Debug for Positions<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Positions")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

// Methods that only compare positions.
impl<T> List<T> {
    /// Returns the position of the first element, or [`List::end`] if the
    /// list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::<i32>::new();
    /// assert_eq!(list.begin(), list.end());
    /// ```
    #[inline]
    pub fn begin(&self) -> Position<T> {
        Position::new(self.front_node())
    }

    /// Returns the position of the ghost node, one past the last element.
    ///
    /// It never changes during the lifetime of the list, even across
    /// [`List::swap`].
    #[inline]
    pub fn end(&self) -> Position<T> {
        Position::new(self.ghost_node())
    }

    /// Provides an iterator over the positions of the elements, front to back.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([1, 2, 3]);
    /// let positions: Vec<_> = list.positions().collect();
    /// assert_eq!(positions.len(), 3);
    /// assert_eq!(positions[0], list.begin());
    /// ```
    pub fn positions(&self) -> Positions<'_, T> {
        Positions {
            start: self.front_node(),
            end: self.ghost_node(),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if `pos` names a node of this list, including the
    /// ghost node.
    ///
    /// This walks the list, so it takes *O*(*n*) time.
    pub fn owns(&self, pos: Position<T>) -> bool {
        pos == self.end() || self.positions().any(|p| p == pos)
    }

    /// Returns `true` if `first..last` is a valid range of this list: both
    /// positions belong to the list, and `last` is reachable from `first`
    /// without crossing the ghost node.
    ///
    /// This walks the list, so it takes *O*(*n*) time.
    pub fn owns_range(&self, first: Position<T>, last: Position<T>) -> bool {
        if last == self.end() && first == last {
            return true;
        }
        let mut inside = false;
        for pos in self.positions().chain(Some(self.end())) {
            if pos == first {
                inside = true;
            }
            if inside && pos == last {
                return true;
            }
        }
        false
    }
}

// Methods that dereference positions.
impl<T> List<T> {
    /// Provides a reference to the element at `pos`, or `None` if `pos` is
    /// the end position.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([1, 2, 3]);
    /// unsafe {
    ///     assert_eq!(list.get(list.begin().next()), Some(&2));
    ///     assert_eq!(list.get(list.end()), None);
    /// }
    /// ```
    pub unsafe fn get(&self, pos: Position<T>) -> Option<&T> {
        debug_assert!(self.owns(pos));
        if pos == self.end() {
            return None;
        }
        Some(element(pos.node))
    }

    /// Provides a mutable reference to the element at `pos`, or `None` if
    /// `pos` is the end position.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    pub unsafe fn get_mut(&mut self, pos: Position<T>) -> Option<&mut T> {
        debug_assert!(self.owns(pos));
        if pos == self.end() {
            return None;
        }
        Some(element_mut(pos.node))
    }

    /// Inserts `elt` before `pos` and returns the position of the new element.
    ///
    /// No existing position is invalidated.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 3]);
    /// let three = unsafe { list.begin().next() };
    /// let two = unsafe { list.insert_before(three, 2) };
    /// assert_eq!(list, List::from([1, 2, 3]));
    /// assert_eq!(unsafe { list.get(two) }, Some(&2));
    /// assert_eq!(unsafe { two.next() }, three);
    /// ```
    pub unsafe fn insert_before(&mut self, pos: Position<T>, elt: T) -> Position<T> {
        debug_assert!(self.owns(pos));
        let node = Node::new_detached(elt);
        self.attach_node(prev_of(pos.node), pos.node, node);
        Position::new(node)
    }

    /// Like [`List::insert_before`], but returns an error instead of aborting
    /// when the node cannot be allocated. The list is unchanged on error.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    pub unsafe fn try_insert_before(
        &mut self,
        pos: Position<T>,
        elt: T,
    ) -> Result<Position<T>, AllocError> {
        debug_assert!(self.owns(pos));
        let node = Node::try_new_detached(elt)?;
        self.attach_node(prev_of(pos.node), pos.node, node);
        Ok(Position::new(node))
    }

    /// Removes the element at `pos`, drops it, and returns the position that
    /// followed it.
    ///
    /// Only `pos` is invalidated.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let next = unsafe { list.erase(list.begin()) };
    /// assert_eq!(next, list.begin());
    /// assert_eq!(list, List::from([2, 3]));
    /// ```
    pub unsafe fn erase(&mut self, pos: Position<T>) -> Position<T> {
        self.take(pos).1
    }

    /// Removes the element at `pos`, and returns it with the position that
    /// followed it.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position.
    pub unsafe fn take(&mut self, pos: Position<T>) -> (T, Position<T>) {
        assert!(pos != self.end(), "Cannot erase the ghost node");
        debug_assert!(self.owns(pos));
        let next = next_of(pos.node);
        let node = if pos.node == self.front_node() {
            // The front node is only linked to the ghost node on its left.
            connect(self.ghost_node(), next);
            #[cfg(feature = "length")]
            {
                self.len -= 1;
            }
            Box::from_raw(pos.node.cast::<Node<T>>().as_ptr())
        } else {
            self.detach_node(pos.node)
        };
        (node.into_element(), Position::new(next))
    }

    /// Removes the elements of `first..last`, dropping them front to back,
    /// and returns `last`.
    ///
    /// An empty range is a no-op. Positions outside the range stay valid.
    ///
    /// # Safety
    ///
    /// `first..last` must be a valid range of this list (see
    /// [`List::owns_range`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3, 4, 5]);
    /// unsafe {
    ///     let first = list.begin().next();
    ///     let last = first.advance(3);
    ///     assert_eq!(list.erase_range(first, last), last);
    ///     assert_eq!(list.get(last), Some(&5));
    /// }
    /// assert_eq!(list, List::from([1, 5]));
    /// ```
    pub unsafe fn erase_range(&mut self, first: Position<T>, last: Position<T>) -> Position<T> {
        debug_assert!(self.owns_range(first, last));
        if first == last {
            return last;
        }
        #[cfg(feature = "length")]
        let len = crate::list::count_run(first.node, last.node);
        drop(self.detach_nodes(
            first.node,
            prev_of(last.node),
            #[cfg(feature = "length")]
            len,
        ));
        last
    }

    /// Moves the nodes of `first..last` out of `source` and links them before
    /// `pos` in this list, in constant time (plus a walk of the range with
    /// the `length` feature, to keep both lengths).
    ///
    /// No element is copied, moved in memory, or dropped, and no node is
    /// allocated. Every position stays valid; the positions of the moved
    /// elements now belong to this list.
    ///
    /// # Safety
    ///
    /// - `pos` must belong to this list;
    /// - `first..last` must be a valid range of `source`.
    ///
    /// Use [`List::move_range`] to move a range within a single list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut a = List::from([1, 2, 3, 4, 5]);
    /// let mut b = List::from([10, 20]);
    /// unsafe {
    ///     let first = a.begin().next();
    ///     let last = first.advance(2);
    ///     let pos = b.begin().next();
    ///     b.splice(pos, &mut a, first, last);
    /// }
    /// assert_eq!(a, List::from([1, 4, 5]));
    /// assert_eq!(b, List::from([10, 2, 3, 20]));
    /// ```
    pub unsafe fn splice(
        &mut self,
        pos: Position<T>,
        source: &mut List<T>,
        first: Position<T>,
        last: Position<T>,
    ) {
        debug_assert!(self.owns(pos));
        debug_assert!(source.owns_range(first, last));
        if first == last {
            return;
        }
        #[cfg(feature = "length")]
        let len = crate::list::count_run(first.node, last.node);
        let detached = source.detach_nodes(
            first.node,
            prev_of(last.node),
            #[cfg(feature = "length")]
            len,
        );
        self.attach_nodes(prev_of(pos.node), pos.node, detached);
    }

    /// Moves the nodes of `first..last` before `pos`, within this list.
    ///
    /// Moving a range before its own first node, or before `last`, leaves the
    /// list as it is. Every position stays valid.
    ///
    /// # Safety
    ///
    /// - `first..last` must be a valid range of this list;
    /// - `pos` must belong to this list and must not be inside `first..last`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3, 4, 5]);
    /// unsafe {
    ///     let first = list.begin().advance(3);
    ///     list.move_range(list.begin(), first, list.end());
    /// }
    /// assert_eq!(list, List::from([4, 5, 1, 2, 3]));
    /// ```
    pub unsafe fn move_range(&mut self, pos: Position<T>, first: Position<T>, last: Position<T>) {
        debug_assert!(self.owns_range(first, last));
        debug_assert!(self.owns(pos));
        if first == last || pos == first || pos == last {
            return;
        }
        let (pos, first, last) = (pos.node, first.node, last.node);
        let back = prev_of(last);
        connect(prev_of(first), last);
        connect(prev_of(pos), first);
        connect(back, pos);
    }

    /// Provides a cursor at `pos`.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    pub unsafe fn cursor_at(&self, pos: Position<T>) -> Cursor<'_, T> {
        debug_assert!(self.owns(pos));
        Cursor::new(self, pos.node)
    }

    /// Provides a cursor with editing operations at `pos`.
    ///
    /// # Safety
    ///
    /// `pos` must belong to this list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 4]);
    /// let four = unsafe { list.begin().advance(2) };
    /// let mut cursor = unsafe { list.cursor_at_mut(four) };
    /// cursor.insert(3);
    /// assert_eq!(list, List::from([1, 2, 3, 4]));
    /// ```
    pub unsafe fn cursor_at_mut(&mut self, pos: Position<T>) -> CursorMut<'_, T> {
        debug_assert!(self.owns(pos));
        CursorMut::new(self, pos.node)
    }
}

#[cfg(test)]
mod tests {
    use crate::{List, Position};
    use std::cell::RefCell;
    use std::iter::FromIterator;

    fn collect<T: Clone>(list: &List<T>) -> Vec<T> {
        list.assert_well_formed();
        list.iter().cloned().collect()
    }

    #[test]
    fn positions_survive_unrelated_edits() {
        let mut list = List::from_iter(1..=5);
        let positions = Vec::from_iter(list.positions());
        unsafe {
            list.insert_before(positions[0], 0);
            list.erase(positions[2]);
            list.push_back(6);
            assert_eq!(list.get(positions[0]), Some(&1));
            assert_eq!(list.get(positions[1]), Some(&2));
            assert_eq!(list.get(positions[3]), Some(&4));
            assert_eq!(list.get(positions[4]), Some(&5));
            assert_eq!(positions[1].next(), positions[3]);
            assert_eq!(positions[3].prev(), positions[1]);
        }
        assert_eq!(collect(&list), vec![0, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn end_position_is_never_an_element() {
        let mut list = List::from([1]);
        let end = list.end();
        unsafe {
            assert_eq!(list.get(end), None);
            assert_eq!(list.get_mut(end), None);
            assert_eq!(end.next(), list.begin());
            assert_eq!(list.begin().next(), end);
            assert_eq!(end.advance(3), list.begin());
        }
        list.clear();
        assert_eq!(list.begin(), end);
    }

    #[test]
    fn owns_detects_foreign_positions() {
        let list = List::from([1, 2, 3]);
        let other = List::from([1, 2, 3]);
        assert!(list.owns(list.begin()));
        assert!(list.owns(list.end()));
        assert!(!list.owns(other.begin()));
        assert!(!list.owns(other.end()));
        let (first, last) = unsafe { (list.begin().next(), list.begin().advance(3)) };
        assert!(list.owns_range(first, last));
        assert!(list.owns_range(first, first));
        assert!(list.owns_range(list.end(), list.end()));
        assert!(!list.owns_range(last, first));
        assert!(!list.owns_range(other.begin(), other.end()));
    }

    #[test]
    fn erase_fast_path_and_general_path() {
        let mut list = List::from_iter(0..4);
        unsafe {
            let next = list.erase(list.begin());
            assert_eq!(next, list.begin());
            let back = list.end().prev();
            let next = list.erase(back);
            assert_eq!(next, list.end());
            let (elt, next) = list.take(list.begin().next());
            assert_eq!(elt, 2);
            assert_eq!(next, list.end());
        }
        assert_eq!(collect(&list), vec![1]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    #[should_panic(expected = "Cannot erase the ghost node")]
    fn erase_end_panics() {
        let mut list = List::from([1, 2, 3]);
        unsafe { list.erase(list.end()) };
    }

    #[test]
    fn erase_range_drops_front_to_back() {
        struct Noisy<'a>(i32, &'a RefCell<Vec<i32>>);
        impl Drop for Noisy<'_> {
            fn drop(&mut self) {
                self.1.borrow_mut().push(self.0);
            }
        }
        let dropped = RefCell::new(Vec::new());
        let mut list = List::new();
        for i in 1..=5 {
            list.push_back(Noisy(i, &dropped));
        }
        unsafe {
            let first = list.begin().next();
            let last = first.advance(3);
            assert_eq!(list.erase_range(first, last), last);
            assert_eq!(list.get(last).map(|n| n.0), Some(5));
            assert_eq!(list.erase_range(last, last), last);
        }
        assert_eq!(dropped.borrow().as_slice(), &[2, 3, 4]);
        assert_eq!(list.len(), 2);
        list.assert_well_formed();
    }

    #[test]
    fn erase_whole_range_empties_the_list() {
        let mut list = List::from_iter(0..5);
        let end = unsafe { list.erase_range(list.begin(), list.end()) };
        assert_eq!(end, list.end());
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        list.assert_well_formed();
    }

    #[test]
    fn splice_between_lists_keeps_positions() {
        let mut a = List::from([1, 2, 3, 4, 5]);
        let mut b = List::from([10, 20]);
        let moved: Vec<Position<i32>>;
        unsafe {
            let first = a.begin().next();
            let last = first.advance(2);
            moved = vec![first, first.next()];
            let pos = b.begin().next();
            b.splice(pos, &mut a, first, last);
            assert!(b.owns(moved[0]) && b.owns(moved[1]));
            assert!(!a.owns(moved[0]));
            assert_eq!(b.get(moved[0]), Some(&2));
        }
        assert_eq!(collect(&a), vec![1, 4, 5]);
        assert_eq!(collect(&b), vec![10, 2, 3, 20]);
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn splice_empty_range_is_a_no_op() {
        let mut a = List::from([1, 2, 3]);
        let mut b = List::from([4]);
        let a_nodes = Vec::from_iter(a.positions());
        let b_nodes = Vec::from_iter(b.positions());
        let (a_end, b_end) = (a.end(), b.end());
        unsafe {
            let first = a.begin().next();
            b.splice(b_end, &mut a, first, first);
            b.splice(b.begin(), &mut a, a_end, a_end);
            let front = a.begin();
            b.splice(b_end, &mut a, front, front);
        }
        assert_eq!(collect(&a), vec![1, 2, 3]);
        assert_eq!(collect(&b), vec![4]);
        assert_eq!(Vec::from_iter(a.positions()), a_nodes);
        assert_eq!(Vec::from_iter(b.positions()), b_nodes);
        assert_eq!((a.end(), b.end()), (a_end, b_end));
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn splice_everything_into_an_empty_list() {
        let mut a = List::from_iter(0..3);
        let mut b = List::new();
        unsafe {
            let (pos, first, last) = (b.end(), a.begin(), a.end());
            b.splice(pos, &mut a, first, last);
        }
        assert!(a.is_empty());
        assert_eq!(collect(&b), vec![0, 1, 2]);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn move_range_within_a_list() {
        let mut list = List::from_iter(0..6);
        unsafe {
            let first = list.begin().advance(4);
            // [4, 5] to the front
            list.move_range(list.begin(), first, list.end());
            assert_eq!(collect(&list), vec![4, 5, 0, 1, 2, 3]);
            // [4] to the back
            let first = list.begin();
            list.move_range(list.end(), first, first.next());
            assert_eq!(collect(&list), vec![5, 0, 1, 2, 3, 4]);
            // No-ops: empty range, before itself, and before its end.
            let first = list.begin().next();
            let last = first.advance(2);
            list.move_range(list.end(), first, first);
            list.move_range(first, first, last);
            list.move_range(last, first, last);
        }
        assert_eq!(collect(&list), vec![5, 0, 1, 2, 3, 4]);
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn cursor_at_positions() {
        let mut list = List::from([1, 2, 3]);
        let two = unsafe { list.begin().next() };
        assert_eq!(unsafe { list.cursor_at(two) }.current(), Some(&2));
        let mut cursor = unsafe { list.cursor_at_mut(two) };
        assert_eq!(cursor.remove(), Some(2));
        assert_eq!(cursor.current(), Some(&3));
        assert_eq!(collect(&list), vec![1, 3]);
    }

    #[test]
    fn positions_iterate_both_ways() {
        let list = List::from_iter(0..4);
        let forward = Vec::from_iter(list.positions());
        let mut backward = Vec::from_iter(list.positions().rev());
        backward.reverse();
        assert_eq!(forward, backward);
        let elements: Vec<_> = forward
            .iter()
            .map(|&pos| unsafe { *list.get(pos).unwrap() })
            .collect();
        assert_eq!(elements, vec![0, 1, 2, 3]);
    }
}
