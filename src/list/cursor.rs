use crate::error::AllocError;
use crate::list::position::Position;
use crate::list::{element, element_mut, next_of, prev_of, Link, List, Node};
use std::fmt;
use std::ptr::NonNull;

/// A read-only cursor into a `List`.
///
/// The cursor rests on one of the *n* + 1 nodes of a list of length *n*:
/// an element, or the ghost node (written `#` below) that sits between the
/// back and the front. Unlike an iterator it moves both ways, and it may
/// wrap around through the ghost node.
///
/// Since it only holds a shared borrow, the references it hands out live as
/// long as the list borrow `'a`.
///
/// # Examples
///
/// ```
/// use sentinel_list::List;
///
/// let list = List::from(['x', 'y', 'z']);
///
/// // [|x y z #]
/// let mut cursor = list.cursor_start();
/// assert_eq!(cursor.current(), Some(&'x'));
/// assert_eq!(cursor.previous(), None);
///
/// // [ x y z|#]
/// assert_eq!(cursor.seek_forward(3), Ok(()));
/// assert_eq!(cursor.current(), None);
/// assert_eq!(cursor.previous(), Some(&'z'));
///
/// // The plain moves stop at the ghost node, the cyclic ones go through it.
/// assert!(cursor.move_next().is_err());
/// cursor.move_next_cyclic();
/// assert_eq!(cursor.current(), Some(&'x'));
/// ```
pub struct Cursor<'a, T: 'a> {
    pub(crate) current: NonNull<Link>,
    pub(crate) list: &'a List<T>,
}

impl<'a, T: 'a> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            list: self.list,
        }
    }
}

/// Two cursors are equal when they rest on the same node of the same list.
///
/// # Examples
/// ```
/// use sentinel_list::List;
///
/// let list = List::from([1, 2, 3]);
/// let copy = list.clone();
///
/// let mut cursor = list.cursor_start();
/// assert_eq!(cursor, list.cursor_start());
/// assert_ne!(cursor, copy.cursor_start());
///
/// cursor.move_prev_cyclic();
/// assert_eq!(cursor, list.cursor_end());
/// ```
impl<'a, T: 'a> PartialEq for Cursor<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list) && self.current == other.current
    }
}

impl<'a, T: 'a> Eq for Cursor<'a, T> {}

/// A cursor into a `List` that can also edit it.
///
/// It holds the only borrow of the list, so it can insert, remove, split
/// and splice around the node it rests on. The element references it hands
/// out borrow the cursor itself, not the list: they must be released before
/// the cursor moves or edits the list again. To look at the whole list
/// meanwhile, use [`CursorMut::view`].
///
/// # Examples
///
/// The list cannot be used while the cursor is alive:
///
/// ```compile_fail
/// use sentinel_list::List;
///
/// let mut list = List::from([1, 2, 3]);
/// let mut cursor = list.cursor_start_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", cursor.current());
/// ```
///
/// An element reference does not outlive the next edit:
///
/// ```compile_fail
/// use sentinel_list::List;
///
/// let mut list = List::from([String::from("hello")]);
/// let mut cursor = list.cursor_start_mut();
/// let current = cursor.current().unwrap();
/// cursor.remove();
/// println!("{}", current);
/// ```
///
/// and at most one mutable reference is handed out at a time:
///
/// ```compile_fail
/// use sentinel_list::List;
///
/// let mut list = List::from([7]);
/// let mut cursor = list.cursor_start_mut();
/// let a = cursor.current_mut().unwrap();
/// let b = cursor.current_mut().unwrap();
/// *a += *b;
/// ```
pub struct CursorMut<'a, T: 'a> {
    pub(crate) current: NonNull<Link>,
    pub(crate) list: &'a mut List<T>,
}

// Movement is shared by both cursors. Element access is not, since the
// lifetimes of the returned references differ.
macro_rules! impl_cursor {
    ($CURSOR:ident) => {
        impl<'a, T: 'a> $CURSOR<'a, T> {
            pub(crate) fn at_ghost(&self) -> bool {
                self.current == self.list.ghost_node()
            }
            pub(crate) fn at_front(&self) -> bool {
                self.before() == self.list.ghost_node()
            }
            pub(crate) fn after(&self) -> NonNull<Link> {
                // SAFETY: every node of the ring has a live successor.
                unsafe { next_of(self.current) }
            }
            pub(crate) fn before(&self) -> NonNull<Link> {
                // SAFETY: every node of the ring has a live predecessor.
                unsafe { prev_of(self.current) }
            }
        }

        impl<'a, T: 'a> $CURSOR<'a, T> {
            /// Returns `true` if the list under the cursor has no elements.
            pub fn is_empty(&self) -> bool {
                self.list.is_empty()
            }

            /// Returns the position of the node under the cursor. It outlives
            /// the cursor.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// assert_eq!(list.cursor_start().position(), list.begin());
            /// assert_eq!(list.cursor_end().position(), list.end());
            /// ```
            pub fn position(&self) -> Position<T> {
                Position::new(self.current)
            }

            /// Steps to the next node, from the back element onto the ghost
            /// node and from the ghost node onto the front element.
            pub fn move_next_cyclic(&mut self) {
                self.current = self.after();
            }

            /// Steps to the previous node, wrapping around like
            /// [`move_next_cyclic`](Self::move_next_cyclic).
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            /// cursor.move_prev_cyclic();
            /// assert_eq!(cursor.current(), None);
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn move_prev_cyclic(&mut self) {
                self.current = self.before();
            }

            /// Steps to the next node. Fails, without moving, when the
            /// cursor is already on the ghost node.
            pub fn move_next(&mut self) -> Result<(), &'static str> {
                if self.at_ghost() {
                    return Err("`move_next` across ghost boundary");
                }
                self.move_next_cyclic();
                Ok(())
            }

            /// Steps to the previous node. Fails, without moving, when the
            /// cursor is on the front node (or the ghost node of an empty
            /// list).
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            /// assert!(cursor.move_prev().is_err());
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            pub fn move_prev(&mut self) -> Result<(), &'static str> {
                if self.at_front() {
                    return Err("`move_prev` across ghost boundary");
                }
                self.move_prev_cyclic();
                Ok(())
            }

            /// Takes up to `steps` steps forward. If the ghost node is hit
            /// first, the cursor stays there and the number of steps taken
            /// is returned as the error.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            /// assert_eq!(cursor.seek_forward(5), Err(3));
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn seek_forward(&mut self, steps: usize) -> Result<(), usize> {
                for taken in 0..steps {
                    self.move_next().map_err(|_| taken)?;
                }
                Ok(())
            }

            /// Takes up to `steps` steps backward. If the front node is hit
            /// first, the cursor stays there and the number of steps taken
            /// is returned as the error.
            pub fn seek_backward(&mut self, steps: usize) -> Result<(), usize> {
                for taken in 0..steps {
                    self.move_prev().map_err(|_| taken)?;
                }
                Ok(())
            }

            /// Jumps to the front node.
            #[inline]
            pub fn move_to_start(&mut self) {
                self.current = self.list.front_node();
            }

            /// Jumps to the ghost node.
            #[inline]
            pub fn move_to_end(&mut self) {
                self.current = self.list.ghost_node();
            }
        }

        impl<'a, T: fmt::Debug + 'a> fmt::Debug for $CURSOR<'a, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($CURSOR))
                    .field("list", &self.list)
                    .field("current", &self.current())
                    .finish()
            }
        }
    };
}

impl_cursor!(Cursor);
impl_cursor!(CursorMut);

impl<'a, T: 'a> Cursor<'a, T> {
    pub(crate) fn new(list: &'a List<T>, current: NonNull<Link>) -> Self {
        Self { current, list }
    }

    /// The element under the cursor, or `None` on the ghost node.
    pub fn current(&self) -> Option<&'a T> {
        if self.at_ghost() {
            return None;
        }
        // SAFETY: a node other than the ghost holds an element, and the list
        // is borrowed for `'a`.
        Some(unsafe { element(self.current) })
    }

    /// The element before the cursor, or `None` on the front node.
    pub fn previous(&self) -> Option<&'a T> {
        if self.at_front() {
            return None;
        }
        // SAFETY: the node before anything but the front node is an element.
        Some(unsafe { element(self.before()) })
    }
}

impl<'a, T: 'a> CursorMut<'a, T> {
    pub(crate) fn new(list: &'a mut List<T>, current: NonNull<Link>) -> Self {
        Self { current, list }
    }

    /// The element under the cursor, or `None` on the ghost node.
    pub fn current(&self) -> Option<&T> {
        if self.at_ghost() {
            return None;
        }
        // SAFETY: a node other than the ghost holds an element. The reference
        // borrows `self`, so the cursor cannot edit the list while it lives.
        Some(unsafe { element(self.current) })
    }

    /// The element before the cursor, or `None` on the front node.
    pub fn previous(&self) -> Option<&T> {
        if self.at_front() {
            return None;
        }
        // SAFETY: as in `current`.
        Some(unsafe { element(self.before()) })
    }

    /// Mutable access to the element under the cursor, or `None` on the
    /// ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_end_mut();
    /// assert_eq!(cursor.current_mut(), None);
    /// cursor.move_prev_cyclic();
    /// if let Some(x) = cursor.current_mut() {
    ///     *x *= 10;
    /// }
    /// assert_eq!(list, List::from([1, 2, 30]));
    /// ```
    pub fn current_mut(&mut self) -> Option<&mut T> {
        if self.at_ghost() {
            return None;
        }
        // SAFETY: a node other than the ghost holds an element. The reference
        // borrows `self` mutably, so it is the only one.
        Some(unsafe { element_mut(self.current) })
    }

    /// Mutable access to the element before the cursor, or `None` on the
    /// front node.
    pub fn previous_mut(&mut self) -> Option<&mut T> {
        if self.at_front() {
            return None;
        }
        // SAFETY: as in `current_mut`.
        Some(unsafe { element_mut(self.before()) })
    }

    /// A read-only cursor at the same node, borrowing this one.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self.list, self.current)
    }

    /// Gives up editing, keeping the node and the borrow of the list.
    pub fn into_cursor(self) -> Cursor<'a, T> {
        Cursor::new(self.list, self.current)
    }

    /// The whole list, borrowed from the cursor.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.insert(0);
    /// assert_eq!(cursor.view(), &List::from([0, 1, 2, 3]));
    /// ```
    pub fn view(&self) -> &List<T> {
        self.list
    }

    /// Links `item` right before the cursor, which does not move.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2]);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.move_next().unwrap();
    /// cursor.insert(5);
    /// assert_eq!(cursor.current(), Some(&2));
    /// assert_eq!(cursor.previous(), Some(&5));
    /// assert_eq!(list, List::from([1, 5, 2]));
    /// ```
    pub fn insert(&mut self, item: T) {
        let node = Node::new_detached(item);
        // SAFETY: the node before the cursor and the cursor node are adjacent.
        unsafe { self.list.attach_node(self.before(), self.current, node) };
    }

    /// Like [`CursorMut::insert`], but reports a failed allocation instead of
    /// aborting. The list is unchanged on error.
    pub fn try_insert(&mut self, item: T) -> Result<(), AllocError> {
        let node = Node::try_new_detached(item)?;
        // SAFETY: as in `insert`.
        unsafe { self.list.attach_node(self.before(), self.current, node) };
        Ok(())
    }

    /// Unlinks the element under the cursor and returns it. The cursor moves
    /// to the following node. Returns `None` on the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.move_next().unwrap();
    /// assert_eq!(cursor.remove(), Some(2));
    /// assert_eq!(cursor.current(), Some(&3));
    /// cursor.move_to_end();
    /// assert_eq!(cursor.remove(), None);
    /// ```
    pub fn remove(&mut self) -> Option<T> {
        if self.at_ghost() {
            return None;
        }
        let following = self.after();
        // SAFETY: the cursor node is an element of the list.
        let node = unsafe { self.list.detach_node(self.current) };
        self.current = following;
        Some(node.into_element())
    }

    /// Unlinks the element before the cursor and returns it. Returns `None`
    /// on the front node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_end_mut();
    /// assert_eq!(cursor.backspace(), Some(3));
    /// assert_eq!(cursor.backspace(), Some(2));
    /// assert_eq!(cursor.view(), &List::from([1]));
    /// ```
    pub fn backspace(&mut self) -> Option<T> {
        if self.at_front() {
            return None;
        }
        // SAFETY: the node before anything but the front node is an element.
        let node = unsafe { self.list.detach_node(self.before()) };
        Some(node.into_element())
    }

    /// Moves the cursor node and everything after it into a new list, and
    /// leaves the cursor on the ghost node. Returns `None` on the ghost node.
    ///
    /// The moved elements keep their positions, which now belong to the
    /// returned list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let two = unsafe { list.begin().next() };
    /// let tail = unsafe { list.cursor_at_mut(two) }.split().unwrap();
    /// assert_eq!(tail.begin(), two);
    /// assert_eq!(tail, List::from([2, 3]));
    /// assert_eq!(list, List::from([1]));
    /// ```
    pub fn split(&mut self) -> Option<List<T>> {
        if self.at_ghost() {
            return None;
        }
        let ghost = self.list.ghost_node();
        let back = self.list.back_node();
        #[cfg(feature = "length")]
        // SAFETY: `current..ghost` is a range of the list.
        let len = unsafe { crate::list::count_run(self.current, ghost) };
        let front = std::mem::replace(&mut self.current, ghost);
        // SAFETY: `front..=back` runs from an element to the back element.
        let tail = unsafe {
            self.list.detach_nodes(
                front,
                back,
                #[cfg(feature = "length")]
                len,
            )
        };
        Some(List::from_detached(tail))
    }

    /// Moves every element of `other` before the cursor, which does not
    /// move. No node is allocated or freed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 4]);
    /// let mut cursor = list.cursor_end_mut();
    /// cursor.move_prev().unwrap();
    /// cursor.splice(List::from([2, 3]));
    /// assert_eq!(cursor.current(), Some(&4));
    /// assert_eq!(list, List::from([1, 2, 3, 4]));
    /// ```
    pub fn splice(&mut self, other: List<T>) {
        if let Some(run) = other.into_detached() {
            // SAFETY: the node before the cursor and the cursor node are adjacent.
            unsafe { self.list.attach_nodes(self.before(), self.current, run) };
        }
    }
}

// SAFETY: a `Cursor` only reads elements through a shared borrow, like `&List<T>`.
unsafe impl<T: Sync> Send for Cursor<'_, T> {}

// SAFETY: as for `Send`.
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

// SAFETY: a `CursorMut` is an exclusive borrow of the list, like `&mut List<T>`.
unsafe impl<T: Send> Send for CursorMut<'_, T> {}

// SAFETY: through `&CursorMut` only shared references to elements are reachable.
unsafe impl<T: Sync> Sync for CursorMut<'_, T> {}
