//! This crate provides a doubly-linked list with owned nodes, anchored by a
//! payload-less *ghost* (sentinel) node.
//!
//! The [`List`] allows inserting and removing elements at any known position,
//! and moving whole runs of elements between lists, in constant time. Elements
//! never move in memory: every element keeps its node from insertion to
//! removal, which is what makes [`Position`]s stable.
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut list = List::from([1, 2, 3, 4]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(0); // insert 0 at the beginning of the list
//! assert_eq!(cursor.current(), Some(&1));
//! assert_eq!(cursor.view(), &List::from([0, 1, 2, 3, 4]));
//!
//! assert!(cursor.seek_forward(2).is_ok()); // move the cursor to 3, and remove it.
//! assert_eq!(cursor.remove(), Some(3));
//! assert_eq!(cursor.view(), &List::from([0, 1, 2, 4]));
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the list is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                        Ghost node   │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        └───────────┘
//! │  ║ element T ║           ║ element T ║                            ↑   ↑
//! │  ╚═══════════╝           ╚═══════════╝                            │   │
//! │      Node 0                  Node 1                               │   │
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ghost   ║ ──────────────────────────────────────────────────────────┘
//! ╟───────────╢
//! ║   (len)   ║
//! ╚═══════════╝
//!     List
//! ```
//! The ghost node is a bare pair of links with no element. It is allocated
//! with the list, stays with it until the list is dropped, and is never handed
//! over to another list (not even by [`List::swap`]). In an empty list, its
//! `next` and `prev` point to itself; otherwise `ghost.next` is the first
//! element and `ghost.prev` the last one.
//!
//! The `len` field only exists with the `length` feature:
//! ```text
//! [dependencies]
//! sentinel_list = { features = ["length"] }
//! ```
//! Without it, [`List::len`] walks the list, and splicing a range between two
//! lists is *O*(1). With it, `len` is *O*(1), and splicing a range counts the
//! moved nodes.
//!
//! # Iteration
//!
//! [`Iter`], [`IterMut`] and [`IntoIter`] are double-ended, fused iterators.
//!
//! ```
//! use sentinel_list::List;
//! use std::iter::FromIterator;
//!
//! let mut list = List::from([1, 2, 3]);
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(&1));
//! assert_eq!(iter.next_back(), Some(&3));
//! assert_eq!(iter.next(), Some(&2));
//! assert_eq!(iter.next(), None);
//!
//! list.iter_mut().for_each(|item| *item *= 2);
//! assert_eq!(Vec::from_iter(list), vec![2, 4, 6]);
//! ```
//!
//! # Cursors
//!
//! The cursors [`Cursor`] and [`CursorMut`] borrow the list and can move
//! forward or backward over it. In a list with length *n*, there are *n* + 1
//! valid locations for a cursor, the last one being the ghost node.
//! [`CursorMut`] edits the list around the cursor:
//! - [`insert`]: insert a new item before the cursor;
//! - [`remove`]: remove the item at the cursor;
//! - [`backspace`]: remove the item before the cursor;
//! - [`split`]: split the list into a new one, from the cursor to the end;
//! - [`splice`]: splice another list before the cursor.
//!
//! ```
//! use sentinel_list::List;
//! use std::iter::FromIterator;
//!
//! let mut list = List::from([1, 2, 3, 4]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(5); // becomes [5, 1, 2, 3, 4], points to 1
//! assert!(cursor.seek_forward(2).is_ok());
//! assert_eq!(cursor.remove(), Some(3)); // becomes [5, 1, 2, 4], points to 4
//! assert_eq!(cursor.backspace(), Some(2)); // becomes [5, 1, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(Vec::from_iter(list), vec![5, 1, 4]);
//! ```
//!
//! # Positions
//!
//! A [`Position`] is a handle to a node that does not borrow the list. It
//! stays valid until its own node is erased: inserting, erasing other
//! elements, splicing and swapping never invalidate it. A position moved to
//! another list by [`List::splice`] or [`List::swap`] then belongs to that
//! list.
//!
//! Since the compiler cannot track that, the operations reading through a
//! position are `unsafe fn`s, each with a `# Safety` section stating which
//! list the position must belong to. Debug builds check these contracts.
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut a = List::from([1, 2, 3, 4, 5]);
//! let mut b = List::from([10, 20]);
//! let two = unsafe { a.begin().next() };
//! unsafe {
//!     // Move [2, 3] before 20.
//!     let pos = b.begin().next();
//!     b.splice(pos, &mut a, two, two.advance(2));
//!     // `two` still names the same element, now in `b`.
//!     assert_eq!(b.get(two), Some(&2));
//!     b.erase(two);
//! }
//! assert_eq!(a, List::from([1, 4, 5]));
//! assert_eq!(b, List::from([10, 3, 20]));
//! ```
//!
//! # Allocation Failure
//!
//! The `try_*` operations ([`List::try_new`], [`List::try_push_back`],
//! [`List::try_insert_before`], [`List::try_clone`], ...) return an
//! [`AllocError`] instead of aborting when memory runs out, and leave the list
//! as it was.
//!
//! [`insert`]: CursorMut::insert
//! [`remove`]: CursorMut::remove
//! [`backspace`]: CursorMut::backspace
//! [`split`]: CursorMut::split
//! [`splice`]: CursorMut::splice

#[doc(inline)]
pub use error::AllocError;
#[doc(inline)]
pub use list::cursor::{Cursor, CursorMut};
#[doc(inline)]
pub use list::iterator::{IntoIter, Iter, IterMut};
#[doc(inline)]
pub use list::position::{Position, Positions};
#[doc(inline)]
pub use list::List;

mod error;
pub mod list;
