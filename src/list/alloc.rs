//! Node allocation.
//!
//! Nodes are allocated as boxes and leaked into the list; the list releases
//! each of them with `Box::from_raw` exactly once. The `try_*` functions
//! allocate through the global allocator directly, so that an allocation
//! failure is reported instead of aborting.

use std::alloc::{alloc, Layout};
use std::ptr::NonNull;

use crate::error::AllocError;
use crate::list::{connect, Link, Node};

/// Allocate `value` like `Box::new`, but return an error when the allocator
/// fails. The result can be released with `Box::from_raw`.
///
/// `N` must not be zero-sized (both `Link` and `Node<T>` hold two pointers).
fn try_leak<N>(value: N) -> Result<NonNull<N>, AllocError> {
    let layout = Layout::new::<N>();
    debug_assert_ne!(layout.size(), 0);
    // SAFETY: `layout` has a non-zero size.
    let ptr = NonNull::new(unsafe { alloc(layout) }.cast::<N>()).ok_or(AllocError)?;
    // SAFETY: `ptr` is freshly allocated with the layout of `N`.
    unsafe { ptr.as_ptr().write(value) };
    Ok(ptr)
}

impl Link {
    fn dangling() -> Self {
        Link {
            next: NonNull::dangling(),
            prev: NonNull::dangling(),
        }
    }

    /// Make an unlinked node point `next` and `prev` at itself.
    fn self_linked(link: NonNull<Link>) -> NonNull<Link> {
        // SAFETY: `link` is freshly allocated and not shared yet.
        unsafe { connect(link, link) };
        link
    }

    /// Allocate the ghost node of an empty list.
    pub(crate) fn new_ghost() -> NonNull<Link> {
        Self::self_linked(NonNull::from(Box::leak(Box::new(Self::dangling()))))
    }

    pub(crate) fn try_new_ghost() -> Result<NonNull<Link>, AllocError> {
        try_leak(Self::dangling()).map(Self::self_linked)
    }
}

impl<T> Node<T> {
    /// Create a detached node with given element.
    pub(crate) fn new_detached(element: T) -> NonNull<Link> {
        let node = Box::new(Node {
            link: Link::dangling(),
            element,
        });
        Link::self_linked(NonNull::from(Box::leak(node)).cast())
    }

    /// Like [`Node::new_detached`], but return an error when the node cannot be
    /// allocated. The element is dropped in that case.
    pub(crate) fn try_new_detached(element: T) -> Result<NonNull<Link>, AllocError> {
        let node = try_leak(Node {
            link: Link::dangling(),
            element,
        })?;
        Ok(Link::self_linked(node.cast()))
    }
}
