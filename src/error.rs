use std::fmt;

/// The error returned by the fallible (`try_*`) operations of a
/// [`List`](crate::List) when the global allocator cannot provide memory
/// for a new node.
///
/// When it is returned, the list is left exactly as it was before the
/// operation began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl std::error::Error for AllocError {}
