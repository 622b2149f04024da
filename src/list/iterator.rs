use crate::list::{element, element_mut, next_of, prev_of, Link, List};
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// An iterator over the elements of a `List`.
///
/// The iterator keeps a half-open range `start..end` of nodes, so it can
/// be consumed from both sides.
///
/// The iterator borrows the list immutably for its whole lifetime:
///
/// ```compile_fail
/// use sentinel_list::List;
///
/// let mut list = List::from([1, 2, 3]);
/// let mut iter = list.iter();
/// list.push_back(4);
/// println!("{:?}", iter.next());
/// ```
pub struct Iter<'a, T: 'a> {
    start: NonNull<Link>,
    end: NonNull<Link>,
    #[cfg(feature = "length")]
    len: usize,
    _marker: PhantomData<&'a List<T>>,
}

impl<'a, T: 'a> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            end: self.end,
            #[cfg(feature = "length")]
            len: self.len,
            _marker: PhantomData,
        }
    }
}

/// A mutable iterator over the elements of a `List`.
///
/// The list cannot be read while the iterator is alive:
///
/// ```compile_fail
/// use sentinel_list::List;
///
/// let mut list = List::from([1, 2, 3]);
/// let mut iter = list.iter_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", iter.next());
/// ```
pub struct IterMut<'a, T: 'a> {
    start: NonNull<Link>,
    end: NonNull<Link>,
    #[cfg(feature = "length")]
    len: usize,
    _marker: PhantomData<&'a mut List<T>>,
}

macro_rules! impl_iter {
    ($ITER:ident, $element:ident $(, $mut:tt)?) => {
        impl<'a, T: 'a> $ITER<'a, T> {
            pub(crate) fn new(list: &'a $($mut)? List<T>) -> Self {
                Self {
                    start: list.front_node(),
                    end: list.ghost_node(),
                    #[cfg(feature = "length")]
                    len: list.len,
                    _marker: PhantomData,
                }
            }
        }

        impl<'a, T: 'a> Iterator for $ITER<'a, T> {
            type Item = &'a $($mut)? T;

            fn next(&mut self) -> Option<Self::Item> {
                if self.start == self.end {
                    return None;
                }
                let current = self.start;
                // SAFETY: `start..end` is a non-empty range of the borrowed
                // list, so `start` is a value node, and every node is
                // yielded at most once.
                unsafe {
                    self.start = next_of(current);
                    #[cfg(feature = "length")]
                    {
                        self.len -= 1;
                    }
                    Some($element(current))
                }
            }

            #[cfg(feature = "length")]
            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.len, Some(self.len))
            }

            fn last(mut self) -> Option<Self::Item> {
                self.next_back()
            }
        }

        impl<'a, T: 'a> DoubleEndedIterator for $ITER<'a, T> {
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.start == self.end {
                    return None;
                }
                // SAFETY: see `next`.
                unsafe {
                    self.end = prev_of(self.end);
                    #[cfg(feature = "length")]
                    {
                        self.len -= 1;
                    }
                    Some($element(self.end))
                }
            }
        }

        #[cfg(feature = "length")]
        impl<'a, T: 'a> ExactSizeIterator for $ITER<'a, T> {}

        impl<'a, T: 'a> FusedIterator for $ITER<'a, T> {}

        impl<'a, T: fmt::Debug + 'a> fmt::Debug for $ITER<'a, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_tuple(stringify!($ITER));
                let mut node = self.start;
                while node != self.end {
                    // SAFETY: `start..end` is a valid range of the borrowed list.
                    unsafe {
                        f.field(element::<T>(node));
                        node = next_of(node);
                    }
                }
                f.finish()
            }
        }
    };
}

impl_iter!(Iter, element);
impl_iter!(IterMut, element_mut, mut);

/// Moves the elements out of a `List`, from either end.
///
/// Returned by `List::into_iter`. Elements not taken are dropped with the
/// iterator.
pub struct IntoIter<T> {
    list: List<T>,
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    #[cfg(feature = "length")]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

#[cfg(feature = "length")]
impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut List<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = List::new();
        list.extend(iter);
        list
    }
}

/// Pushes the items at the back, in order.
impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: 'a + Copy> Extend<&'a T> for List<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

// SAFETY: an `Iter` only yields `&T`, like `&List<T>`.
unsafe impl<T: Sync> Send for Iter<'_, T> {}

// SAFETY: as for `Send`.
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

// SAFETY: an `IterMut` stands for `&mut List<T>` and yields each `&mut T` once.
unsafe impl<T: Send> Send for IterMut<'_, T> {}

// SAFETY: `&IterMut` gives no access to the elements.
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::List;
    use std::iter::FromIterator;

    #[test]
    fn iter_from_both_ends() {
        let list = List::from_iter(0..6);
        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(format!("{:?}", iter), "Iter(1, 2, 3, 4)");
        assert_eq!(iter.clone().last(), Some(&4));
        assert_eq!(Vec::from_iter(iter.by_ref().rev()), vec![&4, &3, &2, &1]);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut list = List::from_iter(0..4);
        let positions = Vec::from_iter(list.positions());
        for (i, elt) in (&mut list).into_iter().enumerate() {
            *elt *= i as i32;
        }
        if let Some(elt) = list.iter_mut().next_back() {
            *elt = -1;
        }
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![0, 1, 4, -1]);
        assert_eq!(Vec::from_iter(list.positions()), positions);
    }

    #[test]
    fn into_iter_from_both_ends() {
        let list = List::from_iter(0..5);
        let mut iter = list.into_iter();
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(format!("{:?}", iter), "IntoIter([1, 2, 3])");
        assert_eq!(iter.last(), Some(3));
    }

    #[test]
    fn empty_list_iterators() {
        let mut list = List::<String>::new();
        assert_eq!(list.iter().next(), None);
        assert_eq!(list.iter_mut().next_back(), None);
        assert_eq!(list.into_iter().next(), None);
    }

    #[test]
    fn extend_appends_at_the_back() {
        let mut list = List::from([1, 2]);
        list.extend(vec![3, 4]);
        list.extend(&[5, 6]);
        list.assert_well_formed();
        assert_eq!(Vec::from_iter(list), vec![1, 2, 3, 4, 5, 6]);
    }

    #[cfg(feature = "length")]
    #[test]
    fn iter_exact_size() {
        let mut list = List::from_iter(0..4);
        let mut iter = list.iter();
        assert_eq!(iter.len(), 4);
        iter.next();
        iter.next_back();
        assert_eq!(iter.len(), 2);
        assert_eq!(list.iter_mut().len(), 4);
        assert_eq!(list.into_iter().len(), 4);
    }
}
