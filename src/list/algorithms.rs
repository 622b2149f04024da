use crate::error::AllocError;
use crate::list::List;

/// Element-wise equality, front to back.
impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other)
    }
}

impl<T: Eq> Eq for List<T> {}

/// Deep copies of a list.
///
/// If cloning an element panics, the clones made so far are dropped with the
/// partially built list, and the panic goes on. `clone_from` builds the copy
/// aside and swaps it in, so the destination is untouched in that case.
impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }

    fn clone_from(&mut self, source: &Self) {
        let mut fresh = source.clone();
        self.swap(&mut fresh);
    }
}

impl<T, const N: usize> From<[T; N]> for List<T> {
    /// Converts a `[T; N]` into a `List<T>`, keeping the order.
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([1, 2, 3]);
    /// assert_eq!(list.front(), Some(&1));
    /// assert_eq!(list.back(), Some(&3));
    /// ```
    fn from(arr: [T; N]) -> Self {
        IntoIterator::into_iter(arr).collect()
    }
}

impl<T> List<T> {
    /// Returns `true` if some element equals `x`. *O*(*n*).
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from(["red", "green"]);
    /// assert!(list.contains(&"green"));
    /// assert!(!list.contains(&"blue"));
    /// ```
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|elt| elt == x)
    }

    /// Like [`Clone::clone`], but returns an error instead of aborting when a
    /// node cannot be allocated.
    ///
    /// On error, every node allocated so far is released again.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from(["a", "b"]);
    /// let copy = list.try_clone().unwrap();
    /// assert_eq!(list, copy);
    /// ```
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut list = List::try_new()?;
        for (index, elt) in self.iter().enumerate() {
            if let Err(err) = list.try_push_back(elt.clone()) {
                log::debug!("cloning failed at element {}, rolling back", index);
                return Err(err);
            }
        }
        Ok(list)
    }

    /// Like [`Clone::clone_from`], but returns an error instead of aborting
    /// when a node cannot be allocated. `self` is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let end = list.end();
    /// list.try_clone_from(&List::from([4, 5])).unwrap();
    /// assert_eq!(list, List::from([4, 5]));
    /// assert_eq!(list.end(), end);
    /// ```
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let mut fresh = source.try_clone()?;
        self.swap(&mut fresh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::List;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::iter::FromIterator;
    use std::panic::{self, AssertUnwindSafe};

    /// An element whose `clone` panics once the shared budget of clones is
    /// spent, and that records every drop.
    struct Fragile<'a> {
        value: i32,
        budget: &'a Cell<usize>,
        dropped: &'a RefCell<Vec<i32>>,
    }

    impl Clone for Fragile<'_> {
        fn clone(&self) -> Self {
            if self.budget.get() == 0 {
                panic!("clone budget exhausted");
            }
            self.budget.set(self.budget.get() - 1);
            Self {
                value: self.value * 10,
                budget: self.budget,
                dropped: self.dropped,
            }
        }
    }

    impl Drop for Fragile<'_> {
        fn drop(&mut self) {
            self.dropped.borrow_mut().push(self.value);
        }
    }

    fn fragile_list<'a>(
        budget: &'a Cell<usize>,
        dropped: &'a RefCell<Vec<i32>>,
    ) -> List<Fragile<'a>> {
        (1..=5)
            .map(|value| Fragile {
                value,
                budget,
                dropped,
            })
            .collect()
    }

    fn values(list: &List<Fragile<'_>>) -> Vec<i32> {
        list.iter().map(|f| f.value).collect()
    }

    #[test]
    fn clone_is_deep() {
        let list = List::from([String::from("a"), String::from("b")]);
        let copy = list.clone();
        assert_eq!(list, copy);
        let originals = HashSet::<_>::from_iter(list.positions());
        assert!(copy.positions().all(|pos| !originals.contains(&pos)));
        assert_ne!(list.end(), copy.end());
        copy.assert_well_formed();
    }

    #[test]
    fn clone_panic_drops_partial_copy() {
        let budget = Cell::new(usize::MAX);
        let dropped = RefCell::new(Vec::new());
        let list = fragile_list(&budget, &dropped);

        budget.set(2);
        let result = panic::catch_unwind(AssertUnwindSafe(|| list.clone()));
        assert!(result.is_err());
        assert_eq!(dropped.borrow().as_slice(), &[10, 20]);
        assert_eq!(values(&list), vec![1, 2, 3, 4, 5]);
        list.assert_well_formed();
    }

    #[test]
    fn clone_from_panic_leaves_destination_unchanged() {
        let budget = Cell::new(usize::MAX);
        let dropped = RefCell::new(Vec::new());
        let source = fragile_list(&budget, &dropped);
        let mut dest = List::from([Fragile {
            value: 7,
            budget: &budget,
            dropped: &dropped,
        }]);
        let dest_positions = Vec::from_iter(dest.positions());

        budget.set(2);
        let result = panic::catch_unwind(AssertUnwindSafe(|| dest.clone_from(&source)));
        assert!(result.is_err());
        assert_eq!(dropped.borrow().as_slice(), &[10, 20]);
        assert_eq!(values(&dest), vec![7]);
        assert_eq!(Vec::from_iter(dest.positions()), dest_positions);

        budget.set(usize::MAX);
        dropped.borrow_mut().clear();
        let end = dest.end();
        dest.clone_from(&source);
        assert_eq!(values(&dest), vec![10, 20, 30, 40, 50]);
        assert_eq!(dest.end(), end);
        assert_eq!(dropped.borrow().as_slice(), &[7]);
    }

    #[test]
    fn try_clone_from_replaces_contents() {
        let mut list = List::from_iter(0..3);
        list.try_clone_from(&List::from_iter(5..9)).unwrap();
        assert_eq!(list, List::from_iter(5..9));
        assert_eq!(list.len(), 4);
        list.assert_well_formed();
        list.try_clone_from(&List::new()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn equality_ignores_node_identity() {
        let a = List::from([1, 2, 3]);
        let mut b = List::new();
        b.push_front(3);
        b.push_front(2);
        b.push_front(1);
        assert_eq!(a, b);
        assert_ne!(a.begin(), b.begin());
        assert_ne!(a, List::from([1, 2]));
        assert_ne!(a, List::from([1, 2, 4]));
        assert_eq!(List::<u8>::new(), List::default());
        assert!(a.contains(&3));
        assert!(!a.contains(&4));
        assert!(!List::new().contains(&0));
    }
}
