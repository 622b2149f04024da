//! Allocation behaviour, observed through a global allocator that counts the
//! allocations of the current thread and can be told to refuse them.

use sentinel_list::{AllocError, List};
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::iter::FromIterator;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

struct CountingAllocator;

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

thread_local! {
    // Allocations minus deallocations made by this thread.
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    // `Some(n)`: only `n` more allocations succeed on this thread.
    static BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let refused = BUDGET
            .try_with(|budget| match budget.get() {
                Some(0) => true,
                Some(n) => {
                    budget.set(Some(n - 1));
                    false
                }
                None => false,
            })
            .unwrap_or(false);
        if refused {
            return ptr::null_mut();
        }
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            let _ = LIVE.try_with(|live| live.set(live.get() + 1));
            let _ = ALLOCATIONS.try_with(|count| count.set(count.get() + 1));
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let _ = LIVE.try_with(|live| live.set(live.get() - 1));
        System.dealloc(ptr, layout)
    }
}

fn live() -> isize {
    LIVE.with(Cell::get)
}

fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

/// Run `f` with only `budget` allocations allowed on this thread.
fn with_budget<R>(budget: usize, f: impl FnOnce() -> R) -> R {
    BUDGET.with(|b| b.set(Some(budget)));
    let result = f();
    BUDGET.with(|b| b.set(None));
    result
}

#[test]
fn try_clone_failure_releases_partial_copy() {
    let list = List::from_iter(1..=5);
    let before = live();
    // The ghost node and two value nodes, then the third value node fails.
    let result = with_budget(3, || list.try_clone());
    assert_eq!(result.as_ref().err(), Some(&AllocError));
    drop(result);
    assert_eq!(live(), before);
    assert_eq!(Vec::from_iter(list.iter().copied()), vec![1, 2, 3, 4, 5]);
}

#[test]
fn try_clone_from_failure_leaves_destination_unchanged() {
    let source = List::from_iter(0..5);
    let mut dest = List::from([7, 8]);
    let before = live();
    let result = with_budget(2, || dest.try_clone_from(&source));
    assert_eq!(result, Err(AllocError));
    assert_eq!(live(), before);
    assert_eq!(dest, List::from([7, 8]));

    dest.try_clone_from(&source).unwrap();
    assert_eq!(dest, source);
}

#[test]
fn try_clone_succeeds_with_exact_budget() {
    let list = List::from_iter(0..4);
    let copy = with_budget(5, || list.try_clone());
    assert_eq!(copy, Ok(List::from_iter(0..4)));
}

#[test]
fn failed_insertions_leave_the_list_unchanged() {
    let mut list = List::from([1, 2, 3]);
    let positions = Vec::from_iter(list.positions());
    let before = live();
    with_budget(0, || {
        assert_eq!(list.try_push_back(4), Err(AllocError));
        assert_eq!(list.try_push_front(0), Err(AllocError));
        let pos = unsafe { list.begin().next() };
        assert_eq!(unsafe { list.try_insert_before(pos, 9) }, Err(AllocError));
        assert_eq!(list.cursor_end_mut().try_insert(4), Err(AllocError));
        assert!(List::<u8>::try_new().is_err());
    });
    assert_eq!(live(), before);
    assert_eq!(Vec::from_iter(list.positions()), positions);
    assert_eq!(list.len(), 3);

    let four = with_budget(1, || list.try_push_back(4));
    assert_eq!(four, Ok(()));
    assert_eq!(list, List::from([1, 2, 3, 4]));
}

#[test]
fn splice_allocates_nothing() {
    let mut a = List::from([1, 2, 3, 4, 5]);
    let mut b = List::from([10, 20]);
    let before = allocations();
    unsafe {
        let first = a.begin().next();
        let last = first.advance(2);
        let pos = b.begin().next();
        b.splice(pos, &mut a, first, last);
        let first = b.begin();
        a.move_range(a.end(), a.begin(), a.end());
        b.move_range(b.end(), first, first.next());
    }
    a.swap(&mut b);
    a.append(&mut b);
    assert_eq!(allocations(), before);
    assert_eq!(Vec::from_iter(a.iter().copied()), vec![2, 3, 20, 10, 1, 4, 5]);
}

#[test]
fn erase_releases_every_node() {
    let before = live();
    {
        let mut list = List::from_iter((0..10).map(|i| i.to_string()));
        unsafe {
            let first = list.begin().advance(2);
            list.erase_range(first, first.advance(5));
            list.erase(list.begin());
        }
        assert_eq!(list.len(), 4);
        list.clear();
        list.push_back(String::from("again"));
    }
    assert_eq!(live(), before);
}

#[test]
fn panicking_element_destructor_still_frees_the_ghost() {
    struct Explosive;
    impl Drop for Explosive {
        fn drop(&mut self) {
            panic!("element destructor failed");
        }
    }

    // The default hook allocates while printing the message.
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));

    let before = live();
    let list = List::from([Explosive]);
    // The ghost node and one value node.
    assert_eq!(live(), before + 2);
    let result = panic::catch_unwind(AssertUnwindSafe(move || drop(list)));
    assert!(result.is_err());
    drop(result);
    let after = live();

    panic::set_hook(hook);
    assert_eq!(after, before);
}
