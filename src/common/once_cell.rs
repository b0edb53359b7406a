use parking_lot::Once;
use std::{cell::UnsafeCell, mem::MaybeUninit};

/// Write-once cell usable in `static` items and as a lazily filled field
pub(crate) struct OnceCell<T> {
    once: Once,
    cell: UnsafeCell<MaybeUninit<T>>,
}

// it is correct because the cell is written only once, under `Once`,
// and after that only shared references go out
// T: Sync because those references reach other threads,
// T: Send because whichever thread wins `get_or_init` builds the value
// and a different thread may drop it
unsafe impl<T: Send + Sync> Sync for OnceCell<T> {}

impl<T> OnceCell<T> {
    pub(crate) const fn new() -> Self {
        Self {
            once: Once::new(),
            cell: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    pub(crate) fn get_or_init(&self, f: impl FnOnce() -> T) -> &T {
        self.once.call_once(|| {
            unsafe { &mut *self.cell.get() }.write(f());
        });
        unsafe { (*self.cell.get()).assume_init_ref() }
    }

    pub(crate) fn get(&self) -> Option<&T> {
        if self.once.state().done() {
            Some(unsafe { (*self.cell.get()).assume_init_ref() })
        } else {
            None
        }
    }
}

impl<T> Drop for OnceCell<T> {
    fn drop(&mut self) {
        if self.once.state().done() {
            unsafe { self.cell.get_mut().assume_init_drop() }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering::SeqCst},
        Arc,
    };

    #[test]
    fn initializes_once() {
        let calls = AtomicUsize::new(0);
        let cell = OnceCell::new();
        assert!(cell.get().is_none());
        let v1 = *cell.get_or_init(|| {
            calls.fetch_add(1, SeqCst);
            100
        });
        let v2 = *cell.get_or_init(|| {
            calls.fetch_add(1, SeqCst);
            200
        });
        assert_eq!(v1, 100);
        assert_eq!(v2, 100);
        assert_eq!(cell.get(), Some(&100));
        assert_eq!(calls.load(SeqCst), 1);
    }

    #[test]
    fn drops_initialized_value() {
        let value = Arc::new(());
        {
            let cell = OnceCell::new();
            cell.get_or_init(|| value.clone());
            assert_eq!(Arc::strong_count(&value), 2);
        }
        assert_eq!(Arc::strong_count(&value), 1);
    }
}
