mod timeout_tests;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Shared call counter plus a listener that bumps it.
pub fn event_counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    (count, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

pub fn count_of(count: &Arc<AtomicUsize>) -> usize {
    count.load(Ordering::SeqCst)
}
