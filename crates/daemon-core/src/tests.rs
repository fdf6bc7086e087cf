use super::*;
use pretty_assertions::assert_eq;
use std::error::Error as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

static UNRELATED_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn names(libs: &SupportLibraries) -> Vec<&str> {
    libs.iter().map(String::as_str).collect()
}

fn overflow_error() -> TryReserveError {
    Vec::<u8>::new()
        .try_reserve_exact(usize::MAX)
        .expect_err("reserving usize::MAX bytes must overflow")
}

#[test]
fn test_returns_three_names_in_order() {
    let libs = support_libraries().unwrap();

    assert_eq!(libs.len(), 3);
    assert_eq!(names(&libs), ["lib1", "lib2", "lib3"]);
}

#[test]
fn test_repeated_calls_are_identical() {
    let first = support_libraries().unwrap();

    for _ in 0..1000 {
        assert_eq!(support_libraries().unwrap(), first);
    }
}

#[test]
fn test_independent_of_process_state() {
    let before = support_libraries().unwrap();

    UNRELATED_COUNTER.fetch_add(41, Ordering::SeqCst);
    let _noise: Vec<String> = (0..64).map(|i| i.to_string()).collect();

    let after = support_libraries().unwrap();
    UNRELATED_COUNTER.fetch_add(1, Ordering::SeqCst);
    let later = support_libraries().unwrap();

    assert_eq!(before, after);
    assert_eq!(after, later);
}

#[test]
fn test_each_call_owns_its_copy() {
    let mut first = support_libraries().unwrap();
    first.0[0].push_str("-patched");
    first.0.push("extra".to_string());

    let second = support_libraries().unwrap();
    assert_eq!(names(&second), ["lib1", "lib2", "lib3"]);
}

#[test]
fn test_concurrent_callers() {
    const CALLERS: usize = 10;
    let barrier = Barrier::new(CALLERS);

    let results: Vec<SupportLibraries> = thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|caller| {
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let mut libs = support_libraries().unwrap();
                    // Scribble on this caller's copy; no other caller may see it
                    libs.0.push(format!("caller-{}", caller));
                    libs
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), CALLERS);
    for (caller, libs) in results.iter().enumerate() {
        let caller_name = format!("caller-{}", caller);
        assert_eq!(names(libs), ["lib1", "lib2", "lib3", caller_name.as_str()]);
    }
}

#[test]
fn test_static_provider_matches_free_function() {
    let provider = StaticLibraryProvider;
    assert_eq!(provider.support_libraries().unwrap(), support_libraries().unwrap());

    let boxed: Box<dyn LibraryProvider> = Box::new(StaticLibraryProvider);
    assert_eq!(boxed.support_libraries().unwrap().len(), 3);
}

#[test]
fn test_build_list_keeps_order_and_duplicates() {
    let libs = build_list(&["b", "a", "b"]).unwrap();
    assert_eq!(names(&libs), ["b", "a", "b"]);

    let empty = build_list(&[]).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.to_string(), "");
}

#[test]
fn test_display_joins_names() {
    let libs = support_libraries().unwrap();

    assert!(!libs.is_empty());
    assert_eq!(libs.to_string(), "lib1, lib2, lib3");
    assert_eq!(names(&libs), SUPPORTED_LIBRARIES);
}

#[test]
fn test_allocation_error_reports_what_failed() {
    let err = DaemonError::Allocation {
        what: "library name list",
        source: overflow_error(),
    };

    assert_eq!(err.to_string(), "failed to allocate library name list");
    assert!(err.source().is_some());
}
