extern crate std;

use alloc::sync::Arc;
use alloc::vec;
use std::thread;

use crate::linked_list::cursored::prelude::*;

#[test]
fn test_concurrent_push_back() {
    let list: Arc<CursoredList<usize>> = Arc::new(CursoredList::new());
    let num_threads = 8;
    let items_per_thread = 500;

    let mut handles = vec![];
    for i in 0..num_threads {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for j in 0..items_per_thread {
                list.push_back(&(i * items_per_thread + j)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), num_threads * items_per_thread);

    // The chain is intact: a full traversal visits exactly the inserted
    // values, each once.
    let mut count = 0usize;
    let mut sum = 0usize;
    list.for_each(|v| {
        count += 1;
        sum += *v;
    });
    let total = num_threads * items_per_thread;
    assert_eq!(count, total);
    assert_eq!(sum, total * (total - 1) / 2);
}

#[test]
fn test_concurrent_sorted_inserts_stay_ordered() {
    let list: Arc<CursoredList<usize>> = Arc::new(CursoredList::new());
    let num_threads = 4;
    let items_per_thread = 100;

    let mut handles = vec![];
    for i in 0..num_threads {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            // Stride the values so the threads interleave everywhere in
            // the ordering, not in disjoint runs.
            for j in 0..items_per_thread {
                list.insert_sorted(&(j * num_threads + i)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), num_threads * items_per_thread);
    let mut values = vec![];
    list.for_each(|v| values.push(*v));
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_concurrent_readers_and_writers() {
    let list: Arc<CursoredList<usize>> = Arc::new(CursoredList::new());
    let writers = 2;
    let items_per_writer = 200;

    let mut handles = vec![];
    for i in 0..writers {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for j in 0..items_per_writer {
                list.push_back(&(i * items_per_writer + j)).unwrap();
            }
        }));
    }
    for _ in 0..2 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                let len = list.len();
                let mut seen = 0;
                list.for_each(|_| seen += 1);
                // The list only grows here, so a later traversal can only
                // see more.
                assert!(seen >= len);
                match list.front_with(|v| *v) {
                    Ok(_) | Err(ListError::Empty) => {}
                    other => panic!("unexpected read result: {:?}", other),
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), writers * items_per_writer);
}

#[test]
fn test_concurrent_cursor_traffic() {
    let list: Arc<CursoredList<usize>> = Arc::new(CursoredList::new());
    for v in 0..100usize {
        list.push_back(&v).unwrap();
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            let cur = list.cursor().unwrap();
            let mut sum = 0usize;
            loop {
                sum += list.cursor_with(cur, |v| *v).unwrap();
                if list.cursor_next(cur).unwrap() == Advance::Boundary {
                    break;
                }
            }
            list.release_cursor(cur).unwrap();
            sum
        }));
    }
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 100 * 99 / 2);
    }

    assert_eq!(list.cursor_count(), 0);
    assert_eq!(list.len(), 100);
}
