//! Basic usage example for `DynamicArray`.
//!
//! This example demonstrates the everyday operations: appending, positional insert
//! and remove, slice-based access, and clearing while keeping the storage.

use dynamic_array::DynamicArray;

fn main() {
    let mut tasks = DynamicArray::new();

    println!("Created an empty array with capacity: {}", tasks.capacity());

    // Append a few entries.
    tasks.push("write report".to_string());
    tasks.push("review patches".to_string());
    tasks.push("file expenses".to_string());

    println!("Added {} tasks", tasks.len());

    // The whole slice API is available through Deref.
    println!("First task: {}", tasks.first().unwrap());
    println!("Last task: {}", tasks.last().unwrap());

    // Insert an urgent entry at the front; everything else shifts right.
    tasks.insert(0, "fix the build".to_string());
    assert_eq!(tasks.len(), 4);
    println!("After inserting at the front: {tasks:?}");

    // Remove by position; the tail closes the gap.
    let removed = tasks.remove(2).unwrap();
    println!("Removed task: {removed}");
    assert_eq!(tasks.len(), 3);

    // Pop takes from the back.
    while let Some(task) = tasks.pop() {
        println!("Completed: {task}");
    }
    assert!(tasks.is_empty());

    // The storage survives clearing and emptying, ready for reuse.
    println!(
        "All tasks done; capacity {} is retained for the next batch",
        tasks.capacity()
    );

    tasks.push("plan next week".to_string());
    assert_eq!(tasks.len(), 1);

    println!("DynamicArray example completed successfully!");
}
