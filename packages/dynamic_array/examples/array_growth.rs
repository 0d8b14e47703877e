//! Storage growth example for `DynamicArray`.
//!
//! This example demonstrates the two ways the array acquires capacity: exact
//! reservation up front, and doubling when an append finds the buffer full.

use dynamic_array::DynamicArray;

fn main() {
    let mut samples = DynamicArray::new();

    // Watch the capacity double as appends outgrow the storage.
    let mut last_capacity = samples.capacity();
    println!("Starting capacity: {last_capacity}");

    for value in 0..33_u64 {
        samples.push(value);

        if samples.capacity() != last_capacity {
            last_capacity = samples.capacity();
            println!(
                "Growth at element {}: capacity is now {last_capacity}",
                samples.len()
            );
        }
    }

    assert_eq!(samples.capacity(), 64);

    // Reservation is exact: the array allocates precisely what was asked for.
    let mut measurements = DynamicArray::new();
    measurements.reserve(100);
    assert_eq!(measurements.capacity(), 100);
    println!("Reserved exactly {} slots up front", measurements.capacity());

    for value in 0..100_u64 {
        measurements.push(value);
    }
    assert_eq!(measurements.capacity(), 100);
    println!("Filled all {} slots without reallocating", measurements.len());

    // A copy is sized for its contents, not for the source's spare capacity.
    let mut readings = DynamicArray::with_capacity(50);
    readings.push(1_u64);
    readings.push(2);
    readings.push(3);

    let snapshot = readings.clone();
    println!(
        "Source capacity {}, snapshot capacity {}",
        readings.capacity(),
        snapshot.capacity()
    );
    assert_eq!(snapshot.capacity(), 3);

    // Assignment into an array with enough capacity reuses its storage.
    let mut buffer = DynamicArray::with_capacity(10);
    for value in 100..108_u64 {
        buffer.push(value);
    }

    buffer.clone_from(&snapshot);
    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.capacity(), 10);
    println!(
        "Assigned {} elements in place; capacity {} was reused",
        buffer.len(),
        buffer.capacity()
    );

    println!("DynamicArray growth example completed successfully!");
}
