//! Move-only element example for `DynamicArray`.
//!
//! Growth relocates elements bitwise, so element types do not need `Clone` or
//! `Copy` for the array to grow. This example stores a move-only type and walks it
//! through growth, in-place construction, and by-value draining.

use dynamic_array::DynamicArray;

/// A sensor reading that deliberately implements neither `Clone` nor `Copy`.
#[derive(Debug)]
struct Reading {
    sensor: u32,
    celsius: f64,
}

fn main() {
    let mut readings = DynamicArray::with_capacity(2);

    readings.push(Reading {
        sensor: 1,
        celsius: 20.5,
    });
    readings.push(Reading {
        sensor: 2,
        celsius: 21.0,
    });

    assert_eq!(readings.len(), readings.capacity());
    println!("Buffer is full at capacity {}", readings.capacity());

    // This append finds the buffer full. The array doubles the storage and moves
    // the existing readings over; no element code runs.
    readings.push(Reading {
        sensor: 3,
        celsius: 19.8,
    });

    println!(
        "Grew to capacity {} while holding move-only elements",
        readings.capacity()
    );
    assert_eq!(readings.capacity(), 4);

    // In-place construction also works with move-only types.
    let inserted = readings.insert_with(1, || Reading {
        sensor: 4,
        celsius: 22.3,
    });
    println!("Inserted reading from sensor {}", inserted.sensor);

    let mut total = 0.0;
    for reading in &readings {
        println!(
            "Sensor {} reported {:.1} degrees",
            reading.sensor, reading.celsius
        );
        total += reading.celsius;
    }
    println!("Average of the 4 readings: {:.2} degrees", total / 4.0);

    // Draining by value hands each reading out exactly once.
    let mut drained = Vec::new();
    for reading in readings {
        drained.push(reading.sensor);
    }
    assert_eq!(drained, vec![1, 4, 2, 3]);

    println!("DynamicArray move-only example completed successfully!");
}
