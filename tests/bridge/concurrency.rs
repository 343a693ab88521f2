use super::unique_name;
use anyhow::{anyhow, Result};
use std::thread;
use sysframe::{read_memory, remove_memory, write_memory, Value};

fn candidate(writer: usize, iteration: usize) -> Value {
    Value::List(vec![
        Value::from(writer as i64),
        Value::from(iteration as i64),
        Value::Str(format!("w{}", writer).repeat(200 + writer)),
    ])
}

/// Writers racing on one segment are serialized by its mutex: every read
/// observes exactly one written value in full, never a mixture, and the
/// final state is the last writer's value.
pub fn serialized_writers_and_readers() -> Result<()> {
    let name = unique_name("race");

    let writers = 4usize;
    let iterations = 25usize;

    // The seed takes the one writer id past the real ones.
    let seed = candidate(writers, 0);
    write_memory(&name, &seed, true)?;

    let is_candidate = move |value: &Value| -> bool {
        (0..=writers).any(|w| (0..iterations).any(|i| value == &candidate(w, i)))
    };

    thread::scope(|scope| {
        for writer in 0..writers {
            let name = &name;
            scope.spawn(move || {
                for iteration in 0..iterations {
                    write_memory(name, &candidate(writer, iteration), false).unwrap();
                }
            });
        }

        for _ in 0..2 {
            let name = &name;
            let is_candidate = &is_candidate;
            scope.spawn(move || {
                for _ in 0..50 {
                    let value = read_memory(name).unwrap();
                    assert!(is_candidate(&value), "torn read: {:?}", value);
                }
            });
        }
    });

    let last = read_memory(&name)?;
    if !is_candidate(&last) {
        return Err(anyhow!("final read is not a written value: {:?}", last));
    }

    assert!(remove_memory(&name, true)?);
    Ok(())
}
