//! Schema caching under concurrent first use.

use std::sync::{Arc, Barrier};
use std::thread;

use hms_validation::hospital::{DispenseRequest, Medicine, PatientRegistration};
use hms_validation::{RawInput, Stage, Validator};

const THREADS: usize = 16;

#[test]
fn test_concurrent_first_use_builds_once() {
    let validator = Arc::new(Validator::with_builtins());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let validator = Arc::clone(&validator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                validator.schema::<Medicine>().expect("medicine schema compiles")
            })
        })
        .collect();

    let schemas: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    for schema in &schemas[1..] {
        assert!(Arc::ptr_eq(&schemas[0], schema));
    }
    assert_eq!(validator.cache().builds(), 1);
    assert_eq!(validator.cache().len(), 1);
}

#[test]
fn test_each_type_is_built_once() {
    let validator = Validator::with_builtins();
    for _ in 0..3 {
        validator.schema::<Medicine>().unwrap();
        validator.schema::<PatientRegistration>().unwrap();
    }
    assert_eq!(validator.cache().builds(), 2);
    assert!(validator.cache().contains::<Medicine>());
    assert!(!validator.cache().contains::<DispenseRequest>());
}

#[test]
fn test_concurrent_validation_shares_one_schema() {
    let validator = Arc::new(Validator::with_builtins());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let raw = RawInput::new()
                    .with("mrn", "abcd0f1")
                    .with("drug_ids", (i + 1).to_string());
                validator
                    .validate::<DispenseRequest>(&raw, &Stage::All)
                    .expect("dispense schema compiles")
                    .into_result()
                    .expect("request is valid")
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let request = handle.join().expect("worker panicked");
        assert_eq!(request.drugs, vec![i as i64 + 1]);
    }
    assert_eq!(validator.cache().builds(), 1);
}
