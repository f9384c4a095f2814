use sovran_anystore::{AnyError, AnyValue, StorageKind};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let storage = StorageKind::Indexed.create_synchronized();

    // Consumers start first and block until the producer has put something
    let consumers: Vec<_> = (0..3)
        .map(|id| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || -> Result<(), AnyError> {
                let value = storage.get(&AnyValue::new(0usize))?;
                println!("Consumer {} got {}", id, value.extract_ref::<String>()?);
                Ok(())
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(100));

    let producer = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || -> Result<(), AnyError> {
            for i in 0..5 {
                let key = storage.put(AnyValue::new(format!("message {}", i)), AnyValue::empty())?;
                println!("Produced message {} at {}", i, key.extract::<usize>()?);
            }
            Ok(())
        })
    };

    producer.join().expect("producer panicked")?;
    for consumer in consumers {
        consumer.join().expect("consumer panicked")?;
    }

    // An independent copy starts out not ready
    let copy = storage.try_clone()?;
    match copy.get_timeout(&AnyValue::new(0usize), Duration::from_millis(50)) {
        Ok(_) => println!("This shouldn't happen - the copy has not been written to"),
        Err(AnyError::Timeout(waited)) => println!("Copy not ready after {:?}", waited),
        Err(e) => println!("Unexpected error: {}", e),
    }

    println!("Original holds {} values, copy holds {}", storage.len()?, copy.len()?);
    Ok(())
}
