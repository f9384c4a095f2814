use sovran_anystore::{AnyCompare, AnyError, AnyValue, ComparatorRegistry, KeyedStorage, MapStorage};

// Example user type that knows how to compare itself
#[derive(Debug, Clone)]
struct Complex {
    re: f32,
    im: f32,
}

impl Complex {
    fn norm(&self) -> f32 {
        (self.re * self.re + self.im * self.im).sqrt()
    }
}

impl AnyCompare for Complex {
    fn any_less(&self, other: &Self) -> bool {
        self.norm() < other.norm()
    }
    fn any_equal(&self, other: &Self) -> bool {
        self.norm() == other.norm()
    }
}

fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Values of different types behind one handle
    let mut value = AnyValue::new(2i32);
    println!("Holding a {}", value.type_tag());

    value.copy_from(&AnyValue::new(1.0f32));
    println!("Now holding a {}", value.type_tag());

    // Reading back with the wrong type
    match value.extract::<i32>() {
        Ok(v) => println!("This shouldn't happen: {}", v),
        Err(AnyError::TypeMismatch { expected, found }) => {
            println!("Correctly refused to read a {} as {}", found, expected)
        }
        Err(e) => println!("Unexpected error: {}", e),
    }

    // Comparisons go through the registry
    let a = AnyValue::new(Complex { re: 1.0, im: 1.0 });
    let b = AnyValue::new(Complex { re: 2.0, im: 2.0 });
    match a.less(&b) {
        Ok(less) => println!("This shouldn't happen: {}", less),
        Err(e) => println!("Before registering: {}", e),
    }

    ComparatorRegistry::global().register_type::<Complex>()?;
    println!("a < b: {}", a.less(&b)?);
    println!("a != b: {}", a.not_equal(&b)?);

    // Values as map keys
    let mut map = MapStorage::new();
    map.put(AnyValue::new(10.0f64), AnyValue::new(5i32))?;
    map.put(AnyValue::new(String::from("hey")), AnyValue::new(3i32))?;

    let hey = map.get(&AnyValue::new(3i32))?;
    println!("map[3] = {}", hey.extract_ref::<String>()?);
    println!("map[4] is empty: {}", map.get(&AnyValue::new(4i32))?.is_empty());

    // Moving a value out
    let mut generated = AnyValue::new(3.0f64);
    let moved = AnyValue::transfer_from(&mut generated);
    println!(
        "Moved value: {}, source empty: {}",
        moved.extract::<f64>()?,
        generated.is_empty()
    );

    Ok(())
}
