// demos/basic_usage.rs
//! Basic usage of the monkey patcher

use monkey_patcher::{Instance, PatchError, Patcher, PatcherConfig, Prototype, SourceObject, SymbolId, Value};

fn main() -> Result<(), PatchError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter("monkey_patcher=debug")
        .init();

    println!("=== Monkey Patcher - Basic Usage ===\n");

    // A type we do not own
    let sample = Prototype::new("Sample")
        .with_method("existingMethod", |_, _| Value::from("Original Method"))
        .with_method("anotherExistingMethod", |_, _| {
            Value::from("Another Original Method")
        });

    // Functions someone else wants every Sample to have
    let extensions = SourceObject::new()
        .with_method("greet", |_, args| {
            Value::from(format!("hi {}", args.first().map(Value::as_string).unwrap_or_default()))
        })
        .with_method("introduce", |this, _| {
            Value::from(format!("I am {}", this.get_field("name").as_string()))
        })
        .with_method("nickname", |this, _| this.get_field("nickname"))
        .with_value("version", Value::Int(2));

    let config = PatcherConfig::from_json(r#"{"conflict_scope":"prototype_chain"}"#)
        .unwrap_or_default();
    let mut patcher = Patcher::new(&sample, "ext").with_config(config);
    patcher.patch(&extensions)?;
    println!("Installed: {:?}\n", patcher.method_names());

    let instance = Instance::new(&sample);
    instance.set_field("name", Value::from("Al"));

    let ext = instance.namespace("ext").expect("namespace just installed");
    let greeting = ext.call("greet", &[Value::from("Al")])?;
    println!(
        "ext.greet(\"Al\")   -> {} ({})",
        greeting.as_str().unwrap_or_default(),
        greeting.kind()
    );
    println!("ext.introduce()   -> {}", ext.call("introduce", &[])?);
    if ext.call("nickname", &[])?.is_null() {
        println!("ext.nickname()    -> none set");
    }
    println!(
        "existingMethod()  -> {}",
        instance.call("existingMethod", &[]).unwrap_or_default()
    );

    println!("\nFailure cases:");
    if let Err(e) = ext.call("missing", &[]) {
        println!("  {e}");
    }
    if let Err(e) = ext.get(SymbolId(1)) {
        println!("  {e}");
    }
    if let Err(e) = patcher.patch(&extensions) {
        println!("  {e}");
    }
    if let Err(e) = Patcher::new(&sample, "empty").patch(&SourceObject::new()) {
        println!("  {e}");
    }

    Ok(())
}
