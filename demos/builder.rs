use json_stores::Registry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Window {
    width: u32,
    height: u32,
}

fn main() -> Result<(), json_stores::Error> {
    let path = std::env::temp_dir().join("json_stores_example_builder.json");

    // two-space indentation, plain in-place writes
    let registry = Registry::builder().indent(2).atomic(false).build();
    let ui = registry.open_at(&path, ["ui"])?;

    ui.set_as("window", &Window { width: 1280, height: 720 })?;
    ui.set("theme", "dark")?;

    let window: Window = ui.get_as("window")?;
    println!("window = {window:?}");

    let contents = std::fs::read_to_string(ui.identifier()).map_err(json_stores::Error::from)?;
    println!("On-disk JSON:\n{contents}");

    println!("\nDebug output: {registry:?} / {ui:?}");

    let _ = std::fs::remove_file(&path);
    Ok(())
}
