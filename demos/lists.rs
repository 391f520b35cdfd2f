use json_stores::Registry;

fn main() -> Result<(), json_stores::Error> {
    let path = std::env::temp_dir().join("json_stores_example_lists.json");
    let _ = std::fs::remove_file(&path);
    let registry = Registry::new();

    let todo = registry.open_at(&path, ["todo"])?;
    todo.append("write docs")?;
    todo.append("ship it")?;
    println!("todo[1] = {}", todo.get(1usize)?);
    println!("has 'ship it'? {}", todo.contains(&"ship it".into())?);

    todo.delete(0usize)?;
    println!("remaining = {:?}", todo.values()?);

    let _ = std::fs::remove_file(&path);
    Ok(())
}
