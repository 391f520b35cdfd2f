use json_stores::{json, Registry};

fn main() -> Result<(), json_stores::Error> {
    let path = std::env::temp_dir().join("json_stores_example_basic.json");
    let _ = std::fs::remove_file(&path);
    let registry = Registry::new();

    // set / get / delete, each write lands on disk immediately
    let fruit = registry.open_at(&path, ["pantry", "fruit"])?;
    fruit.set("apples", 3)?;
    fruit.set("bananas", 5)?;
    println!("apples  = {}", fruit.get("apples")?);
    println!("cherries (default 0) = {}", fruit.get_or("cherries", 0)?);

    // update in place
    fruit.update("apples", |n| *n = json!(n.as_i64().unwrap_or(0) + 1))?;
    println!("apples after update = {}", fruit.get("apples")?);

    // a second handle on the same file sees the same data
    let pantry = registry.open_at(&path, ["pantry"])?;
    println!("pantry keys = {:?}", pantry.keys()?);
    println!("fruit items = {:?}", pantry.child("fruit").items()?);

    fruit.delete("bananas")?;
    println!("on disk:\n{}", std::fs::read_to_string(&path).map_err(json_stores::Error::from)?);

    let _ = std::fs::remove_file(&path);
    Ok(())
}
