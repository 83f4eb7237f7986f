use anyhow::Result;

// Prints the OpenAPI document without a database or a listening socket.
fn main() -> Result<()> {
    let doc = workout_api::api::openapi();
    let json = serde_json::to_string_pretty(&doc)?;
    println!("{json}");
    Ok(())
}
