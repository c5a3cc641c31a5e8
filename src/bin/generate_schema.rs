//! Print the JSON Schema of the configuration file

use ember::config::Config;

fn main() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
