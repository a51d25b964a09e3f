use fileconfig::{Context, TomlFileConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.toml");
    let config = TomlFileConfig::default();

    // Create the file, then modify part of it
    config
        .update(
            &path,
            &json!({
                "app": {"name": "svc", "debug": false},
                "database": {"host": "localhost", "port": 5432, "url": "postgres://${database.host}:${database.port}/${db_name}"}
            }),
        )
        .await?;
    let merged = config
        .update(&path, &json!({"app": {"debug": true}}))
        .await?;
    println!("merged: {merged}");

    let context = Context::builder()
        .with_value("db_name", "main")
        .with_env("MYAPP", "__")
        .build();
    let resolved = config
        .load_with_resolve_placeholder(&path, &context)
        .await?
        .unwrap_or_default();

    println!("App: {} (debug={})", resolved["app"]["name"], resolved["app"]["debug"]);
    println!("Database URL: {}", resolved["database"]["url"]);

    Ok(())
}
