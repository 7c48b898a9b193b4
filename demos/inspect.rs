//! Loads resource definitions, resolves their columns against PostgreSQL, and prints
//! what the admin panel would show for each resource.
//!
//! Run: `cargo run --example inspect` with `DATABASE_URL` and `ADMIN_CONFIG_PATH` set.

use admin_resource::{build_registry, load_from_path, PgDao, ResourceDao};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("admin_resource=info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/admin".into());
    let config_path = std::env::var("ADMIN_CONFIG_PATH").unwrap_or_else(|_| "resources".into());
    // Overrides the schema of every definition, e.g. to point at a staging copy.
    let schema_override = std::env::var("ADMIN_SCHEMA").ok();

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let definitions = load_from_path(&config_path).await?;
    let registry = build_registry(&definitions, |def| {
        let schema = schema_override.clone().unwrap_or_else(|| def.schema.clone());
        let dao: Arc<dyn ResourceDao> = Arc::new(PgDao::new(pool.clone(), schema, def.table.clone()));
        Some(dao)
    })
    .await?
    .freeze();

    for resource in registry.iter() {
        let total = match resource.dao() {
            Some(dao) => dao.count().await?,
            None => 0,
        };
        println!(
            "{} ({} rows, {} per page, keys: {})",
            resource.table_name(),
            total,
            resource.per_page_count(),
            resource.primary_keys().join(", ")
        );
        println!("  index: {}", resource.index_columns().join(", "));
        for element in resource.form_page() {
            println!("  form: {}", element.view());
        }
    }
    Ok(())
}
