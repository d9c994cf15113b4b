//! Seed the item catalog from a YAML file.
//!
//! ```yaml
//! items:
//!   - id: 1
//!     name: Apples
//!   - id: 2
//!     name: Oranges
//! ```
//!
//! Existing items are renamed to match the file.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use franklin_core::ItemId;

/// Contents of an item seed file.
#[derive(Debug, Deserialize)]
pub struct ItemSeed {
    pub items: Vec<SeedItem>,
}

/// One catalog item.
#[derive(Debug, Deserialize)]
pub struct SeedItem {
    pub id: ItemId,
    pub name: String,
}

impl ItemSeed {
    /// Parse a seed file's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or an item has an empty name.
    pub fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let seed: Self = serde_yaml::from_str(content)?;

        if let Some(item) = seed.items.iter().find(|item| item.name.trim().is_empty()) {
            return Err(format!("item {} has an empty name", item.id).into());
        }

        Ok(seed)
    }
}

/// Insert or rename the items listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a write fails.
pub async fn items(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading items from file");

    // Parse before connecting
    let content = tokio::fs::read_to_string(path).await?;
    let seed = ItemSeed::parse(&content)?;

    info!(items = seed.items.len(), "Parsed seed file");

    let pool = super::connect().await?;
    let mut tx = pool.begin().await?;

    for item in &seed.items {
        sqlx::query(
            "INSERT INTO items (id, name) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(item.id)
        .bind(&item.name)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(items = seed.items.len(), "Items seeded");
    Ok(())
}
