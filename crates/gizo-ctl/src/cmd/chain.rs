//! Block queries.

use anyhow::Result;
use gizo_client::Gizo;

pub async fn cmd_block(gizo: &Gizo, id: &str) -> Result<()> {
    // Heights are numeric; anything else is treated as a block hash.
    let block = match id.parse::<u64>() {
        Ok(height) => gizo.block_by_height(height).await?,
        Err(_) => gizo.block_by_hash(id).await?,
    };
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}

pub async fn cmd_blocks(gizo: &Gizo) -> Result<()> {
    let blocks = gizo.latest_15_blocks().await?;

    if blocks.is_empty() {
        println!("No blocks yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Latest Blocks ({})", blocks.len());
    println!("═══════════════════════════════════════");
    for b in &blocks {
        let height = b.get("Height").or_else(|| b.get("height"));
        let hash = b.get("Hash").or_else(|| b.get("hash"));
        match (height, hash) {
            (Some(h), Some(hash)) => println!("  {:>8}  {}", h, hash.as_str().unwrap_or_default()),
            _ => println!("  {}", b),
        }
    }

    Ok(())
}
