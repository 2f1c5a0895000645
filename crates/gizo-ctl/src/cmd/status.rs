//! Dispatcher status, peers, workers and key commands.

use anyhow::Result;
use gizo_client::Gizo;

pub async fn cmd_status(gizo: &Gizo) -> Result<()> {
    let version = gizo.version().await?;
    let peers = gizo.peer_count().await?;
    let height = gizo.latest_block_height().await?;
    let pending = gizo.pending_count().await?;
    let queued = gizo.job_queue_count().await?;
    let workers = gizo.workers_count().await?;
    let busy = gizo.workers_count_busy().await?;
    let score = gizo.score().await?;

    println!("═══════════════════════════════════════");
    println!("  Gizo Dispatcher Status");
    println!("═══════════════════════════════════════");
    println!("  Dispatcher    : {}", gizo.dispatcher().rpc_endpoint());
    println!("  Version       : {}", version);
    println!("  Score         : {:.2}", score);
    println!("  Peers         : {}", peers);
    println!("  Block height  : {}", height);
    println!("  Pending       : {}", pending);
    println!("  Job queue     : {}", queued);
    println!("  Workers       : {} ({} busy)", workers, busy);

    Ok(())
}

pub async fn cmd_peers(gizo: &Gizo) -> Result<()> {
    let peers = gizo.peers().await?;

    if peers.is_empty() {
        println!("Dispatcher has no peers.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Dispatcher Peers ({})", peers.len());
    println!("═══════════════════════════════════════");
    for p in &peers {
        println!("  {}", p);
    }

    Ok(())
}

pub async fn cmd_workers(gizo: &Gizo) -> Result<()> {
    let total = gizo.workers_count().await?;
    let busy = gizo.workers_count_busy().await?;
    let idle = gizo.workers_count_not_busy().await?;

    println!("═══════════════════════════════════════");
    println!("  Workers");
    println!("═══════════════════════════════════════");
    println!("  Total : {}", total);
    println!("  Busy  : {}", busy);
    println!("  Idle  : {}", idle);

    Ok(())
}

pub async fn cmd_keys(gizo: &Gizo) -> Result<()> {
    let dispatcher_key = gizo.public_key().await?;

    println!("  Dispatcher     : {}", gizo.dispatcher());
    println!("  Dispatcher key : {}", dispatcher_key);
    println!("  Your key       : {}", gizo.keys().public);

    Ok(())
}
