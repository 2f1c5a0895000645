//! Job and exec commands.

use anyhow::{Context, Result};
use gizo_client::{ExecState, Gizo};
use gizo_core::encoding::hex_to_bytes;

pub async fn cmd_job_new(gizo: &Gizo, file: &str, name: &str, private: bool) -> Result<()> {
    let id = gizo.new_job(file, name, private).await?;
    println!("Job submitted:");
    println!("  ID      : {}", id);
    println!("  Name    : {}", name);
    println!("  Private : {}", private);
    Ok(())
}

pub async fn cmd_job_show(gizo: &Gizo, id: &str) -> Result<()> {
    let name = gizo.job_name(id).await?;
    let private = gizo.is_job_private(id).await?;
    let submitted = gizo.job_submission_time_string(id).await?;
    let latest = gizo.job_latest_exec(id).await?;

    println!("═══════════════════════════════════════");
    println!("  Job {}", name);
    println!("═══════════════════════════════════════");
    println!("  ID        : {}", id);
    println!("  Private   : {}", private);
    println!("  Submitted : {}", submitted);
    if latest.is_null() {
        println!("  No execs yet.");
    } else {
        println!("  Latest exec:");
        println!("{}", serde_json::to_string_pretty(&latest)?);
    }

    Ok(())
}

pub async fn cmd_exec_status(gizo: &Gizo, job_id: &str, exec_hash_hex: &str) -> Result<()> {
    let hash = hex_to_bytes(exec_hash_hex).context("exec hash must be hex")?;
    let raw = gizo.exec_status(job_id, &hash).await?;

    let icon = match raw.parse::<ExecState>() {
        Ok(s) if s.is_terminal() => "■",
        Ok(_) => "▶",
        Err(_) => "?",
    };
    println!("  {} {}", icon, raw);

    let duration = gizo.exec_duration_string(job_id, &hash).await?;
    let by = gizo.exec_by(job_id, &hash).await?;
    println!("  duration : {}", duration);
    println!("  by       : {}", by);

    Ok(())
}

pub async fn cmd_exec_cancel(gizo: &Gizo, exec_hash_hex: &str) -> Result<()> {
    let hash = hex_to_bytes(exec_hash_hex).context("exec hash must be hex")?;
    gizo.cancel_exec(&hash).await?;
    println!("✓ Exec cancelled: {}", exec_hash_hex);
    Ok(())
}
