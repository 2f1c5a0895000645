//! gizo-ctl: command-line interface for Gizo dispatchers.

use anyhow::{Context, Result};

mod cmd;

use cmd::connect::{GlobalOpts, connect};

fn print_usage() {
    println!("Usage: gizo-ctl [options] <command>");
    println!();
    println!("Commands:");
    println!("  status                          Dispatcher version, chain and worker summary");
    println!("  peers                           List the dispatcher's peers");
    println!("  workers                         Worker counts");
    println!("  keys                            Show dispatcher and caller public keys");
    println!("  block <height|hash>             Print one block");
    println!("  blocks                          List the latest 15 blocks");
    println!("  job new <file.ank> <name> [--private]");
    println!("                                  Register a job");
    println!("  job show <id>                   Show job details");
    println!("  exec status <job-id> <hash>     Show exec status (hash in hex)");
    println!("  exec cancel <hash>              Cancel an exec (hash in hex)");
    println!("  config init                     Write a default config file if none exists");
    println!("  config show                     Print the resolved configuration");
    println!();
    println!("Options:");
    println!("  --dispatcher <url>   Connect to this dispatcher when no state file exists");
    println!("  --state <path>       Connection state file (default: .gizo)");
    println!("  --test               Use the test network");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut opts = GlobalOpts::default();
    let mut private = false;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--dispatcher" => {
                i += 1;
                opts.dispatcher = Some(args.get(i).context("--dispatcher requires a value")?.clone());
            }
            "--state" => {
                i += 1;
                opts.state_file = Some(args.get(i).context("--state requires a value")?.into());
            }
            "--test" => opts.test_net = true,
            "--private" => private = true,
            other => remaining.push(other),
        }
        i += 1;
    }

    if matches!(remaining.as_slice(), ["help"] | ["--help"] | ["-h"]) {
        print_usage();
        return Ok(());
    }

    match remaining.as_slice() {
        ["config", "init"] => return cmd::config::cmd_config_init(),
        ["config", "show"] => return cmd::config::cmd_config_show(&opts),
        _ => {}
    }

    let known = matches!(
        remaining.as_slice(),
        [] | ["status"]
            | ["peers"]
            | ["workers"]
            | ["keys"]
            | ["block", _]
            | ["blocks"]
            | ["job", "new", _, _]
            | ["job", "show", _]
            | ["exec", "status", _, _]
            | ["exec", "cancel", _]
    );
    if !known {
        eprintln!("Unknown command: {}", remaining.join(" "));
        eprintln!();
        print_usage();
        std::process::exit(1);
    }

    let gizo = connect(&opts).await?;

    match remaining.as_slice() {
        ["status"] | [] => cmd::status::cmd_status(&gizo).await,
        ["peers"] => cmd::status::cmd_peers(&gizo).await,
        ["workers"] => cmd::status::cmd_workers(&gizo).await,
        ["keys"] => cmd::status::cmd_keys(&gizo).await,
        ["block", id] => cmd::chain::cmd_block(&gizo, id).await,
        ["blocks"] => cmd::chain::cmd_blocks(&gizo).await,
        ["job", "new", file, name] => cmd::jobs::cmd_job_new(&gizo, file, name, private).await,
        ["job", "show", id] => cmd::jobs::cmd_job_show(&gizo, id).await,
        ["exec", "status", job, hash] => cmd::jobs::cmd_exec_status(&gizo, job, hash).await,
        ["exec", "cancel", hash] => cmd::jobs::cmd_exec_cancel(&gizo, hash).await,
        _ => unreachable!("command list checked above"),
    }
}
