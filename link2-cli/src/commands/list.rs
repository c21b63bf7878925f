//! `link2 environments`, `link2 list-nodes`, `link2 list-tools`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use link2_supervisor::{handler, CommandRequest, CommandResult};

use super::Session;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "environments")]
    environments: String,
}

#[derive(Tabled)]
struct EnvironmentRow {
    #[tabled(rename = "environment")]
    environment: String,
    #[tabled(rename = "prefix")]
    prefix: String,
}

pub fn entries(session: &Session, args: &ListArgs, nodes: bool) -> Result<()> {
    let subcommand = if nodes {
        handler::LIST_NODES
    } else {
        handler::LIST_TOOLS
    };
    let response = session
        .handler
        .handle(&CommandRequest::new(subcommand, Vec::<String>::new()))
        .with_context(|| format!("{subcommand} failed"))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("failed to serialize listing")?
        );
        return Ok(());
    }

    let CommandResult::Listing(listing) = response.result else {
        anyhow::bail!("{subcommand} returned an acknowledgment instead of a listing");
    };

    let noun = if nodes { "nodes" } else { "tools" };
    println!(
        "{} {} across {} environments",
        listing.len().to_string().bold(),
        noun,
        session.registry().environments().len(),
    );
    if listing.is_empty() {
        println!("No {noun} found.");
        return Ok(());
    }

    let rows: Vec<EntryRow> = listing
        .into_iter()
        .map(|(name, envs)| EntryRow {
            name,
            environments: envs
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

pub fn environments(session: &Session, args: &ListArgs) -> Result<()> {
    let environments = session.registry().environments();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(environments)
                .context("failed to serialize environments")?
        );
        return Ok(());
    }

    if environments.is_empty() {
        println!("No environments found.");
        println!("Check that the report command works: conda info --json");
        return Ok(());
    }

    let rows: Vec<EnvironmentRow> = environments
        .iter()
        .map(|env| EnvironmentRow {
            environment: env.key.to_string(),
            prefix: env.prefix.display().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
