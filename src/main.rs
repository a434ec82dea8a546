use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

use tagscope::filter::{FilterSet, ALL};
use tagscope::loader;
use tagscope::metrics::{rollup, GroupBy, MetricsSnapshot};
use tagscope::remediation::{remediate, TagEdit};
use tagscope::{export, filter};

#[derive(Parser)]
#[command(name = "tagscope")]
#[command(about = "Cost governance metrics and tag remediation for cloud resource inventories")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute cost and tagging metrics over a (optionally filtered) inventory
    Analyze {
        /// Path to the inventory CSV
        input: PathBuf,

        /// Filter by service ("All" for unconstrained)
        #[arg(long, default_value = ALL)]
        service: String,

        /// Filter by region
        #[arg(long, default_value = ALL)]
        region: String,

        /// Filter by department
        #[arg(long, default_value = ALL)]
        department: String,

        /// Filter by environment
        #[arg(long, default_value = ALL)]
        environment: String,
    },
    /// Apply a tag edit file to the inventory and export the remediated dataset
    Remediate {
        /// Path to the inventory CSV
        input: PathBuf,

        /// Path to a JSON array of tag edits
        #[arg(long)]
        edits: PathBuf,

        /// Where to write the remediated CSV
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Analyze {
            input,
            service,
            region,
            department,
            environment,
        } => analyze(input, service, region, department, environment),
        Command::Remediate {
            input,
            edits,
            output,
        } => run_remediation(input, edits, output),
    }
}

fn analyze(
    input: PathBuf,
    service: String,
    region: String,
    department: String,
    environment: String,
) -> Result<()> {
    let outcome = loader::load_path(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    info!(
        rows = outcome.report.rows_read,
        duplicates = outcome.report.duplicates_dropped,
        "loaded inventory"
    );

    let dataset = outcome.dataset;
    let filter_set = FilterSet::from_selections(&service, &region, &department, &environment);
    let view = filter_set.apply(&dataset);

    let snapshot = MetricsSnapshot::compute(view.iter().copied());
    print_snapshot(&snapshot);

    for (label, group) in [
        ("Department", GroupBy::Department),
        ("Service", GroupBy::Service),
        ("Environment", GroupBy::Environment),
    ] {
        println!("\n--- By {label} ---");
        println!("{:<20} {:>10} {:>16} {:>14}", label, "Resources", "Total Cost", "Tagging Rate");
        for g in rollup(view.iter().copied(), group) {
            println!(
                "{:<20} {:>10} {:>16.2} {:>13.1}%",
                g.key, g.resource_count, g.total_cost, g.tagging_rate
            );
        }
    }

    println!("\nFilter options:");
    println!("  Service:     {}", filter::filter_options(&dataset, |r| r.service.as_deref()).join(", "));
    println!("  Region:      {}", filter::filter_options(&dataset, |r| r.region.as_deref()).join(", "));
    println!("  Department:  {}", filter::filter_options(&dataset, |r| r.department.as_deref()).join(", "));
    println!("  Environment: {}", filter::filter_options(&dataset, |r| r.environment.as_deref()).join(", "));

    Ok(())
}

fn run_remediation(input: PathBuf, edits_path: PathBuf, output: PathBuf) -> Result<()> {
    let outcome = loader::load_path(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let dataset = outcome.dataset;

    let edits_file = File::open(&edits_path)
        .with_context(|| format!("failed to open {}", edits_path.display()))?;
    let edits: Vec<TagEdit> =
        serde_json::from_reader(edits_file).context("failed to parse edits file")?;
    info!(edits = edits.len(), untagged = dataset.untagged().len(), "applying tag edits");

    let result = remediate(&dataset, &edits)?;

    println!("=== Before Remediation ===");
    print_snapshot(&result.before);
    println!("\n=== After Remediation ===");
    print_snapshot(&result.after);

    println!("\n=== Improvement ===");
    println!(
        "Untagged resources: -{}",
        result.display_untagged_resource_reduction()
    );
    println!(
        "Untagged cost:      -${:.2}",
        result.display_untagged_cost_reduction()
    );
    println!(
        "Avg completeness:   +{:.2}",
        result.display_completeness_improvement()
    );

    let file = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    export::write_csv(&result.dataset, file)?;
    info!(output = %output.display(), "wrote remediated dataset");

    Ok(())
}

fn print_snapshot(m: &MetricsSnapshot) {
    println!("Total resources:    {}", m.total_resources);
    println!("Tagged resources:   {} ({:.1}%)", m.tagged_resources, m.tagging_rate);
    println!("Untagged resources: {}", m.untagged_resources);
    println!("Total monthly cost: ${:.2}", m.total_cost);
    println!("Tagged cost:        ${:.2}", m.tagged_cost);
    println!(
        "Untagged cost:      ${:.2} ({:.1}% of total)",
        m.untagged_cost, m.untagged_cost_pct
    );
    println!("Avg completeness:   {:.2}/5", m.avg_completeness);
}
