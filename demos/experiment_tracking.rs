//! Experiment Tracking Example
//!
//! Runs two small "training" experiments with different hyperparameters,
//! then reads them back as a summary table and a joined loss curve.
//!
//! Run with: cargo run --example experiment_tracking
//! Verbose:  RUST_LOG=exptrack=debug cargo run --example experiment_tracking

use anyhow::Result;
use exptrack::experiment::{RecordStore, Reduce};
use exptrack::query::Dashboard;
use tracing_subscriber::EnvFilter;

#[allow(clippy::cast_precision_loss)]
fn train(store: &mut RecordStore, name: &str, lr: f64, epochs: i64, every: i64) -> Result<()> {
    let active = store.start_experiment(Some(name))?;
    println!("   {name}: id={}", active.experiment_id());

    store.log_params([("lr", lr), ("momentum", 0.9)])?;
    store.log_param("optimizer", "sgd")?;

    for epoch in (0..epochs).step_by(usize::try_from(every)?) {
        let loss = 2.5 * lr.mul_add(-10.0, 1.0).max(0.1) / (epoch as f64 + 1.0) + 0.1;
        let accuracy = 0.05f64.mul_add(epoch as f64, 0.5).min(0.99);
        store.log_value("loss", loss, Some(epoch), Some(&Reduce::Minimum))?;
        store.log_value("accuracy", accuracy, Some(epoch), Some(&Reduce::Maximum))?;
    }

    store.end_experiment()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== exptrack Experiment Tracking ===\n");

    let log_root = tempfile_root()?;
    let mut store = RecordStore::new(&log_root);

    // -------------------------------------------------------------------------
    // 1. Two runs with different schedules
    // -------------------------------------------------------------------------
    println!("1. Running experiments under {}...", log_root.display());
    train(&mut store, "baseline", 0.01, 10, 1)?;
    train(&mut store, "high-lr", 0.05, 10, 2)?;

    // -------------------------------------------------------------------------
    // 2. Summary table
    // -------------------------------------------------------------------------
    println!("\n2. Summary table:");
    let dashboard = Dashboard::open(&log_root)?;
    let summary = dashboard.summary_table()?;
    for group in summary.groups() {
        println!("   [{}] {}", group.name(), group.columns().join(", "));
    }
    for row in summary.rows() {
        println!(
            "   {:<10} lr={:<6} best loss={:<8} best acc={}",
            row.get("meta", "experiment_name").to_string(),
            row.get("params", "lr").to_string(),
            row.get("values", "loss")
                .as_f64()
                .map_or_else(|| "-".to_string(), |v| format!("{v:.4}")),
            row.get("values", "accuracy").to_string(),
        );
    }

    // -------------------------------------------------------------------------
    // 3. Joined loss curve
    // -------------------------------------------------------------------------
    println!("\n3. Loss curve (outer join on step):");
    let series = dashboard.series_for_key("loss")?;
    for (row, step) in series.steps().iter().enumerate() {
        let cells: Vec<String> = series
            .columns()
            .iter()
            .map(|c| {
                c.values()[row]
                    .as_f64()
                    .map_or_else(|| "   -  ".to_string(), |v| format!("{v:.4}"))
            })
            .collect();
        println!("   step {step:>2}: {}", cells.join("  "));
    }

    let batch = series.to_record_batch()?;
    println!(
        "\n   Arrow batch: {} rows x {} columns",
        batch.num_rows(),
        batch.num_columns()
    );

    println!("\n=== Experiment Tracking Complete ===");
    Ok(())
}

fn tempfile_root() -> Result<std::path::PathBuf> {
    let dir = tempfile::tempdir()?;
    // Keep the directory after exit so the files can be inspected
    Ok(dir.keep())
}
