//! Batch feeding example.
//!
//! Generates a small synthetic recording directory, then feeds batches
//! from it in training and evaluation mode.
//!
//! Usage:
//! ```bash
//! cargo run --example feed_batches
//! ```

use arousal_feeder::schema::FEATURE_COLUMNS;
use arousal_feeder::{BatchLoader, FeederConfig, LoaderOptions, WakeDef};
use std::io::Write;
use std::path::Path;

fn main() -> arousal_feeder::Result<()> {
    env_logger::init();

    println!("🛌 Arousal Feeder Example\n");
    println!("{}", "=".repeat(70));

    // =========================================================================
    // 1. Synthetic Recording Directory
    // =========================================================================
    println!("\n1️⃣  Writing synthetic recordings:\n");

    let dir = tempfile::tempdir().expect("temp dir");
    let data_dir = dir.path().join("recordings");
    std::fs::create_dir(&data_dir).expect("create recordings dir");
    for (name, rows) in [("night_01.csv", 24), ("night_02.csv", 16)] {
        write_recording(&data_dir, name, rows);
        println!("  {name}: {rows} rows");
    }

    // =========================================================================
    // 2. Configuration
    // =========================================================================
    println!("\n2️⃣  Configuration:\n");

    let config = FeederConfig::training()
        .with_batch_size(4)
        .with_wake_def(WakeDef::WakeAndN1);
    config.save_toml(dir.path().join("feeder.toml"))?;
    let config = FeederConfig::load_toml(dir.path().join("feeder.toml"))?;
    println!("  Batch size: {}", config.batch_size);
    println!("  Wake definition: {:?}", config.wake_def);
    println!("  Weighting: {:?}", config.weight_approach);

    // =========================================================================
    // 3. Training Feed
    // =========================================================================
    println!("\n3️⃣  Training feed (random files, shuffled batches):\n");

    let options = LoaderOptions::new().with_num_steps(6).with_seed(42);
    let mut loader = BatchLoader::new(&data_dir, config.clone(), options)?;

    let mut step = 0;
    while let Some(batch) = loader.next_batch()? {
        step += 1;
        println!(
            "  Step {step}: file={:?}, features={:?}, logits={:?}, weights={:?}",
            loader.current_file().file_name().unwrap(),
            batch.features.dim(),
            batch.logits.dim(),
            batch.weights.dim()
        );
    }
    println!("\n  {} file load(s), {} step(s)", loader.loads(), loader.steps());

    // =========================================================================
    // 4. Evaluation Feed
    // =========================================================================
    println!("\n4️⃣  Evaluation feed (sorted order, unshifted then shifted):\n");

    let config = FeederConfig::evaluation().with_batch_size(4);
    let options = LoaderOptions::new().with_num_steps(100).with_seed(0);
    let mut loader = BatchLoader::new(&data_dir, config, options)?;

    let mut count = 0;
    while let Some(_batch) = loader.next_batch()? {
        count += 1;
    }
    println!("  {count} batch(es) total");
    println!("\n  Selection history (newest first):");
    for record in loader.history() {
        println!(
            "  {} shift={} at {}",
            record.path.file_name().unwrap().to_string_lossy(),
            record.shift,
            record.selected_at.to_rfc3339()
        );
    }

    println!("\n{}", "=".repeat(70));
    println!("✅ Done");
    Ok(())
}

/// Write one synthetic recording: slow feature ramp, sparse arousals, a
/// ternary wake column.
fn write_recording(dir: &Path, name: &str, rows: usize) {
    let mut file = std::fs::File::create(dir.join(name)).expect("create recording");
    for r in 0..rows {
        let mut fields: Vec<String> = (0..FEATURE_COLUMNS)
            .map(|c| format!("{:.3}", (r as f64) * 0.1 + (c % 128) as f64))
            .collect();
        fields.push(format!("{}", usize::from(r % 7 == 0)));
        fields.push(format!("{}", r % 3));
        writeln!(file, "{}", fields.join(",")).expect("write row");
    }
}
