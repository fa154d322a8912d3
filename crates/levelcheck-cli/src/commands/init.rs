//! The `levelcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create levelcheck.toml
    if std::path::Path::new("levelcheck.toml").exists() {
        println!("levelcheck.toml already exists, skipping.");
    } else {
        std::fs::write("levelcheck.toml", SAMPLE_CONFIG)?;
        println!("Created levelcheck.toml");
    }

    // Create example bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit banks/example.toml or add your own banks");
    println!("  2. Run: levelcheck validate --bank banks/example.toml");
    println!("  3. Run: levelcheck take --bank banks/example.toml --timer");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# levelcheck configuration

# Countdown for timed sessions, in seconds (50 minutes).
time_limit_secs = 3000

# How often the clock advances, in milliseconds.
tick_interval_ms = 1000

# Submit automatically when a timed session runs out of time.
auto_submit_on_timeout = false

output_dir = "./levelcheck-results"

# json, html, markdown, or all
default_format = "json"
"#;

const EXAMPLE_BANK: &str = include_str!("../../../../banks/example.toml");
