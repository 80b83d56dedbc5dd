//! The `quizdrop init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("quizdrop.toml").exists() {
        println!("quizdrop.toml already exists, skipping.");
    } else {
        std::fs::write("quizdrop.toml", SAMPLE_CONFIG)?;
        println!("Created quizdrop.toml");
    }

    write_sample("forms", "forms/example.toml", EXAMPLE_FORM)?;
    write_sample("gestures", "gestures/example.toml", EXAMPLE_GESTURES)?;

    println!("\nNext steps:");
    println!("  1. Run: quizdrop validate --form forms/example.toml");
    println!("  2. Run: quizdrop play --form forms/example.toml --gestures gestures/example.toml");
    println!("  3. Point quizdrop.toml at your form API and run: quizdrop publish --form forms/example.toml");

    Ok(())
}

fn write_sample(dir: &str, path: &str, content: &str) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdrop configuration

# "indexed" gives bare options stable ids (opt-0, opt-1, ...); "random" uses UUIDs.
id_strategy = "indexed"

# QUIZDROP_API_URL overrides base_url; ${VAR} references are expanded.
[api]
base_url = "http://localhost:5000"
timeout_secs = 30
"#;

const EXAMPLE_FORM: &str = include_str!("../../../../forms/example.toml");
const EXAMPLE_GESTURES: &str = include_str!("../../../../gestures/example.toml");
