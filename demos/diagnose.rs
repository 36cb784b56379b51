//! Dump every discovered peripheral as JSON.
//!
//! ```text
//! cargo run --example diagnose [config.toml]
//! RUST_LOG=evmux=debug cargo run --example diagnose
//! ```

use evmux::backends::linux::discover_peripherals_with;
use evmux::{InputConfig, PeripheralKind};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => InputConfig::load(path)?,
        None => InputConfig::default(),
    };

    let list = discover_peripherals_with(&cfg)?;
    println!("{}", list.to_json()?);

    eprintln!(
        "{} peripheral(s): {} keyboard, {} mouse, {} gamepad, {} unknown",
        list.len(),
        list.count_of(PeripheralKind::Keyboard),
        list.count_of(PeripheralKind::Mouse),
        list.count_of(PeripheralKind::Gamepad),
        list.count_of(PeripheralKind::Unknown),
    );
    Ok(())
}
