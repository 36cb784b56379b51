//! Print every translated input event until `P` is pressed.
//!
//! Needs read access to `/dev/input/event*` (root or the `input` group).
//!
//! ```text
//! RUST_LOG=evmux=info cargo run --example poll
//! ```

use evmux::{EventKind, EventType, InputConfig, InputManager, Key};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evmux=info")),
        )
        .init();

    let mut input = InputManager::start(InputConfig::default())?;
    for peri in input.peripherals() {
        if peri.kind.is_known() {
            println!(
                "#{:<2} {:<8} {:<20} {}",
                peri.id,
                peri.kind,
                peri.event_path,
                peri.name.as_deref().unwrap_or("?")
            );
        }
    }
    println!(
        "watching {} device(s), press P to quit",
        input.handles().len()
    );

    let mut rx = input.receiver()?;
    while let Some(event) = rx.recv() {
        if event.event_type() == EventType::KeyDown && event.key() == Some(Key::P) {
            break;
        }
        match event.kind {
            EventKind::MouseMove { axis, delta } => {
                println!("[{}] move {:?} {:+}", event.device_id, axis, delta)
            }
            EventKind::GamepadAxis { axis, value } => {
                println!("[{}] axis {:?} = {}", event.device_id, axis, value)
            }
            _ => println!(
                "[{}] {:?} {:?}",
                event.device_id,
                event.event_type(),
                event.key()
            ),
        }
    }

    input.shutdown()?;
    Ok(())
}
