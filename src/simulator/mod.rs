#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

/*!
Simulator module for Notidle.

This module wires together:
- `driver`: the low-level input injection seam (Enigo-backed or dry-run)
- `runtime`: the idle-prevention loop with its cancellable wait

Typical usage:
- Construct a `Simulator` with the loaded `Config`, an `ActivityLog`, and a
  boxed driver.
- Call `Simulator::run` to block until Ctrl+C or a `LoopHandle::stop`.

Example:
```no_run
use notidle::config::Config;
use notidle::logger::ActivityLog;
use notidle::simulator::{DryRunDriver, Simulator};

# async fn demo() {
let config = Config::default();
let log = ActivityLog::new(&config.log_file_path);
let mut sim = Simulator::new(config, log, Box::new(DryRunDriver::new()));
sim.run().await;
# }
```

Public re-exports:
- `InputDriver`, `EnigoDriver`, `DryRunDriver`: the injection seam.
- `Simulator`, `LoopHandle`: the loop and its stop-only handle.
*/

pub mod driver;
pub mod runtime;

// Re-exports for convenient access from `notidle::simulator::*`
pub use driver::{DryRunDriver, EnigoDriver, InputDriver};
pub use runtime::{LoopHandle, Simulator};
