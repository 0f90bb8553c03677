//! Example: Full-window animated aurora backdrop.
//!
//! Run with:
//!     cargo run --example aurora_window

use aurora_backdrop::AuroraApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    AuroraApp::new().with_title("aurora backdrop").run()
}
