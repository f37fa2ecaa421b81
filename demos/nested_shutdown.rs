//! # Example: nested_shutdown
//!
//! A root app supervising two child apps.
//!
//! ## Flow
//! ```text
//! root ─┬─ level   (Context::child_of)       canceled together with root
//!       └─ saver   (Context::supervised_by)  canceled on its own
//!
//! root.stop()
//!   ├─► level stops immediately (inherited cancellation)
//!   ├─► root is ShuttingDown, gated on saver
//!   └─► saver.stop() after 500ms ─► root reaches Shutdown
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example nested_shutdown
//! ```

use std::sync::Arc;
use std::time::Duration;

use appvisor::{App, AppConfig, AppLifecycle, Context, RunState};

struct Announce;

impl AppLifecycle for Announce {
    fn on_start(&self, app: &App) {
        println!("[{}] started", app.name());
    }

    fn on_stop(&self, app: &App) {
        println!("[{}] stopping (state {:?})", app.name(), app.state());
    }
}

fn build(ctx: Context, name: &'static str) -> Arc<App> {
    App::builder(ctx)
        .with_config(AppConfig::default().with_name(name))
        .with_lifecycle(Arc::new(Announce))
        .build()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let root = build(Context::new(), "root");
    let level = build(Context::child_of(root.context()), "level");
    let saver = build(Context::supervised_by(root.context()), "saver");

    let root_handle = root.run()?;
    let level_handle = level.run()?;
    let saver_handle = saver.run()?;

    root.stop();
    level_handle.wait().await?;
    root.wait_for(RunState::ShuttingDown).await;
    println!("level: {:?}, saver: {:?}, root: {:?}", level.state(), saver.state(), root.state());

    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("saver finishing its work");
    saver.stop();
    saver_handle.wait().await?;

    root_handle.wait().await?;
    println!("root: {:?}", root.state());
    Ok(())
}
