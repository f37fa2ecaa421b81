//! # Example: basic_app
//!
//! Runs a single app with lifecycle callbacks, a supervised worker and the
//! built-in [`LogWriter`] subscriber.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► App::builder(ctx).with_lifecycle(..).with_subscribers([LogWriter]).build()
//!   │     └─► on_init: registers two entities
//!   ├─► app.run()
//!   │     └─► on_start: spawns a ticking worker on the app's wait-group
//!   ├─► app.stop_on_shutdown_signal()  (Ctrl-C stops early)
//!   ├─► sleep 1.2s, app.stop()
//!   └─► handle.wait()
//!         └─► worker drains ─► on_stop ─► Shutdown
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic_app --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use appvisor::{App, AppConfig, AppLifecycle, Context, Entity, LogWriter, Subscribe, Uid};
use tracing_subscriber::EnvFilter;

struct Tree {
    id: Uid,
    species: &'static str,
}

impl Entity for Tree {
    fn entity_id(&self) -> Uid {
        self.id
    }
}

struct Forest;

impl AppLifecycle for Forest {
    fn on_init(&self, app: &App) {
        for species in ["oak", "birch"] {
            let tree = Arc::new(Tree {
                id: app.make_uid(),
                species,
            });
            if let Err(err) = app.add_entity(tree) {
                tracing::error!(error = %err, "cannot plant");
            }
        }
    }

    fn on_start(&self, app: &App) {
        let ctx = app.context().clone();
        app.context().wait_group().spawn(async move {
            let mut ticks = 0u32;
            loop {
                tokio::select! {
                    _ = ctx.done() => break,
                    _ = tokio::time::sleep(Duration::from_millis(300)) => {
                        ticks += 1;
                        tracing::info!(ticks, "forest grows");
                    }
                }
            }
            // graceful drain: shutdown waits for this
            tokio::time::sleep(Duration::from_millis(100)).await;
            tracing::info!(ticks, "worker drained");
        });
    }

    fn on_stop(&self, app: &App) {
        app.range_entities(|e| {
            if let Some(tree) = e.downcast_ref::<Tree>() {
                tracing::info!(id = %tree.id, species = tree.species, "still standing");
            }
            std::ops::ControlFlow::Continue(())
        });
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let app = App::builder(Context::new())
        .with_config(AppConfig::default().with_name("forest"))
        .with_lifecycle(Arc::new(Forest))
        .with_subscribers(subs)
        .build();

    let handle = app.run()?;
    let _signal = app.stop_on_shutdown_signal();

    tokio::time::sleep(Duration::from_millis(1200)).await;
    app.stop();
    handle.wait().await?;

    println!("final state: {:?}, entities: {}", app.state(), app.entity_count());
    Ok(())
}
