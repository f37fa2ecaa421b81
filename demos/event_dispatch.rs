//! # Example: event_dispatch
//!
//! Binds several hooks to an entity acting as an event source and dispatches
//! "damage" to them in priority order.
//!
//! Shows how to:
//! - embed [`HookCore`] / [`EventSourceCore`] in your own types
//! - order hooks with priorities (lower first, ties in bind order)
//! - stop a dispatch early with `ControlFlow::Break`
//! - let a hook unbind itself while being visited
//! - use a standalone [`Signal`] as an event source
//!
//! ## Run
//! ```bash
//! cargo run --example event_dispatch
//! ```

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use appvisor::{
    EventSource, EventSourceCore, Hook, HookCore, Signal, Uid, UidMaker, bind_event,
    bind_event_default, send_event, send_event_as, unbind_all_hooks, unbind_event,
};

struct Knight {
    id: Uid,
    hp: AtomicI32,
    on_damage: EventSourceCore,
}

impl EventSource for Knight {
    fn event_source_core(&self) -> &EventSourceCore {
        &self.on_damage
    }
}

/// Reduces incoming damage by a flat amount.
struct Armor {
    core: HookCore,
    reduction: i32,
}

impl Hook for Armor {
    fn hook_core(&self) -> &HookCore {
        &self.core
    }
}

/// Absorbs one hit entirely, then breaks.
struct Bubble {
    core: HookCore,
}

impl Hook for Bubble {
    fn hook_core(&self) -> &HookCore {
        &self.core
    }
}

fn hit(knight: &Arc<Knight>, raw: i32) {
    let mut damage = raw;
    send_event(knight, |hook| {
        if let Some(armor) = hook.downcast_ref::<Armor>() {
            damage = (damage - armor.reduction).max(0);
        } else if hook.is::<Bubble>() {
            damage = 0;
            // a bubble pops after one hit
            unbind_event(hook, knight);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    let hp = knight.hp.fetch_sub(damage, Ordering::Relaxed) - damage;
    println!("knight {} takes {damage} (raw {raw}), hp = {hp}", knight.id);
}

fn main() -> anyhow::Result<()> {
    let uids = UidMaker::new();
    let knight = Arc::new(Knight {
        id: uids.next(),
        hp: AtomicI32::new(100),
        on_damage: EventSourceCore::new(),
    });

    let bubble = Arc::new(Bubble {
        core: HookCore::new(),
    });
    let plate = Arc::new(Armor {
        core: HookCore::new(),
        reduction: 5,
    });
    let ring = Arc::new(Armor {
        core: HookCore::new(),
        reduction: 2,
    });

    bind_event(&plate, &knight, 10)?;
    bind_event(&ring, &knight, 10)?;
    bind_event(&bubble, &knight, -1)?;

    if let Err(err) = bind_event_default(&plate, &knight) {
        println!("second bind refused: {}", err.as_message());
    }

    hit(&knight, 20); // bubble absorbs and unbinds
    hit(&knight, 20); // plate then ring: 20 - 5 - 2
    drop(ring);
    hit(&knight, 20); // ring dropped: 20 - 5

    let tick = Signal::new("tick");
    bind_event_default(&plate, &tick)?;
    send_event_as::<Armor, _, _>(&tick, |armor| {
        println!("{} reached armor with reduction {}", tick.name(), armor.reduction);
        ControlFlow::Continue(())
    });

    unbind_all_hooks(&knight);
    println!(
        "knight listeners: {}, plate attachments: {}",
        knight.on_damage.len(),
        plate.core.attached_count()
    );
    Ok(())
}
