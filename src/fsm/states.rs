//! Concrete state handler functions and table builder.
//!
//! ```text
//!  IDLE ─▶ ACQUIRING ─▶ VALIDATING ──[all valid]──▶ RENDERING ─▶ PUBLISHING
//!   ▲                        │                                       │
//!   │                  [any invalid]                                 │
//!   │                        ▼                                       │
//!   └──────────────────── SLEEPING ◀─────────────────────────────────┘
//! ```
//!
//! One faulted probe blocks the whole batch: no partial render, no partial
//! publish, and the sleep stretches to the fault backoff.

use super::context::CycleContext;
use super::{StateDescriptor, StateId};
use crate::sensors::reading::first_fault;
use log::warn;

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_update: idle_update,
        },
        StateDescriptor {
            id: StateId::Acquiring,
            name: "Acquiring",
            on_enter: None,
            on_update: acquiring_update,
        },
        StateDescriptor {
            id: StateId::Validating,
            name: "Validating",
            on_enter: None,
            on_update: validating_update,
        },
        StateDescriptor {
            id: StateId::Rendering,
            name: "Rendering",
            on_enter: None,
            on_update: rendering_update,
        },
        StateDescriptor {
            id: StateId::Publishing,
            name: "Publishing",
            on_enter: None,
            on_update: publishing_update,
        },
        StateDescriptor {
            id: StateId::Sleeping,
            name: "Sleeping",
            on_enter: Some(sleeping_enter),
            on_update: sleeping_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut CycleContext) {
    ctx.reset_cycle();
}

fn idle_update(ctx: &mut CycleContext) -> Option<StateId> {
    ctx.cycle += 1;
    Some(StateId::Acquiring)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACQUIRING
// ═══════════════════════════════════════════════════════════════════════════

fn acquiring_update(_ctx: &mut CycleContext) -> Option<StateId> {
    Some(StateId::Validating)
}

// ═══════════════════════════════════════════════════════════════════════════
//  VALIDATING: the only branch in the cycle
// ═══════════════════════════════════════════════════════════════════════════

fn validating_update(ctx: &mut CycleContext) -> Option<StateId> {
    let fault = first_fault(&ctx.batch);
    ctx.faulted = ctx.batch.is_empty() || fault.is_some();
    if ctx.faulted {
        if let Some(idx) = fault {
            warn!(
                "cycle {}: probe {} ({}) invalid, skipping render and publish",
                ctx.cycle, idx, ctx.batch[idx].name
            );
        } else {
            warn!("cycle {}: empty batch, skipping render and publish", ctx.cycle);
        }
        return Some(StateId::Sleeping);
    }
    Some(StateId::Rendering)
}

// ═══════════════════════════════════════════════════════════════════════════
//  RENDERING / PUBLISHING
// ═══════════════════════════════════════════════════════════════════════════

fn rendering_update(_ctx: &mut CycleContext) -> Option<StateId> {
    Some(StateId::Publishing)
}

fn publishing_update(_ctx: &mut CycleContext) -> Option<StateId> {
    Some(StateId::Sleeping)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEPING
// ═══════════════════════════════════════════════════════════════════════════

fn sleeping_enter(ctx: &mut CycleContext) {
    ctx.sleep_ms = if ctx.faulted {
        ctx.fault_backoff_ms
    } else {
        ctx.cadence_ms
    };
}

fn sleeping_update(_ctx: &mut CycleContext) -> Option<StateId> {
    Some(StateId::Idle)
}
