//! Function-pointer finite state machine engine for the acquisition cycle.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌────────────┬───────────┬───────────────────────────┐  │
//! │  │ StateId    │ on_enter  │ on_update                 │  │
//! │  ├────────────┼───────────┼───────────────────────────┤  │
//! │  │ Idle       │ fn(ctx)   │ fn(ctx) -> Option<StateId> │  │
//! │  │ Acquiring  │ fn(ctx)   │ fn(ctx) -> Option<StateId> │  │
//! │  │ Validating │ fn(ctx)   │ fn(ctx) -> Option<StateId> │  │
//! │  │ Rendering  │ fn(ctx)   │ fn(ctx) -> Option<StateId> │  │
//! │  │ Publishing │ fn(ctx)   │ fn(ctx) -> Option<StateId> │  │
//! │  │ Sleeping   │ fn(ctx)   │ fn(ctx) -> Option<StateId> │  │
//! │  └────────────┴───────────┴───────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler performs the I/O belonging to the current state, records
//! the result in the [`CycleContext`], then ticks the engine.  `on_update`
//! of the current state picks the successor from the context alone, so
//! every transition rule lives in [`states`] and is testable without ports.

pub mod context;
pub mod states;

use context::CycleContext;
use log::debug;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Cycle states.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Acquiring = 1,
    Validating = 2,
    Rendering = 3,
    Publishing = 4,
    Sleeping = 5,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert an index back to `StateId`.  Out-of-range indices fall back
    /// to `Sleeping`, the one state every cycle is guaranteed to reach.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Acquiring,
            2 => Self::Validating,
            3 => Self::Rendering,
            4 => Self::Publishing,
            5 => Self::Sleeping,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Sleeping
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Runs once when a state is entered.
pub type StateActionFn = fn(&mut CycleContext);

/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut CycleContext) -> Option<StateId>;

/// Static descriptor for a single cycle state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id as usize == i),
            "state table out of order"
        );
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut CycleContext) {
        debug!("cycle FSM starting in {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Call `on_update` for the current state and follow its verdict.
    pub fn tick(&mut self, ctx: &mut CycleContext) {
        if let Some(next) = (self.table[self.current].on_update)(ctx) {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut CycleContext) {
        let next_idx = next_id as usize;
        debug!(
            "cycle FSM: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );
        self.current = next_idx;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
