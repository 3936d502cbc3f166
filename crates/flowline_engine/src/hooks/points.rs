//! Hook point markers for the run lifecycle.
//!
//! A hook point is identified by a marker type wrapped in a [`HookPointId`].
//! Use the markers with the type-safe registration methods, e.g.
//! [`register_observer::<OnNodeComplete>`](super::HooksAPI::register_observer),
//! or a tuple of them to subscribe to several points at once.
//!
//! Event data is carried by the unified [`RunEvent`](super::events::RunEvent)
//! enum, which every hook receives.

use core::any::TypeId;

use variadics_please::all_tuples;

/// Identifier for a hook point, derived from a marker type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookPointId {
    type_id: TypeId,
    type_name: &'static str,
}

impl HookPointId {
    /// Creates a `HookPointId` for the given marker type.
    #[must_use]
    pub fn of<P: HookPoint>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: P::NAME,
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the marker's short name, e.g. `"OnNodeStart"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.type_name
    }
}

/// Marker trait for hook point types.
pub trait HookPoint: 'static {
    /// Short name used in hook names and diagnostics.
    const NAME: &'static str;
}

/// Types that expand to a list of hook points: a single marker or a tuple.
pub trait IntoHookPoints {
    /// Returns the hook point IDs for this type.
    fn hook_points() -> Vec<HookPointId>;
}

impl<P: HookPoint> IntoHookPoints for P {
    fn hook_points() -> Vec<HookPointId> {
        vec![HookPointId::of::<P>()]
    }
}

macro_rules! impl_into_hook_points_for_tuple {
    ($($P:ident),*) => {
        impl<$($P: HookPoint),*> IntoHookPoints for ($($P,)*) {
            fn hook_points() -> Vec<HookPointId> {
                vec![$(HookPointId::of::<$P>()),*]
            }
        }
    };
}

all_tuples!(impl_into_hook_points_for_tuple, 2, 8, P);

macro_rules! hook_point {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name;

        impl HookPoint for $name {
            const NAME: &'static str = stringify!($name);
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Run Points
// ─────────────────────────────────────────────────────────────────────────────

hook_point! {
    /// Fired once after the graph validated, before the first node.
    ///
    /// Event data: [`RunEvent::RunStart`](super::events::RunEvent::RunStart)
    OnRunStart
}

hook_point! {
    /// Fired once per non-fatal scheduling finding, after [`OnRunStart`].
    ///
    /// Event data: [`RunEvent::ScheduleWarning`](super::events::RunEvent::ScheduleWarning)
    OnScheduleWarning
}

hook_point! {
    /// Fired when `pause()` takes effect on an active run.
    ///
    /// Event data: [`RunEvent::RunPaused`](super::events::RunEvent::RunPaused)
    OnRunPaused
}

hook_point! {
    /// Fired when `resume()` releases a paused run.
    ///
    /// Event data: [`RunEvent::RunResumed`](super::events::RunEvent::RunResumed)
    OnRunResumed
}

hook_point! {
    /// Fired once when the run reaches a terminal status, after the record
    /// was appended to history.
    ///
    /// Event data: [`RunEvent::RunComplete`](super::events::RunEvent::RunComplete)
    OnRunComplete
}

// ─────────────────────────────────────────────────────────────────────────────
// Node Points
// ─────────────────────────────────────────────────────────────────────────────

hook_point! {
    /// Fired when a node turns `running`, just before its executor is called.
    ///
    /// Event data: [`RunEvent::NodeStart`](super::events::RunEvent::NodeStart)
    OnNodeStart
}

hook_point! {
    /// Fired when a node turns `completed`.
    ///
    /// Event data: [`RunEvent::NodeComplete`](super::events::RunEvent::NodeComplete)
    OnNodeComplete
}

hook_point! {
    /// Fired when a node turns `error`.
    ///
    /// Event data: [`RunEvent::NodeError`](super::events::RunEvent::NodeError)
    OnNodeError
}
