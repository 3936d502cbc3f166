//! Hook registration API for run lifecycle events.
//!
//! Observers are registered under a name per hook point and invoked in
//! registration order. A name may be reused across points but not within one.
//!
//! # Multi-Point Registration
//!
//! ```ignore
//! hooks.register_observer::<(OnNodeStart, OnNodeComplete, OnNodeError), _>(
//!     "progress",
//!     |event: &RunEvent| {
//!         if let (Some(node_id), Some(progress)) = (event.node_id(), event.progress()) {
//!             println!("{} {node_id} {progress:.0}%", event.point_name());
//!         }
//!     },
//! )?;
//! ```

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::events::RunEvent;
use super::points::{HookPointId, IntoHookPoints};

// ─────────────────────────────────────────────────────────────────────────────
// BoxedHook
// ─────────────────────────────────────────────────────────────────────────────

/// Type-erased hook that receives `&RunEvent`.
#[derive(Clone)]
pub struct BoxedHook {
    handler: Arc<dyn Fn(&RunEvent) + Send + Sync>,
}

impl BoxedHook {
    /// Wraps a handler.
    #[must_use]
    pub fn new(handler: impl Fn(&RunEvent) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    fn shared(handler: Arc<dyn Fn(&RunEvent) + Send + Sync>) -> Self {
        Self { handler }
    }

    /// Invokes the hook.
    pub fn invoke(&self, event: &RunEvent) {
        (self.handler)(event);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookRegistrationError {
    /// A hook with this name already exists on the point.
    #[error("hook '{name}' already registered for '{}'", .point.name())]
    DuplicateName {
        /// The point where the duplicate was found.
        point: HookPointId,
        /// The duplicate hook name.
        name: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// HooksAPI
// ─────────────────────────────────────────────────────────────────────────────

struct HookEntry {
    name: String,
    hook: BoxedHook,
}

/// Registry of lifecycle observers.
///
/// Registration and invocation both take `&self`; the registry can be shared
/// between the engine and the host through an `Arc`.
#[derive(Default)]
pub struct HooksAPI {
    hooks: RwLock<HashMap<HookPointId, Vec<HookEntry>>>,
}

impl core::fmt::Debug for HooksAPI {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let hooks = self.hooks.read();
        let mut map = f.debug_map();
        for (point, entries) in hooks.iter() {
            let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
            map.entry(&point.name(), &names);
        }
        map.finish()
    }
}

impl HooksAPI {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an observer on one or more hook points.
    ///
    /// With several points, the hook is registered as `name@Point` on each.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if the name is taken
    /// on one of the points. Points before the failing one keep the hook.
    pub fn register_observer<P, F>(
        &self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        P: IntoHookPoints,
        F: Fn(&RunEvent) + Send + Sync + 'static,
    {
        let points = P::hook_points();
        let name = name.into();
        let hook: Arc<dyn Fn(&RunEvent) + Send + Sync> = Arc::new(hook);

        for point in &points {
            let hook_name = if points.len() > 1 {
                format!("{}@{}", name, point.name())
            } else {
                name.clone()
            };
            self.register_boxed(*point, hook_name, BoxedHook::shared(Arc::clone(&hook)))?;
        }
        Ok(self)
    }

    /// Registers a pre-built [`BoxedHook`] on a point.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if the name is taken.
    pub fn register_boxed(
        &self,
        point: HookPointId,
        name: impl Into<String>,
        hook: BoxedHook,
    ) -> Result<(), HookRegistrationError> {
        let name = name.into();

        let mut hooks = self.hooks.write();
        let entries = hooks.entry(point).or_default();

        if entries.iter().any(|entry| entry.name == name) {
            return Err(HookRegistrationError::DuplicateName { point, name });
        }

        entries.push(HookEntry { name, hook });
        Ok(())
    }

    /// Removes a hook by name. Returns true if it existed.
    pub fn unregister(&self, point: HookPointId, name: &str) -> bool {
        let mut hooks = self.hooks.write();
        let Some(entries) = hooks.get_mut(&point) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.name != name);
        before != entries.len()
    }

    /// Invokes every hook registered on the event's point, in registration
    /// order.
    pub fn emit(&self, event: &RunEvent) {
        self.invoke(event.hook_point(), event);
    }

    /// Invokes every hook registered on `point`.
    ///
    /// The hooks are copied out before any of them runs, so a hook may emit,
    /// register or unregister on the same registry. Changes take effect from
    /// the next invocation.
    pub fn invoke(&self, point: HookPointId, event: &RunEvent) {
        let hooks: Vec<BoxedHook> = self
            .hooks
            .read()
            .get(&point)
            .map(|entries| entries.iter().map(|entry| entry.hook.clone()).collect())
            .unwrap_or_default();
        for hook in &hooks {
            hook.invoke(event);
        }
    }

    /// Returns the number of hooks registered on a point.
    #[must_use]
    pub fn hook_count(&self, point: HookPointId) -> usize {
        let hooks = self.hooks.read();
        hooks.get(&point).map_or(0, Vec::len)
    }

    /// Checks if a hook with the given name exists on the point.
    #[must_use]
    pub fn contains_hook(&self, point: HookPointId, name: &str) -> bool {
        let hooks = self.hooks.read();
        hooks
            .get(&point)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name))
    }
}
