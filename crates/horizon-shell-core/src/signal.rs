//! Signal/observer system for Horizon Shell.
//!
//! Platform windows expose their notifications (bounds changed, closed,
//! restored) as [`Signal`]s. The orchestrator only connects and disconnects
//! slots; it never assumes anything about delivery order beyond "after the
//! action that triggered it".
//!
//! Slots are invoked directly on the emitting thread. The connection table
//! is unlocked before any slot runs, so a slot may freely connect, disconnect
//! or emit on the same signal.
//!
//! # Example
//!
//! ```
//! use horizon_shell_core::Signal;
//!
//! let restored = Signal::<()>::new();
//!
//! // A one-shot slot is removed before it runs.
//! restored.connect_once(|_| println!("restored"));
//! restored.emit(());
//! assert_eq!(restored.connection_count(), 0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type PersistentSlot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type OnceSlot<Args> = Box<dyn FnOnce(&Args) + Send>;

/// Internal storage for a single connection.
enum Slot<Args> {
    /// Invoked on every emission until disconnected.
    Persistent(PersistentSlot<Args>),
    /// Invoked on the next emission only.
    Once(OnceSlot<Args>),
}

/// A slot together with the order it was connected in.
///
/// Slotmap keys reuse the indices of removed entries, so they cannot order
/// connections.
struct Connection<Args> {
    sequence: u64,
    slot: Slot<Args>,
}

/// A slot taken out of the table for invocation.
enum Invocation<Args> {
    Persistent(PersistentSlot<Args>),
    Once(OnceSlot<Args>),
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Sequence number of the next connection.
    next_sequence: AtomicU64,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            next_sequence: AtomicU64::new(0),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Slot::Persistent(Arc::new(slot)))
    }

    /// Connect a slot that runs on the next emission only.
    ///
    /// The connection is removed before the slot runs. Disconnecting it with
    /// the returned ID before any emission drops the slot unrun.
    pub fn connect_once<F>(&self, slot: F) -> ConnectionId
    where
        F: FnOnce(&Args) + Send + 'static,
    {
        self.insert(Slot::Once(Box::new(slot)))
    }

    fn insert(&self, slot: Slot<Args>) -> ConnectionId {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.connections.lock().insert(Connection { sequence, slot })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let invocations = {
            let mut connections = self.connections.lock();
            let once_ids: Vec<ConnectionId> = connections
                .iter()
                .filter(|(_, connection)| matches!(connection.slot, Slot::Once(_)))
                .map(|(id, _)| id)
                .collect();

            let mut invocations: Vec<(u64, Invocation<Args>)> = connections
                .values()
                .filter_map(|connection| match &connection.slot {
                    Slot::Persistent(slot) => {
                        Some((connection.sequence, Invocation::Persistent(slot.clone())))
                    }
                    Slot::Once(_) => None,
                })
                .collect();
            for id in once_ids {
                if let Some(Connection {
                    sequence,
                    slot: Slot::Once(slot),
                }) = connections.remove(id)
                {
                    invocations.push((sequence, Invocation::Once(slot)));
                }
            }
            invocations.sort_by_key(|(sequence, _)| *sequence);
            invocations
        };

        tracing::trace!(
            target: targets::SIGNAL,
            connection_count = invocations.len(),
            "emitting signal"
        );

        for (_, invocation) in invocations {
            match invocation {
                Invocation::Persistent(slot) => slot(&args),
                Invocation::Once(slot) => slot(&args),
            }
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}
