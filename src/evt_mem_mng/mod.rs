//! Events are stored in a pool of fixed size slots while they wait in the queue and while they
//! are dispatched. The pool is allocated statically (or on the stack in tests), so submitting an
//! event never touches a heap.

/// Handle owning an event stored in a pool slot
pub mod event_box;

/// Pool of event slots
pub mod event_pool;
