//! The MPMC portion-queue family: a non-blocking capability abstraction,
//! the blown-queue composite that bounds it, and two monolithic
//! alternatives used as benchmarking baselines.

pub mod blown_queue;
pub mod factory;
pub mod nonblocking;
pub mod sync_bounded_queue;
pub mod textbook_queue;

pub use blown_queue::BlownQueue;
pub use sync_bounded_queue::SyncBoundedQueue;
pub use textbook_queue::TextbookQueue;

/// Capability abstraction for a loosely-bounded or unbounded MPMC queue
/// whose enqueue/dequeue operations may spuriously fail under contention.
///
/// `try_enqueue` returns `Err(portion)` on failure so the caller reclaims
/// the value to retry; `try_dequeue` returning `None` does not imply the
/// queue is empty, only that no portion was visible at this attempt.
pub trait NonBlockingQueue<E>: Send + Sync {
    /// Attempt to enqueue `portion`. May fail only for capacity-related
    /// reasons; never loses the portion on failure.
    fn try_enqueue(&self, portion: E) -> Result<(), E>;

    /// Attempt to dequeue a portion. `None` may mean "try again".
    fn try_dequeue(&self) -> Option<E>;
}

/// The public contract shared by every bounded MPMC portion queue in this
/// workbench, whether backed by a `NonBlockingQueue` (via `BlownQueue`) or
/// implemented as a monolithic design (`TextbookQueue`, `SyncBoundedQueue`).
pub trait MpmcPortionQueue<E>: Send + Sync {
    /// Add a portion, blocking until there is capacity.
    fn add_portion(&self, portion: E);

    /// Retrieve a portion, blocking until one is available or the queue has
    /// been shut down (in which case `None` is returned).
    fn retrieve_portion(&self) -> Option<E>;

    /// Block until every accepted portion has been retrieved. Called
    /// exactly once, after all producers have finished.
    fn ensure_all_portions_are_retrieved(&self);

    /// Signal consumers that no more portions will arrive. The queue must
    /// not be used after this call.
    fn stop_consumers(&self, consumer_count: usize);

    /// Current number of logically-accepted-but-not-yet-retrieved portions.
    fn get_size(&self) -> usize;

    /// The capacity this queue was configured with.
    fn get_max_size(&self) -> usize;
}
