//! # ptw-engine: Permit Lifecycle Engine
//!
//! Ties the pure pieces together: the risk classifier, the permit state
//! machine and the access policy, behind a repository facade and a
//! notification sink.
//!
//! ## Modules
//!
//! - **Engine** (`engine.rs`): create, submit, approve, reject, draft edits
//!   and the read-side queries.
//! - **Repository** (`repository.rs`): the persistence facade trait.
//! - **Memory** (`memory.rs`): the in-memory compare-and-swap store.
//! - **Journal** (`journal.rs`): durable writes inside that compare-and-swap.
//! - **Numbering** (`numbering.rs`): unique permit numbers.
//! - **Notify** (`notify.rs`): lifecycle events and their sinks.
//! - **Query** (`query.rs`): filters, pages and counts.

pub mod engine;
pub mod journal;
pub mod memory;
pub mod notify;
pub mod numbering;
pub mod query;
pub mod repository;

pub use engine::{DraftPatch, PermitEngine};
pub use journal::PermitJournal;
pub use memory::MemoryRepository;
pub use notify::{LifecycleEvent, LifecycleEventKind, Notifier, NotifyError, TracingNotifier};
pub use numbering::{PermitNumberGenerator, DEFAULT_PREFIX};
pub use query::{Page, PageRequest, PermitFilter, PermitStats, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use repository::PermitRepository;
