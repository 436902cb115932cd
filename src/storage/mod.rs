//! Persistent OAuth storages
//!
//! [`PersistentStorage`] is what the OAuth layer reads and writes through.
//! [`SessionStorage`] keeps data in the visitor session, [`MemoryStorage`]
//! keeps it in process, and the [`RestrictedStorage`] and [`ScopedStorage`]
//! decorators wrap any of them.

mod memory;
mod restricted;
mod scoped;
mod session;
mod traits;

pub use memory::MemoryStorage;
pub use restricted::{RestrictedStorage, SUPPORTED_KEYS};
pub use scoped::ScopedStorage;
pub use session::SessionStorage;
pub use traits::PersistentStorage;
