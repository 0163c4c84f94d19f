//! Lifecycle Event Observers

mod store_observer;

pub use store_observer::StoreObserver;
