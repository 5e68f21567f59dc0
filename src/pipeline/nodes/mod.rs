//! Built-in generic stages.
//!
//! Business-agnostic adapters: a queue-backed source, closure-driven
//! processors, a buffering target and a closure observer.

pub mod collect_target;
pub mod filter;
pub mod fn_observer;
pub mod map;
pub mod vec_source;

pub use collect_target::{Collected, CollectTarget};
pub use filter::FilterProcessor;
pub use fn_observer::FnObserver;
pub use map::MapProcessor;
pub use vec_source::VecSource;
