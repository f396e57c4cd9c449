#![doc = r"Cooperative runtime pieces for listkit data managers."]

pub mod deferred;
pub mod platform;
pub mod runtime;

pub use deferred::DeferredRegistration;
pub use platform::{DisplayMetrics, RuntimeScheduler, StaticDisplayMetrics};
pub use runtime::{DefaultScheduler, DeferredId, Runtime, RuntimeHandle};
