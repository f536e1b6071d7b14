//! Statekeeper: a single-writer, event-driven state machine manager
//!
//! One state value, three states, and one task allowed to change it.
//! Callers on any task submit named events and wait for the result; the
//! processor applies them strictly in arrival order. Observers receive
//! committed changes through a latest-value channel that never slows the
//! processor down.
//!
//! # Core Concepts
//!
//! - **State**: `Idle`, `Processing` or `Completed`
//! - **Transition table**: `start`, `complete` and `reset` move the machine
//!   around the cycle; anything else is an `InvalidTransition`
//! - **Manager**: owns the processor and monitor tasks and their shutdown
//! - **Observers**: sinks for state changes, fed by the monitor
//!
//! # Example
//!
//! ```rust
//! use statekeeper::{FsmError, Manager, State};
//! use statekeeper::work::FixedWork;
//! use std::time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let manager = Manager::builder()
//!     .work(FixedWork(Duration::from_millis(10)))
//!     .build()
//!     .unwrap();
//! manager.start().unwrap();
//!
//! manager.submit("start").await.unwrap();
//! assert_eq!(manager.current_state(), State::Processing);
//!
//! let err = manager.submit("reset").await.unwrap_err();
//! assert!(matches!(err, FsmError::InvalidTransition { .. }));
//!
//! manager.stop().await;
//! # });
//! ```

pub mod core;
pub mod error;
pub mod manager;
pub mod notify;
pub mod work;

// Re-export commonly used types
pub use crate::core::{State, StateHistory, StateTransition, TransitionTable};
pub use error::FsmError;
pub use manager::{Manager, ManagerBuilder, ManagerConfig};
pub use notify::{StateChange, StateObserver, TracingObserver};
