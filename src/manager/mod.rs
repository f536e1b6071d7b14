//! Single-writer runtime around the core state machine.
//!
//! - `Manager` is the public handle: lifecycle, submission, snapshots
//! - The event processor is the only task that writes state
//! - The state monitor forwards notifications to an observer on its own task
//!
//! ```text
//! submit ──► bounded queue ──► processor ──► state cell
//!    ▲                            │  └──────► notification slot ──► monitor ──► observer
//!    └──────── one-shot reply ◄───┘
//! ```

mod cell;
mod config;
mod event;
mod facade;
mod monitor;
mod processor;

pub use config::ManagerConfig;
pub use event::EventResponse;
pub use facade::{Manager, ManagerBuilder};
