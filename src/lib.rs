//! Server-side core of a persistent, multi-tenant Diplomacy service.
//!
//! The crate divides into two halves. The rules half ([`geo`], [`order`],
//! [`parser`], [`adjudicator`]) is pure and synchronous: it turns a map, a
//! set of units, and a set of orders into the unique legal outcome for a
//! phase. The service half ([`game`], [`store`], [`service`], [`scheduler`])
//! drives many concurrent games through their phases under wall-clock
//! deadlines, persisting every transition.
//!
//! Transport, rendering, and identity resolution belong to the caller; the
//! core surfaces a programmatic API ([`service::Core`]) and an outbound
//! notification hook ([`notify::Notifier`]).

pub mod adjudicator;
pub mod config;
pub mod error;
pub mod game;
pub mod geo;
pub mod logging;
pub mod notify;
pub mod order;
pub mod parser;
pub mod power;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod time;
pub mod unit;

pub use crate::error::Error;
pub use crate::power::Power;
pub use crate::time::{Phase, PhaseKind, Season};
pub use crate::unit::{Deployment, Unit, UnitKind, UnitPosition};
