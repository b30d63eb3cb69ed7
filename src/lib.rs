//! RandomGen - query-driven random data for launcher-style hosts
//!
//! A query such as `rd password 16` or `rd lorem 5` is normalized, matched
//! against a fixed command registry and turned into a ranked list of
//! results. Unknown or partial commands produce autocomplete suggestions; an
//! empty query produces the help listing.
//!
//! # Layout
//! - [`query`]: tokenizing and keyword cleanup
//! - [`registry`]: the command table (names, aliases, usage, examples)
//! - [`dispatch`]: exact generation, suggestion ranking, help
//! - [`generators`] / [`secure`] / [`faker`]: value producers
//! - [`cache`]: short-lived replay cache with a background sweeper
//! - [`service`]: [`RandomGen`], the engine a host embeds
//!
//! # Example
//! ```no_run
//! use randomgen::{Config, RandomGen};
//!
//! let engine = RandomGen::new(&Config::default());
//! engine.start();
//! for result in engine.query("rd password 16") {
//!     println!("{} - {}", result.title, result.subtitle);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod faker;
pub mod generators;
pub mod host;
pub mod query;
pub mod registry;
pub mod result;
pub mod secure;
pub mod service;

pub use cache::{CachePolicy, Clock, ManualClock, ResultCache, SystemClock};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{ConfigError, GenerationError, HostError};
pub use faker::{FakeData, Locale, LocaleFaker};
pub use host::{Host, TerminalHost};
pub use query::{normalize, NormalizedCommand, QueryNormalizer};
pub use result::{ContextMenuEntry, GeneratedResult, MenuAction, ResultAction, ResultKind};
pub use service::RandomGen;
