pub mod pattern;
pub mod filter;
pub mod file_walker;
pub mod workers;
pub mod collector;
pub mod finder;

pub use pattern::NamePattern;
pub use filter::{EntryFilter, TypeFilter};
pub use file_walker::{TraversalErrorPolicy, TraversalProducer};
pub use workers::WorkerPool;
pub use collector::Collector;
pub use finder::{Finder, SearchConfig, SearchReport};
