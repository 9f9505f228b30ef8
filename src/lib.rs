pub mod config;
pub mod copy;
pub mod errors;
pub mod formatter;
pub mod ignore;
pub mod logger;
pub mod pack;
pub mod reporting;
pub mod sniff;
pub mod trie;
pub mod utils;
pub mod walker;

pub use config::PackConfig;
pub use errors::PackError;
pub use formatter::Formatter;
pub use ignore::{IgnorePattern, IgnoreRuleSet, RuleScope};
pub use pack::{pack_directory, run, PackedContext};
pub use walker::{IncludedFile, Walker};
