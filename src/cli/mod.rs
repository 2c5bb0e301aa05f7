//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | List | Shopping lists | `list new`, `list ls`, `list show` |
//! | Item | Items within a list | `item add`, `item done`, `item mv` |
//! | Share | Export for messaging | `share`, `share --csv` |
//! | Suggest | Autocomplete from history | `suggest mil` |
//! | Plan | Subscription tier | `plan status`, `plan upgrade` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. `BASKET_LOG` takes an
//! `EnvFilter` directive; `--verbose` turns on debug events for this crate:
//! ```bash
//! basket --verbose list ls
//! BASKET_LOG=basket_cli=trace basket share Weekly
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod gate;
mod list;
mod item;
mod share;
mod plan;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
