//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! caserec validate cases.sql
//! caserec iterations cases.sql --first --format json
//! caserec layout set cases.sql '{"panels": []}'
//! caserec poll cases.sql --since 12
//! caserec get cases.sql driver_metadata
//! ```

mod core;


pub use core::{
    parse_args, Cli, Command, FileArgs, GetArgs, IterationsArgs, LayoutAction, LayoutArgs,
    LayoutSetArgs, PollArgs,
};
