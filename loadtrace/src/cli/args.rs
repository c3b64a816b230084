//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::config::TraceConfig;
use crate::output::{Destination, FilterConfig, RenderMode, DEFAULT_MAX_LIBRARY_LEVEL};

#[derive(Parser, Debug)]
#[command(
    name = "loadtrace",
    version,
    about = "Trace the time and memory spent loading each module of a program",
    after_help = "\
EXAMPLES:
    loadtrace app/main.src                        Tree trace written to loadtime.log
    loadtrace -E --max-depth 2 app/main.src       Two levels of the tree on stderr
    loadtrace --raw -o loads.csv app/main.src     Comma-separated rows
    loadtrace --stdlib /opt/std -L 2 main.src     Show standard library modules up to a.b"
)]
pub struct Args {
    /// Program to run under tracing
    #[arg(value_name = "PROGRAM")]
    pub program: PathBuf,

    /// Output file name (truncated on start)
    #[arg(short, long, value_name = "FILE", default_value = "loadtime.log")]
    pub output: PathBuf,

    /// Print to stderr instead of file
    #[arg(short = 'E', long)]
    pub print_to_stderr: bool,

    /// Show dependency tree (default)
    #[arg(long, conflicts_with = "raw")]
    pub tree: bool,

    /// Write comma-separated rows instead of a tree
    #[arg(long)]
    pub raw: bool,

    /// Hide loads nested deeper than N
    #[arg(short = 'd', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    /// Hide modules whose dotted name has more than N segments
    #[arg(short = 'l', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_level: Option<u32>,

    /// Like --max-level, for standard library modules only
    #[arg(
        short = 'L',
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_LIBRARY_LEVEL,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_library_level: u32,

    /// Ignore --max-depth, --max-level and --max-library-level
    #[arg(long)]
    pub full: bool,

    /// Extra module search directory (repeatable)
    #[arg(long = "path", value_name = "DIR", env = "LOADTRACE_PATH", value_delimiter = ':')]
    pub search_path: Vec<PathBuf>,

    /// Standard library directory (searched last)
    #[arg(long, value_name = "DIR", env = "LOADTRACE_STDLIB")]
    pub stdlib: Option<PathBuf>,

    /// Also export the unfiltered timeline as Chrome trace JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        if self.raw {
            RenderMode::Raw
        } else {
            RenderMode::Tree
        }
    }

    #[must_use]
    pub fn destination(&self) -> Destination {
        if self.print_to_stderr {
            Destination::Stderr
        } else {
            Destination::File(self.output.clone())
        }
    }

    #[must_use]
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            max_depth: self.max_depth,
            max_level: self.max_level,
            max_library_level: Some(self.max_library_level),
            full: self.full,
        }
    }

    #[must_use]
    pub fn into_config(self) -> TraceConfig {
        TraceConfig {
            destination: self.destination(),
            mode: self.render_mode(),
            filters: self.filter_config(),
            program: self.program,
            search_path: self.search_path,
            stdlib: self.stdlib,
            export: self.export,
        }
    }
}
