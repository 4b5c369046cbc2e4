//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Extract course syllabi and resource links from the course platform.
///
/// For each class name the syllabus is normalized, every item's downloadable
/// links are extracted, and the catalog is recorded in a local `SQLite`
/// database. The resulting tree is printed as JSON.
#[derive(Parser, Debug)]
#[command(name = "coursedl")]
#[command(author, version, about)]
pub struct Args {
    /// Class names (course slugs) to process, e.g. `machine-learning`
    #[arg(required_unless_present = "list_courses")]
    pub class_names: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Value of the CAUTH session cookie
    #[arg(long, env = "CAUTH", hide_env_values = true)]
    pub cauth: Option<String>,

    /// Catalog database path [default: coursera-dl.db]
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// List enrolled courses and exit
    #[arg(long)]
    pub list_courses: bool,

    /// Reverse the order of modules (Resources stays last)
    #[arg(long)]
    pub reverse: bool,

    /// Subtitle languages, comma separated, or `all` [default: en]
    #[arg(long)]
    pub subtitle_language: Option<String>,

    /// Preferred video resolution, e.g. 720p [default: highest]
    #[arg(long)]
    pub video_resolution: Option<String>,

    /// Extract quizzes, exams, and immediate programming instructions
    #[arg(long)]
    pub download_quizzes: bool,

    /// Extract the first notebook workspace of each course
    #[arg(long)]
    pub download_notebooks: bool,

    /// Keep names close to the original (spaces and parentheses allowed)
    #[arg(long)]
    pub unrestricted_filenames: bool,

    /// MathJax script URL used by rendered HTML pages
    #[arg(long = "mathjax-cdn")]
    pub mathjax_cdn: Option<String>,

    /// Platform API base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Notebook hub base URL
    #[arg(long, hide = true)]
    pub notebook_base: Option<String>,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP request timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,
}
