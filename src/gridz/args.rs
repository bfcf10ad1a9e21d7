use clap::Parser;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.0" for releases, "0.3.0@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    // Use a static to compute the version string once
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "gridz", bin_name = "gridz", version = get_version())]
#[command(about = "An interactive, searchable data grid for the terminal", long_about = None)]
pub struct Cli {
    /// CSV file to import before the session starts
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Rows per page (overrides the saved preference)
    #[arg(short, long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Where to read and write preferences
    #[arg(long, value_name = "FILE")]
    pub prefs_file: Option<PathBuf>,

    /// Run without loading or saving preferences
    #[arg(long)]
    pub no_prefs: bool,
}
