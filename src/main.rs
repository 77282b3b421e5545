use clap::Parser;
use dirs::config_dir;
use env_logger::Builder;
use log::LevelFilter;
use mcdeploy::cli::Cli;
use std::fs::OpenOptions;

/** Main entry point for the mcdeploy application
 *
 * # Process Flow
 * 1. Initialize logging system with file output
 * 2. Parse command line arguments using Clap
 * 3. Execute the requested pipeline command
 * 4. Map failures onto per-component exit codes
 *
 * # Error Handling
 * - Logging failures are non-fatal (fallback to creation)
 * - Clap parsing errors are displayed and exit with proper codes
 * - Pipeline errors are printed to stderr and mapped to their
 *   component exit code so CI can tell a config mistake from a
 *   failed download
 *
 * # Example
 * ```bash
 * # Run with default logging
 * mcdeploy --help
 *
 * # Execute specific command
 * mcdeploy compile --config mctoolchain.json
 * ```
 */
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging before any other operations
    init_logging().await;

    // Parse command line arguments with error handling
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Print clap error message to stderr
            e.print().expect("Failed to print clap error");
            std::process::exit(e.exit_code());
        }
    };

    // Execute the parsed command
    if let Err(e) = cli.execute().await {
        eprintln!("[Error] {}", e);
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

/** Initializes the logging system with file-based output
 *
 * # Configuration
 * - Log file location: platform-specific config directory
 * - Log level: Info and above
 * - Output: Append mode to preserve historical logs
 * - Fallback: Current directory if config directory unavailable
 *
 * # Directory Structure
 * - Linux: `~/.config/mcdeploy/mcdeploy.log`
 * - macOS: `~/Library/Application Support/mcdeploy/mcdeploy.log`
 * - Windows: `%APPDATA%\mcdeploy\mcdeploy.log`
 *
 * # Notes
 * - Creates directory structure if it doesn't exist
 * - Falls back to current directory if config directory inaccessible
 * - Console output stays reserved for the progress reporting
 */
async fn init_logging() {
    let log_file = get_log_file_path();

    // Ensure log directory exists
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).ok(); // Non-fatal if directory creation fails
    }

    // Configure and initialize the logger
    Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(
            OpenOptions::new()
                .create(true) // Create file if it doesn't exist
                .append(true) // Append to existing logs
                .open(&log_file)
                .unwrap_or_else(|_| {
                    // Fallback: create new file if open fails
                    std::fs::File::create(&log_file).expect("Failed to create log file")
                }),
        )))
        .filter_level(LevelFilter::Info) // Log info level and above
        .init();

    log::info!("mcdeploy started");
}

/** Determines the appropriate log file path based on platform
 *
 * # Returns
 * - Platform-specific config directory path when available
 * - Current working directory as fallback
 * - Direct filename as last resort
 *
 * # Platform Support
 * - **Linux**: Follows XDG Base Directory specification
 * - **macOS**: Uses Application Support directory
 * - **Windows**: Uses AppData/Roaming directory
 * - **Fallback**: Current working directory
 *
 * # Notes
 * - Respects platform conventions for configuration files
 * - Gracefully handles missing config directories
 */
fn get_log_file_path() -> std::path::PathBuf {
    if let Some(config_dir) = config_dir() {
        // Use platform-specific config directory
        config_dir.join("mcdeploy").join("mcdeploy.log")
    } else {
        // Fallback to current directory
        std::env::current_dir()
            .map(|p| p.join("mcdeploy.log"))
            .unwrap_or_else(|_| "mcdeploy.log".into())
    }
}

/*
 * Performance and Design Considerations:
 *
 * 1. Async Runtime:
 *    - Uses `current_thread` flavor for lightweight operations
 *    - Downloads and filesystem work are awaited sequentially, the
 *      external build scripts dominate the wall clock anyway
 *    - Lower memory overhead compared to multi-threaded runtime
 *
 * 2. Error Handling:
 *    - Non-fatal logging initialization failures
 *    - Proper exit codes for command line errors
 *    - Each pipeline component owns a distinct exit code, stderr
 *      carries the human-readable cause
 *
 * 3. Logging Strategy:
 *    - File-based logging for persistence
 *    - Append mode to preserve history across runs
 *    - Platform-appropriate directory structure
 *
 * 4. Maintenance:
 *    - Centralized logging configuration
 *    - Clear separation of concerns
 *    - Easy to modify log levels or destinations
 */
