use crate::cli::output::Output;
use crate::config::get_config_file;
use crate::errors::Result;

/// Show version information
pub async fn run() -> Result<()> {
    Output::section("bbfetch");
    Output::sub_item(format!("Version: {}", env!("CARGO_PKG_VERSION")));
    Output::sub_item(format!("Description: {}", env!("CARGO_PKG_DESCRIPTION")));

    Output::section("Build Information");
    Output::sub_item(format!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION")));
    Output::sub_item(format!("Target: {}", std::env::consts::ARCH));
    Output::sub_item(format!("OS: {}", std::env::consts::OS));

    #[cfg(debug_assertions)]
    Output::sub_item("Build type: Debug");
    #[cfg(not(debug_assertions))]
    Output::sub_item("Build type: Release");

    if let Ok(config_file) = get_config_file() {
        Output::section("Configuration");
        Output::sub_item(format!("Settings file: {}", config_file.display()));
    }

    Ok(())
}
