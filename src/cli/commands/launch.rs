//! Launch command - write the process manifest

use crate::cli::args::LaunchArgs;
use crate::config::Config;
use crate::error::StrataResult;
use crate::launch::LaunchMetadata;

/// Execute the launch command
pub async fn execute(args: LaunchArgs, config: &Config) -> StrataResult<()> {
    let launch = super::build_launch(config);
    launch
        .write_metadata(&LaunchMetadata::new(args.processes))
        .await
}
