use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::run_replay;
use crate::args::{DEFAULT_CONFIG_FILES, ReplayArgs};
use crate::error::AppResult;

/// Parses arguments, merges the config file, and runs the replay.
///
/// # Errors
///
/// Returns an error when arguments or config are invalid, the session
/// cannot be loaded, or the terminal fails.
pub fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };
    apply_config(&mut args, &matches)?;

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_replay(&args))
}

fn parse_args() -> AppResult<Option<(ReplayArgs, ArgMatches)>> {
    let mut cmd = ReplayArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = ReplayArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn apply_config(args: &mut ReplayArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::should_show_help;

    #[test]
    fn help_is_shown_only_without_arguments() {
        let bare = [OsString::from("paddock")];
        let separator = [OsString::from("paddock"), OsString::from("--")];
        let with_session = [OsString::from("paddock"), OsString::from("-s9158")];
        assert!(should_show_help(&bare));
        assert!(should_show_help(&separator));
        assert!(!should_show_help(&with_session));
    }
}
