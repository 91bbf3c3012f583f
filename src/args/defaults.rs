pub(crate) const DEFAULT_USER_AGENT: &str = concat!(
    "paddock-replay/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/paddock-replay/paddock)"
);

/// Config filenames checked in the working directory when `--config` is not
/// given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["paddock.toml", "paddock.json"];
