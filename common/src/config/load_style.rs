use serde::{Deserialize, Serialize};

/// How a `Config` was produced. Carried alongside the parsed value so a
/// caller that later needs to re-save the config (the GUI host's editor)
/// knows which serializer round-trips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStyle {
    /// Parsed from a JSON config file on disk.
    Json,

    /// Not loaded from any file; produced by `Config::default()` or a
    /// CLI-argument overlay.
    Default,
}
