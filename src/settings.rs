// src/settings.rs

//! The settings JSON document shared by the formatter component factory
//! and the WebSocket sink.
//!
//! Schema:
//!
//! ```json
//! {
//!   "components": [ { "type": "timestamp|level|tid|loc|msg|color",
//!                     "enabled": true,
//!                     "format": "…",           // loc only
//!                     "level_colors": { … } }  // color only
//!                 ],
//!   "websocket":  [ { "url": "ws://…",
//!                     "message_deflate_en": false,
//!                     "ping_interval": 30,
//!                     "handshake_timeout": 5 } ]
//! }
//! ```
//!
//! A missing file is not an error to this module; [`Settings::from_path`]
//! returns `Ok(None)` so callers can substitute their defaults. A file
//! that exists but cannot be read or parsed is a hard error.

use crate::common::{FPath, LogError, LogResult};

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

extern crate serde;
use serde::Deserialize;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

/// Default path of the settings document, relative to the process working
/// directory. Overridable per-call throughout the crate.
pub const SETTINGS_FILE_PATH: &str = "config/sallib_settings.json";

/// Map of lowercase level name to color name, the `level_colors` object
/// of a `color` component.
pub type LevelColorMap = BTreeMap<String, String>;

/// One entry of the `components` array.
#[derive(Clone, Debug, Deserialize)]
pub struct ComponentSpec {
    /// `timestamp`, `level`, `tid`, `loc`, `msg`, or `color`;
    /// unrecognized types are skipped
    #[serde(rename = "type")]
    pub kind: String,
    /// a component with `enabled: false` is skipped
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// render template; `loc` only
    #[serde(default)]
    pub format: Option<String>,
    /// level to color-name map; `color` only
    #[serde(default)]
    pub level_colors: Option<LevelColorMap>,
}

/// One entry of the `websocket` array.
#[derive(Clone, Debug, Deserialize)]
pub struct WsEndpoint {
    pub url: String,
    /// permessage-deflate negotiation flag, kept for settings-file
    /// compatibility (see the websocket sink for transport support)
    #[serde(default)]
    pub message_deflate_en: bool,
    /// keepalive ping interval, seconds; `0` disables pings
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    /// connect and handshake timeout, seconds
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: u64,
}

/// The whole settings document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub components: Option<Vec<ComponentSpec>>,
    #[serde(default)]
    pub websocket: Option<Vec<WsEndpoint>>,
}

const fn default_enabled() -> bool {
    true
}

const fn default_ping_interval() -> u64 {
    30
}

const fn default_handshake_timeout() -> u64 {
    5
}

impl Settings {
    /// Load and parse the settings document at `path`.
    ///
    /// Returns `Ok(None)` when no file exists at `path`. Returns
    /// [`IoFailure`] when the file exists but cannot be read, and
    /// [`BadSettings`] when it cannot be parsed; neither of those is
    /// substituted with defaults.
    ///
    /// [`IoFailure`]: crate::common::LogError#variant.IoFailure
    /// [`BadSettings`]: crate::common::LogError#variant.BadSettings
    pub fn from_path(path: &FPath) -> LogResult<Option<Settings>> {
        defn!("({:?})", path);
        let path_std: &Path = Path::new(path);
        let contents: String = match std::fs::read_to_string(path_std) {
            Ok(val) => val,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                defx!("({:?}) no such file", path);
                return Ok(None);
            }
            Err(err) => {
                defx!("({:?}) read error {}", path, err);
                return Err(LogError::io(path_std, err));
            }
        };

        let settings: Settings = match serde_json::from_str(contents.as_str()) {
            Ok(val) => val,
            Err(err) => {
                defx!("({:?}) parse error {}", path, err);
                return Err(LogError::BadSettings(format!("{}: {}", path, err)));
            }
        };
        defx!("({:?}) parsed", path);

        Ok(Some(settings))
    }
}
