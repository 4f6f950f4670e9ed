#![forbid(unsafe_code)]

//! Modal configuration and layered option resolution.
//!
//! Options come from up to four layers, later layers winning field by field:
//!
//! 1. host defaults ([`ModalOptions::default`] or policy files loaded with
//!    [`ModalOptions::from_toml_str`] / [`ModalOptions::from_json_str`]),
//! 2. options declared on the dialog element (`data-*` attributes),
//! 3. options declared on the activating trigger element,
//! 4. call-site overrides passed to [`ModalHost::open`](super::ModalHost::open).
//!
//! Layers 2–4 are partial ([`ModalOptionsPatch`]); only the fields they set
//! take part in the merge.
//!
//! # Declarative attributes
//!
//! | Attribute | Values |
//! |-----------|--------|
//! | `data-backdrop` | `true`, `false`, `static` |
//! | `data-keyboard` | `true`, `false` |
//! | `data-show` | `true`, `false` |
//! | `data-remote` | URL, or `false` / empty to disable |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use modalkit_core::document::{Document, ElementId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Default duration of the dialog's own transition.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(300);

/// Default duration of the backdrop fade.
pub const BACKDROP_TRANSITION_DURATION: Duration = Duration::from_millis(150);

/// Errors raised while reading modal configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for modal option `{key}`")]
    InvalidValue { key: &'static str, value: String },
    #[error("unknown modal verb {0:?} (expected show, hide or toggle)")]
    UnknownVerb(String),
    #[error("invalid TOML modal policy: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON modal policy: {0}")]
    Json(#[from] serde_json::Error),
}

/// Backdrop behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "BackdropRepr", into = "BackdropRepr")]
pub enum BackdropMode {
    /// Darken the page; a click on the backdrop dismisses the dialog.
    #[default]
    Dismissible,
    /// Darken the page; backdrop clicks refocus the dialog instead.
    Static,
    /// No backdrop at all.
    Disabled,
}

impl BackdropMode {
    /// Whether a backdrop element is created.
    #[inline]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl FromStr for BackdropMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "true" => Ok(Self::Dismissible),
            "false" => Ok(Self::Disabled),
            "static" => Ok(Self::Static),
            other => Err(ConfigError::InvalidValue {
                key: "backdrop",
                value: other.to_owned(),
            }),
        }
    }
}

/// Wire form of [`BackdropMode`]: `true`, `false` or `"static"`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BackdropRepr {
    Flag(bool),
    Mode(String),
}

impl TryFrom<BackdropRepr> for BackdropMode {
    type Error = ConfigError;

    fn try_from(repr: BackdropRepr) -> Result<Self, Self::Error> {
        match repr {
            BackdropRepr::Flag(true) => Ok(Self::Dismissible),
            BackdropRepr::Flag(false) => Ok(Self::Disabled),
            BackdropRepr::Mode(mode) => mode.parse(),
        }
    }
}

impl From<BackdropMode> for BackdropRepr {
    fn from(mode: BackdropMode) -> Self {
        match mode {
            BackdropMode::Dismissible => Self::Flag(true),
            BackdropMode::Disabled => Self::Flag(false),
            BackdropMode::Static => Self::Mode("static".to_owned()),
        }
    }
}

/// Fully resolved options of one dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModalOptions {
    pub backdrop: BackdropMode,
    /// Escape dismisses the dialog.
    pub keyboard: bool,
    /// Open as soon as the controller is created through a config call.
    pub show: bool,
    /// URL whose content replaces the dialog's content region.
    #[serde(
        deserialize_with = "remote_source",
        skip_serializing_if = "Option::is_none"
    )]
    pub remote: Option<String>,
    #[serde(rename = "transition_ms", with = "duration_ms")]
    pub transition: Duration,
    #[serde(rename = "backdrop_transition_ms", with = "duration_ms")]
    pub backdrop_transition: Duration,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            backdrop: BackdropMode::Dismissible,
            keyboard: true,
            show: true,
            remote: None,
            transition: TRANSITION_DURATION,
            backdrop_transition: BACKDROP_TRANSITION_DURATION,
        }
    }
}

impl ModalOptions {
    /// Load defaults from a TOML policy document.
    ///
    /// ```
    /// # use modalkit_widgets::modal::{BackdropMode, ModalOptions};
    /// let opts = ModalOptions::from_toml_str("backdrop = \"static\"\ntransition_ms = 200").unwrap();
    /// assert_eq!(opts.backdrop, BackdropMode::Static);
    /// assert!(opts.keyboard);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load defaults from a JSON policy document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Apply `layers` in order on top of `self`.
    #[must_use]
    pub fn layered<'a>(&self, layers: impl IntoIterator<Item = &'a ModalOptionsPatch>) -> Self {
        let mut resolved = self.clone();
        for layer in layers {
            layer.apply_to(&mut resolved);
        }
        resolved
    }

    pub fn backdrop(mut self, backdrop: BackdropMode) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn remote(mut self, url: impl Into<String>) -> Self {
        self.remote = Some(url.into());
        self
    }

    pub fn transition(mut self, duration: Duration) -> Self {
        self.transition = duration;
        self
    }

    pub fn backdrop_transition(mut self, duration: Duration) -> Self {
        self.backdrop_transition = duration;
        self
    }
}

/// Partial options: one configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalOptionsPatch {
    pub backdrop: Option<BackdropMode>,
    pub keyboard: Option<bool>,
    pub show: Option<bool>,
    /// `Some(None)` explicitly disables a remote source set by a lower layer.
    pub remote: Option<Option<String>>,
}

impl ModalOptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backdrop(mut self, backdrop: BackdropMode) -> Self {
        self.backdrop = Some(backdrop);
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = Some(show);
        self
    }

    pub fn remote(mut self, url: impl Into<String>) -> Self {
        self.remote = Some(Some(url.into()));
        self
    }

    pub fn no_remote(mut self) -> Self {
        self.remote = Some(None);
        self
    }

    /// Whether the layer sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields this layer sets.
    pub fn apply_to(&self, options: &mut ModalOptions) {
        if let Some(backdrop) = self.backdrop {
            options.backdrop = backdrop;
        }
        if let Some(keyboard) = self.keyboard {
            options.keyboard = keyboard;
        }
        if let Some(show) = self.show {
            options.show = show;
        }
        if let Some(remote) = &self.remote {
            options.remote.clone_from(remote);
        }
    }

    /// Read the options declared with `data-*` attributes on `el`.
    pub fn from_element(doc: &Document, el: ElementId) -> Result<Self, ConfigError> {
        let mut patch = Self::default();
        if let Some(value) = doc.data(el, "backdrop") {
            patch.backdrop = Some(value.parse()?);
        }
        if let Some(value) = doc.data(el, "keyboard") {
            patch.keyboard = Some(parse_flag("keyboard", value)?);
        }
        if let Some(value) = doc.data(el, "show") {
            patch.show = Some(parse_flag("show", value)?);
        }
        if let Some(value) = doc.data(el, "remote") {
            patch.remote = Some(match value.trim() {
                "" | "false" => None,
                url => Some(url.to_owned()),
            });
        }
        Ok(patch)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            value: other.to_owned(),
        }),
    }
}

/// Imperative lifecycle verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalVerb {
    Show,
    Hide,
    Toggle,
}

impl ModalVerb {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for ModalVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModalVerb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "show" => Ok(Self::Show),
            "hide" => Ok(Self::Hide),
            "toggle" => Ok(Self::Toggle),
            other => Err(ConfigError::UnknownVerb(other.to_owned())),
        }
    }
}

/// Second argument of [`ModalHost::open`](super::ModalHost::open): either a
/// configuration layer or a verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Configure(ModalOptionsPatch),
    Verb(ModalVerb),
}

impl From<ModalVerb> for Invocation {
    fn from(verb: ModalVerb) -> Self {
        Self::Verb(verb)
    }
}

impl From<ModalOptionsPatch> for Invocation {
    fn from(patch: ModalOptionsPatch) -> Self {
        Self::Configure(patch)
    }
}

impl FromStr for Invocation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::Verb)
    }
}

fn remote_source<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RemoteRepr {
        Flag(bool),
        Url(String),
    }

    match Option::<RemoteRepr>::deserialize(deserializer)? {
        None | Some(RemoteRepr::Flag(false)) => Ok(None),
        Some(RemoteRepr::Flag(true)) => Err(D::Error::custom("`remote` must be a URL or false")),
        Some(RemoteRepr::Url(url)) if url.trim().is_empty() => Ok(None),
        Some(RemoteRepr::Url(url)) => Ok(Some(url)),
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
