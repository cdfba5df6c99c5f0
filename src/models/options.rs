//! Option schema, defaults and validation.
//!
//! Stored values are raw JSON primitives. Nothing read from storage is trusted
//! until it has been validated here: a field that is missing or outside its
//! domain is dropped from the partial result, and [`validate_complete`] fills
//! the gaps with [`DEFAULT_OPTIONS`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// How a copied image is wrapped in a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageLinkTarget {
    NoLink,
    LinkToPage,
    LinkToImage,
}

impl ImageLinkTarget {
    pub const ALL: [ImageLinkTarget; 3] = [Self::NoLink, Self::LinkToPage, Self::LinkToImage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoLink => "no-link",
            Self::LinkToPage => "link-to-page",
            Self::LinkToImage => "link-to-image",
        }
    }

    /// Next value in domain order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::NoLink => Self::LinkToPage,
            Self::LinkToPage => Self::LinkToImage,
            Self::LinkToImage => Self::NoLink,
        }
    }
}

/// Where image alt text comes from when the image has none of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageAltTarget {
    Alt,
    AltFallbackTitle,
    AltFallbackFilename,
}

impl ImageAltTarget {
    pub const ALL: [ImageAltTarget; 3] = [Self::Alt, Self::AltFallbackTitle, Self::AltFallbackFilename];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alt => "alt",
            Self::AltFallbackTitle => "alt-fallback-title",
            Self::AltFallbackFilename => "alt-fallback-filename",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Alt => Self::AltFallbackTitle,
            Self::AltFallbackTitle => Self::AltFallbackFilename,
            Self::AltFallbackFilename => Self::Alt,
        }
    }
}

/// What the toolbar action button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionButton {
    Popup,
    Copy,
}

impl ActionButton {
    pub const ALL: [ActionButton; 2] = [Self::Popup, Self::Copy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Popup => "popup",
            Self::Copy => "copy",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Popup => Self::Copy,
            Self::Copy => Self::Popup,
        }
    }
}

impl FromStr for ImageLinkTarget {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

impl FromStr for ImageAltTarget {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

impl FromStr for ActionButton {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

/// Name of a recognized option field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    EnableLink,
    EnableImage,
    EnablePage,
    ImageLinkTarget,
    ImageAltTarget,
    PrivacyRemoveTracking,
    ActionButton,
}

impl OptionKey {
    pub const ALL: [OptionKey; 7] = [
        Self::EnableLink,
        Self::EnableImage,
        Self::EnablePage,
        Self::ImageLinkTarget,
        Self::ImageAltTarget,
        Self::PrivacyRemoveTracking,
        Self::ActionButton,
    ];

    /// Storage key, as persisted by the host.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnableLink => "enable-link",
            Self::EnableImage => "enable-image",
            Self::EnablePage => "enable-page",
            Self::ImageLinkTarget => "image-link-target",
            Self::ImageAltTarget => "image-alt-target",
            Self::PrivacyRemoveTracking => "privacy-remove-tracking",
            Self::ActionButton => "action-button",
        }
    }

    /// Human-readable description shown on the options screen.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnableLink => "Show copy link when links are right clicked",
            Self::EnableImage => "Show copy image link when images are right clicked",
            Self::EnablePage => "Show copy page when an empty spot on a page is right clicked",
            Self::ImageLinkTarget => "Should images be wrapped in a link?",
            Self::ImageAltTarget => "The image alt text should use",
            Self::PrivacyRemoveTracking => "Remove tracking parameters from URLs",
            Self::ActionButton => "What to do when the action button is clicked",
        }
    }

    /// Legal values, as accepted by [`OptionSetting::parse`].
    pub fn domain(&self) -> Vec<&'static str> {
        match self {
            Self::EnableLink | Self::EnableImage | Self::EnablePage | Self::PrivacyRemoveTracking => {
                vec!["true", "false"]
            }
            Self::ImageLinkTarget => ImageLinkTarget::ALL.iter().map(|v| v.as_str()).collect(),
            Self::ImageAltTarget => ImageAltTarget::ALL.iter().map(|v| v.as_str()).collect(),
            Self::ActionButton => ActionButton::ALL.iter().map(|v| v.as_str()).collect(),
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| OptionParseError::UnknownKey(s.to_string()))
    }
}

/// Errors from parsing user-supplied option text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionParseError {
    #[error("unknown option '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for {key}: expected one of {expected}")]
    InvalidValue {
        key: OptionKey,
        value: String,
        expected: String,
    },
}

/// A single option field together with a domain-valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSetting {
    EnableLink(bool),
    EnableImage(bool),
    EnablePage(bool),
    ImageLinkTarget(ImageLinkTarget),
    ImageAltTarget(ImageAltTarget),
    PrivacyRemoveTracking(bool),
    ActionButton(ActionButton),
}

impl OptionSetting {
    pub fn key(&self) -> OptionKey {
        match self {
            Self::EnableLink(_) => OptionKey::EnableLink,
            Self::EnableImage(_) => OptionKey::EnableImage,
            Self::EnablePage(_) => OptionKey::EnablePage,
            Self::ImageLinkTarget(_) => OptionKey::ImageLinkTarget,
            Self::ImageAltTarget(_) => OptionKey::ImageAltTarget,
            Self::PrivacyRemoveTracking(_) => OptionKey::PrivacyRemoveTracking,
            Self::ActionButton(_) => OptionKey::ActionButton,
        }
    }

    /// The documented default for `key`.
    pub fn default_for(key: OptionKey) -> Self {
        DEFAULT_OPTIONS.setting(key)
    }

    /// Validate a raw stored value against the domain of `key`.
    pub fn from_json(key: OptionKey, value: &Value) -> Option<Self> {
        match key {
            OptionKey::EnableLink => value.as_bool().map(Self::EnableLink),
            OptionKey::EnableImage => value.as_bool().map(Self::EnableImage),
            OptionKey::EnablePage => value.as_bool().map(Self::EnablePage),
            OptionKey::PrivacyRemoveTracking => value.as_bool().map(Self::PrivacyRemoveTracking),
            OptionKey::ImageLinkTarget => value
                .as_str()
                .and_then(|s| s.parse().ok())
                .map(Self::ImageLinkTarget),
            OptionKey::ImageAltTarget => value
                .as_str()
                .and_then(|s| s.parse().ok())
                .map(Self::ImageAltTarget),
            OptionKey::ActionButton => value
                .as_str()
                .and_then(|s| s.parse().ok())
                .map(Self::ActionButton),
        }
    }

    /// Raw value as persisted by the host.
    pub fn to_json(&self) -> Value {
        match self {
            Self::EnableLink(v)
            | Self::EnableImage(v)
            | Self::EnablePage(v)
            | Self::PrivacyRemoveTracking(v) => Value::Bool(*v),
            Self::ImageLinkTarget(v) => Value::String(v.as_str().to_string()),
            Self::ImageAltTarget(v) => Value::String(v.as_str().to_string()),
            Self::ActionButton(v) => Value::String(v.as_str().to_string()),
        }
    }

    /// Parse command-line text for `key`.
    pub fn parse(key: OptionKey, text: &str) -> Result<Self, OptionParseError> {
        let value = match key {
            OptionKey::ImageLinkTarget | OptionKey::ImageAltTarget | OptionKey::ActionButton => {
                Value::String(text.to_string())
            }
            _ => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Null,
            },
        };

        Self::from_json(key, &value).ok_or_else(|| OptionParseError::InvalidValue {
            key,
            value: text.to_string(),
            expected: key.domain().join(", "),
        })
    }

    /// Flip a boolean, or step an enumerated value to the next one in its domain.
    pub fn cycled(self) -> Self {
        match self {
            Self::EnableLink(v) => Self::EnableLink(!v),
            Self::EnableImage(v) => Self::EnableImage(!v),
            Self::EnablePage(v) => Self::EnablePage(!v),
            Self::PrivacyRemoveTracking(v) => Self::PrivacyRemoveTracking(!v),
            Self::ImageLinkTarget(v) => Self::ImageLinkTarget(v.next()),
            Self::ImageAltTarget(v) => Self::ImageAltTarget(v.next()),
            Self::ActionButton(v) => Self::ActionButton(v.next()),
        }
    }
}

impl fmt::Display for OptionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnableLink(v)
            | Self::EnableImage(v)
            | Self::EnablePage(v)
            | Self::PrivacyRemoveTracking(v) => write!(f, "{}", v),
            Self::ImageLinkTarget(v) => f.write_str(v.as_str()),
            Self::ImageAltTarget(v) => f.write_str(v.as_str()),
            Self::ActionButton(v) => f.write_str(v.as_str()),
        }
    }
}

/// The fully-populated option record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Options {
    pub enable_link: bool,
    pub enable_image: bool,
    pub enable_page: bool,
    pub image_link_target: ImageLinkTarget,
    pub image_alt_target: ImageAltTarget,
    pub privacy_remove_tracking: bool,
    pub action_button: ActionButton,
}

pub const DEFAULT_OPTIONS: Options = Options {
    enable_link: true,
    enable_image: true,
    enable_page: true,
    image_link_target: ImageLinkTarget::LinkToPage,
    image_alt_target: ImageAltTarget::AltFallbackTitle,
    privacy_remove_tracking: true,
    action_button: ActionButton::Popup,
};

impl Default for Options {
    fn default() -> Self {
        DEFAULT_OPTIONS
    }
}

impl Options {
    pub fn setting(&self, key: OptionKey) -> OptionSetting {
        match key {
            OptionKey::EnableLink => OptionSetting::EnableLink(self.enable_link),
            OptionKey::EnableImage => OptionSetting::EnableImage(self.enable_image),
            OptionKey::EnablePage => OptionSetting::EnablePage(self.enable_page),
            OptionKey::ImageLinkTarget => OptionSetting::ImageLinkTarget(self.image_link_target),
            OptionKey::ImageAltTarget => OptionSetting::ImageAltTarget(self.image_alt_target),
            OptionKey::PrivacyRemoveTracking => {
                OptionSetting::PrivacyRemoveTracking(self.privacy_remove_tracking)
            }
            OptionKey::ActionButton => OptionSetting::ActionButton(self.action_button),
        }
    }

    pub fn apply(&mut self, setting: OptionSetting) {
        match setting {
            OptionSetting::EnableLink(v) => self.enable_link = v,
            OptionSetting::EnableImage(v) => self.enable_image = v,
            OptionSetting::EnablePage(v) => self.enable_page = v,
            OptionSetting::ImageLinkTarget(v) => self.image_link_target = v,
            OptionSetting::ImageAltTarget(v) => self.image_alt_target = v,
            OptionSetting::PrivacyRemoveTracking(v) => self.privacy_remove_tracking = v,
            OptionSetting::ActionButton(v) => self.action_button = v,
        }
    }

    pub fn settings(&self) -> Vec<OptionSetting> {
        OptionKey::ALL.iter().map(|k| self.setting(*k)).collect()
    }
}

/// A subset of option fields, each already domain-valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_link: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_image: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_page: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link_target: Option<ImageLinkTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt_target: Option<ImageAltTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_remove_tracking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_button: Option<ActionButton>,
}

impl PartialOptions {
    pub fn get(&self, key: OptionKey) -> Option<OptionSetting> {
        match key {
            OptionKey::EnableLink => self.enable_link.map(OptionSetting::EnableLink),
            OptionKey::EnableImage => self.enable_image.map(OptionSetting::EnableImage),
            OptionKey::EnablePage => self.enable_page.map(OptionSetting::EnablePage),
            OptionKey::ImageLinkTarget => self.image_link_target.map(OptionSetting::ImageLinkTarget),
            OptionKey::ImageAltTarget => self.image_alt_target.map(OptionSetting::ImageAltTarget),
            OptionKey::PrivacyRemoveTracking => self
                .privacy_remove_tracking
                .map(OptionSetting::PrivacyRemoveTracking),
            OptionKey::ActionButton => self.action_button.map(OptionSetting::ActionButton),
        }
    }

    pub fn insert(&mut self, setting: OptionSetting) {
        match setting {
            OptionSetting::EnableLink(v) => self.enable_link = Some(v),
            OptionSetting::EnableImage(v) => self.enable_image = Some(v),
            OptionSetting::EnablePage(v) => self.enable_page = Some(v),
            OptionSetting::ImageLinkTarget(v) => self.image_link_target = Some(v),
            OptionSetting::ImageAltTarget(v) => self.image_alt_target = Some(v),
            OptionSetting::PrivacyRemoveTracking(v) => self.privacy_remove_tracking = Some(v),
            OptionSetting::ActionButton(v) => self.action_button = Some(v),
        }
    }

    /// Builder form of [`PartialOptions::insert`].
    pub fn with(mut self, setting: OptionSetting) -> Self {
        self.insert(setting);
        self
    }

    /// Fields that are present, in schema order.
    pub fn settings(&self) -> Vec<OptionSetting> {
        OptionKey::ALL.iter().filter_map(|k| self.get(*k)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.settings().is_empty()
    }

    /// Fill every absent field with its default.
    pub fn complete(&self) -> Options {
        let mut options = DEFAULT_OPTIONS;
        for setting in self.settings() {
            options.apply(setting);
        }
        options
    }

    /// Raw key/value entries ready to hand to the host store.
    pub fn to_entries(&self) -> Map<String, Value> {
        self.settings()
            .into_iter()
            .map(|s| (s.key().as_str().to_string(), s.to_json()))
            .collect()
    }
}

impl From<Options> for PartialOptions {
    fn from(options: Options) -> Self {
        options
            .settings()
            .into_iter()
            .fold(Self::default(), |partial, s| partial.with(s))
    }
}

impl From<OptionSetting> for PartialOptions {
    fn from(setting: OptionSetting) -> Self {
        Self::default().with(setting)
    }
}

/// Validate raw values, keeping only fields that are present and well-typed.
pub fn validate(candidate: &Map<String, Value>) -> PartialOptions {
    let mut partial = PartialOptions::default();

    for key in OptionKey::ALL {
        let Some(raw) = candidate.get(key.as_str()) else {
            continue;
        };

        match OptionSetting::from_json(key, raw) {
            Some(setting) => partial.insert(setting),
            None if key == OptionKey::ImageAltTarget && raw.as_str() == Some("none") => {
                warn!(
                    key = key.as_str(),
                    "stored value 'none' is not part of the option schema, using default"
                );
            }
            None => {
                debug!(key = key.as_str(), value = %raw, "dropping out-of-domain option value");
            }
        }
    }

    partial
}

/// Validate raw values and substitute the default for every missing or invalid field.
pub fn validate_complete(raw: &Map<String, Value>) -> Options {
    validate(raw).complete()
}
