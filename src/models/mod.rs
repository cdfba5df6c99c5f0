//! Data models for options and trigger context.

pub mod context;
pub mod options;

pub use context::{ClickInfo, ImageContext, PageContext, SelectionContext, Tab, TriggerKind};
pub use options::{
    ActionButton, ImageAltTarget, ImageLinkTarget, OptionKey, OptionSetting, Options,
    PartialOptions, DEFAULT_OPTIONS,
};
