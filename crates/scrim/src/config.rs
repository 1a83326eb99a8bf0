#![forbid(unsafe_code)]

//! Option merging and configuration resolution.
//!
//! [`ModalOptions`] is the sparse, host-facing override set: every field is
//! optional, width and content-source values arrive as the strings host
//! markup uses, and unrecognized extra keys ride along untouched.
//! [`ModalConfig::resolve`] merges the overrides onto the defaults, derives
//! an identifier when none was given, and parses the stringly-typed fields
//! — surfacing [`ModalError::InvalidConfiguration`] instead of silently
//! defaulting.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ahash::AHashMap;
use web_time::{SystemTime, UNIX_EPOCH};

use crate::error::ModalError;

/// Transition duration assumed when the host does not configure one,
/// matching the stock CSS transition.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(500);

/// Default close-control label.
pub const DEFAULT_CLOSE_LABEL: &str = "&times;";

/// Namespace prefix for derived identifiers.
pub const IDENTIFIER_PREFIX: &str = "modal-";

/// Counter making derived identifiers unique within the process even when
/// two modals are created in the same millisecond.
static IDENTIFIER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Maximum width preset for the dialog panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WidthVariant {
    #[default]
    Base,
    Fluid,
    Small,
    Large,
}

impl WidthVariant {
    /// The class-name suffix for this variant (`modal_dialog--<suffix>`).
    pub const fn class_suffix(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Fluid => "fluid",
            Self::Small => "s",
            Self::Large => "l",
        }
    }
}

impl FromStr for WidthVariant {
    type Err = ModalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "base" => Ok(Self::Base),
            "fluid" => Ok(Self::Fluid),
            "s" => Ok(Self::Small),
            "l" => Ok(Self::Large),
            other => Err(ModalError::InvalidConfiguration {
                field: "width",
                value: other.to_owned(),
            }),
        }
    }
}

/// How the dialog body markup is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentSource {
    /// Markup supplied inline via the `content` option.
    #[default]
    Inline,
    /// A complete dialog subtree already exists in the document under the
    /// configured identifier.
    ById,
    /// Markup arrives later from a fetch; the dialog opens with placeholder
    /// content and is filled via the content-update path.
    Ajax,
    /// Markup arrives later from a host callback; same update path as
    /// [`ContentSource::Ajax`].
    EventCallback,
}

impl FromStr for ContentSource {
    type Err = ModalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "inline" => Ok(Self::Inline),
            "by-id" => Ok(Self::ById),
            "ajax" => Ok(Self::Ajax),
            "event-callback" => Ok(Self::EventCallback),
            other => Err(ModalError::InvalidConfiguration {
                field: "content-source",
                value: other.to_owned(),
            }),
        }
    }
}

/// Sparse caller overrides for one modal.
///
/// Unset fields fall back to the defaults documented on [`ModalConfig`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModalOptions {
    pub add_close_button: Option<bool>,
    pub allow_backdrop_close: Option<bool>,
    pub allow_escape_close: Option<bool>,
    pub allow_inner_scroll: Option<bool>,
    pub css_class: Option<String>,
    pub close_button_label: Option<String>,
    pub identifier: Option<String>,
    pub content: Option<String>,
    /// Width preset token: `base`, `fluid`, `s`, or `l`.
    pub width: Option<String>,
    /// Content-source token: `inline`, `by-id`, `ajax`, or `event-callback`.
    pub content_source: Option<String>,
    pub transition: Option<Duration>,
    /// Unrecognized keys, carried through without interpretation.
    pub extra: AHashMap<String, String>,
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_close_button(mut self, add: bool) -> Self {
        self.add_close_button = Some(add);
        self
    }

    pub fn allow_backdrop_close(mut self, allow: bool) -> Self {
        self.allow_backdrop_close = Some(allow);
        self
    }

    pub fn allow_escape_close(mut self, allow: bool) -> Self {
        self.allow_escape_close = Some(allow);
        self
    }

    pub fn allow_inner_scroll(mut self, allow: bool) -> Self {
        self.allow_inner_scroll = Some(allow);
        self
    }

    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }

    pub fn close_button_label(mut self, label: impl Into<String>) -> Self {
        self.close_button_label = Some(label.into());
        self
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn content_source(mut self, source: impl Into<String>) -> Self {
        self.content_source = Some(source.into());
        self
    }

    pub fn transition(mut self, transition: Duration) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Attach an unrecognized key; it is carried through to the resolved
    /// config without interpretation.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Fully resolved, immutable configuration for one modal instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModalConfig {
    pub add_close_button: bool,
    pub allow_backdrop_close: bool,
    pub allow_escape_close: bool,
    pub allow_inner_scroll: bool,
    pub css_class: String,
    pub close_button_label: String,
    pub identifier: String,
    pub content: String,
    pub width: WidthVariant,
    pub content_source: ContentSource,
    pub transition: Duration,
    pub extra: AHashMap<String, String>,
}

impl ModalConfig {
    /// Merge `options` over the defaults and validate the result.
    ///
    /// Defaults: close button on, backdrop and escape dismissal on, inner
    /// scroll off, empty css class, `&times;` close label, derived
    /// identifier, empty content, base width, inline content, 500 ms
    /// transition.
    pub fn resolve(options: ModalOptions) -> Result<Self, ModalError> {
        let width = match options.width.as_deref() {
            Some(token) => token.parse()?,
            None => WidthVariant::default(),
        };
        let content_source = match options.content_source.as_deref() {
            Some(token) => token.parse()?,
            None => ContentSource::default(),
        };
        Ok(Self {
            add_close_button: options.add_close_button.unwrap_or(true),
            allow_backdrop_close: options.allow_backdrop_close.unwrap_or(true),
            allow_escape_close: options.allow_escape_close.unwrap_or(true),
            allow_inner_scroll: options.allow_inner_scroll.unwrap_or(false),
            css_class: options.css_class.unwrap_or_default(),
            close_button_label: options
                .close_button_label
                .unwrap_or_else(|| DEFAULT_CLOSE_LABEL.to_owned()),
            identifier: options.identifier.unwrap_or_else(derive_identifier),
            content: options.content.unwrap_or_default(),
            width,
            content_source,
            transition: options.transition.unwrap_or(DEFAULT_TRANSITION),
            extra: options.extra,
        })
    }
}

/// Derive a fresh identifier: namespace prefix, wall-clock millis, and a
/// process-unique sequence number.
fn derive_identifier() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = IDENTIFIER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{IDENTIFIER_PREFIX}{millis}-{seq}")
}
