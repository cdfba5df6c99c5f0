//! Per-trigger selection data delivered by the host.

use serde::{Deserialize, Serialize};

use super::options::{OptionKey, Options};

/// Which kind of content a trigger acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Link,
    Image,
    Page,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 3] = [Self::Image, Self::Link, Self::Page];

    /// Context-menu item id registered for this kind.
    pub fn menu_item_id(&self) -> &'static str {
        match self {
            Self::Link => "copy-as-markdown-link",
            Self::Image => "copy-as-markdown-image",
            Self::Page => "copy-as-markdown-page",
        }
    }

    pub fn from_menu_item_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.menu_item_id() == id)
    }

    /// The `enable-*` option gating this kind's menu entry.
    pub fn enable_key(&self) -> OptionKey {
        match self {
            Self::Link => OptionKey::EnableLink,
            Self::Image => OptionKey::EnableImage,
            Self::Page => OptionKey::EnablePage,
        }
    }

    pub fn is_enabled(&self, options: &Options) -> bool {
        match self {
            Self::Link => options.enable_link,
            Self::Image => options.enable_image,
            Self::Page => options.enable_page,
        }
    }
}

/// The tab a trigger originated from. Clipboard writes are scoped to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Tab {
    /// Page context for this tab, if it has a URL.
    pub fn page(&self) -> Option<PageContext> {
        self.url.as_ref().map(|url| PageContext {
            title: self.title.clone(),
            url: url.clone(),
        })
    }
}

/// Fields carried by a context-menu click.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    pub menu_item_id: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub src_url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub link_text: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkContext {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageContext {
    /// Host-reported media type, e.g. "image" or "png".
    pub media_type: Option<String>,
    /// Alt text of the element, when the host can see it.
    pub alt: Option<String>,
    pub src_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub title: Option<String>,
    pub url: String,
}

/// What the user acted on, created at trigger time and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionContext {
    Link(LinkContext),
    Image { image: ImageContext, page: PageContext },
    Page(PageContext),
}

impl SelectionContext {
    /// Build the selection for `kind` from a click and its tab.
    ///
    /// Missing click fields degrade to empty strings. Returns `None` only
    /// for a page trigger on a tab without a URL.
    pub fn from_click(kind: TriggerKind, info: &ClickInfo, tab: &Tab) -> Option<Self> {
        let page = PageContext {
            title: tab.title.clone(),
            url: tab.url.clone().unwrap_or_default(),
        };

        match kind {
            TriggerKind::Link => Some(Self::Link(LinkContext {
                text: info.link_text.clone().unwrap_or_default(),
                url: info.link_url.clone().unwrap_or_default(),
            })),
            TriggerKind::Image => Some(Self::Image {
                image: ImageContext {
                    media_type: info.media_type.clone(),
                    alt: info.alt_text.clone(),
                    src_url: info.src_url.clone().unwrap_or_default(),
                },
                page,
            }),
            TriggerKind::Page => tab.page().map(Self::Page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_ids_round_trip() {
        for kind in TriggerKind::ALL {
            assert_eq!(TriggerKind::from_menu_item_id(kind.menu_item_id()), Some(kind));
        }
        assert_eq!(TriggerKind::from_menu_item_id("copy-as-html"), None);
    }

    #[test]
    fn test_click_info_from_host_json() {
        let info: ClickInfo = serde_json::from_str(
            r#"{"menuItemId":"copy-as-markdown-image","mediaType":"png","srcUrl":"https://ex/im.png"}"#,
        )
        .unwrap();
        assert_eq!(info.menu_item_id, "copy-as-markdown-image");
        assert_eq!(info.media_type.as_deref(), Some("png"));
        assert_eq!(info.link_url, None);
    }

    #[test]
    fn test_page_selection_requires_url() {
        let tab = Tab {
            id: 1,
            title: Some("Title".into()),
            url: None,
        };
        let info = ClickInfo::default();
        assert_eq!(SelectionContext::from_click(TriggerKind::Page, &info, &tab), None);

        let link = SelectionContext::from_click(TriggerKind::Link, &info, &tab).unwrap();
        assert_eq!(link, SelectionContext::Link(LinkContext::default()));
    }
}
