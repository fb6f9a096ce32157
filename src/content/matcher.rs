/// Section matchers and the page document they run against
use crate::error::Result;
use crate::settings::Settings;

/// The page document, as far as the matchers need it
pub trait PageDom {
    type Node;

    /// All elements matching a CSS selector, in document order
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Text of every descendant of `node` matching `selector`
    fn texts_within(&self, node: &Self::Node, selector: &str) -> Vec<String>;

    fn has_children(&self, node: &Self::Node) -> bool;

    /// Remove `node` and its subtree from its parent
    fn detach(&self, node: &Self::Node) -> Result<()>;
}

/// How a matcher recognizes its sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Every element with this tag
    Tag(&'static str),
    /// Shelf containers holding a text element that contains `phrase`
    ShelfText {
        container: &'static str,
        text: &'static str,
        phrase: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatcherKind {
    ShortsShelf,
    AdSlot,
    NewChannelsShelf,
}

impl MatcherKind {
    pub const ALL: [MatcherKind; 3] = [
        MatcherKind::ShortsShelf,
        MatcherKind::AdSlot,
        MatcherKind::NewChannelsShelf,
    ];

    pub fn signature(&self) -> Signature {
        match self {
            MatcherKind::ShortsShelf => Signature::Tag("ytd-reel-shelf-renderer"),
            MatcherKind::AdSlot => Signature::Tag("ytd-ad-slot-renderer"),
            MatcherKind::NewChannelsShelf => Signature::ShelfText {
                container: "ytd-shelf-renderer",
                text: "span",
                phrase: "Channels new to you",
            },
        }
    }

    /// Whether the user's settings turn this matcher on
    pub fn enabled_by(&self, settings: &Settings) -> bool {
        match self {
            MatcherKind::ShortsShelf => settings.remove_shorts_from_search,
            MatcherKind::AdSlot => settings.remove_ads_from_recommendations,
            MatcherKind::NewChannelsShelf => settings.remove_new_channels_from_search,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatcherKind::ShortsShelf => "Shorts shelf",
            MatcherKind::AdSlot => "Ad slot",
            MatcherKind::NewChannelsShelf => "New channels shelf",
        }
    }

    /// Current matches on the page. Each container appears at most once.
    pub fn find<D: PageDom>(&self, dom: &D) -> Vec<D::Node> {
        match self.signature() {
            Signature::Tag(selector) => dom.query_all(selector),
            Signature::ShelfText {
                container,
                text,
                phrase,
            } => dom
                .query_all(container)
                .into_iter()
                .filter(|shelf| {
                    dom.texts_within(shelf, text)
                        .iter()
                        .any(|content| content.contains(phrase))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDom;

    #[test]
    fn test_tag_matchers() {
        let dom = FakeDom::new();
        let shorts = dom.add("ytd-reel-shelf-renderer");
        let ad = dom.add("ytd-ad-slot-renderer");
        dom.add("ytd-video-renderer");

        assert_eq!(MatcherKind::ShortsShelf.find(&dom), vec![shorts]);
        assert_eq!(MatcherKind::AdSlot.find(&dom), vec![ad]);
    }

    #[test]
    fn test_shelf_text_matcher() {
        let dom = FakeDom::new();
        let wanted = dom.add_shelf(
            "ytd-shelf-renderer",
            &["Channels new to you", "Channels new to you"],
        );
        dom.add_shelf("ytd-shelf-renderer", &["Latest from Rust"]);
        dom.add_shelf("ytd-reel-shelf-renderer", &["Channels new to you"]);

        assert_eq!(MatcherKind::NewChannelsShelf.find(&dom), vec![wanted]);
    }

    #[test]
    fn test_shelf_text_matches_substring() {
        let dom = FakeDom::new();
        let wanted = dom.add_shelf("ytd-shelf-renderer", &["More", "  Channels new to you  "]);

        assert_eq!(MatcherKind::NewChannelsShelf.find(&dom), vec![wanted]);
    }

    #[test]
    fn test_enabled_by_settings() {
        let mut settings = Settings::default();
        assert!(MatcherKind::ALL.iter().all(|kind| kind.enabled_by(&settings)));

        settings.remove_ads_from_recommendations = false;
        assert!(!MatcherKind::AdSlot.enabled_by(&settings));
        assert!(MatcherKind::ShortsShelf.enabled_by(&settings));
    }
}
