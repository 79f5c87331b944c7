//! The page side of the language filter: the [`Surface`] trait, through which
//! the controller reads and writes a listing page, and [`Document`], an
//! in-memory surface scanned from listing-page markup.
//!
//! The markup contract is the one the theme's layouts emit:
//!
//! * posts: `<div class="post-preview" data-post-lang="en">`; a missing or
//!   empty `data-post-lang` means the post is untagged
//! * listing container: `<div class="posts-list">`
//! * "no results" banner: `<div id="no-posts-message">`
//! * pagination: `<li class="previous"><a href="...">` and
//!   `<li class="next"><a href="...">`; only a link inside the control
//!   counts, so a disabled `<li class="next"><span>` has no href
//! * language switchers: `<a class="language-switcher-link"
//!   data-lang-selector="true" data-current-lang="vi">` holding
//!   `<span class="current-lang">` and `<span class="other-lang">`

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

/// A pagination direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Previous, Direction::Next];

    pub fn name(self) -> &'static str {
        match self {
            Direction::Previous => "previous",
            Direction::Next => "next",
        }
    }
}

/// The interactive page as seen by [`crate::controller::Controller`]. Every
/// part except the location is optional; writes to parts a page doesn't have
/// are no-ops.
pub trait Surface {
    /// The absolute URL of the page.
    fn location(&self) -> &Url;

    /// The language tag of every post item in document order (`None` for
    /// untagged items).
    fn item_tags(&self) -> Vec<Option<&str>>;

    fn set_item_visible(&mut self, index: usize, visible: bool);

    /// Shows or hides the "no results" banner. Showing inserts the banner into
    /// the listing container the first time; hiding never inserts it.
    fn set_banner(&mut self, text: &str, visible: bool);

    /// The raw href of the pagination control in `direction`, if any.
    fn pager_href(&self, direction: Direction) -> Option<&str>;

    fn set_pager_visible(&mut self, direction: Direction, visible: bool);

    /// The current-language attribute of the first language switcher.
    fn switcher_language(&self) -> Option<&str>;

    /// Updates the labels and current-language attribute of every switcher.
    fn set_switchers(&mut self, current_label: &str, other_label: &str, lang: &str);

    /// Navigates away to `path` on the same origin.
    fn redirect(&mut self, path: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub lang: Option<String>,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerControl {
    pub href: Option<String>,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Switcher {
    pub current_lang: Option<String>,
    pub current_label: String,
    pub other_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    pub visible: bool,
}

/// An in-memory listing page.
#[derive(Clone, Debug)]
pub struct Document {
    location: Url,
    pub items: Vec<Item>,
    pub has_listing: bool,
    pub banner: Option<Banner>,
    pub previous: Option<PagerControl>,
    pub next: Option<PagerControl>,
    pub switchers: Vec<Switcher>,
    pub redirected_to: Option<String>,
}

impl Document {
    /// Creates an empty page at `location`.
    pub fn new(location: Url) -> Document {
        Document {
            location,
            items: Vec::new(),
            has_listing: false,
            banner: None,
            previous: None,
            next: None,
            switchers: Vec::new(),
            redirected_to: None,
        }
    }

    /// Scans `markup` for the elements described in the module docs. The scan
    /// is tag-by-tag and tolerant: anything it doesn't recognize is skipped.
    pub fn parse(location: Url, markup: &str) -> Document {
        let mut doc = Document::new(location);
        // A pagination control whose link hasn't been seen, and the offset of
        // its closing tag.
        let mut pending: Option<(Direction, usize)> = None;

        for caps in tag_regex().captures_iter(markup) {
            let name = caps[1].to_ascii_lowercase();
            let attrs = Attributes::parse(&caps[2]);
            let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));

            if matches!(pending, Some((_, close)) if start >= close) {
                pending = None;
            }

            if attrs.has_class("post-preview") {
                doc.items.push(Item {
                    lang: attrs
                        .get("data-post-lang")
                        .filter(|lang| !lang.is_empty())
                        .map(str::to_owned),
                    visible: !attrs.is_hidden(),
                });
            }

            if attrs.has_class("posts-list") {
                doc.has_listing = true;
            }

            if attrs.get("id") == Some("no-posts-message") {
                doc.banner = Some(Banner {
                    text: text_after(markup, end),
                    visible: !attrs.is_hidden(),
                });
            }

            for &direction in Direction::BOTH.iter() {
                if attrs.has_class(direction.name()) {
                    let is_link = name == "a";
                    *doc.control_mut(direction) = Some(PagerControl {
                        href: attrs
                            .get("href")
                            .filter(|_| is_link)
                            .map(str::to_owned),
                        visible: !attrs.is_hidden(),
                    });
                    pending = if is_link {
                        None
                    } else {
                        Some((direction, closing_tag(markup, &name, end)))
                    };
                }
            }

            if name == "a" {
                if let Some((direction, _)) = pending.take() {
                    if let Some(control) = doc.control_mut(direction) {
                        control.href = attrs.get("href").map(str::to_owned);
                    }
                }

                if attrs.has_class("language-switcher-link")
                    && attrs.get("data-lang-selector") == Some("true")
                {
                    doc.switchers.push(Switcher {
                        current_lang: attrs.get("data-current-lang").map(str::to_owned),
                        current_label: String::new(),
                        other_label: String::new(),
                    });
                }
            }

            if let Some(switcher) = doc.switchers.last_mut() {
                if attrs.has_class("current-lang") {
                    switcher.current_label = text_after(markup, end);
                } else if attrs.has_class("other-lang") {
                    switcher.other_label = text_after(markup, end);
                }
            }
        }

        doc
    }

    fn control_mut(&mut self, direction: Direction) -> &mut Option<PagerControl> {
        match direction {
            Direction::Previous => &mut self.previous,
            Direction::Next => &mut self.next,
        }
    }

    pub fn control(&self, direction: Direction) -> Option<&PagerControl> {
        match direction {
            Direction::Previous => self.previous.as_ref(),
            Direction::Next => self.next.as_ref(),
        }
    }

    /// The number of currently visible post items.
    pub fn visible_count(&self) -> usize {
        self.items.iter().filter(|item| item.visible).count()
    }
}

impl Surface for Document {
    fn location(&self) -> &Url {
        &self.location
    }

    fn item_tags(&self) -> Vec<Option<&str>> {
        self.items.iter().map(|item| item.lang.as_deref()).collect()
    }

    fn set_item_visible(&mut self, index: usize, visible: bool) {
        if let Some(item) = self.items.get_mut(index) {
            item.visible = visible;
        }
    }

    fn set_banner(&mut self, text: &str, visible: bool) {
        if let Some(banner) = &mut self.banner {
            banner.visible = visible;
        } else if visible && self.has_listing {
            self.banner = Some(Banner {
                text: text.to_owned(),
                visible: true,
            });
        }
    }

    fn pager_href(&self, direction: Direction) -> Option<&str> {
        self.control(direction)
            .and_then(|control| control.href.as_deref())
    }

    fn set_pager_visible(&mut self, direction: Direction, visible: bool) {
        if let Some(control) = self.control_mut(direction) {
            control.visible = visible;
        }
    }

    fn switcher_language(&self) -> Option<&str> {
        self.switchers
            .first()
            .and_then(|switcher| switcher.current_lang.as_deref())
    }

    fn set_switchers(&mut self, current_label: &str, other_label: &str, lang: &str) {
        for switcher in self.switchers.iter_mut() {
            switcher.current_label = current_label.to_owned();
            switcher.other_label = other_label.to_owned();
            switcher.current_lang = Some(lang.to_owned());
        }
    }

    fn redirect(&mut self, path: &str) {
        self.redirected_to = Some(path.to_owned());
    }
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    // literal pattern; should never fail
    TAG.get_or_init(|| Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)([^>]*)>").unwrap())
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| {
        // literal pattern; should never fail
        Regex::new(
            r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
        )
        .unwrap()
    })
}

// The offset of the first `</name` at or after `offset`, or the end of the
// markup when the element is never closed. Nesting isn't tracked.
fn closing_tag(markup: &str, name: &str, offset: usize) -> usize {
    let needle = format!("</{}", name);
    markup[offset..]
        .to_ascii_lowercase()
        .find(&needle)
        .map_or(markup.len(), |i| offset + i)
}

// The text between the end of a start tag and the next tag, trimmed.
fn text_after(markup: &str, offset: usize) -> String {
    let rest = &markup[offset..];
    let stop = rest.find('<').unwrap_or_else(|| rest.len());
    rest[..stop].trim().to_owned()
}

/// The attributes of a single start tag. Names are lower-cased.
struct Attributes<'a>(HashMap<String, &'a str>);

impl<'a> Attributes<'a> {
    fn parse(input: &'a str) -> Attributes<'a> {
        let mut attrs = HashMap::new();
        for caps in attribute_regex().captures_iter(input) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            attrs
                .entry(caps[1].to_ascii_lowercase())
                .or_insert(value);
        }
        Attributes(attrs)
    }

    fn get(&self, name: &str) -> Option<&'a str> {
        self.0.get(name).copied()
    }

    fn has_class(&self, class: &str) -> bool {
        self.get("class")
            .map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
    }

    fn is_hidden(&self) -> bool {
        self.get("style").map_or(false, |style| {
            style
                .split(';')
                .filter_map(|decl| decl.split_once(':'))
                .any(|(prop, value)| {
                    prop.trim().eq_ignore_ascii_case("display")
                        && value.trim().eq_ignore_ascii_case("none")
                })
        })
    }
}
