//! The decision layer of the language filter. Nothing here touches a page:
//! functions take item language tags and the active [`Language`] and return
//! what should be visible. [`crate::controller`] applies the decisions to a
//! [`crate::document::Surface`].

use crate::language::Language;

/// Reports whether an item tagged `tag` is visible under `lang`. Untagged
/// items are visible under every language.
pub fn is_visible(tag: Option<&str>, lang: Language) -> bool {
    match tag {
        None => true,
        Some(tag) => tag == lang.code(),
    }
}

/// Reports whether an item on an adjacent page counts as a match for `lang`
/// when probing pagination. Unlike [`is_visible`], an untagged item only
/// counts toward the `default` language.
pub fn counts_toward(tag: Option<&str>, lang: Language, default: Language) -> bool {
    match tag {
        None => lang == default,
        Some(tag) => tag == lang.code(),
    }
}

/// Counts the items in `tags` that match `lang` for probing purposes.
pub fn count_matches<'a, I>(tags: I, lang: Language, default: Language) -> usize
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    tags.into_iter()
        .filter(|tag| counts_toward(*tag, lang, default))
        .count()
}

/// The outcome of filtering a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Visibility per item, in document order.
    pub visible: Vec<bool>,

    /// Whether the "no results" banner should be shown.
    pub show_banner: bool,
}

impl Decision {
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    /// Reports whether at least one item is hidden.
    pub fn hides_any(&self) -> bool {
        self.visible.iter().any(|v| !*v)
    }
}

/// Decides visibility for every item and whether the banner is due.
pub fn decide<'a, I>(tags: I, lang: Language) -> Decision
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let visible: Vec<bool> = tags.into_iter().map(|tag| is_visible(tag, lang)).collect();
    let shown = visible.iter().filter(|v| **v).count();
    Decision {
        show_banner: shown == 0 && !visible.is_empty(),
        visible,
    }
}

/// Per-direction result of probing the adjacent listing pages: `true` iff the
/// page in that direction was fetched and holds at least one matching item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub previous: bool,
    pub next: bool,
}

/// Which pagination controls should be shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagerVisibility {
    pub previous: bool,
    pub next: bool,
}

impl PagerVisibility {
    pub const ALL: PagerVisibility = PagerVisibility {
        previous: true,
        next: true,
    };

    pub const NONE: PagerVisibility = PagerVisibility {
        previous: false,
        next: false,
    };
}

/// Decides pagination visibility. When the filter hides nothing the adjacent
/// pages are unaffected and both controls stay; otherwise each control follows
/// its probe.
pub fn pager_visibility(hides_any: bool, probe: ProbeOutcome) -> PagerVisibility {
    if hides_any {
        PagerVisibility {
            previous: probe.previous,
            next: probe.next,
        }
    } else {
        PagerVisibility::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language::*;

    #[test]
    fn test_untagged_visible_everywhere() {
        assert!(is_visible(None, Vi));
        assert!(is_visible(None, En));
    }

    #[test]
    fn test_tagged_visible_iff_equal() {
        for tag in &["vi", "en", "fr"] {
            for lang in &[Vi, En] {
                assert_eq!(*tag == lang.code(), is_visible(Some(*tag), *lang));
            }
        }
    }

    #[test]
    fn test_decide_one_english() {
        let decision = decide(vec![Some("vi"), Some("vi"), Some("en")], En);
        assert_eq!(vec![false, false, true], decision.visible);
        assert_eq!(1, decision.visible_count());
        assert!(!decision.show_banner);
        assert!(decision.hides_any());
    }

    #[test]
    fn test_decide_none_visible() {
        let decision = decide(vec![Some("en"), Some("en")], Vi);
        assert_eq!(0, decision.visible_count());
        assert!(decision.show_banner);
    }

    #[test]
    fn test_decide_empty_listing_has_no_banner() {
        let decision = decide(Vec::new(), Vi);
        assert!(!decision.show_banner);
        assert!(!decision.hides_any());
    }

    #[test]
    fn test_decide_untagged_keeps_banner_away() {
        let decision = decide(vec![Some("en"), None], Vi);
        assert_eq!(vec![false, true], decision.visible);
        assert!(!decision.show_banner);
    }

    #[test]
    fn test_counts_toward_default_only() {
        assert!(counts_toward(None, Vi, Vi));
        assert!(!counts_toward(None, En, Vi));
        assert_eq!(
            1,
            count_matches(vec![None, Some("vi"), Some("en")], En, Vi)
        );
        assert_eq!(
            2,
            count_matches(vec![None, Some("vi"), Some("en")], Vi, Vi)
        );
    }

    #[test]
    fn test_pager_visibility() {
        let probe = ProbeOutcome {
            previous: false,
            next: true,
        };
        assert_eq!(PagerVisibility::ALL, pager_visibility(false, probe));
        assert_eq!(
            PagerVisibility {
                previous: false,
                next: true
            },
            pager_visibility(true, probe)
        );
    }
}
