//! The language filter controller. It owns the reader's preference (through a
//! [`PreferenceStore`]) and drives a [`Surface`]: resolving the active
//! [`Language`] on load, filtering posts, keeping the switchers and banner in
//! sync, and deciding whether the pagination links survive the filter.

use crate::document::{Direction, Surface};
use crate::filter::{self, Decision, PagerVisibility, ProbeOutcome};
use crate::language::{self, Language};
use crate::preference::PreferenceStore;
use crate::probe::{self, PageFetcher};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for the controller, read from the `language` section of the
/// project file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The language for untagged posts and first-time readers.
    pub default: Language,

    /// The key under which the preference is stored.
    pub storage_key: String,

    /// Single pages that exist once per language as `{name}-{code}.html`.
    pub bilingual_pages: Vec<String>,

    /// The text of the "no results" banner.
    pub no_results_message: String,

    /// Optional timeout for each probe request, in seconds.
    pub probe_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default: Language::DEFAULT,
            storage_key: String::from("siteLanguage"),
            bilingual_pages: vec![String::from("aboutme"), String::from("openlearning")],
            no_results_message: String::from("No posts found for the selected language."),
            probe_timeout_secs: None,
        }
    }
}

/// What a switcher click did to the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The page was filtered in place.
    Filtered(Decision),

    /// The page is a bilingual single page and the reader is sent to the
    /// sibling at this path.
    Redirect(String),
}

pub struct Controller<S, F> {
    settings: Settings,
    store: S,
    fetcher: F,
}

impl<S: PreferenceStore, F: PageFetcher> Controller<S, F> {
    pub fn new(settings: Settings, store: S, fetcher: F) -> Self {
        Controller {
            settings,
            store,
            fetcher,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The page-load entry point: resolves the preference, filters the page,
    /// updates the switchers, and settles the pagination links.
    pub async fn init<D: Surface + ?Sized>(&mut self, page: &mut D) -> Language {
        let lang = self.resolve_preference(&*page);
        self.apply_filter(page, lang);
        self.toggle_switcher_labels(page, lang);
        self.refresh_pagination(page, lang).await;
        lang
    }

    /// Resolves the active language. A language suffix in the page path wins
    /// (and is stored); then the stored preference; then the default.
    pub fn resolve_preference<D: Surface + ?Sized>(&mut self, page: &D) -> Language {
        if let Some(lang) = language::from_path(page.location().path()) {
            debug!(lang = %lang, path = page.location().path(), "language taken from page path");
            self.persist(lang);
            return lang;
        }

        match self.store.get(&self.settings.storage_key) {
            Some(stored) => match stored.parse::<Language>() {
                Ok(lang) => lang,
                Err(e) => {
                    warn!(error = %e, "ignoring stored language preference");
                    self.settings.default
                }
            },
            None => self.settings.default,
        }
    }

    /// Shows posts tagged `lang` and untagged posts, hides the rest, and
    /// shows the banner iff a non-empty listing was filtered down to nothing.
    pub fn apply_filter<D: Surface + ?Sized>(&self, page: &mut D, lang: Language) -> Decision {
        let decision = filter::decide(page.item_tags(), lang);
        for (index, visible) in decision.visible.iter().enumerate() {
            page.set_item_visible(index, *visible);
        }
        page.set_banner(&self.settings.no_results_message, decision.show_banner);
        debug!(
            lang = %lang,
            visible = decision.visible_count(),
            total = decision.visible.len(),
            "applied language filter"
        );
        decision
    }

    pub fn toggle_switcher_labels<D: Surface + ?Sized>(&self, page: &mut D, lang: Language) {
        page.set_switchers(lang.label(), lang.other().label(), lang.code());
    }

    /// Handles the reader picking `lang`. Bilingual single pages redirect to
    /// their sibling; every other page is filtered in place.
    pub fn on_switch_click<D: Surface + ?Sized>(&mut self, page: &mut D, lang: Language) -> SwitchOutcome {
        self.persist(lang);
        self.toggle_switcher_labels(page, lang);

        let sibling = language::sibling_path(
            page.location().path(),
            &self.settings.bilingual_pages,
            lang,
        );
        match sibling {
            Some(path) => {
                info!(lang = %lang, path = %path, "redirecting to sibling page");
                page.redirect(&path);
                SwitchOutcome::Redirect(path)
            }
            None => SwitchOutcome::Filtered(self.apply_filter(page, lang)),
        }
    }

    /// Switches to the language opposite the one the switchers currently
    /// show.
    pub fn toggle<D: Surface + ?Sized>(&mut self, page: &mut D) -> SwitchOutcome {
        let current = page
            .switcher_language()
            .and_then(|code| code.parse::<Language>().ok())
            .unwrap_or(self.settings.default);
        self.on_switch_click(page, current.other())
    }

    /// Probes the adjacent listing pages for posts matching `lang`.
    pub async fn probe_adjacent_pages<D: Surface + ?Sized>(&self, page: &D, lang: Language) -> ProbeOutcome {
        probe::probe_adjacent(page, &self.fetcher, lang, self.settings.default).await
    }

    /// Like [`Controller::probe_adjacent_pages`], handing the outcome to
    /// `callback` once every probe has settled.
    pub async fn probe_adjacent_pages_with<D, C>(&self, page: &D, lang: Language, callback: C)
    where
        D: Surface + ?Sized,
        C: FnOnce(ProbeOutcome),
    {
        callback(self.probe_adjacent_pages(page, lang).await)
    }

    /// Keeps the pagination links only where they lead to posts in `lang`.
    /// When the filter hides nothing on this page, the links are left shown
    /// and nothing is fetched. Otherwise both links are hidden until the
    /// probes settle.
    pub async fn refresh_pagination<D: Surface + ?Sized>(&self, page: &mut D, lang: Language) -> PagerVisibility {
        let hides_any = filter::decide(page.item_tags(), lang).hides_any();
        let visibility = if hides_any {
            set_pager(page, PagerVisibility::NONE);
            let outcome = self.probe_adjacent_pages(&*page, lang).await;
            filter::pager_visibility(true, outcome)
        } else {
            PagerVisibility::ALL
        };
        set_pager(page, visibility);
        visibility
    }

    fn persist(&mut self, lang: Language) {
        self.store.set(&self.settings.storage_key, lang.code());
    }
}

fn set_pager<D: Surface + ?Sized>(page: &mut D, visibility: PagerVisibility) {
    page.set_pager_visible(Direction::Previous, visibility.previous);
    page.set_pager_visible(Direction::Next, visibility.next);
}
