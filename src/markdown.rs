use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// Converts a Markdown snippet from a data file (e.g., a series description)
/// into HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options).map(demote));
    out
}

// Headings in a snippet need to be subordinate to both the site title (h1)
// and the page title (h2), so `#` becomes h3.
fn demote(ev: Event) -> Event {
    match ev {
        Event::Start(Tag::Heading(level)) => Event::Start(Tag::Heading((level + 2).min(6))),
        Event::End(Tag::Heading(level)) => Event::End(Tag::Heading((level + 2).min(6))),
        _ => ev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html() {
        assert_eq!("<p>Learn <em>Rust</em>.</p>\n", to_html("Learn *Rust*."));
    }

    #[test]
    fn test_headings_demoted() {
        assert_eq!("<h3>Intro</h3>\n", to_html("# Intro"));
        assert_eq!("<h6>Deep</h6>\n", to_html("##### Deep"));
    }
}
