//! HTML to readable text.
//!
//! Strategy, first hit wins:
//! 1. the first content selector (`article`, `main`, `.content`, ...) with any
//!    non-empty match, every match of it concatenated
//! 2. paragraphs whose text is longer than 30 characters
//! 3. the whole `<body>`
//!
//! Navigation chrome, scripts and ad containers are ignored throughout.

use scraper::{ElementRef, Html, Node, Selector};

pub const NOISE_SELECTOR: &str = "script, style, nav, footer, header, .ads, .banner, .comments";

pub const CONTENT_SELECTORS: [&str; 10] = [
    "article",
    "main",
    ".content",
    ".post",
    ".article-content",
    ".article-body",
    ".article",
    ".detail-content",
    ".news-detail",
    ".detail__content",
];

const MIN_PARAGRAPH_CHARS: usize = 30;

/// Extract the readable text of an HTML document, whitespace collapsed.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(noise) = Selector::parse(NOISE_SELECTOR) else {
        return String::new();
    };

    let text = content_text(&document, &noise)
        .or_else(|| paragraph_text(&document, &noise))
        .unwrap_or_else(|| body_text(&document, &noise));

    collapse_whitespace(&text)
}

fn content_text(document: &Html, noise: &Selector) -> Option<String> {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        let parts: Vec<String> = document
            .select(&selector)
            .map(|element| visible_text(&element, noise).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        if !parts.is_empty() {
            log::debug!("Extracted content using selector '{}'", selector_str);
            return Some(parts.join("\n\n"));
        }
    }
    None
}

fn paragraph_text(document: &Html, noise: &Selector) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    // Length is measured on the raw text, before any boundary spacing
    let paragraphs: Vec<String> = document
        .select(&selector)
        .filter(|p| collect_text(p, noise, false).trim().chars().count() > MIN_PARAGRAPH_CHARS)
        .map(|p| visible_text(&p, noise).trim().to_string())
        .collect();

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n\n"))
    }
}

fn body_text(document: &Html, noise: &Selector) -> String {
    Selector::parse("body")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|body| visible_text(&body, noise))
        })
        .unwrap_or_default()
}

const BLOCK_TAGS: [&str; 24] = [
    "p", "div", "section", "article", "main", "aside", "h1", "h2", "h3", "h4", "h5", "h6", "li",
    "ul", "ol", "blockquote", "pre", "table", "tr", "td", "th", "br", "figcaption", "dd",
];

fn is_block(node: &Node) -> bool {
    node.as_element().is_some_and(|element| BLOCK_TAGS.contains(&element.name()))
}

/// Text of `element`, skipping anything under a noise node.
///
/// Text nodes are concatenated as-is so words split across inline tags stay
/// whole; a single space marks each block-level boundary.
fn visible_text(element: &ElementRef, noise: &Selector) -> String {
    collect_text(element, noise, true)
}

fn collect_text(element: &ElementRef, noise: &Selector, separate_blocks: bool) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let boundary = is_block(node.value())
            || node.prev_sibling().is_some_and(|prev| is_block(prev.value()));
        if separate_blocks && boundary {
            out.push(' ');
        }
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| noise.matches(&ancestor))
        {
            continue;
        }
        out.push_str(text);
    }
    out
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_text() {
        let html = "<html><body><article>Hello world</article></body></html>";
        assert_eq!(extract_text(html), "Hello world");
    }

    #[test]
    fn test_noise_is_stripped() {
        let html = r#"
            <html><body>
              <header>Site header</header>
              <nav>Home | About</nav>
              <main>
                <script>var tracking = 1;</script>
                <p>Main story text.</p>
                <div class="ads">Buy now</div>
                <div class="comments">First!</div>
              </main>
              <footer>Copyright</footer>
            </body></html>
        "#;
        assert_eq!(extract_text(html), "Main story text.");
    }

    #[test]
    fn test_all_matches_of_first_selector_are_joined() {
        let html = r#"
            <html><body>
              <div class="content">First block</div>
              <div class="post">Ignored post</div>
              <div class="content">Second block</div>
            </body></html>
        "#;
        assert_eq!(extract_text(html), "First block Second block");
    }

    #[test]
    fn test_empty_container_falls_through() {
        let html = r#"
            <html><body>
              <article>   </article>
              <div class="article-body">Body of the story</div>
            </body></html>
        "#;
        assert_eq!(extract_text(html), "Body of the story");
    }

    #[test]
    fn test_long_paragraphs_without_container() {
        let html = r#"
            <html><body>
              <div>
                <p>Short one.</p>
                <p>This paragraph is definitely longer than thirty characters.</p>
                <p>Another paragraph that also clears the length threshold.</p>
              </div>
            </body></html>
        "#;
        assert_eq!(
            extract_text(html),
            "This paragraph is definitely longer than thirty characters. \
             Another paragraph that also clears the length threshold."
        );
    }

    #[test]
    fn test_body_fallback() {
        let html = "<html><body><div>Tiny</div>\n\n<span>page</span></body></html>";
        assert_eq!(extract_text(html), "Tiny page");
    }

    #[test]
    fn test_inline_tags_do_not_split_words() {
        let html = "<html><body><article><p>Hel<b>lo</b> wor<i>ld</i></p></article></body></html>";
        assert_eq!(extract_text(html), "Hello world");
    }

    #[test]
    fn test_paragraph_length_ignores_inline_boundaries() {
        // Three inline runs add up to exactly 30 characters, which is not enough
        let short = format!(
            "<p><a>{}</a><b>{}</b><i>{}</i></p>",
            "a".repeat(10),
            "b".repeat(10),
            "c".repeat(10)
        );
        let html = format!(
            "<html><body>{}<p>{}</p></body></html>",
            short,
            "d".repeat(30)
        );
        assert_eq!(
            extract_text(&html),
            format!(
                "{}{}{} {}",
                "a".repeat(10),
                "b".repeat(10),
                "c".repeat(10),
                "d".repeat(30)
            )
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Hello \n\n  world\t! "), "Hello world !");
    }
}
