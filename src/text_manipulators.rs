use scraper::ElementRef;

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Wikipedia serves image sources as `//upload.wikimedia.org/...`.
pub fn absolute_image_url(src: &str) -> String {
    if src.starts_with("//") {
        "https:".to_string() + src
    } else {
        src.to_string()
    }
}

/// Joins whitespace separated words from `paragraphs` in order, stopping at
/// the first paragraph that pushes the running count past `limit` and cutting
/// the result to exactly `limit` words.
pub fn take_words<I, S>(paragraphs: I, limit: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut words: Vec<String> = Vec::new();
    for paragraph in paragraphs {
        words.extend(paragraph.as_ref().split_whitespace().map(String::from));
        if words.len() > limit {
            words.truncate(limit);
            break;
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize, word: &str) -> String {
        vec![word; n].join(" ")
    }

    #[test]
    fn protocol_relative_sources_get_https() {
        assert_eq!(
            absolute_image_url("//upload.wikimedia.org/a.jpg"),
            "https://upload.wikimedia.org/a.jpg"
        );
        assert_eq!(
            absolute_image_url("https://example.org/a.png"),
            "https://example.org/a.png"
        );
        assert_eq!(absolute_image_url("/static/logo.svg"), "/static/logo.svg");
    }

    #[test]
    fn short_text_is_kept_whole() {
        let summary = take_words(["Alpha  beta\n", "gamma"], 150);
        assert_eq!(summary, "Alpha beta gamma");
    }

    #[test]
    fn long_text_is_cut_to_limit() {
        let summary = take_words([words(100, "a"), words(100, "b"), words(100, "c")], 150);
        let counted: Vec<&str> = summary.split(' ').collect();
        assert_eq!(counted.len(), 150);
        assert_eq!(counted[99], "a");
        assert_eq!(counted[100], "b");
        assert!(!summary.contains('c'));
    }

    #[test]
    fn exactly_limit_words_is_untouched() {
        let summary = take_words([words(150, "x")], 150);
        assert_eq!(summary.split(' ').count(), 150);
    }

    #[test]
    fn no_paragraphs_gives_empty_summary() {
        assert_eq!(take_words(Vec::<String>::new(), 150), "");
    }
}
