//! Whole-word title/name search
//!
//! Linear scan over items in storage order; no index and no ranking.

use crate::domain::{UserProfile, Video};

/// Anything with a single searchable text field
pub trait Searchable {
    fn search_text(&self) -> &str;
}

impl Searchable for Video {
    fn search_text(&self) -> &str {
        &self.title
    }
}

impl Searchable for UserProfile {
    fn search_text(&self) -> &str {
        &self.name
    }
}

/// True if the first occurrence of `term` in `text` is bounded by spaces or
/// the ends of the text. Case-sensitive.
pub fn matches_word(text: &str, term: &str) -> bool {
    let Some(begin) = text.find(term) else {
        return false;
    };
    let end = begin + term.len();
    let bytes = text.as_bytes();

    if begin != 0 && bytes[begin - 1] != b' ' {
        return false;
    }
    if end != bytes.len() && bytes[end] != b' ' {
        return false;
    }
    true
}

/// True if any term matches; stops at the first one that does.
pub fn matches_any<S: AsRef<str>>(text: &str, terms: &[S]) -> bool {
    terms.iter().any(|term| matches_word(text, term.as_ref()))
}

/// Items whose text matches any of `terms`, in their original order.
pub fn search<T, S>(items: Vec<T>, terms: &[S]) -> Vec<T>
where
    T: Searchable,
    S: AsRef<str>,
{
    items
        .into_iter()
        .filter(|item| matches_any(item.search_text(), terms))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn videos(titles: &[&str]) -> Vec<Video> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| Video::new(format!("v{i}"), *title, "alice"))
            .collect()
    }

    fn titles(found: Vec<Video>) -> Vec<String> {
        found.into_iter().map(|v| v.title).collect()
    }

    #[test]
    fn test_whole_word_match() {
        assert!(matches_word("My Cat Video", "Cat"));
        assert!(matches_word("My Cat Video", "My"));
        assert!(matches_word("My Cat Video", "Video"));
        assert!(matches_word("My Cat Video", "Cat Video"));
        assert!(!matches_word("My Cat Video", "Caterpillar"));
        assert!(!matches_word("My Caterpillar", "Cat"));
        assert!(!matches_word("My Cat Video", "cat"));
    }

    #[test]
    fn test_only_first_occurrence_is_considered() {
        // "Cat" first occurs inside "Catalog", so the later whole word is not seen
        assert!(!matches_word("Catalog Cat", "Cat"));
        assert!(matches_word("Cat Catalog", "Cat"));
    }

    #[test]
    fn test_search_is_disjunctive_and_ordered() {
        let items = videos(&["My Cat Video", "Dog Days", "My Dog", "Birds"]);
        let found = search(items, &["Dog", "My"]);
        assert_eq!(titles(found), vec!["My Cat Video", "Dog Days", "My Dog"]);
    }

    #[test]
    fn test_empty_terms_match_nothing() {
        let items = videos(&["My Cat Video"]);
        let terms: [&str; 0] = [];
        assert!(search(items, &terms).is_empty());
    }

    #[test]
    fn test_non_ascii_titles() {
        assert!(matches_word("Кот и пёс", "и"));
        assert!(!matches_word("Котик", "Кот"));
    }

    #[test]
    fn test_search_user_profiles() {
        let profiles = vec![
            UserProfile {
                name: "alice".into(),
                follower_count: 0,
                subscription_count: 0,
                videos: vec![],
            },
            UserProfile {
                name: "bob".into(),
                follower_count: 0,
                subscription_count: 0,
                videos: vec![],
            },
        ];
        let found = search(profiles, &["bob".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "bob");
    }
}
