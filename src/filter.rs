use crate::model::Book;

/// Free-text search over title and author.
///
/// Every whitespace-separated term must appear (case-insensitively) in the
/// title or the author. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    terms: Vec<String>,
}

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        let terms = raw.split_whitespace().map(str::to_lowercase).collect();
        Self {
            raw: raw.to_owned(),
            terms,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, book: &Book) -> bool {
        let title = book.title.to_lowercase();
        let author = book.author.to_lowercase();
        self.terms
            .iter()
            .all(|term| title.contains(term.as_str()) || author.contains(term.as_str()))
    }

    pub fn filter<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        books.iter().filter(|book| self.matches(book)).collect()
    }
}
