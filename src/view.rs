use std::fmt::Write as _;

use crate::auth::AuthContext;
use crate::catalog::Catalog;
use crate::model::Book;

pub fn book_line(book: &Book) -> String {
    format!(
        "[{}] {} by {} (Published: {})",
        book.id,
        book.title,
        book.author,
        book.published_year_text()
    )
}

pub fn book_list(books: &[&Book]) -> String {
    let mut out = String::new();
    for book in books {
        out.push_str(&book_line(book));
        out.push('\n');
    }
    out
}

/// Renders the landing view as text. An unauthenticated session renders nothing.
pub fn landing(auth: &dyn AuthContext, catalog: &Catalog) -> Option<String> {
    if !auth.authenticated() {
        return None;
    }

    let mut out = String::new();
    let draft = catalog.draft();
    let _ = writeln!(out, "== Add a New Book");
    let _ = writeln!(out, "title:  {}", draft.title);
    let _ = writeln!(out, "author: {}", draft.author);
    let _ = writeln!(out, "year:   {}", draft.published_year);

    let view = catalog.filtered_view();
    let query = catalog.search_query();
    if query.is_empty() {
        let _ = writeln!(out, "== Book List ({})", view.len());
    } else {
        let _ = writeln!(
            out,
            "== Book List ({} of {}, search: {:?})",
            view.len(),
            catalog.books().len(),
            query.as_str()
        );
    }
    out.push_str(&book_list(&view));

    if let Some(buffer) = catalog.overlay().buffer() {
        let _ = writeln!(out, "== Edit Book [{}]", buffer.id);
        let _ = writeln!(out, "title:  {}", buffer.title);
        let _ = writeln!(out, "author: {}", buffer.author);
        let _ = writeln!(out, "year:   {}", buffer.published_year_text());
    }

    Some(out)
}
