use crate::catalog::Catalog;
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs};
use crate::model::BookField;
use crate::store::BookStore;
use crate::view;

pub async fn list(args: ListArgs, store: &dyn BookStore) -> anyhow::Result<String> {
    let mut catalog = Catalog::new();
    if !catalog.load(store).await {
        anyhow::bail!("fetch failed");
    }
    if let Some(query) = args.search.as_deref() {
        catalog.set_search_query(query);
    }
    Ok(view::book_list(&catalog.filtered_view()))
}

pub async fn add(args: AddArgs, store: &dyn BookStore) -> anyhow::Result<String> {
    let mut catalog = Catalog::new();
    catalog.set_draft_field(BookField::Title, &args.title);
    catalog.set_draft_field(BookField::Author, &args.author);
    if let Some(year) = args.published_year.as_deref() {
        catalog.set_draft_field(BookField::PublishedYear, year);
    }
    if !catalog.submit_draft(store).await {
        anyhow::bail!("create failed");
    }
    let created = catalog
        .books()
        .last()
        .ok_or_else(|| anyhow::anyhow!("created book missing from catalog"))?;
    Ok(format!("{}\n", view::book_line(created)))
}

pub async fn edit(args: EditArgs, store: &dyn BookStore) -> anyhow::Result<String> {
    let mut catalog = Catalog::new();
    if !catalog.load(store).await {
        anyhow::bail!("fetch failed");
    }
    let id = catalog.resolve_id(&args.id);
    if !catalog.open_edit(&id) {
        anyhow::bail!("no book with id {id}");
    }

    let changes = [
        (BookField::Title, args.title),
        (BookField::Author, args.author),
        (BookField::PublishedYear, args.published_year),
    ];
    for (field, value) in changes {
        if let Some(value) = value {
            catalog.edit_field(field, &value);
        }
    }

    if !catalog.save_edit(store).await {
        anyhow::bail!("update failed");
    }
    let saved = catalog
        .find(&id)
        .ok_or_else(|| anyhow::anyhow!("updated book missing from catalog: {id}"))?;
    Ok(format!("{}\n", view::book_line(saved)))
}

pub async fn delete(args: DeleteArgs, store: &dyn BookStore) -> anyhow::Result<String> {
    let mut catalog = Catalog::new();
    if !catalog.load(store).await {
        anyhow::bail!("fetch failed");
    }
    let id = catalog.resolve_id(&args.id);
    if !catalog.remove_book(store, &id).await {
        anyhow::bail!("delete failed");
    }
    Ok(format!("deleted [{id}]\n"))
}
