use crate::model::{Book, BookField, BookId};

/// The single modal editing session.
///
/// While open, edits land in a private copy of the book; the catalog entry
/// only changes once the service confirms a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditOverlay {
    #[default]
    Closed,
    Open {
        buffer: Book,
    },
}

impl EditOverlay {
    /// Opening while already open replaces the previous buffer.
    pub fn open(&mut self, book: &Book) {
        *self = Self::Open {
            buffer: book.clone(),
        };
    }

    /// Returns `false` when the overlay is closed and nothing was changed.
    pub fn field_change(&mut self, field: BookField, value: &str) -> bool {
        match self {
            Self::Open { buffer } => {
                buffer.set_field(field, value);
                true
            }
            Self::Closed => false,
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn buffer(&self) -> Option<&Book> {
        match self {
            Self::Open { buffer } => Some(buffer),
            Self::Closed => None,
        }
    }

    pub fn selected_id(&self) -> Option<&BookId> {
        self.buffer().map(|book| &book.id)
    }
}
