//! # Validation Module
//!
//! Input checks run before any royalty or catalogue logic touches storage.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller input (sale, inventory movement, new book)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  THIS MODULE: field rules (quantity > 0, ISBN shape, title length)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Engine: existence and ownership (NotFound, Forbidden)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  SQLite: UNIQUE(isbn), UNIQUE(author, book, year, month), FKs          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{BookUpdate, NewBook};
use crate::{MAX_SALE_AMOUNT_CENTS, MAX_SALE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_TITLE_LEN: usize = 300;
const MAX_LABEL_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a book title: non-empty, at most 300 characters.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    required("title", title, MAX_TITLE_LEN)
}

/// Validates short descriptive labels (language, genre, cover type).
pub fn validate_label(field: &str, value: &str) -> ValidationResult<()> {
    required(field, value, MAX_LABEL_LEN)
}

/// Validates an ISBN.
///
/// ## Rules
/// - Hyphens and spaces are ignored
/// - 13 digits (ISBN-13), or 10 characters where the last may be `X`
///
/// ```rust
/// use royalty_core::validation::validate_isbn;
///
/// assert!(validate_isbn("978-3-16-148410-0").is_ok());
/// assert!(validate_isbn("0-306-40615-X").is_ok());
/// assert!(validate_isbn("12345").is_err());
/// ```
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let compact: Vec<char> = isbn
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(ValidationError::Required {
            field: "isbn".to_string(),
        });
    }

    let valid = match compact.len() {
        13 => compact.iter().all(|c| c.is_ascii_digit()),
        10 => {
            compact[..9].iter().all(|c| c.is_ascii_digit())
                && (compact[9].is_ascii_digit() || compact[9] == 'X' || compact[9] == 'x')
        }
        _ => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: "must be 10 or 13 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates optional notes on an inventory movement.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale or inventory quantity: `1..=MAX_SALE_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_SALE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_SALE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in cents (sale amount, price, MRP):
/// `0..=MAX_SALE_AMOUNT_CENTS`.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_SALE_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_SALE_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a page count.
pub fn validate_pages(pages: i64) -> ValidationResult<()> {
    if pages <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "pages".to_string(),
        });
    }
    Ok(())
}

/// Validates a printed run. Zero is allowed for books not yet printed.
pub fn validate_printed_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "printed_quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a royalty percentage.
pub fn validate_royalty_percentage(pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "royalty_percentage".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a new book.
pub fn validate_new_book(book: &NewBook) -> ValidationResult<()> {
    validate_title(&book.title)?;
    validate_label("language", &book.language)?;
    validate_label("genre", &book.genre)?;
    validate_label("cover_type", &book.cover_type)?;
    validate_isbn(&book.isbn)?;
    validate_amount_cents("price", book.price_cents)?;
    validate_amount_cents("mrp", book.mrp_cents)?;
    validate_pages(book.pages)?;
    validate_printed_quantity(book.printed_quantity)?;
    validate_royalty_percentage(book.royalty_percentage)
}

/// Validates the fields present in a book update.
pub fn validate_book_update(update: &BookUpdate) -> ValidationResult<()> {
    if let Some(title) = &update.title {
        validate_title(title)?;
    }
    if let Some(language) = &update.language {
        validate_label("language", language)?;
    }
    if let Some(genre) = &update.genre {
        validate_label("genre", genre)?;
    }
    if let Some(cover_type) = &update.cover_type {
        validate_label("cover_type", cover_type)?;
    }
    if let Some(price) = update.price_cents {
        validate_amount_cents("price", price)?;
    }
    if let Some(mrp) = update.mrp_cents {
        validate_amount_cents("mrp", mrp)?;
    }
    if let Some(pages) = update.pages {
        validate_pages(pages)?;
    }
    if let Some(printed) = update.printed_quantity {
        validate_printed_quantity(printed)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_book() -> NewBook {
        NewBook {
            title: "The Long Harvest".to_string(),
            language: "English".to_string(),
            isbn: "978-0-306-40615-7".to_string(),
            price_cents: 29900,
            genre: "Fiction".to_string(),
            pages: 312,
            cover_type: "paperback".to_string(),
            edition: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            printed_quantity: 1000,
            mrp_cents: 34900,
            royalty_percentage: 12.5,
        }
    }

    #[test]
    fn test_validate_isbn() {
        assert!(validate_isbn("9780306406157").is_ok());
        assert!(validate_isbn("0306406152").is_ok());
        assert!(validate_isbn("0-306-40615-x").is_ok());

        assert!(validate_isbn("").is_err());
        assert!(validate_isbn("97803064061").is_err());
        assert!(validate_isbn("978030640615X").is_err());
        assert!(validate_isbn("abcdefghij").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_SALE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-4).is_err());
        assert!(validate_quantity(MAX_SALE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert!(validate_amount_cents("amount", 0).is_ok());
        assert!(validate_amount_cents("amount", MAX_SALE_AMOUNT_CENTS).is_ok());
        assert!(validate_amount_cents("amount", -1).is_err());
        assert!(validate_amount_cents("amount", MAX_SALE_AMOUNT_CENTS + 1).is_err());
        assert!(validate_amount_cents("amount", i64::MAX / 2 + 1).is_err());
    }

    #[test]
    fn test_validate_new_book() {
        assert!(validate_new_book(&new_book()).is_ok());

        let mut book = new_book();
        book.title = "   ".to_string();
        assert!(matches!(
            validate_new_book(&book),
            Err(ValidationError::Required { .. })
        ));

        let mut book = new_book();
        book.royalty_percentage = 120.0;
        assert!(validate_new_book(&book).is_err());

        let mut book = new_book();
        book.pages = 0;
        assert!(validate_new_book(&book).is_err());
    }

    #[test]
    fn test_validate_book_update() {
        assert!(validate_book_update(&BookUpdate::default()).is_ok());
        let update = BookUpdate {
            price_cents: Some(-1),
            ..Default::default()
        };
        assert!(validate_book_update(&update).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("book_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("book_id", "").is_err());
        assert!(validate_uuid("book_id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("Reprint")).is_ok());
        assert!(validate_notes(Some(&"n".repeat(501))).is_err());
    }
}
