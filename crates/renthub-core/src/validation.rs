//! # Validation Module
//!
//! Input validation for listing submissions, booking requests and profile
//! edits.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web frontend                                                 │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: renthub-api command (Rust)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules, before any transaction opens            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use renthub_core::validation::{validate_duration, validate_id};
//!
//! validate_duration(2).unwrap();
//! assert!(validate_id("listing_id", "not-a-uuid").is_err());
//! ```

use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{NewListing, ProfileUpdate};
use crate::{MAX_BOOKING_DURATION, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, length-bounded text field.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
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

/// Validates an entity identifier (UUID).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an optional amount in cents (rates, deposit).
///
/// ## Rules
/// - Absent is fine
/// - Present must not be negative
pub fn validate_optional_cents(field: &str, cents: Option<i64>) -> ValidationResult<()> {
    match cents {
        Some(c) if c < 0 => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

/// Validates a booking duration.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed MAX_BOOKING_DURATION
pub fn validate_duration(duration: i64) -> ValidationResult<()> {
    if duration <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "duration".to_string(),
        });
    }

    if duration > MAX_BOOKING_DURATION {
        return Err(ValidationError::OutOfRange {
            field: "duration".to_string(),
            min: 1,
            max: MAX_BOOKING_DURATION,
        });
    }

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates a listing submission.
///
/// ## Rules
/// - title, category required; description may be empty but is bounded
/// - at least one of the hourly/daily rates must be set
/// - amounts are non-negative
/// - the availability window, when both ends are given, is not inverted
/// - at most `max_images` image references
pub fn validate_new_listing(listing: &NewListing, max_images: usize) -> ValidationResult<()> {
    validate_text("title", &listing.title, MAX_TITLE_LEN)?;
    validate_text("category", &listing.category, MAX_TITLE_LEN)?;

    if listing.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    if listing.price_per_hour_cents.is_none() && listing.price_per_day_cents.is_none() {
        return Err(ValidationError::Required {
            field: "price per hour or price per day".to_string(),
        });
    }

    validate_optional_cents("price per hour", listing.price_per_hour_cents)?;
    validate_optional_cents("price per day", listing.price_per_day_cents)?;
    validate_optional_cents("deposit", listing.deposit_cents)?;

    if let (Some(from), Some(until)) = (listing.available_from, listing.available_until) {
        if until < from {
            return Err(ValidationError::InvalidFormat {
                field: "availability window".to_string(),
                reason: "end date is before start date".to_string(),
            });
        }
    }

    if listing.images.len() > max_images {
        return Err(ValidationError::TooMany {
            field: "images".to_string(),
            max: max_images,
        });
    }

    Ok(())
}

/// Validates a profile edit.
pub fn validate_profile_update(update: &ProfileUpdate) -> ValidationResult<()> {
    validate_text("fullname", &update.fullname, MAX_TITLE_LEN)?;

    if update.phone.chars().count() > 32 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 32,
        });
    }

    if update.city.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "city".to_string(),
            max: MAX_TITLE_LEN,
        });
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

    fn drill() -> NewListing {
        NewListing {
            title: "Cordless Drill".to_string(),
            category: "Tools".to_string(),
            description: "18V, two batteries".to_string(),
            price_per_hour_cents: Some(500),
            ..NewListing::default()
        }
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_text("title", "Tent", 10).is_ok());
        assert!(validate_text("title", "   ", 10).is_err());
        assert!(validate_text("title", &"A".repeat(11), 10).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("id", "").is_err());
        assert!(validate_id("id", "123").is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(MAX_BOOKING_DURATION).is_ok());
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-3).is_err());
        assert!(validate_duration(MAX_BOOKING_DURATION + 1).is_err());
    }

    #[test]
    fn test_validate_new_listing() {
        assert!(validate_new_listing(&drill(), 5).is_ok());

        let no_price = NewListing {
            price_per_hour_cents: None,
            ..drill()
        };
        assert!(matches!(
            validate_new_listing(&no_price, 5),
            Err(ValidationError::Required { .. })
        ));

        let negative_deposit = NewListing {
            deposit_cents: Some(-1),
            ..drill()
        };
        assert!(validate_new_listing(&negative_deposit, 5).is_err());

        let too_many_images = NewListing {
            images: vec!["/uploads/a.jpg".to_string(); 6],
            ..drill()
        };
        assert!(matches!(
            validate_new_listing(&too_many_images, 5),
            Err(ValidationError::TooMany { max: 5, .. })
        ));
    }

    #[test]
    fn test_inverted_availability_window() {
        let inverted = NewListing {
            available_from: NaiveDate::from_ymd_opt(2026, 5, 10),
            available_until: NaiveDate::from_ymd_opt(2026, 5, 1),
            ..drill()
        };
        assert!(matches!(
            validate_new_listing(&inverted, 5),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_profile_update() {
        let ok = ProfileUpdate {
            fullname: "Rafi Renter".to_string(),
            phone: "555-0101".to_string(),
            city: "Lahore".to_string(),
        };
        assert!(validate_profile_update(&ok).is_ok());

        let blank = ProfileUpdate {
            fullname: " ".to_string(),
            ..ok
        };
        assert!(validate_profile_update(&blank).is_err());
    }
}
