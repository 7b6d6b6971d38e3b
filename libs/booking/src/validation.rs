//! Input validation for booking operations
//!
//! Everything here runs before any store or blob call so a rejected request
//! never leaves partial state behind.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::{
    error::{BookingError, BookingResult},
    models::{Coordinates, ReservationDraft},
};

const MAX_NAME_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Validated, trimmed reservation fields
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub location_name: String,
    pub coordinates: Coordinates,
    pub requested_date: NaiveDate,
    pub description: String,
}

/// Check a reservation form and return its trimmed fields
pub fn validate_reservation_draft(draft: &ReservationDraft) -> BookingResult<CheckedDraft> {
    let location_name = draft.location_name.trim();
    let coordinates = match draft.coordinates {
        Some(c) if !location_name.is_empty() && !c.is_unset() => c,
        _ => return Err(invalid("작업 위치를 지도에서 선택해주세요.")),
    };
    if !coordinates.is_valid() {
        return Err(invalid("좌표가 올바르지 않습니다."));
    }

    let requested_date = draft
        .requested_date
        .ok_or_else(|| invalid("작업 희망일을 선택해주세요."))?;

    let customer_phone = draft.customer_phone.trim();
    let customer_name = draft.customer_name.trim();
    if customer_phone.is_empty() || customer_name.is_empty() {
        return Err(invalid("연락처와 성함을 입력해주세요."));
    }
    validate_display_name(customer_name)?;
    validate_phone(customer_phone)?;

    let description = draft.description.trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(invalid("요청 사항이 너무 깁니다."));
    }

    Ok(CheckedDraft {
        customer_name: customer_name.to_string(),
        customer_phone: customer_phone.to_string(),
        location_name: location_name.to_string(),
        coordinates,
        requested_date,
        description: description.to_string(),
    })
}

/// Names must be non-blank and reasonably short
pub fn validate_display_name(name: &str) -> BookingResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("이름을 입력해주세요."));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(invalid("이름은 50자 이하로 입력해주세요."));
    }
    Ok(())
}

/// Digits with optional dashes or spaces, optionally a leading `+`
pub fn validate_phone(phone: &str) -> BookingResult<()> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9\- ]{6,18}[0-9]$").expect("Failed to compile phone regex")
    });

    if !regex.is_match(phone.trim()) {
        return Err(invalid("연락처 형식이 올바르지 않습니다."));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> BookingResult<()> {
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }

    if email.len() > 254 {
        return Err(invalid("Email must be at most 254 characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(invalid("Invalid email format"));
    }

    Ok(())
}

fn invalid(message: &str) -> BookingError {
    BookingError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReservationDraft {
        ReservationDraft {
            customer_name: " 홍길동 ".to_string(),
            customer_phone: "010-1234-5678".to_string(),
            location_name: "성주군 선산".to_string(),
            coordinates: Some(Coordinates::new(35.9, 128.2)),
            requested_date: NaiveDate::from_ymd_opt(2024, 9, 1),
            description: "".to_string(),
        }
    }

    #[test]
    fn test_valid_draft_is_trimmed() {
        let checked = validate_reservation_draft(&draft()).unwrap();
        assert_eq!(checked.customer_name, "홍길동");
    }

    #[test]
    fn test_unset_location_is_rejected() {
        let mut d = draft();
        d.coordinates = Some(Coordinates::new(0.0, 0.0));
        assert!(matches!(
            validate_reservation_draft(&d),
            Err(BookingError::Validation(_))
        ));

        let mut d = draft();
        d.location_name = "  ".to_string();
        assert!(validate_reservation_draft(&d).is_err());

        let mut d = draft();
        d.coordinates = None;
        assert!(validate_reservation_draft(&d).is_err());
    }

    #[test]
    fn test_missing_date_and_blank_contact_are_rejected() {
        let mut d = draft();
        d.requested_date = None;
        assert!(validate_reservation_draft(&d).is_err());

        let mut d = draft();
        d.customer_phone = "   ".to_string();
        assert!(validate_reservation_draft(&d).is_err());

        let mut d = draft();
        d.customer_name = "".to_string();
        assert!(validate_reservation_draft(&d).is_err());
    }

    #[test]
    fn test_phone_and_email_formats() {
        assert!(validate_phone("010-1234-5678").is_ok());
        assert!(validate_phone("01012345678").is_ok());
        assert!(validate_phone("+82 10 1234 5678").is_ok());
        assert!(validate_phone("call me").is_err());

        assert!(validate_email("admin@beolcho.kr").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }
}
