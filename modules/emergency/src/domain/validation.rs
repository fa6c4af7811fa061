use modkit::validation::{Pipeline, Violation};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::model::{GeoPoint, NewRequest, StatusUpdate};

pub const MAX_FULL_NAME_CHARS: usize = 100;
pub const MAX_ADDRESS_CHARS: usize = 200;
pub const MAX_NOTES_CHARS: usize = 500;

/// Optional `+`, a non-zero digit, then up to 15 more digits.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("phone pattern compiles"));

static NEW_REQUEST_RULES: Lazy<Pipeline<NewRequest>> = Lazy::new(|| {
    Pipeline::new()
        .check("fullName", |r: &NewRequest| {
            match r.full_name.as_deref().map(str::trim) {
                None | Some("") => {
                    Err("Full name is required and must be a non-empty string".into())
                }
                Some(n) if n.chars().count() > MAX_FULL_NAME_CHARS => Err(format!(
                    "Full name cannot exceed {MAX_FULL_NAME_CHARS} characters"
                )),
                Some(_) => Ok(()),
            }
        })
        .check("phoneNumber", |r: &NewRequest| {
            match r.phone_number.as_deref() {
                None | Some("") => Err("Phone number is required and must be a string".into()),
                Some(p) if !PHONE_RE.is_match(p.trim()) => {
                    Err("Please enter a valid phone number".into())
                }
                Some(_) => Ok(()),
            }
        })
        .check("location", |r: &NewRequest| check_location(r).map(|_| ()))
        .check("address", |r: &NewRequest| match r.address.as_deref().map(str::trim) {
            _ if r.malformed_address => Err("Address must be a string".into()),
            Some(a) if a.chars().count() > MAX_ADDRESS_CHARS => Err(format!(
                "Address cannot exceed {MAX_ADDRESS_CHARS} characters"
            )),
            _ => Ok(()),
        })
});

static STATUS_UPDATE_RULES: Lazy<Pipeline<StatusUpdate>> = Lazy::new(|| {
    Pipeline::new().check("notes", |u: &StatusUpdate| match u.notes.as_deref() {
        Some(n) if n.chars().count() > MAX_NOTES_CHARS => Err(format!(
            "Notes cannot exceed {MAX_NOTES_CHARS} characters"
        )),
        _ => Ok(()),
    })
});

/// Shape and range of `location.coordinates`, reported as one message.
fn check_location(r: &NewRequest) -> Result<GeoPoint, String> {
    let Some(location) = &r.location else {
        return Err("Location is required".into());
    };
    let Some(coordinates) = &location.coordinates else {
        return Err("Location coordinates are required and must be an array".into());
    };
    let [lng, lat] = coordinates.as_slice() else {
        return Err(
            "Location coordinates must contain exactly 2 values [longitude, latitude]".into(),
        );
    };
    let (Some(longitude), Some(latitude)) = (*lng, *lat) else {
        return Err("Coordinates must be numbers".into());
    };
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180".into());
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90".into());
    }
    Ok(GeoPoint {
        longitude,
        latitude,
    })
}

/// Every violated field of a submission, or the validated point.
pub fn validate_new_request(input: &NewRequest) -> Result<GeoPoint, Vec<Violation>> {
    NEW_REQUEST_RULES.run(input)?;
    // The pipeline already accepted the location, so this cannot fail.
    check_location(input).map_err(|m| vec![Violation::new("location", m)])
}

pub fn validate_status_update(input: &StatusUpdate) -> Result<(), Vec<Violation>> {
    STATUS_UPDATE_RULES.run(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::LocationInput;
    use modkit::validation::messages;

    fn valid() -> NewRequest {
        NewRequest {
            full_name: Some("Jane Doe".into()),
            phone_number: Some("+15551234567".into()),
            location: Some(LocationInput {
                coordinates: Some(vec![Some(-74.0), Some(40.7)]),
            }),
            address: None,
            malformed_address: false,
        }
    }

    fn with_coordinates(coordinates: Option<Vec<Option<f64>>>) -> NewRequest {
        NewRequest {
            location: Some(LocationInput { coordinates }),
            ..valid()
        }
    }

    fn errors(input: &NewRequest) -> Vec<String> {
        messages(&validate_new_request(input).unwrap_err())
    }

    #[test]
    fn accepts_valid_submission() {
        let point = validate_new_request(&valid()).unwrap();
        assert_eq!(
            point,
            GeoPoint {
                longitude: -74.0,
                latitude: 40.7
            }
        );
    }

    #[test]
    fn reports_every_failing_field() {
        let input = NewRequest {
            full_name: Some("   ".into()),
            phone_number: None,
            location: None,
            address: Some("x".repeat(201)),
            malformed_address: false,
        };
        assert_eq!(
            errors(&input),
            vec![
                "Full name is required and must be a non-empty string",
                "Phone number is required and must be a string",
                "Location is required",
                "Address cannot exceed 200 characters",
            ]
        );
    }

    #[test]
    fn non_string_address_is_rejected() {
        let input = NewRequest {
            malformed_address: true,
            ..valid()
        };
        assert_eq!(errors(&input), vec!["Address must be a string"]);
    }

    #[test]
    fn name_length_counts_trimmed_chars() {
        let mut input = valid();
        input.full_name = Some(format!("  {}  ", "a".repeat(100)));
        assert!(validate_new_request(&input).is_ok());
        input.full_name = Some("a".repeat(101));
        assert_eq!(errors(&input), vec!["Full name cannot exceed 100 characters"]);
    }

    #[test]
    fn phone_pattern() {
        for ok in ["+15551234567", "15551234567", "7", " +4412345 "] {
            let mut input = valid();
            input.phone_number = Some(ok.into());
            assert!(validate_new_request(&input).is_ok(), "{ok}");
        }
        for bad in ["0123", "+0123", "555-1234", "+1234567890123456789", "abc"] {
            let mut input = valid();
            input.phone_number = Some(bad.into());
            assert_eq!(errors(&input), vec!["Please enter a valid phone number"], "{bad}");
        }
    }

    #[test]
    fn coordinate_shape_errors() {
        assert_eq!(
            errors(&with_coordinates(None)),
            vec!["Location coordinates are required and must be an array"]
        );
        assert_eq!(
            errors(&with_coordinates(Some(vec![Some(1.0)]))),
            vec!["Location coordinates must contain exactly 2 values [longitude, latitude]"]
        );
        assert_eq!(
            errors(&with_coordinates(Some(vec![Some(1.0), None]))),
            vec!["Coordinates must be numbers"]
        );
    }

    #[test]
    fn coordinate_ranges_are_inclusive() {
        assert!(validate_new_request(&with_coordinates(Some(vec![Some(180.0), Some(-90.0)]))).is_ok());
        assert_eq!(
            errors(&with_coordinates(Some(vec![Some(180.01), Some(0.0)]))),
            vec!["Longitude must be between -180 and 180"]
        );
        assert_eq!(
            errors(&with_coordinates(Some(vec![Some(0.0), Some(-90.5)]))),
            vec!["Latitude must be between -90 and 90"]
        );
    }

    #[test]
    fn notes_limit() {
        let ok = StatusUpdate {
            notes: Some("n".repeat(500)),
            ..StatusUpdate::default()
        };
        assert!(validate_status_update(&ok).is_ok());
        let too_long = StatusUpdate {
            notes: Some("n".repeat(501)),
            ..StatusUpdate::default()
        };
        assert_eq!(
            messages(&validate_status_update(&too_long).unwrap_err()),
            vec!["Notes cannot exceed 500 characters"]
        );
    }
}
