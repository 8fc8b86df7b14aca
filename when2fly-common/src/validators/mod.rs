use chrono::{DateTime, NaiveDateTime, Utc};

pub const MAX_FLIGHT_NAME_LENGTH: usize = 255;
pub const MAX_USER_NAME_LENGTH: usize = 100;
pub const MAX_TIMEZONE_LENGTH: usize = 64;

// Timestamps without an offset (e.g. from an HTML datetime-local input) are read as UTC
const LOCAL_TIMESTAMP_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Debug)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }
}

pub fn validate_email_address(email: &str) -> Validity {
    if email.chars().count() > 320 {
        return Validity::Invalid(String::from("Email address is too long."));
    }

    for c in email.chars() {
        if c == ' ' || !c.is_ascii() {
            return Validity::Invalid(String::from(
                "Email address cannot contain a space or non-ASCII characters.",
            ));
        }
    }

    if email.contains("@.") {
        return Validity::Invalid(String::from(
            "Domain name in email address cannot begin with a period.",
        ));
    }

    let Some((username, domain)) = email.split_once('@') else {
        return Validity::Invalid(String::from(
            "Email address must contain an at symbol (@).",
        ));
    };

    if username.is_empty() || domain.len() < 3 {
        return Validity::Invalid(String::from("Email username or domain name is too short."));
    }

    if domain.contains('@') || !domain.contains('.') {
        return Validity::Invalid(String::from(
            "Email address must have only one at symbol (@) and the domain must contain a period.",
        ));
    }

    if domain.ends_with('.') {
        return Validity::Invalid(String::from("Email address cannot end with a period."));
    }

    Validity::Valid
}

/// An empty `allowed_domain` accepts every domain.
pub fn validate_email_domain(email: &str, allowed_domain: &str) -> Validity {
    if allowed_domain.is_empty() {
        return Validity::Valid;
    }

    let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();

    if domain.eq_ignore_ascii_case(allowed_domain) {
        Validity::Valid
    } else {
        Validity::Invalid(format!(
            "Only {} email addresses may use this service.",
            allowed_domain,
        ))
    }
}

pub fn validate_flight_name(name: &str) -> Validity {
    validate_display_text("Flight name", name, MAX_FLIGHT_NAME_LENGTH)
}

pub fn validate_user_name(name: &str) -> Validity {
    validate_display_text("Name", name, MAX_USER_NAME_LENGTH)
}

fn validate_display_text(label: &str, text: &str, max_length: usize) -> Validity {
    if text.trim().is_empty() {
        return Validity::Invalid(format!("{label} cannot be blank."));
    }

    if text.chars().count() > max_length {
        return Validity::Invalid(format!(
            "{label} cannot be longer than {max_length} characters."
        ));
    }

    if text.chars().any(char::is_control) {
        return Validity::Invalid(format!("{label} cannot contain control characters."));
    }

    Validity::Valid
}

/// Accepts `UTC` and IANA-shaped names such as `America/Los_Angeles` or `Etc/GMT+8`.
pub fn validate_timezone(timezone: &str) -> Validity {
    const INVALID_MSG: &str = "Timezone must be an IANA name such as America/Los_Angeles.";

    if timezone == "UTC" {
        return Validity::Valid;
    }

    if timezone.is_empty() || timezone.len() > MAX_TIMEZONE_LENGTH {
        return Validity::Invalid(String::from(INVALID_MSG));
    }

    let segments: Vec<&str> = timezone.split('/').collect();

    if segments.len() < 2 {
        return Validity::Invalid(String::from(INVALID_MSG));
    }

    for segment in segments {
        let first = segment.chars().next();

        if !first.is_some_and(|c| c.is_ascii_alphabetic())
            || !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
        {
            return Validity::Invalid(String::from(INVALID_MSG));
        }
    }

    Validity::Valid
}

pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, String> {
    let timestamp = timestamp.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(timestamp) {
        return Ok(t.with_timezone(&Utc));
    }

    for format in LOCAL_TIMESTAMP_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(timestamp, format) {
            return Ok(t.and_utc());
        }
    }

    Err(format!(
        "'{}' is not an ISO 8601 timestamp (e.g. 2025-01-01T12:00:00Z)",
        timestamp,
    ))
}
