//! Payload checks that run at the HTTP boundary before the engine is called.

use crate::error::AppError;
use crate::schema::*;
use regex::Regex;
use std::sync::OnceLock;

/// Rules a payload must satisfy beyond what its type already guarantees. Returns the payload
/// in the form that gets stored.
pub trait Validate: Sized {
    fn validate(self) -> Result<Self, AppError> {
        Ok(self)
    }
}

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

fn email_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub fn is_valid_email(s: &str) -> bool {
    s.len() <= 254 && email_regex().map(|re| re.is_match(s)).unwrap_or(false)
}

/// Lowercases the domain part; the local part is kept as written.
pub fn normalize_email(s: &str) -> String {
    match s.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_ascii_lowercase()),
        None => s.to_string(),
    }
}

fn check_email(field: &str, value: &str) -> Result<String, AppError> {
    if is_valid_email(value) {
        Ok(normalize_email(value))
    } else {
        Err(AppError::Validation(format!("{} must be a valid email", field)))
    }
}

impl Validate for EmailSubscriberCreate {
    fn validate(mut self) -> Result<Self, AppError> {
        self.email = check_email("email", &self.email)?;
        Ok(self)
    }
}

impl Validate for EmailSubscriberUpdate {
    fn validate(mut self) -> Result<Self, AppError> {
        if let Some(email) = self.email.take() {
            self.email = Some(check_email("email", &email)?);
        }
        Ok(self)
    }
}

macro_rules! no_extra_rules {
    ($($payload:ty),* $(,)?) => {
        $( impl Validate for $payload {} )*
    };
}

no_extra_rules!(
    CityCreate,
    CityUpdate,
    VenueCreate,
    VenueUpdate,
    CompetitionCreate,
    CompetitionUpdate,
    SeasonCreate,
    SeasonUpdate,
    StageCreate,
    StageUpdate,
    TeamCreate,
    TeamUpdate,
    MatchCreate,
    MatchUpdate,
    PageCreate,
    PageUpdate,
    PageBlockCreate,
    PageBlockUpdate,
    AffiliatePartnerCreate,
    AffiliatePartnerUpdate,
    AffiliateOfferCreate,
    AffiliateOfferUpdate,
    OutboundClickCreate,
    OutboundClickUpdate,
    AlertSubscriptionCreate,
    AlertSubscriptionUpdate,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("fan@example.com"));
        assert!(is_valid_email("first.last+alerts@mail.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "fan", "fan@", "@example.com", "fan@example", "fan @example.com", "a@b@c.com"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn update_without_email_passes() {
        assert!(EmailSubscriberUpdate::default().validate().is_ok());
    }

    #[test]
    fn update_with_bad_email_fails() {
        let patch = EmailSubscriberUpdate {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(patch.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn domain_is_lowercased_local_part_kept() {
        assert_eq!(normalize_email("Fan.Club@EXAMPLE.Com"), "Fan.Club@example.com");
        let patch = EmailSubscriberUpdate {
            email: Some("fan@MAIL.Example.ORG".into()),
            ..Default::default()
        };
        assert_eq!(patch.validate().unwrap().email.as_deref(), Some("fan@mail.example.org"));
    }
}
