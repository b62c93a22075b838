use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

/// Account used to register and authenticate against the backend.
///
/// `Validate` is implemented by hand so the password is checked through
/// `expose_secret` and never copied into the error params.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub full_name: Option<String>,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: SecretString::from(password.into()),
            full_name: None,
        }
    }

    pub fn with_full_name(
        mut self,
        full_name: impl Into<String>,
    ) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self
            .username
            .validate_length(Some(1), Some(64), None)
        {
            errors.add(
                "username",
                ValidationError::new("length").with_message("username must be 1 to 64 characters".into()),
            );
        }

        if !self.email.validate_email() {
            errors.add("email", ValidationError::new("email"));
        }

        if let Err(err) = validate_password(&self.password) {
            errors.add("password", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_password(password: &SecretString) -> Result<(), ValidationError> {
    if password.expose_secret().chars().count() < 6 {
        return Err(ValidationError::new("password_length")
            .with_message("password must be at least 6 characters".into()));
    }
    Ok(())
}

/// `POST /api/auth/register` body. `name` mirrors `username` since both
/// field names are accepted across backend revisions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<&'a str>,
}

impl<'a> From<&'a Credentials> for RegisterRequest<'a> {
    fn from(creds: &'a Credentials) -> Self {
        Self {
            username: &creds.username,
            name: &creds.username,
            email: &creds.email,
            password: creds.password.expose_secret(),
            full_name: creds.full_name.as_deref(),
        }
    }
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(creds: &'a Credentials) -> Self {
        Self {
            email: &creds.email,
            password: creds.password.expose_secret(),
        }
    }
}

/// A single classification result as posted to `/api/classification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationSubmission {
    #[validate(length(min = 1))]
    pub waste_type: String,
    /// Percentage, `0..=100`.
    #[validate(custom(function = "validate_confidence"))]
    pub confidence: f64,
    #[validate(url)]
    pub image_url: String,
    #[validate(nested)]
    pub location: Location,
}

impl ClassificationSubmission {
    /// The submission every smoke run sends.
    pub fn fixture() -> Self {
        Self {
            waste_type: "plastic".into(),
            confidence: 95.5,
            image_url: "https://example.com/test.jpg".into(),
            location: Location::point("Jakarta", 106.8456, -6.2088),
        }
    }
}

/// GeoJSON point; `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_point"))]
    pub kind: String,
    pub address: String,
    #[validate(custom(function = "validate_coordinates"))]
    pub coordinates: [f64; 2],
}

impl Location {
    pub fn point(
        address: impl Into<String>,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            kind: "Point".into(),
            address: address.into(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

fn validate_confidence(confidence: f64) -> Result<(), ValidationError> {
    if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
        return Err(ValidationError::new("range").with_message("confidence must be a number within 0..=100".into()));
    }
    Ok(())
}

fn validate_point(kind: &str) -> Result<(), ValidationError> {
    if kind != "Point" {
        return Err(ValidationError::new("geojson_type").with_message("location type must be `Point`".into()));
    }
    Ok(())
}

fn validate_coordinates(coordinates: &[f64; 2]) -> Result<(), ValidationError> {
    let [longitude, latitude] = *coordinates;

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::new("longitude").with_message("longitude must be within -180..=180".into()));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::new("latitude").with_message("latitude must be within -90..=90".into()));
    }
    Ok(())
}
