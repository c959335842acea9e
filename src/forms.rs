//! Submitted HTML forms and their field constraints.
//!
//! `validate` never talks to the backend; a form that fails here is
//! re-rendered with an inline message and nothing is submitted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::{ProfileUpdate, SignUp};
use crate::directory::{BloodGroup, DonorRecord};
use crate::error::Error;

pub const MIN_PASSWORD_LEN: usize = 8;
const PHONE_DIGITS: usize = 10;

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub blood_group: String,
    pub address: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    pub blood_group: String,
    pub address: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct CertificateForm {
    pub title: String,
    pub issued_by: String,
    pub date: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    pub title: String,
    pub issued_by: String,
    pub date: NaiveDate,
    pub image_url: Url,
}

fn required(field: &'static str, label: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, format!("{} is required", label)));
    }
    Ok(trimmed.to_string())
}

fn phone(value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.len() != PHONE_DIGITS || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation(
            "phone",
            "Please enter a valid 10-digit phone number",
        ));
    }
    Ok(trimmed.to_string())
}

fn email(value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !trimmed.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(Error::validation("email", "Please enter a valid email address"));
    }
    Ok(trimmed.to_string())
}

fn blood_group(value: &str) -> Result<BloodGroup, Error> {
    value
        .parse()
        .map_err(|_| Error::validation("blood_group", "Please select your blood group"))
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignUp, Error> {
        let name = required("name", "Full name", &self.name)?;
        let phone = phone(&self.phone)?;
        let email = email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation(
                "password",
                format!("Password must be at least {} characters long", MIN_PASSWORD_LEN),
            ));
        }
        let blood_group = blood_group(&self.blood_group)?;
        let address = required("address", "Address", &self.address)?;

        Ok(SignUp {
            email,
            password: self.password.clone(),
            name,
            phone,
            blood_group,
            address,
        })
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Error> {
        email(&self.email)?;
        if self.password.is_empty() {
            return Err(Error::validation("password", "Password is required"));
        }
        Ok(())
    }
}

impl ProfileForm {
    pub fn from_record(record: &DonorRecord) -> Self {
        Self {
            name: record.name.clone(),
            phone: record.phone.clone().unwrap_or_default(),
            blood_group: record.blood_group.to_string(),
            address: record.address.clone(),
        }
    }

    /// Validates the form and keeps only the fields that differ from
    /// `current`.
    pub fn to_update(
        &self,
        current: &DonorRecord,
        now: DateTime<Utc>,
    ) -> Result<ProfileUpdate, Error> {
        let name = required("name", "Full name", &self.name)?;
        let phone = phone(&self.phone)?;
        let blood_group = blood_group(&self.blood_group)?;
        let address = required("address", "Address", &self.address)?;

        Ok(ProfileUpdate {
            name: (name != current.name).then_some(name),
            phone: (current.phone.as_deref() != Some(phone.as_str())).then_some(phone),
            blood_group: (blood_group != current.blood_group).then_some(blood_group),
            address: (address != current.address).then_some(address),
            updated_at: now,
        })
    }
}

impl CertificateForm {
    pub fn validate(&self) -> Result<NewCertificate, Error> {
        let title = required("title", "Certificate title", &self.title)?;
        let issued_by = required("issued_by", "Issued by", &self.issued_by)?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| Error::validation("date", "Please enter the date of issue"))?;
        let image_url = Url::parse(self.image_url.trim())
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| {
                Error::validation("image_url", "Please enter a valid certificate image URL")
            })?;

        Ok(NewCertificate {
            title,
            issued_by,
            date,
            image_url,
        })
    }
}
