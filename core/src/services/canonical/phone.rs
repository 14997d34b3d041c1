//! Phone number canonicalization

use phonenumber::{metadata::DATABASE, Mode, Type};
use std::collections::HashSet;
use tracing::debug;

use crate::errors::VerificationError;
use sv_shared::phone::mask_phone;

/// Parses international numbers and keeps mobile numbers from approved countries
#[derive(Debug, Clone)]
pub struct PhoneCanonicalizer {
    allowed_regions: HashSet<String>,
}

impl PhoneCanonicalizer {
    /// `allowed` holds ISO 3166 alpha-2 codes; `UK` is read as `GB`
    pub fn new<S: AsRef<str>>(allowed: &[S]) -> Self {
        let allowed_regions = allowed
            .iter()
            .map(|code| match code.as_ref().trim().to_uppercase().as_str() {
                "UK" => "GB".to_string(),
                other => other.to_string(),
            })
            .collect();
        Self { allowed_regions }
    }

    pub fn is_allowed_region(&self, region: &str) -> bool {
        self.allowed_regions.contains(region)
    }

    /// E.164 form of `raw_phone`, or `InvalidPhoneNumber`
    pub fn canonicalize(&self, raw_phone: &str) -> Result<String, VerificationError> {
        let raw_phone = raw_phone.trim();
        if !raw_phone.starts_with('+') {
            debug!(phone = %mask_phone(raw_phone), "Phone number lacks international prefix");
            return Err(VerificationError::InvalidPhoneNumber);
        }

        let number = phonenumber::parse(None, raw_phone).map_err(|e| {
            debug!(phone = %mask_phone(raw_phone), error = %e, "Phone number does not parse");
            VerificationError::InvalidPhoneNumber
        })?;

        if !phonenumber::is_valid(&number) {
            debug!(phone = %mask_phone(raw_phone), "Phone number is not valid");
            return Err(VerificationError::InvalidPhoneNumber);
        }

        let region = number
            .country()
            .id()
            .map(|id| format!("{:?}", id))
            .ok_or(VerificationError::InvalidPhoneNumber)?;
        if !self.is_allowed_region(&region) {
            debug!(phone = %mask_phone(raw_phone), region = %region, "Country not approved");
            return Err(VerificationError::InvalidPhoneNumber);
        }

        match number.number_type(&DATABASE) {
            Type::Mobile | Type::FixedLineOrMobile | Type::Unknown => {}
            other => {
                debug!(phone = %mask_phone(raw_phone), number_type = ?other, "Not a mobile number");
                return Err(VerificationError::InvalidPhoneNumber);
            }
        }

        Ok(number.format().mode(Mode::E164).to_string())
    }
}
