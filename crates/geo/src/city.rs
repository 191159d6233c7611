use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roost_core::{CityId, DomainError, DomainResult, Entity};

use crate::country::CountryCode;

/// A city, keyed into a country by its two-letter code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub country_code: CountryCode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a city. Whether `country_code` references an existing
/// country is checked against the store by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCity {
    pub name: String,
    pub country_code: CountryCode,
}

/// Patch for an existing city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateCity {
    pub name: Option<String>,
    pub country_code: Option<CountryCode>,
}

impl City {
    pub fn create(input: NewCity) -> DomainResult<Self> {
        let name = validate_name(&input.name)?;
        let now = Utc::now();
        Ok(Self {
            id: CityId::new(),
            name,
            country_code: input.country_code,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: UpdateCity) -> DomainResult<()> {
        let name = match &patch.name {
            Some(raw) => Some(validate_name(raw)?),
            None => None,
        };
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(country_code) = patch.country_code {
            self.country_code = country_code;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Entity for City {
    type Id = CityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("city name cannot be empty"));
    }
    Ok(name.to_string())
}
