use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roost_core::{AmenityId, DomainError, DomainResult, Entity};

/// A catalogue amenity (wifi, parking, ...). Attached to places through
/// [`crate::association::PlaceAmenity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amenity {
    pub id: AmenityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAmenity {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateAmenity {
    pub name: Option<String>,
}

impl Amenity {
    pub fn create(input: NewAmenity) -> DomainResult<Self> {
        let name = validate_name(&input.name)?;
        let now = Utc::now();
        Ok(Self {
            id: AmenityId::new(),
            name,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: UpdateAmenity) -> DomainResult<()> {
        if let Some(raw) = &patch.name {
            self.name = validate_name(raw)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Entity for Amenity {
    type Id = AmenityId;

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
        return Err(DomainError::validation("amenity name cannot be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_amenity_success() {
        let amenity = Amenity::create(NewAmenity {
            name: "  Wifi ".to_string(),
        })
        .unwrap();
        assert_eq!(amenity.name, "Wifi");
    }

    #[test]
    fn create_rejects_blank_name() {
        assert!(
            Amenity::create(NewAmenity {
                name: " ".to_string()
            })
            .is_err()
        );
    }

    #[test]
    fn patch_renames() {
        let mut amenity = Amenity::create(NewAmenity {
            name: "Wifi".to_string(),
        })
        .unwrap();
        amenity
            .apply(UpdateAmenity {
                name: Some("Fibre wifi".to_string()),
            })
            .unwrap();
        assert_eq!(amenity.name, "Fibre wifi");
        assert!(amenity.updated_at >= amenity.created_at);
    }
}
