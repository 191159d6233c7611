use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roost_core::{DomainError, DomainResult, Entity, PlaceId, ReviewId, UserId};

/// A guest review of a place. Both references are fixed at creation; only
/// the comment and the rating can ever change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub place_id: PlaceId,
    pub user_id: UserId,
    pub comment: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a review. Whether `place_id` and `user_id` reference
/// existing records is checked against the store by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewReview {
    pub place_id: PlaceId,
    pub user_id: UserId,
    pub comment: String,
    pub rating: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateReview {
    pub comment: Option<String>,
    pub rating: Option<f64>,
}

impl Review {
    pub fn create(input: NewReview) -> DomainResult<Self> {
        let comment = validate_comment(&input.comment)?;
        let rating = validate_rating(input.rating)?;
        let now = Utc::now();
        Ok(Self {
            id: ReviewId::new(),
            place_id: input.place_id,
            user_id: input.user_id,
            comment,
            rating,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: UpdateReview) -> DomainResult<()> {
        let comment = match &patch.comment {
            Some(raw) => Some(validate_comment(raw)?),
            None => None,
        };
        let rating = match patch.rating {
            Some(raw) => Some(validate_rating(raw)?),
            None => None,
        };
        if let Some(comment) = comment {
            self.comment = comment;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Entity for Review {
    type Id = ReviewId;

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

fn validate_comment(raw: &str) -> DomainResult<String> {
    let comment = raw.trim();
    if comment.is_empty() {
        return Err(DomainError::validation("review comment cannot be empty"));
    }
    Ok(comment.to_string())
}

fn validate_rating(value: f64) -> DomainResult<f64> {
    if !value.is_finite() || !(0.0..=5.0).contains(&value) {
        return Err(DomainError::validation(format!(
            "rating {value} out of range [0, 5]"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_review() -> NewReview {
        NewReview {
            place_id: PlaceId::new(),
            user_id: UserId::new(),
            comment: "Quiet street, great host.".to_string(),
            rating: 4.5,
        }
    }

    #[test]
    fn create_review_success() {
        let review = Review::create(new_review()).unwrap();
        assert_eq!(review.rating, 4.5);
        assert_eq!(review.created_at, review.updated_at);
    }

    #[test]
    fn create_rejects_blank_comment() {
        let mut input = new_review();
        input.comment = "  ".to_string();
        assert!(Review::create(input).is_err());
    }

    #[test]
    fn create_rejects_out_of_range_ratings() {
        for rating in [-0.1, 5.1, f64::NAN, f64::INFINITY] {
            let mut input = new_review();
            input.rating = rating;
            assert!(Review::create(input).is_err(), "accepted rating {rating}");
        }
    }

    #[test]
    fn boundary_ratings_are_valid() {
        for rating in [0.0, 5.0] {
            let mut input = new_review();
            input.rating = rating;
            assert!(Review::create(input).is_ok(), "rejected rating {rating}");
        }
    }

    #[test]
    fn patch_keeps_references_fixed() {
        let mut review = Review::create(new_review()).unwrap();
        let place = review.place_id;
        let user = review.user_id;

        review
            .apply(UpdateReview {
                comment: Some("Still great on a second stay.".to_string()),
                rating: Some(5.0),
            })
            .unwrap();

        assert_eq!(review.place_id, place);
        assert_eq!(review.user_id, user);
        assert_eq!(review.rating, 5.0);
    }

    #[test]
    fn serialized_review_exposes_ids_as_strings() {
        let review = Review::create(new_review()).unwrap();
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["rating"], serde_json::json!(4.5));
        assert_eq!(value["place_id"].as_str().unwrap(), review.place_id.to_string());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            #[test]
            fn ratings_in_range_always_pass(rating in 0.0_f64..=5.0) {
                prop_assert_eq!(validate_rating(rating).unwrap(), rating);
            }

            #[test]
            fn ratings_above_range_always_fail(excess in 1e-6_f64..1e6) {
                prop_assert!(validate_rating(5.0 + excess).is_err());
            }
        }
    }
}
