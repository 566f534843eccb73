//! User update planning.

use serde::Deserialize;

use shop_core::Cart;

use super::{Column, ColumnValue, PlanBuilder, PlanError, UpdatePlan};
use crate::models::User;

/// Writable columns of the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Name,
    Latitude,
    Longitude,
    IsCard,
    Cart,
}

impl Column for UserColumn {
    const TABLE: &'static str = "users";

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::IsCard => "is_card",
            Self::Cart => "cart",
        }
    }
}

/// JSON payload for `PATCH /user/{id}`.
///
/// Every field is optional. An omitted (or `null`) field is left untouched;
/// a present field is compared with the stored value. Coordinates and the
/// card flag carry explicit presence, so `0.0` and `false` are real targets.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_card: Option<bool>,
    /// Replaces the whole cart when it differs; `[]` clears it.
    pub cart: Option<Cart>,
}

/// Plan the column updates that take `current` to the state described by `patch`.
///
/// # Errors
///
/// Returns `PlanError::NothingToUpdate` if no submitted field changes the row.
pub fn plan_user_update(
    current: &User,
    patch: &UserPatch,
) -> Result<UpdatePlan<UserColumn>, PlanError> {
    let mut builder = PlanBuilder::new(current.id.as_i64());

    builder
        .set_text(UserColumn::Name, patch.name.as_deref(), &current.name)
        .set_real(UserColumn::Latitude, patch.latitude, current.latitude)
        .set_real(UserColumn::Longitude, patch.longitude, current.longitude)
        .set_bool(UserColumn::IsCard, patch.is_card, current.is_card);

    if let Some(cart) = patch.cart.as_ref().filter(|cart| **cart != current.cart) {
        builder.set(UserColumn::Cart, ColumnValue::Text(cart.encode()));
    }

    builder.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shop_core::UserId;

    use super::*;

    fn ann(is_card: bool) -> User {
        User {
            id: UserId::new(2),
            name: "Ann".to_owned(),
            latitude: 55.75,
            longitude: 37.61,
            is_card,
            cart: Cart::new(vec![1, 2]),
        }
    }

    fn flag_only(value: bool) -> UserPatch {
        UserPatch {
            is_card: Some(value),
            ..UserPatch::default()
        }
    }

    #[test]
    fn test_flag_false_to_true() {
        let plan = plan_user_update(&ann(false), &flag_only(true)).unwrap();
        assert_eq!(
            plan.assignments(),
            &[(UserColumn::IsCard, ColumnValue::Bool(true))]
        );
    }

    #[test]
    fn test_flag_true_to_false() {
        let plan = plan_user_update(&ann(true), &flag_only(false)).unwrap();
        assert_eq!(
            plan.assignments(),
            &[(UserColumn::IsCard, ColumnValue::Bool(false))]
        );
    }

    #[test]
    fn test_flag_unchanged_is_nothing() {
        assert_eq!(
            plan_user_update(&ann(true), &flag_only(true)),
            Err(PlanError::NothingToUpdate)
        );
    }

    #[test]
    fn test_omitted_flag_is_left_alone() {
        let patch = UserPatch {
            name: Some("Bob".to_owned()),
            ..UserPatch::default()
        };
        let plan = plan_user_update(&ann(true), &patch).unwrap();
        assert_eq!(plan.columns().collect::<Vec<_>>(), vec![UserColumn::Name]);
    }

    #[test]
    fn test_empty_patch_is_nothing() {
        assert_eq!(
            plan_user_update(&ann(false), &UserPatch::default()),
            Err(PlanError::NothingToUpdate)
        );
    }

    #[test]
    fn test_longitude_compared_against_submitted_value() {
        let patch = UserPatch {
            longitude: Some(40.0),
            ..UserPatch::default()
        };
        let plan = plan_user_update(&ann(false), &patch).unwrap();
        assert_eq!(
            plan.assignments(),
            &[(UserColumn::Longitude, ColumnValue::Real(40.0))]
        );

        let same = UserPatch {
            longitude: Some(37.61),
            ..UserPatch::default()
        };
        assert_eq!(
            plan_user_update(&ann(false), &same),
            Err(PlanError::NothingToUpdate)
        );
    }

    #[test]
    fn test_explicit_zero_coordinate_is_a_change() {
        let patch = UserPatch {
            latitude: Some(0.0),
            ..UserPatch::default()
        };
        let plan = plan_user_update(&ann(false), &patch).unwrap();
        assert_eq!(
            plan.value_of(UserColumn::Latitude),
            Some(&ColumnValue::Real(0.0))
        );
    }

    #[test]
    fn test_cart_replaced_not_merged() {
        let patch = UserPatch {
            cart: Some(Cart::new(vec![9])),
            ..UserPatch::default()
        };
        let plan = plan_user_update(&ann(false), &patch).unwrap();
        assert_eq!(
            plan.value_of(UserColumn::Cart),
            Some(&ColumnValue::Text("9".to_owned()))
        );
    }

    #[test]
    fn test_empty_cart_clears() {
        let patch = UserPatch {
            cart: Some(Cart::default()),
            ..UserPatch::default()
        };
        let plan = plan_user_update(&ann(false), &patch).unwrap();
        assert_eq!(
            plan.value_of(UserColumn::Cart),
            Some(&ColumnValue::Text(String::new()))
        );
    }

    #[test]
    fn test_same_cart_is_nothing() {
        let patch = UserPatch {
            cart: Some(Cart::new(vec![1, 2])),
            ..UserPatch::default()
        };
        assert_eq!(
            plan_user_update(&ann(false), &patch),
            Err(PlanError::NothingToUpdate)
        );
    }

    #[test]
    fn test_patch_json_nulls_are_absent() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"name":null,"is_card":false,"cart":[3,4]}"#).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.is_card, Some(false));
        assert_eq!(patch.cart, Some(Cart::new(vec![3, 4])));
        assert_eq!(patch.latitude, None);
    }
}
