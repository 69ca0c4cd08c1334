//! Pollen Core - Entity Types
//!
//! Data structures, the error hierarchy, and boundary validation shared by
//! every other Pollen crate. No storage or transport concerns live here.

mod entities;
mod enums;
mod error;
mod identity;
mod validation;

pub use entities::*;
pub use enums::*;
pub use error::*;
pub use identity::*;
pub use validation::*;

// ============================================================================
// SEEDED DEFAULTS
// ============================================================================

/// Definition of a row seeded into every new environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedDefinition<T> {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: T,
}

/// Action classes seeded into every new environment.
pub const DEFAULT_ACTION_CLASSES: [SeedDefinition<ActionClassType>; 1] = [SeedDefinition {
    name: "New Session",
    description: "Gets fired when a new session is created",
    kind: ActionClassType::Automatic,
}];

/// Attribute classes seeded into every new environment.
pub const DEFAULT_ATTRIBUTE_CLASSES: [SeedDefinition<AttributeClassType>; 2] = [
    SeedDefinition {
        name: "email",
        description: "The email of the person",
        kind: AttributeClassType::Automatic,
    },
    SeedDefinition {
        name: "language",
        description: "The language used by the person",
        kind: AttributeClassType::Automatic,
    },
];

/// Build the seeded action and attribute class rows for a new environment.
pub fn seeded_classes(
    environment_id: EntityId,
    created_at: Timestamp,
) -> (Vec<ActionClass>, Vec<AttributeClass>) {
    let actions = DEFAULT_ACTION_CLASSES
        .iter()
        .map(|seed| ActionClass {
            id: new_entity_id(),
            environment_id,
            name: seed.name.to_string(),
            description: Some(seed.description.to_string()),
            action_type: seed.kind,
            created_at,
        })
        .collect();
    let attributes = DEFAULT_ATTRIBUTE_CLASSES
        .iter()
        .map(|seed| AttributeClass {
            id: new_entity_id(),
            environment_id,
            name: seed.name.to_string(),
            description: Some(seed.description.to_string()),
            attribute_type: seed.kind,
            created_at,
        })
        .collect();
    (actions, attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_classes_shape() {
        let env_id = new_entity_id();
        let (actions, attributes) = seeded_classes(env_id, now());

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "New Session");
        assert_eq!(actions[0].action_type, ActionClassType::Automatic);

        let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["email", "language"]);
        assert!(attributes.iter().all(|a| a.environment_id == env_id));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn org_role_strategy() -> impl Strategy<Value = OrganizationRole> {
        prop_oneof![
            Just(OrganizationRole::Owner),
            Just(OrganizationRole::Manager),
            Just(OrganizationRole::Member),
            Just(OrganizationRole::Billing),
        ]
    }

    proptest! {
        #[test]
        fn prop_admin_iff_owner_or_manager(role in org_role_strategy()) {
            let is_admin = role.team_role() == TeamRole::Admin;
            prop_assert_eq!(
                is_admin,
                matches!(role, OrganizationRole::Owner | OrganizationRole::Manager)
            );
        }

        #[test]
        fn prop_role_wire_name_parses_back(role in org_role_strategy()) {
            prop_assert_eq!(role.as_str().parse::<OrganizationRole>(), Ok(role));
        }

        #[test]
        fn prop_blank_strings_rejected(spaces in " {0,8}") {
            prop_assert!(spaces.validate_non_empty("required").is_err());
        }
    }
}
