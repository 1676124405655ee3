//! Matrix ⇄ assignment-list conversion.
//!
//! Storage keeps one row per granted (feature, action) pair, using the DB
//! token vocabulary. Writes replace a role's or user's full row set.

use serde::{Deserialize, Serialize};

use crate::action::CrudAction;
use crate::codec::{crud_to_db_permission, db_permission_to_crud};
use crate::feature::Feature;
use crate::matrix::PermissionMatrix;

/// A persisted assignment row, exactly as storage hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionAssignmentRow {
    pub permission: String,
    pub resource: Option<String>,
}

impl PermissionAssignmentRow {
    pub fn new(permission: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            resource: Some(resource.into()),
        }
    }

    /// Parse into the typed form. `None` when the resource is missing or not
    /// in the catalog, or when the token has no CRUD meaning.
    pub fn decode(&self) -> Option<Assignment> {
        let resource = Feature::from_key(self.resource.as_deref()?)?;
        let permission = db_permission_to_crud(&self.permission)?;
        Some(Assignment {
            permission,
            resource,
        })
    }
}

/// A typed assignment: one granted cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub permission: CrudAction,
    pub resource: Feature,
}

impl Assignment {
    pub fn new(resource: Feature, permission: CrudAction) -> Self {
        Self {
            permission,
            resource,
        }
    }

    /// Storage form, with the action re-encoded as a DB token.
    pub fn encode(&self) -> PermissionAssignmentRow {
        PermissionAssignmentRow::new(
            crud_to_db_permission(self.permission).as_str(),
            self.resource.key(),
        )
    }
}

/// Flatten a matrix to its granted cells, in catalog order then action order.
///
/// Every action of every feature is visited, not only the feature's valid
/// subset, so whatever the matrix holds is what gets written.
pub fn matrix_to_assignments(matrix: &PermissionMatrix) -> Vec<Assignment> {
    let mut out = Vec::new();
    for resource in Feature::ALL {
        for permission in CrudAction::ALL {
            if matrix.allows(resource, permission) {
                out.push(Assignment {
                    permission,
                    resource,
                });
            }
        }
    }
    out
}

/// Flatten and encode in one go; the payload for a full-replace write.
pub fn matrix_to_rows(matrix: &PermissionMatrix) -> Vec<PermissionAssignmentRow> {
    matrix_to_assignments(matrix)
        .iter()
        .map(Assignment::encode)
        .collect()
}

/// Result of rebuilding a matrix from stored rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltMatrix {
    pub matrix: PermissionMatrix,
    /// Rows that granted a cell.
    pub applied: usize,
    /// Rows dropped as malformed (unknown feature or token, null resource,
    /// action unsupported by the feature).
    pub dropped: usize,
}

impl BuiltMatrix {
    pub fn has_valid_rows(&self) -> bool {
        self.applied > 0
    }
}

/// Rebuild a matrix from stored rows, silently dropping malformed ones.
pub fn build_from_assignments(rows: &[PermissionAssignmentRow]) -> BuiltMatrix {
    let mut matrix = PermissionMatrix::empty();
    let mut applied = 0;
    let mut dropped = 0;

    for row in rows {
        match row.decode() {
            Some(a) if matrix.grant(a.resource, a.permission) => applied += 1,
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!(applied, dropped, "dropped malformed permission rows");
    }

    BuiltMatrix {
        matrix,
        applied,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flatten_then_encode_tokens() {
        let mut m = PermissionMatrix::empty();
        m.grant(Feature::Tokens, CrudAction::Create);
        m.grant(Feature::Tokens, CrudAction::Delete);

        let assignments = matrix_to_assignments(&m);
        assert_eq!(
            assignments,
            vec![
                Assignment::new(Feature::Tokens, CrudAction::Create),
                Assignment::new(Feature::Tokens, CrudAction::Delete),
            ]
        );

        let json = serde_json::to_value(&assignments).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"permission": "CREATE", "resource": "tokens"},
                {"permission": "DELETE", "resource": "tokens"},
            ])
        );

        let rows = matrix_to_rows(&m);
        assert_eq!(
            rows,
            vec![
                PermissionAssignmentRow::new("WRITE", "tokens"),
                PermissionAssignmentRow::new("EXCHANGE", "tokens"),
            ]
        );
    }

    #[test]
    fn empty_matrix_flattens_to_nothing() {
        assert!(matrix_to_assignments(&PermissionMatrix::empty()).is_empty());
    }

    #[test]
    fn null_resource_is_dropped() {
        let rows = vec![PermissionAssignmentRow {
            permission: "READ".into(),
            resource: None,
        }];
        let built = build_from_assignments(&rows);
        assert!(built.matrix.is_empty());
        assert_eq!(built.dropped, 1);
        assert!(!built.has_valid_rows());
    }

    #[test]
    fn unsupported_action_row_is_dropped() {
        // CREATE on audit logs is not a valid cell.
        let rows = vec![
            PermissionAssignmentRow::new("WRITE", "auditLogs"),
            PermissionAssignmentRow::new("READ", "auditLogs"),
        ];
        let built = build_from_assignments(&rows);
        assert_eq!(built.applied, 1);
        assert_eq!(built.dropped, 1);
        assert!(built.matrix.allows(Feature::AuditLogs, CrudAction::Read));
        assert!(!built.matrix.allows(Feature::AuditLogs, CrudAction::Create));
    }

    #[test]
    fn storage_row_deserializes_with_null_resource() {
        let row: PermissionAssignmentRow =
            serde_json::from_str(r#"{"permission":"SYNC","resource":null}"#).unwrap();
        assert_eq!(row.resource, None);
        assert_eq!(row.decode(), None);
    }

    fn valid_cell() -> impl Strategy<Value = (Feature, CrudAction)> {
        (0..Feature::ALL.len()).prop_flat_map(|i| {
            let feature = Feature::ALL[i];
            let actions = feature.valid_actions();
            (Just(feature), (0..actions.len()).prop_map(move |j| actions[j]))
        })
    }

    proptest! {
        #[test]
        fn round_trip_preserves_valid_cells(cells in prop::collection::vec(valid_cell(), 0..40)) {
            let mut original = PermissionMatrix::empty();
            for (feature, action) in &cells {
                original.grant(*feature, *action);
            }

            let rows = matrix_to_rows(&original);
            let rebuilt = build_from_assignments(&rows);

            prop_assert_eq!(rebuilt.dropped, 0);
            prop_assert_eq!(rebuilt.matrix, original);
        }
    }
}
