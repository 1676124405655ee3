//! Permission Matrix: feature → action → granted.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use tollgate_core::ValueObject;

use crate::action::CrudAction;
use crate::feature::{FEATURE_COUNT, Feature};

/// Full feature × action grid.
///
/// Every catalog feature and every action always has a cell, so lookups never
/// need existence checks. A cell for an action the feature does not support
/// (see [`Feature::supports`]) is always `false`: every write path goes
/// through [`PermissionMatrix::set`], which refuses to set such a cell.
///
/// The grid is a plain value. `clone()` yields a fully independent copy; clone
/// a shared matrix before editing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawMatrix")]
pub struct PermissionMatrix {
    cells: [[bool; 4]; FEATURE_COUNT],
}

impl ValueObject for PermissionMatrix {}

impl Default for PermissionMatrix {
    fn default() -> Self {
        Self::empty()
    }
}

impl PermissionMatrix {
    /// All features, all actions, nothing granted.
    pub const fn empty() -> Self {
        Self {
            cells: [[false; 4]; FEATURE_COUNT],
        }
    }

    /// Every supported action of every feature granted.
    pub fn full_control() -> Self {
        let mut matrix = Self::empty();
        for feature in Feature::ALL {
            matrix.grant_all_valid(feature);
        }
        matrix
    }

    pub fn allows(&self, feature: Feature, action: CrudAction) -> bool {
        self.cells[feature.index()][action.index()]
    }

    /// Set a cell. Returns `false` (leaving the cell untouched) when asked to
    /// grant an action the feature does not support.
    pub fn set(&mut self, feature: Feature, action: CrudAction, granted: bool) -> bool {
        if granted && !feature.supports(action) {
            return false;
        }
        self.cells[feature.index()][action.index()] = granted;
        true
    }

    pub fn grant(&mut self, feature: Feature, action: CrudAction) -> bool {
        self.set(feature, action, true)
    }

    pub fn revoke(&mut self, feature: Feature, action: CrudAction) {
        self.set(feature, action, false);
    }

    pub fn grant_all_valid(&mut self, feature: Feature) {
        for &action in feature.valid_actions() {
            self.cells[feature.index()][action.index()] = true;
        }
    }

    pub fn revoke_all(&mut self, feature: Feature) {
        self.cells[feature.index()] = [false; 4];
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|granted| !granted)
    }

    /// Granted cells in catalog order, then action order.
    pub fn granted_cells(&self) -> impl Iterator<Item = (Feature, CrudAction)> + '_ {
        Feature::ALL.into_iter().flat_map(move |feature| {
            CrudAction::ALL
                .into_iter()
                .filter(move |&action| self.allows(feature, action))
                .map(move |action| (feature, action))
        })
    }

    /// Cellwise OR of two matrices.
    pub fn union(&self, other: &PermissionMatrix) -> PermissionMatrix {
        let mut merged = self.clone();
        for (row, other_row) in merged.cells.iter_mut().zip(other.cells.iter()) {
            for (cell, other_cell) in row.iter_mut().zip(other_row.iter()) {
                *cell |= *other_cell;
            }
        }
        merged
    }

    /// The action row for one feature, in action order.
    pub fn row(&self, feature: Feature) -> [bool; 4] {
        self.cells[feature.index()]
    }
}

/// Untyped lookup for callers holding raw strings (route handlers, templates).
///
/// Total: a missing matrix, an unknown feature key or an unknown action name
/// all answer `false`.
pub fn has_permission_in_matrix(
    matrix: Option<&PermissionMatrix>,
    feature: &str,
    action: &str,
) -> bool {
    let Some(matrix) = matrix else {
        return false;
    };
    match (Feature::from_key(feature), CrudAction::parse(action)) {
        (Some(feature), Some(action)) => matrix.allows(feature, action),
        _ => false,
    }
}

struct ActionRow([bool; 4]);

impl Serialize for ActionRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for action in CrudAction::ALL {
            map.serialize_entry(action.as_str(), &self.0[action.index()])?;
        }
        map.end()
    }
}

impl Serialize for PermissionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for feature in Feature::ALL {
            map.serialize_entry(feature.key(), &ActionRow(self.row(feature)))?;
        }
        map.end()
    }
}

/// Wire shape of an edited matrix as it comes back from the console.
#[derive(Deserialize)]
#[serde(transparent)]
struct RawMatrix(BTreeMap<String, BTreeMap<String, bool>>);

impl From<RawMatrix> for PermissionMatrix {
    fn from(raw: RawMatrix) -> Self {
        let mut matrix = PermissionMatrix::empty();
        for (key, actions) in raw.0 {
            let Some(feature) = Feature::from_key(&key) else {
                tracing::debug!(feature = %key, "ignoring unknown feature in matrix payload");
                continue;
            };
            for (name, granted) in actions {
                let Some(action) = CrudAction::parse(&name) else {
                    continue;
                };
                if !matrix.set(feature, action, granted) {
                    tracing::debug!(%feature, %action, "ignoring unsupported action in matrix payload");
                }
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_matrix_covers_every_cell() {
        let m = PermissionMatrix::empty();
        assert!(m.is_empty());
        for feature in Feature::ALL {
            for action in CrudAction::ALL {
                assert!(!m.allows(feature, action));
            }
        }
    }

    #[test]
    fn unsupported_action_cannot_be_granted() {
        let mut m = PermissionMatrix::empty();
        assert!(!m.grant(Feature::AuditLogs, CrudAction::Create));
        assert!(!m.allows(Feature::AuditLogs, CrudAction::Create));
        assert!(m.grant(Feature::AuditLogs, CrudAction::Delete));
        assert!(m.allows(Feature::AuditLogs, CrudAction::Delete));
    }

    #[test]
    fn clone_is_independent() {
        let original = PermissionMatrix::full_control();
        let mut copy = original.clone();
        copy.revoke(Feature::Tokens, CrudAction::Read);
        assert!(original.allows(Feature::Tokens, CrudAction::Read));
        assert!(!copy.allows(Feature::Tokens, CrudAction::Read));
    }

    #[test]
    fn untyped_lookup_is_total() {
        let mut m = PermissionMatrix::empty();
        m.grant(Feature::Software, CrudAction::Read);

        assert!(has_permission_in_matrix(Some(&m), "software", "READ"));
        assert!(!has_permission_in_matrix(Some(&m), "software", "UPDATE"));
        assert!(!has_permission_in_matrix(Some(&m), "nope", "READ"));
        assert!(!has_permission_in_matrix(Some(&m), "software", "EXCHANGE"));
        assert!(!has_permission_in_matrix(None, "software", "READ"));
    }

    #[test]
    fn granted_cells_follow_catalog_then_action_order() {
        let mut m = PermissionMatrix::empty();
        m.grant(Feature::Tokens, CrudAction::Delete);
        m.grant(Feature::Software, CrudAction::Update);
        m.grant(Feature::Tokens, CrudAction::Create);

        let cells: Vec<_> = m.granted_cells().collect();
        assert_eq!(
            cells,
            vec![
                (Feature::Software, CrudAction::Update),
                (Feature::Tokens, CrudAction::Create),
                (Feature::Tokens, CrudAction::Delete),
            ]
        );
    }

    #[test]
    fn union_merges_cellwise() {
        let mut a = PermissionMatrix::empty();
        a.grant(Feature::Users, CrudAction::Read);
        let mut b = PermissionMatrix::empty();
        b.grant(Feature::Users, CrudAction::Update);

        let merged = a.union(&b);
        assert!(merged.allows(Feature::Users, CrudAction::Read));
        assert!(merged.allows(Feature::Users, CrudAction::Update));
        assert!(!a.allows(Feature::Users, CrudAction::Update));
    }

    #[test]
    fn serializes_every_feature_and_action() {
        let mut m = PermissionMatrix::empty();
        m.grant(Feature::Tokens, CrudAction::Create);
        let value = serde_json::to_value(&m).unwrap();

        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), FEATURE_COUNT);
        assert_eq!(
            value["tokens"],
            json!({"CREATE": true, "READ": false, "UPDATE": false, "DELETE": false})
        );
        assert_eq!(value["auditLogs"]["CREATE"], json!(false));
    }

    #[test]
    fn serialization_keeps_catalog_order() {
        let text = serde_json::to_string(&PermissionMatrix::empty()).unwrap();
        let software = text.find("\"software\"").unwrap();
        let tokens = text.find("\"tokens\"").unwrap();
        let documents = text.find("\"documents\"").unwrap();
        assert!(software < tokens && tokens < documents);
    }

    #[test]
    fn deserialization_filters_untrusted_cells() {
        let payload = json!({
            "software": {"CREATE": true, "READ": true},
            "auditLogs": {"CREATE": true, "DELETE": true},
            "bogus": {"READ": true},
            "tokens": {"EXTEND": true}
        });
        let m: PermissionMatrix = serde_json::from_value(payload).unwrap();

        assert!(m.allows(Feature::Software, CrudAction::Create));
        assert!(m.allows(Feature::Software, CrudAction::Read));
        assert!(!m.allows(Feature::AuditLogs, CrudAction::Create));
        assert!(m.allows(Feature::AuditLogs, CrudAction::Delete));
        assert_eq!(m.granted_cells().count(), 3);
    }

    #[test]
    fn full_control_serializes_back_to_itself() {
        let full = PermissionMatrix::full_control();
        let text = serde_json::to_string(&full).unwrap();
        let back: PermissionMatrix = serde_json::from_str(&text).unwrap();
        assert_eq!(back, full);
    }
}
