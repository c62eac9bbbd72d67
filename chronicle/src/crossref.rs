//! Cross-references between person clusters.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::types::{non_blank, PersonCluster, Relation};

/// Outcome of following a relation to another cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrossReference<'a> {
    /// The target cluster is in the dataset
    Found {
        cluster_id: &'a str,
        primary_name: &'a str,
        #[serde(skip)]
        cluster: &'a PersonCluster,
    },
    /// The relation names a cluster id absent from the dataset
    NotFound { target: String },
    /// The relation has no `otherPerson`
    NoTarget,
}

impl CrossReference<'_> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Display name of the target, when found.
    pub fn target_name(&self) -> Option<&str> {
        match self {
            Self::Found { primary_name, .. } => Some(*primary_name),
            _ => None,
        }
    }
}

/// Follow `relation.otherPerson` to a cluster by exact id.
pub fn resolve_cross_reference<'a>(relation: &Relation, dataset: &'a Dataset) -> CrossReference<'a> {
    let Some(target) = non_blank(relation.other_person.as_deref()) else {
        return CrossReference::NoTarget;
    };

    match dataset.get_key_value(target) {
        Some((cluster_id, cluster)) => CrossReference::Found {
            cluster_id,
            primary_name: cluster.primary_name(),
            cluster,
        },
        None => CrossReference::NotFound {
            target: target.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Appellation;

    fn dataset() -> Dataset {
        let spouse = PersonCluster {
            appellations: vec![Appellation {
                appellation: Some("Maria van Dam".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        Dataset::from_clusters([("c-2".to_string(), spouse)])
    }

    fn relation(other: Option<&str>) -> Relation {
        Relation {
            relation: Some("https://vocab.example#hasSpouse".to_string()),
            other_person: other.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_found() {
        let dataset = dataset();
        let reference = resolve_cross_reference(&relation(Some("c-2")), &dataset);

        match reference {
            CrossReference::Found {
                cluster_id,
                primary_name,
                ..
            } => {
                assert_eq!(cluster_id, "c-2");
                assert_eq!(primary_name, "Maria van Dam");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_not_found_is_reported() {
        let dataset = dataset();
        let reference = resolve_cross_reference(&relation(Some("c-404")), &dataset);
        assert_eq!(
            reference,
            CrossReference::NotFound {
                target: "c-404".to_string()
            }
        );
        assert!(reference.target_name().is_none());
    }

    #[test]
    fn test_exact_match_only() {
        let dataset = dataset();
        assert!(!resolve_cross_reference(&relation(Some("C-2")), &dataset).is_found());
        assert!(!resolve_cross_reference(&relation(Some(" c-2")), &dataset).is_found());
    }

    #[test]
    fn test_no_target() {
        let dataset = dataset();
        assert_eq!(resolve_cross_reference(&relation(None), &dataset), CrossReference::NoTarget);
        assert_eq!(resolve_cross_reference(&relation(Some("")), &dataset), CrossReference::NoTarget);
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let dataset = dataset();
        let json = serde_json::to_value(resolve_cross_reference(&relation(Some("c-2")), &dataset)).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["primary_name"], "Maria van Dam");
        assert!(json.get("cluster").is_none());
    }
}
