//! Taxonomy payload types

use serde::{Deserialize, Deserializer, Serialize};

/// A node of the taxonomy tree as served by `/api/taxonomy_json`.
///
/// `name` is the node's identity key; it is unique along any root-to-leaf
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonNode {
    pub name: String,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<TaxonNode>,
}

impl TaxonNode {
    /// Creates a leaf node.
    pub fn new(name: impl Into<String>, rank: Option<&str>) -> Self {
        Self {
            name: name.into(),
            rank: rank.map(str::to_string),
            children: Vec::new(),
        }
    }

    /// Appends a child, builder style.
    pub fn with_child(mut self, child: TaxonNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children, builder style.
    pub fn with_children(mut self, children: impl IntoIterator<Item = TaxonNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns `true` if the node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the display label: `name` or `name (rank)`.
    pub fn label(&self) -> String {
        label(&self.name, self.rank.as_deref())
    }
}

pub(crate) fn label(name: &str, rank: Option<&str>) -> String {
    match rank {
        Some(rank) if !rank.is_empty() => format!("{} ({})", name, rank),
        _ => name.to_string(),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<TaxonNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TaxonNode>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw provider response: either a single root or an array of roots.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaxonomyPayload {
    Forest(Vec<TaxonNode>),
    Root(TaxonNode),
}

impl TaxonomyPayload {
    /// Normalizes the payload into a forest.
    pub fn into_forest(self) -> Vec<TaxonNode> {
        match self {
            Self::Forest(roots) => roots,
            Self::Root(root) => vec![root],
        }
    }
}

/// One entry of the exported taxonomy selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonSelection {
    pub name: String,
    pub rank: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_root_normalizes_to_forest() {
        let json = r#"{"name": "Root", "rank": null, "children": [
            {"name": "Animalia", "rank": "kingdom"}
        ]}"#;
        let payload: TaxonomyPayload = serde_json::from_str(json).unwrap();
        let forest = payload.into_forest();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Root");
        assert_eq!(forest[0].children[0].rank.as_deref(), Some("kingdom"));
        assert!(forest[0].children[0].children.is_empty());
    }

    #[test]
    fn test_array_payload_is_kept() {
        let json = r#"[{"name": "A", "rank": null}, {"name": "B", "rank": "phylum", "children": null}]"#;
        let forest = serde_json::from_str::<TaxonomyPayload>(json)
            .unwrap()
            .into_forest();

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].name, "B");
        assert!(!forest[1].has_children());
    }

    #[test]
    fn test_label() {
        assert_eq!(TaxonNode::new("Genus X", Some("genus")).label(), "Genus X (genus)");
        assert_eq!(TaxonNode::new("Root", None).label(), "Root");
        assert_eq!(TaxonNode::new("Blank", Some("")).label(), "Blank");
    }
}
