//! Query form state sent to `/api/build_query`.

use serde::{Deserialize, Serialize};

use crate::model::TaxonSelection;

/// Which sequences to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceType {
    #[default]
    Full,
    /// Restrict to the amplicon between two primers.
    Primers,
}

/// Forward/reverse primer pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primers {
    pub forward: String,
    pub reverse: String,
}

/// Sequence section of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceOptions {
    #[serde(rename = "type")]
    pub kind: Option<SequenceType>,
    /// Only present in primer mode.
    pub primers: Option<Primers>,
}

/// Hybrid specimen handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HybridFilter {
    #[default]
    All,
    Exclude,
    Only,
}

impl HybridFilter {
    pub const ALL: [HybridFilter; 3] = [Self::All, Self::Exclude, Self::Only];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Exclude => "exclude",
            Self::Only => "only",
        }
    }

    /// Next value in button-group order, wrapping.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Exclude,
            Self::Exclude => Self::Only,
            Self::Only => Self::All,
        }
    }

    /// Previous value in button-group order, wrapping.
    pub fn prev(self) -> Self {
        match self {
            Self::All => Self::Only,
            Self::Exclude => Self::All,
            Self::Only => Self::Exclude,
        }
    }
}

/// Boolean filters and hybrid handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub exclude_duplicates: bool,
    pub hybrids: HybridFilter,
    pub exclude_misclassified: bool,
    pub checked_locations_only: bool,
}

/// Full query state assembled from the form.
///
/// # Example
///
/// ```
/// use specimen_lib::query::{Primers, QueryState, SequenceType};
///
/// let state = QueryState::new()
///     .with_sequence(SequenceType::Primers, Primers {
///         forward: "GGTCAACAAATCATAAAGATATTGG".into(),
///         reverse: "TAAACTTCAGGGTGACCAAAAAATCA".into(),
///     })
///     .with_identification_rank("species");
///
/// let json = serde_json::to_value(&state).unwrap();
/// assert_eq!(json["sequence"]["type"], "primers");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub taxonomy: Vec<TaxonSelection>,
    pub identification_rank: Option<String>,
    pub countries: Vec<String>,
    pub climates: Vec<String>,
    pub sequence: SequenceOptions,
    pub options: QueryOptions,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxonomy(mut self, taxonomy: Vec<TaxonSelection>) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn with_identification_rank(mut self, rank: impl Into<String>) -> Self {
        self.identification_rank = Some(rank.into());
        self
    }

    /// Sets the sequence type. Primers are dropped unless the type is
    /// [`SequenceType::Primers`].
    pub fn with_sequence(mut self, kind: SequenceType, primers: Primers) -> Self {
        self.sequence = SequenceOptions {
            kind: Some(kind),
            primers: (kind == SequenceType::Primers).then_some(primers),
        };
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

/// Parameters of the plain `/api/query` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenusQuery {
    pub genus: String,
    pub verified_genus: bool,
    pub exclude_duplicates: bool,
    pub exclude_misclassified: bool,
}

impl GenusQuery {
    pub fn new(genus: impl Into<String>) -> Self {
        Self {
            genus: genus.into(),
            ..Default::default()
        }
    }

    /// Query-string pairs in the order the server expects.
    pub fn pairs(&self) -> [(&'static str, String); 4] {
        [
            ("genus", self.genus.clone()),
            ("verified_genus", self.verified_genus.to_string()),
            ("exclude_dup", self.exclude_duplicates.to_string()),
            ("exclude_misclass", self.exclude_misclassified.to_string()),
        ]
    }
}
