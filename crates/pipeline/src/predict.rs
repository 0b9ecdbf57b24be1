//! Embedding link prediction
//!
//! Translational fallback for questions the graph cannot answer:
//! `target = entity_vector + relation_vector`, then the entity
//! nearest to `target` wins. Distance is cosine distance
//! (1 - cosine similarity), so vector magnitude does not skew the
//! ranking.
//!
//! Every failure mode (unknown uri, ragged matrix, empty space)
//! yields `None`: this path is best-effort, never required.

use cinegraph_common::errors::{AppError, Result};
use cinegraph_semantic::index::cosine_similarity;
use cinegraph_semantic::Lexicon;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Provenance tag attached to predicted answers
pub const EMBEDDING_PROVENANCE: &str = "Embeddings";

/// Parallel dense matrices for entities and relations plus their
/// uri <-> row mappings, loaded once at startup.
pub struct EmbeddingSpace {
    entity_vectors: Vec<Vec<f32>>,
    relation_vectors: Vec<Vec<f32>>,
    entity_rows: HashMap<String, usize>,
    relation_rows: HashMap<String, usize>,
    /// Row index -> entity uri, for reading results back out
    entity_uris: Vec<String>,
}

impl EmbeddingSpace {
    /// Load both matrices (CSV of f32 rows) and both row mappings
    /// (TSV `index<TAB>uri`).
    pub fn load(
        entity_matrix: &Path,
        entity_ids: &Path,
        relation_matrix: &Path,
        relation_ids: &Path,
    ) -> Result<Self> {
        let entity_vectors = load_matrix(entity_matrix)?;
        let relation_vectors = load_matrix(relation_matrix)?;
        let (entity_rows, entity_uris) = load_mapping(entity_ids, entity_vectors.len())?;
        let (relation_rows, _) = load_mapping(relation_ids, relation_vectors.len())?;

        info!(
            entities = entity_vectors.len(),
            relations = relation_vectors.len(),
            "Loaded embedding space"
        );
        Ok(Self {
            entity_vectors,
            relation_vectors,
            entity_rows,
            relation_rows,
            entity_uris,
        })
    }

    /// Build from in-memory parts (tests, fixtures)
    pub fn from_parts(
        entity_vectors: Vec<Vec<f32>>,
        entity_uris: Vec<String>,
        relation_vectors: Vec<Vec<f32>>,
        relation_uris: Vec<String>,
    ) -> Self {
        let entity_rows = entity_uris
            .iter()
            .enumerate()
            .map(|(i, uri)| (uri.clone(), i))
            .collect();
        let relation_rows = relation_uris
            .iter()
            .enumerate()
            .map(|(i, uri)| (uri.clone(), i))
            .collect();
        Self {
            entity_vectors,
            relation_vectors,
            entity_rows,
            relation_rows,
            entity_uris,
        }
    }

    fn entity_vector(&self, uri: &str) -> Option<&[f32]> {
        let row = *self.entity_rows.get(uri)?;
        self.entity_vectors.get(row).map(|v| v.as_slice())
    }

    fn relation_vector(&self, uri: &str) -> Option<&[f32]> {
        let row = *self.relation_rows.get(uri)?;
        self.relation_vectors.get(row).map(|v| v.as_slice())
    }
}

/// A prediction and its provenance tag
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub uri: String,
    pub provenance: &'static str,
}

/// Nearest-entity link predictor over the embedding space
pub struct LinkPredictor {
    space: Arc<EmbeddingSpace>,
    lexicon: Arc<Lexicon>,
}

impl LinkPredictor {
    pub fn new(space: Arc<EmbeddingSpace>, lexicon: Arc<Lexicon>) -> Self {
        Self { space, lexicon }
    }

    /// Predict the object of (entity, relation). Deterministic for a
    /// fixed embedding space: ties break toward the lower row index.
    pub fn nearest(&self, entity_uri: &str, relation_uri: &str) -> Option<Prediction> {
        let entity = self.space.entity_vector(entity_uri)?;
        let relation = self.space.relation_vector(relation_uri)?;
        if entity.len() != relation.len() {
            warn!(entity = entity_uri, relation = relation_uri, "Dimension mismatch");
            return None;
        }

        let target: Vec<f32> = entity
            .iter()
            .zip(relation.iter())
            .map(|(e, r)| e + r)
            .collect();

        let mut best: Option<(usize, f32)> = None;
        for (row, candidate) in self.space.entity_vectors.iter().enumerate() {
            let distance = 1.0 - cosine_similarity(&target, candidate);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((row, distance)),
            }
        }

        let (row, distance) = best?;
        let uri = self.space.entity_uris.get(row)?.clone();
        let label = self
            .lexicon
            .label_of(&uri)
            .map(str::to_string)
            .unwrap_or_else(|| uri.clone());
        debug!(
            entity = entity_uri,
            relation = relation_uri,
            predicted = %uri,
            distance,
            "Link prediction"
        );

        Some(Prediction {
            label,
            uri,
            provenance: EMBEDDING_PROVENANCE,
        })
    }
}

/// Load a CSV matrix of f32 rows
fn load_matrix(path: &Path) -> Result<Vec<Vec<f32>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (row_no, row) in reader.records().enumerate() {
        let row = row?;
        let mut vector = Vec::with_capacity(row.len());
        for cell in row.iter() {
            let value = cell.trim().parse::<f32>().map_err(|e| {
                AppError::MalformedRecord {
                    file: path.display().to_string(),
                    message: format!("row {}: {}", row_no + 1, e),
                }
            })?;
            vector.push(value);
        }
        rows.push(vector);
    }
    Ok(rows)
}

/// Load an `index<TAB>uri` mapping file
fn load_mapping(path: &Path, row_count: usize) -> Result<(HashMap<String, usize>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_path(path)?;

    let mut rows = HashMap::new();
    let mut uris = vec![String::new(); row_count];
    for record in reader.records() {
        let record = record?;
        let (Some(index), Some(uri)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let Ok(index) = index.trim().parse::<usize>() else {
            warn!(index, "Skipping mapping row with non-numeric index");
            continue;
        };
        if index >= row_count {
            warn!(index, row_count, "Mapping index beyond matrix, skipping");
            continue;
        }
        uris[index] = uri.trim().to_string();
        rows.insert(uri.trim().to_string(), index);
    }
    Ok((rows, uris))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tiny hand-built space: relation P1 translates Q1 onto Q2's
    /// direction.
    fn space() -> EmbeddingSpace {
        EmbeddingSpace::from_parts(
            vec![
                vec![1.0, 0.0, 0.0], // Q1
                vec![1.0, 1.0, 0.0], // Q2
                vec![0.0, 0.0, 1.0], // Q3
            ],
            vec!["wd:Q1".into(), "wd:Q2".into(), "wd:Q3".into()],
            vec![vec![0.0, 1.0, 0.0]], // P1
            vec!["wdt:P1".into()],
        )
    }

    fn lexicon() -> Arc<Lexicon> {
        let mut lexicon = Lexicon::empty();
        lexicon.add_entry("wd:Q2", "Christopher Nolan");
        Arc::new(lexicon)
    }

    #[test]
    fn test_translation_finds_nearest() {
        let predictor = LinkPredictor::new(Arc::new(space()), lexicon());
        let prediction = predictor.nearest("wd:Q1", "wdt:P1").unwrap();
        // Q1 + P1 = (1,1,0), exactly Q2
        assert_eq!(prediction.uri, "wd:Q2");
        assert_eq!(prediction.label, "Christopher Nolan");
        assert_eq!(prediction.provenance, "Embeddings");
    }

    #[test]
    fn test_deterministic() {
        let predictor = LinkPredictor::new(Arc::new(space()), lexicon());
        let a = predictor.nearest("wd:Q1", "wdt:P1").unwrap();
        let b = predictor.nearest("wd:Q1", "wdt:P1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_uri_is_none() {
        let predictor = LinkPredictor::new(Arc::new(space()), lexicon());
        assert!(predictor.nearest("wd:Q404", "wdt:P1").is_none());
        assert!(predictor.nearest("wd:Q1", "wdt:P404").is_none());
    }

    #[test]
    fn test_label_falls_back_to_uri() {
        let predictor = LinkPredictor::new(Arc::new(space()), Arc::new(Lexicon::empty()));
        let prediction = predictor.nearest("wd:Q1", "wdt:P1").unwrap();
        assert_eq!(prediction.label, "wd:Q2");
    }

    #[test]
    fn test_load_matrix_and_mapping() {
        use std::io::Write;
        let mut matrix = tempfile::NamedTempFile::new().unwrap();
        writeln!(matrix, "1.0,0.0").unwrap();
        writeln!(matrix, "0.0,1.0").unwrap();
        matrix.flush().unwrap();

        let mut mapping = tempfile::NamedTempFile::new().unwrap();
        writeln!(mapping, "0\twd:Q1").unwrap();
        writeln!(mapping, "1\twd:Q2").unwrap();
        mapping.flush().unwrap();

        let vectors = load_matrix(matrix.path()).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

        let (rows, uris) = load_mapping(mapping.path(), 2).unwrap();
        assert_eq!(rows["wd:Q2"], 1);
        assert_eq!(uris, vec!["wd:Q1", "wd:Q2"]);
    }
}
