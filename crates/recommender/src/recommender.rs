//! Recommender Query: ranked lookups against a loaded artifact set.
//!
//! A `Recommender` is immutable once built, so one instance can be shared
//! through `Arc` by any number of concurrent readers.

use data_loader::{ItemId, TitleIndex};
use serde::Serialize;
use similarity::SimilarityMatrix;
use tracing::{debug, instrument, warn};
use ulid::Ulid;

use crate::artifacts::{ArtifactSet, ArtifactStore, ItemRecord};
use crate::error::ArtifactError;

/// One recommended item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub title: String,
    pub score: f32,
}

/// One title search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub row: usize,
    pub item_id: ItemId,
    pub title: String,
}

pub struct Recommender {
    snapshot_id: Ulid,
    items: Vec<ItemRecord>,
    titles: TitleIndex,
    matrix: SimilarityMatrix,
}

impl Recommender {
    /// Wrap a loaded artifact set.
    ///
    /// Fails with `Mismatch` unless there is exactly one matrix row per item.
    pub fn new(set: ArtifactSet) -> Result<Self, ArtifactError> {
        if set.items.len() != set.matrix.dim() {
            return Err(ArtifactError::Mismatch(format!(
                "{} items but similarity matrix has dimension {}",
                set.items.len(),
                set.matrix.dim()
            )));
        }
        let titles = TitleIndex::build(set.items.iter().map(|item| item.title.as_str()));
        if titles.duplicates() > 0 {
            debug!(
                "{} items share a title with an earlier item; the earliest is used",
                titles.duplicates()
            );
        }
        Ok(Self {
            snapshot_id: set.snapshot_id,
            items: set.items,
            titles,
            matrix: set.matrix,
        })
    }

    /// Load and validate the artifacts in `store`
    pub fn load(store: &ArtifactStore) -> Result<Self, ArtifactError> {
        Self::new(store.load()?)
    }

    pub fn snapshot_id(&self) -> Ulid {
        self.snapshot_id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    /// Top `top_n` items most similar to the item titled `title`.
    ///
    /// ## Algorithm
    /// 1. Case-insensitive exact title match; the earliest row wins on
    ///    duplicate titles
    /// 2. Take that row of the matrix, drop the query item itself
    /// 3. Sort by score desc, then by row asc
    /// 4. Keep the first `top_n`
    ///
    /// An empty or unknown title yields an empty list, not an error.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, top_n: usize) -> Vec<Recommendation> {
        if title.is_empty() {
            warn!("Empty title given; no recommendations");
            return Vec::new();
        }
        let Some(row) = self.titles.lookup(title) else {
            warn!("Title {:?} not found; no recommendations", title);
            return Vec::new();
        };
        self.recommend_row(row, top_n)
    }

    /// Same as `recommend`, addressed by corpus row
    pub fn recommend_row(&self, row: usize, top_n: usize) -> Vec<Recommendation> {
        let Some(scores) = self.matrix.row(row) else {
            warn!("Row {} is outside the corpus; no recommendations", row);
            return Vec::new();
        };

        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != row)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top_n);

        debug!("Ranked {} recommendations for row {}", ranked.len(), row);
        ranked
            .into_iter()
            .map(|(j, score)| Recommendation {
                item_id: self.items[j].id,
                title: self.items[j].title.clone(),
                score,
            })
            .collect()
    }

    /// Case-insensitive substring search over titles.
    ///
    /// Exact matches come first, then the rest in corpus order. An empty
    /// fragment matches nothing.
    pub fn search(&self, fragment: &str) -> Vec<SearchHit> {
        let needle = fragment.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for (row, item) in self.items.iter().enumerate() {
            let title = item.title.to_lowercase();
            if !title.contains(&needle) {
                continue;
            }
            let hit = SearchHit {
                row,
                item_id: item.id,
                title: item.title.clone(),
            };
            if title == needle {
                exact.push(hit);
            } else {
                partial.push(hit);
            }
        }
        exact.extend(partial);
        exact
    }
}
