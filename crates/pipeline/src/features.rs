//! Term-count feature vectors.
//!
//! A `FeatureVector` has one logical slot per vocabulary column but only
//! stores the non-zero ones, as `(column, count)` pairs sorted by column.
//! Tag documents are short, so most of the 5000 slots are zero.

use serde::{Deserialize, Serialize};

/// Sparse term-count vector of fixed logical length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    len: usize,
    entries: Vec<(u32, u32)>,
}

impl FeatureVector {
    /// All-zero vector of length `len`
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            entries: Vec::new(),
        }
    }

    /// Build from unordered `(column, count)` pairs.
    ///
    /// Pairs for the same column are summed; zero counts and columns
    /// outside `0..len` are dropped.
    pub fn from_counts(len: usize, counts: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut entries: Vec<(u32, u32)> = counts
            .into_iter()
            .filter(|&(col, count)| count > 0 && (col as usize) < len)
            .collect();
        entries.sort_unstable_by_key(|&(col, _)| col);

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(entries.len());
        for (col, count) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == col => last.1 += count,
                _ => merged.push((col, count)),
            }
        }
        Self {
            len,
            entries: merged,
        }
    }

    /// Logical length, always the vocabulary size
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Count at `column`; zero outside the stored entries
    pub fn get(&self, column: usize) -> u32 {
        self.entries
            .binary_search_by_key(&(column as u32), |&(col, _)| col)
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0)
    }

    /// Non-zero `(column, count)` pairs in ascending column order
    pub fn entries(&self) -> &[(u32, u32)] {
        &self.entries
    }

    /// Number of non-zero slots
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_dense(&self) -> Vec<u32> {
        let mut dense = vec![0; self.len];
        for &(col, count) in &self.entries {
            dense[col as usize] = count;
        }
        dense
    }

    /// Sum of squared counts, exact in integer arithmetic
    pub fn squared_norm(&self) -> u64 {
        self.entries
            .iter()
            .map(|&(_, count)| count as u64 * count as u64)
            .sum()
    }

    pub fn norm(&self) -> f64 {
        (self.squared_norm() as f64).sqrt()
    }

    /// Dot product by merge-join over the sorted entries.
    ///
    /// ## Algorithm
    /// Walk both entry lists with two cursors, advancing the one with the
    /// smaller column and multiplying when the columns meet. O(nnz(a) + nnz(b)).
    pub fn dot(&self, other: &FeatureVector) -> u64 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0u64;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 as u64 * b[j].1 as u64;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts_merges_and_sorts() {
        let v = FeatureVector::from_counts(5, vec![(3, 1), (0, 2), (3, 2), (1, 0), (9, 4)]);
        assert_eq!(v.len(), 5);
        assert_eq!(v.entries(), &[(0, 2), (3, 3)]);
        assert_eq!(v.to_dense(), vec![2, 0, 0, 3, 0]);
        assert_eq!(v.get(3), 3);
        assert_eq!(v.get(4), 0);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_dot_and_norm() {
        let a = FeatureVector::from_counts(4, vec![(0, 1), (2, 2)]);
        let b = FeatureVector::from_counts(4, vec![(1, 5), (2, 3), (3, 1)]);
        assert_eq!(a.dot(&b), 6);
        assert_eq!(b.dot(&a), 6);
        assert_eq!(a.squared_norm(), 5);
        assert!((a.norm() - 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector() {
        let z = FeatureVector::zeros(3);
        assert!(z.is_zero());
        assert_eq!(z.to_dense(), vec![0, 0, 0]);
        assert_eq!(z.norm(), 0.0);
    }
}
