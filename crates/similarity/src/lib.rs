//! # Similarity Crate
//!
//! All-pairs cosine similarity over term-count vectors.
//!
//! ## Components
//!
//! - **builder**: `SimilarityBuilder` and `cosine_similarity`
//! - **matrix**: `SimilarityMatrix`, the dense symmetric result
//! - **error**: `SimilarityError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::SimilarityBuilder;
//!
//! let matrix = SimilarityBuilder::new().build(&output.vectors)?;
//! let row = matrix.row(0).unwrap();
//! ```
//!
//! ## Performance
//!
//! The build is O(n²·k) with k the average number of non-zero terms per
//! vector. Rows are spread across rayon workers; the matrix takes
//! `4·n²` bytes.

pub mod builder;
pub mod error;
pub mod matrix;

pub use builder::{cosine_similarity, SimilarityBuilder};
pub use error::{Result, SimilarityError};
pub use matrix::SimilarityMatrix;
