//! Genre vocabulary and multi-hot encoding.
//!
//! The vocabulary is the sorted set of distinct genre labels seen at fit time.
//! It fixes the width and order of the multi-hot segment. Labels outside the
//! vocabulary encode to nothing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct GenreVocabulary {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl GenreVocabulary {
    /// Collect the sorted distinct labels of every genre set
    pub fn fit<'a, I, S>(genre_sets: I) -> Self
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<[String]> + 'a + ?Sized,
    {
        let distinct: BTreeSet<&str> = genre_sets
            .into_iter()
            .flat_map(|set| set.as_ref().iter().map(String::as_str))
            .collect();
        Self::from(distinct.into_iter().map(str::to_string).collect::<Vec<_>>())
    }

    /// Number of labels, the width of the multi-hot segment
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Write the multi-hot encoding of `genres` into `out`, which must be
    /// `len()` wide and zeroed.
    pub fn encode_into<S: AsRef<str>>(&self, genres: &[S], out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.labels.len());
        for genre in genres {
            if let Some(idx) = self.position(genre.as_ref()) {
                out[idx] = 1.0;
            }
        }
    }

    /// Multi-hot encoding as a fresh vector
    pub fn encode<S: AsRef<str>>(&self, genres: &[S]) -> Vec<f32> {
        let mut out = vec![0.0; self.labels.len()];
        self.encode_into(genres, &mut out);
        out
    }
}

impl From<Vec<String>> for GenreVocabulary {
    /// Sorts and dedups, so any label list yields a canonical vocabulary
    fn from(mut labels: Vec<String>) -> Self {
        labels.sort();
        labels.dedup();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), idx))
            .collect();
        Self { labels, positions }
    }
}

impl From<GenreVocabulary> for Vec<String> {
    fn from(vocabulary: GenreVocabulary) -> Self {
        vocabulary.labels
    }
}
