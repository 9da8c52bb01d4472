use std::collections::vec_deque;
use std::collections::VecDeque;
use std::fmt::Debug;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine::error::EngineError;

/// Fixed-capacity FIFO buffer. Appending to a full window evicts the oldest item.
/// Serialized as a plain sequence; deserializing more than `N` items fails.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedWindow<T, const N: usize> {
    items: VecDeque<T>,
}

impl<T, const N: usize> BoundedWindow<T, N> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(N),
        }
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Appends `item`, returning the evicted oldest item when the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if N == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() == N {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// The most recent `count` items, oldest first.
    pub fn latest(&self, count: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(self.items.len().saturating_sub(count))
    }

    /// Everything except the most recent item, oldest first.
    pub fn prior(&self) -> impl Iterator<Item = &T> {
        self.items.iter().take(self.items.len().saturating_sub(1))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone, const N: usize> BoundedWindow<T, N> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<const N: usize> BoundedWindow<f64, N> {
    /// `None` for an empty window.
    pub fn mean(&self) -> Option<f64> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items.iter().sum::<f64>() / self.items.len() as f64)
    }

    /// Population standard deviation; 0 when fewer than two samples exist.
    pub fn population_stddev(&self) -> f64 {
        if self.items.len() < 2 {
            return 0.0;
        }
        let mean = self.items.iter().sum::<f64>() / self.items.len() as f64;
        let variance = self
            .items
            .iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / self.items.len() as f64;
        variance.sqrt()
    }

    /// Mean of every sample except the latest one.
    pub fn prior_mean(&self) -> Option<f64> {
        let prior = self.items.len().checked_sub(1).filter(|n| *n > 0)?;
        Some(self.prior().sum::<f64>() / prior as f64)
    }
}

impl<const N: usize> BoundedWindow<bool, N> {
    /// Accuracy in percent over the latest `count` results, `None` until
    /// that many results exist.
    pub fn latest_accuracy_pct(&self, count: usize) -> Option<f64> {
        if count == 0 || self.items.len() < count {
            return None;
        }
        let correct = self.latest(count).filter(|r| **r).count();
        Some(correct as f64 / count as f64 * 100.0)
    }
}

impl<T, const N: usize> Default for BoundedWindow<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> TryFrom<Vec<T>> for BoundedWindow<T, N> {
    type Error = EngineError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        if items.len() > N {
            return Err(EngineError::WindowOverflow {
                capacity: N,
                len: items.len(),
            });
        }
        Ok(Self {
            items: VecDeque::from(items),
        })
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a BoundedWindow<T, N> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize, const N: usize> Serialize for BoundedWindow<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for BoundedWindow<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::try_from(items).map_err(serde::de::Error::custom)
    }
}

/// Insertion-ordered set with fixed capacity. Re-inserting a present item is a
/// no-op and keeps its original position; overflow evicts the oldest insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSet<T, const N: usize> {
    items: VecDeque<T>,
}

impl<T: PartialEq, const N: usize> BoundedSet<T, N> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(N),
        }
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Returns `true` when `item` was not already present.
    pub fn insert(&mut self, item: T) -> bool {
        if N == 0 || self.items.contains(&item) {
            return false;
        }
        if self.items.len() == N {
            self.items.pop_front();
        }
        self.items.push_back(item);
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: PartialEq, const N: usize> Default for BoundedSet<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Debug, const N: usize> TryFrom<Vec<T>> for BoundedSet<T, N> {
    type Error = EngineError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        if items.len() > N {
            return Err(EngineError::WindowOverflow {
                capacity: N,
                len: items.len(),
            });
        }
        let mut set = Self::new();
        for item in items {
            if set.contains(&item) {
                return Err(EngineError::DuplicateEntry(format!("{item:?}")));
            }
            set.items.push_back(item);
        }
        Ok(set)
    }
}

impl<T: Serialize, const N: usize> Serialize for BoundedSet<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, T, const N: usize> Deserialize<'de> for BoundedSet<T, N>
where
    T: Deserialize<'de> + PartialEq + Debug,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::try_from(items).map_err(serde::de::Error::custom)
    }
}
