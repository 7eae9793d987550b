//! Recursive sample hierarchy
//!
//! A [`Sample`] is either a [`Leaf`] (one experiment: a flat sequence of
//! observations) or a [`Node`] (an ordered group of samples). Nodes may nest at
//! most [`MAX_DEPTH`] levels above the leaves, which covers the three shapes
//! the application works with:
//!
//! | Depth | Shape                   | Example                          |
//! |-------|-------------------------|----------------------------------|
//! | 0     | experiment              | `[2, 7, 9.2]`                    |
//! | 1     | experiment-of-experiments | `[[2, 4, 6], [4, 5, 7]]`       |
//! | 2     | set of experiment sets  | `[[[9, 4], [10, 5]], [[8], [12]]]` |
//!
//! All children of one node share the same depth. Hierarchies are immutable:
//! transforms build new instances of identical shape.
//!
//! # Examples
//!
//! ```
//! use schicksal_normalize::sample::{Leaf, Node, Sample};
//!
//! let sample = Sample::from(Node::new(vec![
//!     Leaf::new(vec![2.0, 4.0, 6.0]).into(),
//!     Leaf::new(vec![4.0, 5.0]).into(),
//! ])?);
//!
//! assert_eq!(sample.count(), 2);
//! assert_eq!(sample.depth(), 1);
//! assert_eq!(sample.flatten().collect::<Vec<_>>(), vec![2.0, 4.0, 6.0, 4.0, 5.0]);
//! # Ok::<(), schicksal_normalize::NormalizeError>(())
//! ```

use std::slice;

use serde::{Deserialize, Serialize};

use crate::{NormalizeError, record::TransformRecord};

/// Maximum number of nesting levels above the leaves
pub const MAX_DEPTH: usize = 2;

/// A flat, ordered sequence of observations
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    values: Vec<f64>,
    record: Option<TransformRecord>,
}

impl Leaf {
    /// Creates a leaf from raw observations.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            record: None,
        }
    }

    /// Number of observations.
    #[must_use]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Returns the observation at `index`.
    pub fn get(&self, index: usize) -> Result<f64, NormalizeError> {
        self.values
            .get(index)
            .copied()
            .ok_or(NormalizeError::Index {
                index,
                len: self.values.len(),
            })
    }

    /// All observations in order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Transform record attached to this leaf, if any.
    #[must_use]
    pub fn record(&self) -> Option<&TransformRecord> {
        self.record.as_ref()
    }

    /// λ of the Box-Cox transform that produced this leaf.
    #[must_use]
    pub fn lambda(&self) -> Option<f64> {
        self.record.as_ref().and_then(TransformRecord::lambda)
    }
}

impl From<Vec<f64>> for Leaf {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<f64> for Leaf {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// An ordered group of samples of equal depth
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    children: Vec<Sample>,
    depth: usize,
    record: Option<TransformRecord>,
}

impl Node {
    /// Creates a node from its children.
    ///
    /// Fails with [`NormalizeError::Argument`] when the children differ in
    /// depth or the node would nest deeper than [`MAX_DEPTH`]. An empty node
    /// is a group of experiments (depth 1).
    pub fn new(children: Vec<Sample>) -> Result<Self, NormalizeError> {
        let child_depth = children.first().map_or(0, Sample::depth);
        if let Some(position) = children.iter().position(|c| c.depth() != child_depth) {
            return Err(NormalizeError::argument(format!(
                "child {position} has depth {}, expected {child_depth}",
                children[position].depth()
            )));
        }
        let depth = child_depth + 1;
        if depth > MAX_DEPTH {
            return Err(NormalizeError::argument(format!(
                "nesting depth {depth} exceeds the maximum of {MAX_DEPTH}"
            )));
        }
        Ok(Self {
            children,
            depth,
            record: None,
        })
    }

    /// Number of children.
    #[must_use]
    pub fn count(&self) -> usize {
        self.children.len()
    }

    /// Returns the child at `index`.
    pub fn get(&self, index: usize) -> Result<&Sample, NormalizeError> {
        self.children.get(index).ok_or(NormalizeError::Index {
            index,
            len: self.children.len(),
        })
    }

    /// All children in order.
    #[must_use]
    pub fn children(&self) -> &[Sample] {
        &self.children
    }

    /// Transform record attached to this node, if any.
    #[must_use]
    pub fn record(&self) -> Option<&TransformRecord> {
        self.record.as_ref()
    }
}

/// A sample hierarchy: one experiment or a nested group of experiments
#[derive(Debug, Clone, PartialEq, derive_more::From, derive_more::IsVariant)]
pub enum Sample {
    Leaf(Leaf),
    Node(Node),
}

impl Sample {
    /// Number of direct elements: observations for a leaf, children for a node.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.count(),
            Self::Node(node) => node.count(),
        }
    }

    /// Nesting levels above the leaves (a leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Node(node) => node.depth,
        }
    }

    /// Returns the child sample at `index`.
    ///
    /// A leaf has no child samples, so this always fails for a leaf; use
    /// [`Sample::value`] to read observations.
    pub fn child(&self, index: usize) -> Result<&Sample, NormalizeError> {
        match self {
            Self::Leaf(_) => Err(NormalizeError::Index { index, len: 0 }),
            Self::Node(node) => node.get(index),
        }
    }

    /// Returns the observation at `index` of a leaf.
    ///
    /// A node holds no observations directly, so this always fails for a node.
    pub fn value(&self, index: usize) -> Result<f64, NormalizeError> {
        match self {
            Self::Leaf(leaf) => leaf.get(index),
            Self::Node(_) => Err(NormalizeError::Index { index, len: 0 }),
        }
    }

    /// Transform record attached to the root of this hierarchy, if any.
    #[must_use]
    pub fn record(&self) -> Option<&TransformRecord> {
        match self {
            Self::Leaf(leaf) => leaf.record(),
            Self::Node(node) => node.record(),
        }
    }

    /// Iterates over the leaves depth-first, left to right.
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self)
    }

    /// Iterates over the pooled sample: every observation of every leaf,
    /// depth-first, left to right.
    ///
    /// The iterator borrows the hierarchy and can be recreated any number of times.
    pub fn flatten(&self) -> impl Iterator<Item = f64> + '_ {
        self.leaves().flat_map(|leaf| leaf.values.iter().copied())
    }

    /// Size of the pooled sample.
    #[must_use]
    pub fn pooled_len(&self) -> usize {
        self.leaves().map(Leaf::count).sum()
    }

    /// Returns `true` when both hierarchies have the same count at every level.
    #[must_use]
    pub fn has_same_shape(&self, other: &Sample) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => a.count() == b.count(),
            (Self::Node(a), Self::Node(b)) => {
                a.count() == b.count()
                    && a
                        .children
                        .iter()
                        .zip(&b.children)
                        .all(|(a, b)| a.has_same_shape(b))
            }
            _ => false,
        }
    }

    /// Builds a hierarchy of identical shape whose observations are taken, in
    /// pooled order, from `values`. Every produced leaf receives `leaf_record`;
    /// node records are not carried over.
    ///
    /// `values` must yield at least [`Sample::pooled_len`] items.
    pub(crate) fn rebuild<I>(
        &self,
        values: &mut I,
        leaf_record: Option<&TransformRecord>,
    ) -> Sample
    where
        I: Iterator<Item = f64>,
    {
        match self {
            Self::Leaf(leaf) => {
                let values = values.take(leaf.count()).collect::<Vec<_>>();
                debug_assert_eq!(values.len(), leaf.count(), "not enough values to rebuild");
                Self::Leaf(Leaf {
                    values,
                    record: leaf_record.cloned(),
                })
            }
            Self::Node(node) => Self::Node(Node {
                children: node
                    .children
                    .iter()
                    .map(|child| child.rebuild(values, leaf_record))
                    .collect(),
                depth: node.depth,
                record: None,
            }),
        }
    }

    /// Replaces the record attached to the root.
    pub(crate) fn with_root_record(mut self, record: TransformRecord) -> Sample {
        match &mut self {
            Self::Leaf(leaf) => leaf.record = Some(record),
            Self::Node(node) => node.record = Some(record),
        }
        self
    }

    /// Converts the hierarchy into its plain nested-array form, dropping records.
    #[must_use]
    pub fn to_raw(&self) -> RawSample {
        match self {
            Self::Leaf(leaf) => RawSample::Leaf(leaf.values.clone()),
            Self::Node(node) => RawSample::Node(node.children.iter().map(Sample::to_raw).collect()),
        }
    }
}

/// Depth-first iterator over the leaves of a hierarchy
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    root: Option<&'a Sample>,
    stack: Vec<slice::Iter<'a, Sample>>,
}

impl<'a> Leaves<'a> {
    fn new(root: &'a Sample) -> Self {
        Self {
            root: Some(root),
            stack: Vec::new(),
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Leaf;

    fn next(&mut self) -> Option<Self::Item> {
        let mut next = self.root.take();
        loop {
            match next {
                Some(Sample::Leaf(leaf)) => return Some(leaf),
                Some(Sample::Node(node)) => self.stack.push(node.children.iter()),
                None => {}
            }
            let top = self.stack.last_mut()?;
            next = top.next();
            if next.is_none() {
                self.stack.pop();
            }
        }
    }
}

/// Plain nested-array form of a hierarchy, used at serialization boundaries
///
/// `[1, 2]` is a leaf, `[[1, 2], [3]]` a group of leaves, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSample {
    Leaf(Vec<f64>),
    Node(Vec<RawSample>),
}

impl TryFrom<RawSample> for Sample {
    type Error = NormalizeError;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        match raw {
            RawSample::Leaf(values) => Ok(Leaf::new(values).into()),
            RawSample::Node(children) => {
                let children = children
                    .into_iter()
                    .map(Sample::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Node::new(children)?.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(values: &[f64]) -> Sample {
        Leaf::new(values.to_vec()).into()
    }

    fn node(children: Vec<Sample>) -> Sample {
        Node::new(children).unwrap().into()
    }

    fn three_level() -> Sample {
        node(vec![
            node(vec![leaf(&[9.0, 4.0, 6.0]), leaf(&[10.0, 5.0, 7.0])]),
            node(vec![leaf(&[8.0, 11.0, 15.0]), leaf(&[12.0, 13.0, 14.0])]),
        ])
    }

    #[test]
    fn test_leaf_access() {
        let sample = leaf(&[2.0, 7.0, 9.2]);
        assert_eq!(sample.count(), 3);
        assert_eq!(sample.depth(), 0);
        assert!((sample.value(2).unwrap() - 9.2).abs() < f64::EPSILON);
        assert_eq!(
            sample.value(3),
            Err(NormalizeError::Index { index: 3, len: 3 })
        );
        assert!(sample.child(0).unwrap_err().is_index());
    }

    #[test]
    fn test_node_access() {
        let sample = three_level();
        assert_eq!(sample.count(), 2);
        assert_eq!(sample.depth(), 2);
        let inner = sample.child(1).unwrap();
        assert_eq!(inner.count(), 2);
        assert!((inner.child(0).unwrap().value(2).unwrap() - 15.0).abs() < f64::EPSILON);
        assert!(sample.child(2).unwrap_err().is_index());
        assert!(sample.value(0).unwrap_err().is_index());
    }

    #[test]
    fn test_flatten_is_depth_first_and_restartable() {
        let sample = three_level();
        let expected = vec![
            9.0, 4.0, 6.0, 10.0, 5.0, 7.0, 8.0, 11.0, 15.0, 12.0, 13.0, 14.0,
        ];
        assert_eq!(sample.flatten().collect::<Vec<_>>(), expected);
        assert_eq!(sample.flatten().collect::<Vec<_>>(), expected);
        assert_eq!(sample.pooled_len(), 12);
        assert_eq!(sample.leaves().count(), 4);
    }

    #[test]
    fn test_flatten_skips_empty_parts() {
        let sample = node(vec![leaf(&[]), leaf(&[1.0]), leaf(&[])]);
        assert_eq!(sample.flatten().collect::<Vec<_>>(), vec![1.0]);

        let empty = node(vec![]);
        assert_eq!(empty.flatten().count(), 0);
        assert_eq!(empty.leaves().count(), 0);
    }

    #[test]
    fn test_mixed_depth_rejected() {
        let err = Node::new(vec![leaf(&[1.0]), node(vec![leaf(&[2.0])])]).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn test_depth_limit() {
        let err = Node::new(vec![three_level()]).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn test_rebuild_preserves_shape() {
        let sample = three_level();
        let mut values = (1..=12).map(f64::from);
        let rebuilt = sample.rebuild(&mut values, None);
        assert!(sample.has_same_shape(&rebuilt));
        assert_eq!(
            rebuilt.flatten().collect::<Vec<_>>(),
            (1..=12).map(f64::from).collect::<Vec<_>>()
        );
        assert!(rebuilt.record().is_none());
    }

    #[test]
    fn test_shape_comparison() {
        assert!(leaf(&[1.0, 2.0]).has_same_shape(&leaf(&[3.0, 4.0])));
        assert!(!leaf(&[1.0, 2.0]).has_same_shape(&leaf(&[3.0])));
        assert!(!leaf(&[1.0]).has_same_shape(&node(vec![leaf(&[1.0])])));
        assert!(
            !node(vec![leaf(&[1.0]), leaf(&[2.0, 3.0])])
                .has_same_shape(&node(vec![leaf(&[1.0, 2.0]), leaf(&[3.0])]))
        );
    }

    #[test]
    fn test_raw_sample_json() {
        let json = "[[[9, 4, 6], [10, 5, 7]], [[8, 11, 15], [12, 13, 14]]]";
        let raw: RawSample = serde_json::from_str(json).unwrap();
        let sample = Sample::try_from(raw.clone()).unwrap();
        assert_eq!(sample, three_level());
        assert_eq!(sample.to_raw(), raw);

        let raw: RawSample = serde_json::from_str("[[1], [[2]]]").unwrap();
        assert!(Sample::try_from(raw).unwrap_err().is_argument());
    }
}
