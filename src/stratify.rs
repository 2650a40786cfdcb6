use crate::table::Value;
use itertools::Itertools as _;
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom as _;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

/// A distinct target value, ordered so that grouping is independent of hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClassKey<'a> {
    Missing,
    Integer(i64),
    Float(OrderedFloat<f64>),
    Text(&'a str),
}

impl<'a> From<&'a Value> for ClassKey<'a> {
    fn from(v: &'a Value) -> Self {
        match v {
            Value::Missing => Self::Missing,
            Value::Integer(v) => Self::Integer(*v),
            Value::Float(v) => Self::Float(OrderedFloat(*v)),
            Value::Text(v) => Self::Text(v.as_str()),
        }
    }
}

impl fmt::Display for ClassKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("<missing>"),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v.0),
            Self::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Row indices of each distinct value, in row order.
pub fn classes(target: &[Value]) -> BTreeMap<ClassKey<'_>, Vec<usize>> {
    target
        .iter()
        .enumerate()
        .map(|(i, v)| (ClassKey::from(v), i))
        .into_group_map()
        .into_iter()
        .collect()
}

/// Distributes `draws` rows over classes of the given sizes in proportion to their size.
///
/// Every class gets the floor or the ceiling of its exact share. The leftover
/// rows go to the classes with the largest remainders; equal remainders are
/// ordered by `rng`.
pub fn allocate<R: Rng + ?Sized>(rng: &mut R, counts: &[usize], draws: usize) -> Vec<usize> {
    let total = counts.iter().sum::<usize>();
    if total == 0 {
        return vec![0; counts.len()];
    }
    debug_assert!(draws <= total);

    let mut allocation = counts
        .iter()
        .map(|&c| draws * c / total)
        .collect::<Vec<_>>();
    let mut leftover = draws - allocation.iter().sum::<usize>();

    let mut order = (0..counts.len()).collect::<Vec<_>>();
    order.shuffle(rng);
    order.sort_by_key(|&i| Reverse(draws * counts[i] % total));
    for i in order {
        if leftover == 0 {
            break;
        }
        if allocation[i] < counts[i] {
            allocation[i] += 1;
            leftover -= 1;
        }
    }
    allocation
}
