use std::ops::RangeInclusive;

/// Finds the index range of elements in a sorted slice whose keys fall within
/// the inclusive `key_range`.
///
/// The slice must be sorted by `key_fn`. Works on partially ordered keys
/// (e.g. `f64` masses) as long as no key is NaN.
///
/// # Examples
///
/// ```
/// use psmrollup::utils::binary_search_range_by_key;
///
/// let masses = [-17.0265, 0.984, 15.9949, 42.0106, 79.9663];
/// let range = binary_search_range_by_key(&masses, 15.98..=42.02, |x| *x);
/// assert_eq!(&masses[range], &[15.9949, 42.0106]);
///
/// let empty = binary_search_range_by_key(&masses, 100.0..=200.0, |x| *x);
/// assert!(masses[empty].is_empty());
/// ```
pub fn binary_search_range_by_key<T, K, F>(
    slice: &[T],
    key_range: RangeInclusive<K>,
    key_fn: F,
) -> std::ops::Range<usize>
where
    F: Fn(&T) -> K,
    K: PartialOrd,
{
    let start_idx = slice.partition_point(|x| key_fn(x) < *key_range.start());
    let end_idx = start_idx + slice[start_idx..].partition_point(|x| key_fn(x) <= *key_range.end());

    start_idx..end_idx
}
