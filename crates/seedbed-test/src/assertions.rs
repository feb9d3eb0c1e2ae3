//! Query result assertions

use std::fmt::Debug;

/// Assert that query results equal `expected`, in order
///
/// # Examples
///
/// ```
/// use seedbed_db::QueryValue;
/// use seedbed_test::assertions::assert_queryset_eq;
///
/// let names = vec![QueryValue::String("Achieving self-awareness of Python programs".into())];
/// assert_queryset_eq(&names, &["Achieving self-awareness of Python programs"]);
/// ```
#[track_caller]
pub fn assert_queryset_eq<T, U>(actual: &[T], expected: &[U])
where
	T: PartialEq<U> + Debug,
	U: Debug,
{
	assert_eq!(
		actual.len(),
		expected.len(),
		"Expected {} row(s) {:?}, got {} row(s) {:?}",
		expected.len(),
		expected,
		actual.len(),
		actual
	);
	for (index, (row, wanted)) in actual.iter().zip(expected).enumerate() {
		assert!(
			row == wanted,
			"Row {} differs: expected {:?}, got {:?} (rows: {:?})",
			index,
			wanted,
			row,
			actual
		);
	}
}

/// Assert that query results hold exactly the `expected` values, in any order.
#[track_caller]
pub fn assert_queryset_eq_unordered<T, U>(actual: &[T], expected: &[U])
where
	T: PartialEq<U> + Debug,
	U: Debug,
{
	assert_eq!(
		actual.len(),
		expected.len(),
		"Expected {} row(s) {:?}, got {} row(s) {:?}",
		expected.len(),
		expected,
		actual.len(),
		actual
	);
	let mut unmatched: Vec<&T> = actual.iter().collect();
	for wanted in expected {
		let position = unmatched.iter().position(|row| *row == wanted);
		match position {
			Some(position) => {
				unmatched.swap_remove(position);
			}
			None => panic!("Expected a row equal to {:?}, got rows: {:?}", wanted, actual),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_ordered_match() {
		assert_queryset_eq(&["a", "b"], &["a", "b"]);
	}

	#[rstest]
	#[should_panic(expected = "Row 0 differs")]
	fn test_order_matters() {
		assert_queryset_eq(&["b", "a"], &["a", "b"]);
	}

	#[rstest]
	#[should_panic(expected = "Expected 1 row(s)")]
	fn test_length_mismatch() {
		assert_queryset_eq(&["a", "b"], &["a"]);
	}

	#[rstest]
	fn test_unordered_match() {
		assert_queryset_eq_unordered(&[1, 2, 2], &[2, 1, 2]);
	}

	#[rstest]
	#[should_panic(expected = "Expected a row equal to 3")]
	fn test_unordered_missing_row() {
		assert_queryset_eq_unordered(&[1, 2], &[1, 3]);
	}
}
