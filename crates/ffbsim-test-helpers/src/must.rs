//! Panicking unwraps for tests, reporting the caller's location.

use std::fmt::Debug;

/// `Ok` value of `result`, or a panic showing the error.
///
/// ```rust
/// use ffbsim_test_helpers::must;
///
/// let interval: Result<u64, String> = Ok(16);
/// assert_eq!(must(interval), 16);
/// ```
///
/// # Panics
///
/// When `result` is `Err`.
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| panic!("must: unexpected Err: {e:?}"))
}

/// `Some` value of `option`, or a panic with `what`.
///
/// ```rust
/// use ffbsim_test_helpers::must_some;
///
/// let names = ["Push", "Sine"];
/// assert_eq!(must_some(names.first(), "catalog has entries"), &"Push");
/// ```
///
/// # Panics
///
/// When `option` is `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, what: &str) -> T {
    option.unwrap_or_else(|| panic!("must_some: {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "must: unexpected Err: \"device busy\"")]
    fn test_must_reports_error() {
        let opened: Result<(), &str> = Err("device busy");
        must(opened);
    }

    #[test]
    #[should_panic(expected = "must_some: playing effect")]
    fn test_must_some_reports_what() {
        must_some(None::<u32>, "playing effect");
    }
}
