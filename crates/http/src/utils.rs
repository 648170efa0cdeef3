//! Utility macros shared across the crate.

/// Early-returns with `$error` when `$predicate` does not hold.
///
/// Similar to `assert!`, but produces an `Err` instead of panicking. Used by
/// the codec for request-size and framing checks.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
