/// Result of a repository operation
///
/// The failure side is a single generic cause. Callers that care about the
/// kind of failure downcast to `SourceError` or `StoreError`.
pub type Outcome<T> = Result<T, anyhow::Error>;

/// Outcome of a write-only operation
pub type VoidOutcome = Outcome<()>;

/// Combinators used by the repository to keep the success path linear
pub trait OutcomeExt<T, E> {
    /// Transform the success value, passing errors through untouched
    fn map_success<U, F>(self, f: F) -> Result<U, E>
    where
        F: FnOnce(T) -> U;

    /// Chain a fallible step; an outer error wins over the inner step
    fn map_nested_success<U, F>(self, f: F) -> Result<U, E>
    where
        F: FnOnce(T) -> Result<U, E>;

    /// Run a side effect on the success value and hand the result back unchanged
    fn do_on_success<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&T);
}

impl<T, E> OutcomeExt<T, E> for Result<T, E> {
    fn map_success<U, F>(self, f: F) -> Result<U, E>
    where
        F: FnOnce(T) -> U,
    {
        self.map(f)
    }

    fn map_nested_success<U, F>(self, f: F) -> Result<U, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        self.and_then(f)
    }

    fn do_on_success<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&T),
    {
        if let Ok(value) = &self {
            f(value);
        }
        self
    }
}

/// All-or-nothing aggregation
///
/// Returns every success value in order when nothing failed, otherwise every
/// failure cause in order. Unlike `collect::<Result<Vec<_>, _>>()` it does not
/// stop at the first error.
pub fn collect_outcomes<T, E, I>(outcomes: I) -> Result<Vec<T>, Vec<E>>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();

    for outcome in outcomes {
        match outcome {
            Ok(value) if errors.is_empty() => values.push(value),
            Ok(_) => {}
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}
