//! Ordered fallback evaluation.
//!
//! Both the listing tiers and the attribution strategies are declared as an
//! ordered list of candidates and run through [`first_success`], so the
//! precedence lives in one place and can be tested on its own.

use std::future::Future;

/// The candidate that produced a value, and the value itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<S, T> {
    /// Position of the winning candidate in the input order.
    pub position: usize,
    pub candidate: S,
    pub value: T,
}

/// Try each candidate in order and stop at the first `Ok`.
///
/// Returns every `(candidate, error)` pair in order when nothing succeeds.
/// Candidates after the winning one are never attempted.
pub async fn first_success<I, S, T, E, F, Fut>(
    candidates: I,
    mut attempt: F,
) -> Result<Success<S, T>, Vec<(S, E)>>
where
    I: IntoIterator<Item = S>,
    S: Clone,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = Vec::new();

    for (position, candidate) in candidates.into_iter().enumerate() {
        match attempt(candidate.clone()).await {
            Ok(value) => {
                return Ok(Success {
                    position,
                    candidate,
                    value,
                })
            }
            Err(err) => failures.push((candidate, err)),
        }
    }

    Err(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_returns_first_ok() {
        let result = first_success(vec![1, 2, 3], |n| async move {
            if n >= 2 {
                Ok(n * 10)
            } else {
                Err(format!("{n} failed"))
            }
        })
        .await
        .unwrap();

        assert_eq!(result.position, 1);
        assert_eq!(result.candidate, 2);
        assert_eq!(result.value, 20);
    }

    #[tokio::test]
    async fn test_stops_after_success() {
        let tried = RefCell::new(Vec::new());

        let _ = first_success(["a", "b", "c"], |c| {
            tried.borrow_mut().push(c);
            async move {
                if c == "a" {
                    Ok::<_, ()>(c)
                } else {
                    Err(())
                }
            }
        })
        .await;

        assert_eq!(*tried.borrow(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_collects_all_failures() {
        let failures = first_success(vec!["x", "y"], |c| async move { Err::<(), _>(c.len()) })
            .await
            .unwrap_err();

        assert_eq!(failures, vec![("x", 1), ("y", 1)]);
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let failures = first_success(Vec::<u8>::new(), |_| async { Ok::<_, ()>(()) })
            .await
            .unwrap_err();

        assert!(failures.is_empty());
    }
}
