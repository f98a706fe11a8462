//! Lifecycle of an orchestrated asynchronous operation.
//!
//! Every orchestrated call emits `Loading` first and then exactly one of the
//! terminal variants. Consumers match on all four variants.

/// Outcome of an orchestrated operation.
///
/// `Loading` is always emitted first; `Success`, `Empty` and `Error` are
/// terminal and nothing follows them for the same invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Operation in flight.
    Loading,

    /// Operation completed with data.
    Success(T),

    /// Operation succeeded but there is nothing to show.
    Empty { title: String, message: String },

    /// Operation failed. `data` may carry a partial or stale payload.
    Error { message: String, data: Option<T> },
}

impl<T> Outcome<T> {
    pub fn loading() -> Self {
        Self::Loading
    }

    pub fn success(data: T) -> Self {
        Self::Success(data)
    }

    pub fn empty(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Empty {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error without any payload.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            data: None,
        }
    }

    /// Error carrying whatever data was available when the failure happened.
    pub fn error_with_data(message: impl Into<String>, data: T) -> Self {
        Self::Error {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// True for the variants that end an invocation.
    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    /// Payload of a `Success`, or the partial payload of an `Error`.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error { data, .. } => data.as_ref(),
            Self::Loading | Self::Empty { .. } => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(data) => Outcome::Success(f(data)),
            Self::Empty { title, message } => Outcome::Empty { title, message },
            Self::Error { message, data } => Outcome::Error {
                message,
                data: data.map(f),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_is_not_terminal() {
        assert!(!Outcome::<u32>::loading().is_terminal());
        assert!(Outcome::success(1).is_terminal());
        assert!(Outcome::<u32>::empty("t", "m").is_terminal());
        assert!(Outcome::<u32>::error("boom").is_terminal());
    }

    #[test]
    fn test_error_defaults_to_no_data() {
        let outcome = Outcome::<u32>::error("boom");
        assert_eq!(
            outcome,
            Outcome::Error {
                message: "boom".into(),
                data: None
            }
        );
        assert_eq!(outcome.data(), None);
    }

    #[test]
    fn test_error_with_partial_data() {
        let outcome = Outcome::error_with_data("partial", vec![1, 2]);
        assert_eq!(outcome.data(), Some(&vec![1, 2]));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Outcome::success("a".to_string()), Outcome::success("a".to_string()));
        assert_ne!(Outcome::success(1), Outcome::success(2));
        assert_ne!(Outcome::<u32>::empty("t", "m"), Outcome::<u32>::error("m"));
    }

    #[test]
    fn test_map_keeps_variant() {
        assert_eq!(Outcome::success(2).map(|n| n * 10), Outcome::success(20));
        assert_eq!(
            Outcome::error_with_data("e", 2).map(|n| n + 1),
            Outcome::error_with_data("e", 3)
        );
        assert_eq!(
            Outcome::<u32>::empty("t", "m").map(|n| n + 1),
            Outcome::<u32>::empty("t", "m")
        );
        assert_eq!(Outcome::<u32>::Loading.map(|n| n + 1), Outcome::<u32>::Loading);
    }
}
