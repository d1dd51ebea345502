use std::rc::Rc;

/// Snapshot of a cache entry as seen by a subscriber.
///
/// `Pending` is the initial state and also covers an in-flight request.
/// `Resolved` and `Rejected` are terminal per request; a later fetch
/// (after invalidation, staleness, or a rejection) re-enters `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Pending,
    Resolved(Rc<T>),
    Rejected(String),
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Rejected(error) => Some(error),
            _ => None,
        }
    }
}
