/// Outcome of an asynchronous fetch: loading, loaded, failed, or nothing yet.
///
/// Fields are private so that only the constructors below can build a value,
/// which keeps `data` and `error` mutually exclusive and both absent while
/// `loading` is set. Callers replace the whole value on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct DataOrError<V, E> {
    data: Option<V>,
    loading: bool,
    error: Option<E>,
}

impl<V, E> DataOrError<V, E> {
    pub fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    pub fn success(value: V) -> Self {
        Self {
            data: Some(value),
            loading: false,
            error: None,
        }
    }

    pub fn failure(error: E) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error),
        }
    }

    pub fn data(&self) -> Option<&V> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True before anything was requested.
    pub fn is_empty(&self) -> bool {
        !self.loading && self.data.is_none() && self.error.is_none()
    }

    /// True once the fetch resolved, either way.
    pub fn is_settled(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }
}

impl<V, E> Default for DataOrError<V, E> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}
