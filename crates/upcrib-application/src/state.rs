//! Shared `{data, loading, error}` snapshot kept by the workflow handles.

/// Latest outcome of an async operation, observable between calls.
#[derive(Debug, Clone)]
pub struct OpState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for OpState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> OpState<T> {
    /// Marks an operation in flight; clears the previous error but keeps
    /// the previous data visible until the new result lands.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn succeed(&mut self, value: T) {
        self.data = Some(value);
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}
