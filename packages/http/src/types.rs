use datastore_core::Operation;

/// A remote store endpoint.
///
/// | Route | Method | Path |
/// |---|---|---|
/// | `Put` | PUT | `/put/{id}` |
/// | `Get` | GET | `/get/{id}` |
/// | `Has` | HEAD | `/has/{id}` |
/// | `Delete` | DELETE | `/delete/{id}` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Put,
    Get,
    Has,
    Delete,
}

impl Route {
    pub fn method(&self) -> http::Method {
        match self {
            Route::Put => http::Method::PUT,
            Route::Get => http::Method::GET,
            Route::Has => http::Method::HEAD,
            Route::Delete => http::Method::DELETE,
        }
    }

    /// The path segment placed before the content id.
    pub fn segment(&self) -> &'static str {
        match self {
            Route::Put => "put",
            Route::Get => "get",
            Route::Has => "has",
            Route::Delete => "delete",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Route::Put => Operation::Put,
            Route::Get => Operation::Get,
            Route::Has => Operation::Has,
            Route::Delete => Operation::Delete,
        }
    }
}
