/// Resource type for managing async state in a type-safe, explicit way.
///
/// Inspired by Elm's RemoteData pattern, this enum represents the four states
/// of an asynchronous operation:
/// - NotAsked: Initial state, no request made yet
/// - Loading: Request in progress
/// - Success: Request completed successfully with data
/// - Failure: Request failed with error
///
/// Panels keep their screen in a `Resource` so a pending load, a mounted
/// screen and a failed load are one field rather than three.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource<T, E = String> {
    /// No request has been made yet (initial state)
    NotAsked,

    /// Request is in progress
    Loading,

    /// Request succeeded with data
    Success(T),

    /// Request failed with error
    Failure(E),
}

impl<T, E> Resource<T, E> {
    /// Create a Resource from a Result
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Failure(e),
        }
    }

    /// Convert to an Option, discarding error and loading states
    pub fn ok(self) -> Option<T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Get a reference to the data if successful
    pub fn as_ref(&self) -> Resource<&T, &E> {
        match self {
            Resource::NotAsked => Resource::NotAsked,
            Resource::Loading => Resource::Loading,
            Resource::Success(data) => Resource::Success(data),
            Resource::Failure(e) => Resource::Failure(e),
        }
    }

    /// Get a mutable reference to the data if successful
    pub fn success_mut(&mut self) -> Option<&mut T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }
}
