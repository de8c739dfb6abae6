

/// Cache model access-path tests.
pub mod model;
