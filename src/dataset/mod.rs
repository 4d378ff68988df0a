pub(crate) mod empty;
pub(crate) mod loader;
