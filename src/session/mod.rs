pub(crate) mod api;
pub(crate) mod mask_session;
