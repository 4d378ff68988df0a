pub(crate) mod codec;
pub(crate) mod preview;
pub(crate) mod raster;
