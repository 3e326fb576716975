pub mod chart;
pub mod image_asset;
pub mod offer;
pub mod series;
pub mod session;
pub mod upload;
