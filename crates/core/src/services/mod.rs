pub mod chart_service;
pub mod image_service;
pub mod offer_service;
