pub mod article;
pub mod category;
pub mod fallback;
pub mod predictor;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod trace_init;
