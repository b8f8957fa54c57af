// Presentation layer - derived state handed to renderers
pub mod view_model;
