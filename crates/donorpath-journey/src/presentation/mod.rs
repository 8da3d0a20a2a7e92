//! Scene rendering and choice debouncing.

pub mod scene_presenter;
