mod marker;
pub use marker::MarkerWidget;
