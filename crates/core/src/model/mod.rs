pub mod span;

pub use span::{Annotation, AnnotationKind, Service, Span};
