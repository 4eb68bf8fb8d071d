pub mod compare;
pub mod pricing;
pub mod project;
pub mod reference;
