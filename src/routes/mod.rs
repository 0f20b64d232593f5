pub mod bootstrap;
pub mod gathering;
pub mod place;
pub mod realtime;
pub mod recommendation;
