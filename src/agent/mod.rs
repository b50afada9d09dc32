//! Agent-side collaborators.
//!
//! - [`TeacherAgent`] -- the optional teacher/shaping agent reset during setup.
//! - [`ResponsePolicy`] -- what the episode runner asks for a response to each
//!   observation, with two scripted policies for smoke runs.

pub mod policy;
pub mod teacher;

pub use policy::{EchoResponder, OracleResponder, ResponsePolicy};
pub use teacher::{NoTeacher, TeacherAgent};
