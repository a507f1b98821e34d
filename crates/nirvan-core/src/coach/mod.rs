//! Coach domain module.
//!
//! # Module Structure
//!
//! - `model`: Core coach domain model (`Coach`) and delete policy
//! - `repository`: Repository trait for custom coach persistence
//! - `preset`: Built-in coach cards and system instructions
//! - `request`: Custom coach creation request
//!
//! # Usage
//!
//! ```ignore
//! use nirvan_core::coach::{Coach, CoachRepository, builtin_coaches};
//! ```

mod model;
mod preset;
mod repository;
pub mod request;

pub use model::{CUSTOM_COACH_ID_PREFIX, Coach, CoachDeletePolicy, DEFAULT_ICON};
pub use preset::{
    BuiltinInstruction, DEFAULT_INSTRUCTION, builtin_coaches, builtin_instruction,
    builtin_instruction_for_coach,
};
pub use repository::CoachRepository;
pub use request::CreateCoachRequest;
