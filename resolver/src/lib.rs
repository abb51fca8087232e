//! Deterministic chat responder with an optional generative fallback.
//!
//! A [`RuleSet`] maps free text to a canned reply: the input is lower-cased
//! and trimmed, looked up in an exact-match table, then checked against an
//! ordered list of substring rules (first match wins), and finally falls
//! through to a default reply. Resolution never fails.
//!
//! [`DelegatingResponder`] instead forwards the text to a generative backend
//! with a fixed [`Persona`], substituting canned replies when the backend is
//! empty, blocked, slow or failing.
//!
//! # Example
//!
//! ```rust,ignore
//! use ayushbot_resolver::{builtin, Responder, RuleResponder};
//!
//! let bot = RuleResponder::new(builtin::loyal());
//! assert_eq!(
//!     bot.respond("Who created you").await,
//!     "I was created by my developer, Ayush ji."
//! );
//! ```

pub mod builtin;
pub mod conversation;
pub mod delegate;
pub mod error;
pub mod normalize;
pub mod persona;
pub mod responder;
pub mod rule;
pub mod ruleset;

pub use conversation::{Conversation, Entry, Speaker};
pub use delegate::{DelegatingResponder, Fallback};
pub use error::{PersonaError, RuleSetError};
pub use normalize::normalize;
pub use persona::{Persona, EMPTY_REPLY, FAILURE_REPLY};
pub use responder::{Responder, RuleResponder};
pub use rule::{Predicate, Rule};
pub use ruleset::{Matched, Resolution, RuleSet, RuleSetBuilder, RuleSetFile};
