//! Out-of-band property store for the Hyperion engine.
//!
//! External code can attach typed values to an existing instance, keyed by a string, without
//! touching the instance's own definition. Entries live in a process-wide [`registry::Registry`]
//! indexed by the instance's [`token::InstanceId`], and are purged when the instance's
//! [`token::AssocToken`] is dropped. Most consumers will interact with [`facade::Associable`]
//! and [`facade::Tracked`].
//!
//! ```rust
//! use hyassoc::prelude::*;
//!
//! struct Person {
//!     token: AssocToken,
//! }
//!
//! impl Associable for Person {
//!     fn assoc_token(&self) -> &AssocToken {
//!         &self.token
//!     }
//! }
//!
//! let ada = Person { token: AssocToken::new() };
//! ada.associate(42u32, "age");
//! assert_eq!(ada.associated_value::<u32>("age"), Some(42));
//! assert_eq!(ada.associated_value::<i64>("age"), None);
//! ```

pub mod facade;
pub mod key;
pub mod magic;
pub mod registry;
pub mod table;
pub mod token;
pub mod utils;

pub mod prelude {
    pub use crate::{
        facade::{Associable, Tracked},
        registry::Registry,
        token::{AssocToken, InstanceId},
        utils::error::{AssocError, AssocResult},
    };
}
