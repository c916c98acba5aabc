use std::{
    fmt,
    ops::{Deref, DerefMut},
    rc::Rc,
    sync::Arc,
};

use crate::{
    registry::Registry,
    table::AssocValue,
    token::{AssocToken, InstanceId},
    utils::error::AssocResult,
};

/// Grants association methods to any type that owns an [`AssocToken`].
///
/// The only required method hands out the token; every operation is provided. Values are keyed
/// by string and typed: reading a key with another type than the one it was stored with yields
/// [`None`] (or [`crate::utils::error::AssocError::TypeMismatch`] from the `try_` variants).
///
/// Example:
/// ```rust
/// # use hyassoc::prelude::*;
/// struct MyClass {
///     token: AssocToken,
/// }
///
/// impl Associable for MyClass {
///     fn assoc_token(&self) -> &AssocToken {
///         &self.token
///     }
/// }
///
/// let instance = MyClass { token: AssocToken::new() };
/// instance.associate(String::from("Hello, World!"), "greeting");
/// assert!(instance.is_associated("greeting"));
///
/// instance.disassociate("greeting");
/// assert!(!instance.is_associated("greeting"));
/// ```
pub trait Associable {
    fn assoc_token(&self) -> &AssocToken;

    fn instance_id(&self) -> InstanceId {
        self.assoc_token().id()
    }

    /// Associate `value` with this instance under `key`, replacing whatever was stored under
    /// that key before (whatever its type).
    fn associate<T: AssocValue>(&self, value: T, key: &str) {
        let token = self.assoc_token();
        token.registry().associate(token.id(), value, key);
    }

    /// Retrieve a clone of the value stored under `key`, if there is one and it is a `T`.
    fn associated_value<T: AssocValue + Clone>(&self, key: &str) -> Option<T> {
        self.associated_arc::<T>(key).map(|value| T::clone(&value))
    }

    /// Retrieve a shared handle on the value stored under `key`, if there is one and it is a
    /// `T`. The handle stays valid after the value is disassociated.
    fn associated_arc<T: AssocValue>(&self, key: &str) -> Option<Arc<T>> {
        self.try_associated_arc(key).ok()
    }

    /// Like [`Associable::associated_value`], but tells an unknown key apart from a type
    /// mismatch.
    fn try_associated_value<T: AssocValue + Clone>(&self, key: &str) -> AssocResult<T> {
        self.try_associated_arc::<T>(key)
            .map(|value| T::clone(&value))
    }

    /// Like [`Associable::associated_arc`], but tells an unknown key apart from a type
    /// mismatch.
    fn try_associated_arc<T: AssocValue>(&self, key: &str) -> AssocResult<Arc<T>> {
        let token = self.assoc_token();
        token.registry().try_associated_arc(token.id(), key)
    }

    /// Name of the type stored under `key`.
    fn associated_type_name(&self, key: &str) -> Option<&'static str> {
        let token = self.assoc_token();
        token.registry().associated_type_name(token.id(), key)
    }

    /// Whether a value of any type is stored under `key`.
    fn is_associated(&self, key: &str) -> bool {
        let token = self.assoc_token();
        token.registry().is_associated(token.id(), key)
    }

    /// Keys currently associated with this instance, in no particular order.
    fn associated_keys(&self) -> Vec<String> {
        let token = self.assoc_token();
        token.registry().associated_keys(token.id())
    }

    /// Remove the value stored under `key`. Does nothing if there is none.
    fn disassociate(&self, key: &str) {
        let token = self.assoc_token();
        token.registry().disassociate(token.id(), key);
    }

    /// Remove every value associated with this instance.
    fn disassociate_all(&self) {
        let token = self.assoc_token();
        token.registry().disassociate_all(token.id());
    }
}

impl Associable for AssocToken {
    fn assoc_token(&self) -> &AssocToken {
        self
    }
}

impl<A: Associable + ?Sized> Associable for &A {
    fn assoc_token(&self) -> &AssocToken {
        (**self).assoc_token()
    }
}

impl<A: Associable + ?Sized> Associable for Box<A> {
    fn assoc_token(&self) -> &AssocToken {
        (**self).assoc_token()
    }
}

impl<A: Associable + ?Sized> Associable for Rc<A> {
    fn assoc_token(&self) -> &AssocToken {
        (**self).assoc_token()
    }
}

impl<A: Associable + ?Sized> Associable for Arc<A> {
    fn assoc_token(&self) -> &AssocToken {
        (**self).assoc_token()
    }
}

/// Attaches an [`AssocToken`] to a value of any type, making it [`Associable`] without changing
/// its definition.
///
/// Cloning a `Tracked` clones the inner value but not its associations.
#[derive(Clone, Default)]
pub struct Tracked<T> {
    value: T,
    token: AssocToken,
}

impl<T> Tracked<T> {
    /// Track `value` in the process-wide registry.
    pub fn new(value: T) -> Self {
        Self {
            value,
            token: AssocToken::new(),
        }
    }

    /// Track `value` in `registry`.
    pub fn new_in(value: T, registry: &Arc<Registry>) -> Self {
        Self {
            value,
            token: AssocToken::new_in(registry),
        }
    }

    /// Unwrap the inner value, dropping every association.
    pub fn into_inner(self) -> T {
        let Tracked { value, token } = self;
        drop(token);
        value
    }
}

impl<T> Associable for Tracked<T> {
    fn assoc_token(&self) -> &AssocToken {
        &self.token
    }
}

impl<T> From<T> for Tracked<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("value", &self.value)
            .field("id", &self.token.id())
            .finish()
    }
}
