//! Runtime data values.
//!
//! Data types form a hierarchy (a mask is a greyscale image is an image).
//! A derived type embeds its parent and exposes it through
//! [`Data::upcast`], so code written against an ancestor type can read a
//! descendant with [`downcast_ref`](trait.Data.html#method.downcast_ref).

use pipeforge_types::TypeKey;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Shared handle to a value. Trivial conversions hand back the same handle.
pub type DataValue = Arc<dyn Data>;

/// Object-safe access to `Any`, implemented for every eligible type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub trait Data: AsAny + fmt::Debug {
    /// Returns `self` viewed as `target` if this value is-a `target`.
    ///
    /// The default only matches the value's own type. Derived types return
    /// their embedded ancestor for ancestor targets, usually through
    /// [`upcast_through`]. The chain must agree with the lineage of the
    /// type's [`DataTypeInfo`](crate::DataTypeInfo).
    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        let this = self.as_any();
        (this.type_id() == target).then_some(this)
    }

    /// Key of the concrete type.
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }
}

impl<'a> dyn Data + 'a {
    /// Views the value as `T`, following the upcast chain.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.upcast(TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// True if the value is a `T` or derives from it.
    pub fn is<T: Any>(&self) -> bool {
        self.upcast(TypeId::of::<T>()).is_some()
    }

    pub(crate) fn is_type(&self, target: TypeKey) -> bool {
        self.upcast(target.type_id()).is_some()
    }
}

/// `upcast` for a type that embeds its parent: matches `this` itself, then
/// delegates to `parent`.
pub fn upcast_through<'a, T: Any>(
    this: &'a T,
    target: TypeId,
    parent: &'a dyn Data,
) -> Option<&'a dyn Any> {
    if TypeId::of::<T>() == target {
        Some(this as &dyn Any)
    } else {
        parent.upcast(target)
    }
}
