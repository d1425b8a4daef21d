//! The `Taggable` capability and the `Instance` handle.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::value::Record;

/// Registered type name of calendar timestamps.
pub const DATE_TYPE: &str = "Date";

/// Type-erased comparison and downcasting.
///
/// Implemented automatically for every `'static` type with `PartialEq`, so
/// `Taggable` implementors never write it by hand.
pub trait DynCompare: Any {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn Any) -> bool;
}

impl<T: Any + PartialEq> DynCompare for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }
}

/// A value the config layer persists under a registered type name.
///
/// The name returned by `type_name` becomes the `className` tag of the
/// packed form, and must match the name the type was registered under.
pub trait Taggable: DynCompare + fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    /// Own enumerable properties, in a stable order.
    ///
    /// Used by the structural pack. Types registered with a serializer
    /// never reach it, so the default is empty.
    fn properties(&self) -> Record {
        Record::new()
    }
}

/// Shared handle to a live typed object.
#[derive(Clone)]
pub struct Instance(Arc<dyn Taggable>);

impl Instance {
    pub fn new<T: Taggable>(object: T) -> Self {
        Self(Arc::new(object))
    }

    pub fn type_name(&self) -> &str {
        self.inner().type_name()
    }

    pub fn properties(&self) -> Record {
        self.inner().properties()
    }

    pub fn downcast_ref<T: Taggable>(&self) -> Option<&T> {
        self.inner().as_any().downcast_ref::<T>()
    }

    pub fn is<T: Taggable>(&self) -> bool {
        self.inner().as_any().is::<T>()
    }

    pub fn inner(&self) -> &dyn Taggable {
        &*self.0
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.inner().dyn_eq(other.inner().as_any())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner(), f)
    }
}

impl Taggable for DateTime<Utc> {
    fn type_name(&self) -> &str {
        DATE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, Value};

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl Taggable for Point {
        fn type_name(&self) -> &str {
            "Point"
        }

        fn properties(&self) -> Record {
            record! { "x" => self.x, "y" => self.y }
        }
    }

    #[test]
    fn instances_compare_by_value() {
        let a = Instance::new(Point { x: 1, y: 2 });
        let b = Instance::new(Point { x: 1, y: 2 });
        let c = Instance::new(Point { x: 2, y: 2 });
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn instances_of_different_types_differ() {
        let point = Instance::new(Point { x: 0, y: 0 });
        let date = Instance::new(DateTime::<Utc>::UNIX_EPOCH);
        assert_ne!(point, date);
    }

    #[test]
    fn downcast_recovers_the_object() {
        let value = Value::instance(Point { x: 3, y: 4 });
        let point: &Point = value.downcast_ref().unwrap();
        assert_eq!(point.x, 3);
        assert!(value.downcast_ref::<DateTime<Utc>>().is_none());
    }

    #[test]
    fn properties_are_exposed_through_the_handle() {
        let instance = Instance::new(Point { x: 3, y: 4 });
        assert_eq!(instance.type_name(), "Point");
        assert_eq!(instance.properties().get("y"), Some(&Value::Integer(4)));
    }
}
