//! Object Registry
//!
//! Shared collection of live service objects published by loaded components.
//! Each published object advertises the interfaces it implements; lookups
//! match against that advertised table.
//!
//! The registry is built by the composition root and handed to every
//! component through the lifecycle hooks. Owners add and remove their own
//! objects; the registry never drops an object on its own.
//!
//! ```
//! use std::sync::Arc;
//! use extsys::component::{ObjectRegistry, PublishedObject};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".to_string() }
//! }
//!
//! let registry = ObjectRegistry::new();
//! let english = Arc::new(English);
//! registry.add(PublishedObject::new("english", english.clone()).with_interface::<dyn Greeter>(english.clone()));
//!
//! let greeter = registry.first::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//!
//! registry.remove(&english);
//! assert!(registry.is_empty());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use parking_lot::RwLock;

type ErasedInterface = Arc<dyn Any + Send + Sync>;

/// An object published into the registry together with its interface table
#[derive(Clone)]
pub struct PublishedObject {
    name: String,
    identity: usize,
    interfaces: Vec<(TypeId, ErasedInterface)>,
}

impl PublishedObject {
    /// Publish `object`, advertising its concrete type
    pub fn new<O: Any + Send + Sync>(name: impl Into<String>, object: Arc<O>) -> Self {
        let identity = identity_of(&object);
        Self {
            name: name.into(),
            identity,
            interfaces: vec![(TypeId::of::<O>(), Arc::new(object) as ErasedInterface)],
        }
    }

    /// Also advertise `interface`, usually the same object coerced to a trait
    /// object such as `Arc<dyn MenuService>`
    pub fn with_interface<T>(mut self, interface: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.interfaces.push((TypeId::of::<T>(), Arc::new(interface) as ErasedInterface));
        self
    }

    /// Label given at publication
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this object advertises `T`
    pub fn implements<T: ?Sized + 'static>(&self) -> bool {
        self.interfaces.iter().any(|(id, _)| *id == TypeId::of::<T>())
    }

    /// The advertised `T` interface, if any
    pub fn query<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.interfaces
            .iter()
            .filter(|(id, _)| *id == TypeId::of::<T>())
            .find_map(|(_, erased)| erased.downcast_ref::<Arc<T>>().cloned())
    }

    fn is<O: ?Sized>(&self, object: &Arc<O>) -> bool {
        self.identity == identity_of(object)
    }
}

impl fmt::Debug for PublishedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishedObject")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces.len())
            .finish()
    }
}

/// Address of the shared allocation, independent of the pointer's type
fn identity_of<O: ?Sized>(object: &Arc<O>) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

/// Registry of published service objects
#[derive(Default)]
pub struct ObjectRegistry {
    objects: RwLock<Vec<PublishedObject>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(Vec::new()),
        }
    }

    /// Append an object; the same object may be added more than once
    pub fn add(&self, object: PublishedObject) {
        log::trace!("Publishing object {}", object.name());
        self.objects.write().push(object);
    }

    /// Remove every entry for `object`, returning how many were removed
    pub fn remove<O: ?Sized>(&self, object: &Arc<O>) -> usize {
        let mut objects = self.objects.write();
        let before = objects.len();
        objects.retain(|entry| !entry.is(object));
        before - objects.len()
    }

    /// Every published object, in insertion order
    pub fn all(&self) -> Vec<PublishedObject> {
        self.objects.read().clone()
    }

    /// The first object advertising `T`
    pub fn first<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.objects.read().iter().find_map(|entry| entry.query::<T>())
    }

    /// Every object advertising `T`, in insertion order
    pub fn all_of<T>(&self) -> Vec<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.objects.read().iter().filter_map(|entry| entry.query::<T>()).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn area(&self) -> u32;
    }

    trait Named: Send + Sync {
        fn label(&self) -> &str;
    }

    struct Square(u32);

    impl Shape for Square {
        fn area(&self) -> u32 {
            self.0 * self.0
        }
    }

    impl Named for Square {
        fn label(&self) -> &str {
            "square"
        }
    }

    struct Rectangle(u32, u32);

    impl Shape for Rectangle {
        fn area(&self) -> u32 {
            self.0 * self.1
        }
    }

    fn publish_square(registry: &ObjectRegistry, square: &Arc<Square>) {
        registry.add(
            PublishedObject::new("square", square.clone())
                .with_interface::<dyn Shape>(square.clone())
                .with_interface::<dyn Named>(square.clone()),
        );
    }

    #[test]
    fn test_registry_basic_operations() {
        let registry = ObjectRegistry::new();
        assert!(registry.is_empty());

        let square = Arc::new(Square(3));
        publish_square(&registry, &square);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.all()[0].name(), "square");
        assert!(registry.all()[0].implements::<dyn Shape>());
        assert!(!registry.all()[0].implements::<Rectangle>());
    }

    #[test]
    fn test_first_respects_insertion_order() {
        let registry = ObjectRegistry::new();
        let rectangle = Arc::new(Rectangle(2, 5));
        let square = Arc::new(Square(3));

        registry.add(PublishedObject::new("rectangle", rectangle.clone()).with_interface::<dyn Shape>(rectangle.clone()));
        publish_square(&registry, &square);

        assert_eq!(registry.first::<dyn Shape>().unwrap().area(), 10);
        assert_eq!(registry.first::<dyn Named>().unwrap().label(), "square");
        assert_eq!(registry.first::<Square>().unwrap().0, 3);
        assert!(registry.first::<String>().is_none());
    }

    #[test]
    fn test_all_of_returns_every_match() {
        let registry = ObjectRegistry::new();
        let rectangle = Arc::new(Rectangle(2, 5));
        let square = Arc::new(Square(3));

        publish_square(&registry, &square);
        registry.add(PublishedObject::new("rectangle", rectangle.clone()).with_interface::<dyn Shape>(rectangle.clone()));

        let areas: Vec<u32> = registry.all_of::<dyn Shape>().iter().map(|s| s.area()).collect();
        assert_eq!(areas, vec![9, 10]);
        assert_eq!(registry.all_of::<dyn Named>().len(), 1);
        assert!(registry.all_of::<u64>().is_empty());
    }

    #[test]
    fn test_remove_drops_every_duplicate() {
        let registry = ObjectRegistry::new();
        let square = Arc::new(Square(3));
        let other = Arc::new(Square(4));

        publish_square(&registry, &square);
        publish_square(&registry, &square);
        publish_square(&registry, &other);
        assert_eq!(registry.len(), 3);

        assert_eq!(registry.remove(&square), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.first::<Square>().unwrap().0, 4);

        // absent objects are a no-op
        assert_eq!(registry.remove(&square), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_through_trait_object() {
        let registry = ObjectRegistry::new();
        let square = Arc::new(Square(3));
        publish_square(&registry, &square);

        let shape: Arc<dyn Shape> = registry.first::<dyn Shape>().unwrap();
        assert_eq!(registry.remove(&shape), 1);
        assert!(registry.is_empty());
    }
}
