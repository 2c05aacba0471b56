//! Slice registry for modular features.
//! A minimal type-erased container for pre-initialized feature state.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// Feature state that can be shared across request handlers.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Human readable slice name used in logs.
    fn name(&self) -> &'static str;

    /// Helper to allow downcasting from the trait object.
    fn as_any(&self) -> &dyn Any;
}

/// A container for an initialized feature.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), state: Box::new(state) }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.state.name()
    }
}
