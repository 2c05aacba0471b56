use axum::extract::FromRef;
use catalog_database::Database;
use catalog_domain::config::AppConfig;
use catalog_domain::registry::{FeatureSlice, InitializedSlice};
use catalog_event_bus::EventBus;
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

#[catalog_derive::catalog_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    SliceMissing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: AppConfig,
    pub database: Database,
    pub events: EventBus,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Request state shared by every handler.
///
/// Holds the config, the database session, the event bus and the feature slices,
/// looked up by type with [`ApiState::try_get_slice`].
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>())?.state.as_any().downcast_ref::<T>()
    }

    /// # Errors
    /// [`ApiStateError::SliceMissing`] naming `T` when it was never registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::SliceMissing {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.slices.values().map(InitializedSlice::name)
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for Database {
    fn from_ref(state: &ApiState) -> Self {
        state.database.clone()
    }
}

impl FromRef<ApiState> for EventBus {
    fn from_ref(state: &ApiState) -> Self {
        state.events.clone()
    }
}

/// Collects the parts of an [`ApiState`]. Config and database are required; the bus
/// defaults to a fresh one.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<AppConfig>,
    database: Option<Database>,
    events: Option<EventBus>,
    slices: Vec<InitializedSlice>,
}

impl ApiStateBuilder {
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        debug!(slice = slice.name(), "Registering feature slice");
        self.slices.push(slice);
        self
    }

    pub fn register_slices(mut self, slices: impl IntoIterator<Item = InitializedSlice>) -> Self {
        for slice in slices {
            self = self.register_slice(slice);
        }
        self
    }

    /// # Errors
    /// [`ApiStateError::Validation`] when the config or database is missing, or when a slice
    /// type was registered twice.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or(ApiStateError::Validation {
            message: Cow::Borrowed("config not provided"),
            context: None,
        })?;
        let database = self.database.ok_or(ApiStateError::Validation {
            message: Cow::Borrowed("database not provided"),
            context: None,
        })?;

        let mut slices = FxHashMap::default();
        for slice in self.slices {
            match slices.entry(slice.id) {
                Entry::Occupied(_) => {
                    return Err(ApiStateError::Validation {
                        message: format!("slice {} registered twice", slice.name()).into(),
                        context: None,
                    });
                },
                Entry::Vacant(vacant) => {
                    vacant.insert(slice);
                },
            }
        }

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                config,
                database,
                events: self.events.unwrap_or_default(),
                slices,
            }),
        })
    }
}
