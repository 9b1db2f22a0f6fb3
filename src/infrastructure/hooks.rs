use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Trait for listeners that respond to the "user data updated" notification.
///
/// The notification carries no payload: a listener should re-fetch whatever
/// it shows rather than try to apply a diff.
pub trait DataUpdateHook: Send + Sync {
    /// Called after a data store operation has completed
    fn on_user_data_updated(&self) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;
}

impl<H: DataUpdateHook + ?Sized> DataUpdateHook for Box<H> {
    fn on_user_data_updated(&self) -> Result<()> {
        (**self).on_user_data_updated()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapts a closure into a [`DataUpdateHook`]
pub struct CallbackHook<F> {
    name: String,
    callback: F,
}

impl<F> CallbackHook<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> DataUpdateHook for CallbackHook<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn on_user_data_updated(&self) -> Result<()> {
        (self.callback)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    hooks: Vec<(u64, Arc<dyn DataUpdateHook>)>,
}

/// Registry for managing update hooks
///
/// Registering returns a [`Subscription`]; the hook stays registered exactly
/// as long as that handle is alive.
#[derive(Default)]
pub struct HookRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new update hook
    #[must_use = "the hook is unregistered as soon as the subscription is dropped"]
    pub fn register<H>(&self, hook: H) -> Subscription
    where
        H: DataUpdateHook + 'static,
    {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        log::debug!("Registering update hook '{}' (#{id})", hook.name());
        inner.hooks.push((id, Arc::new(hook)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Notify every registered hook, in registration order
    pub fn notify(&self) {
        // Snapshot so hooks may subscribe or unsubscribe while being notified.
        let hooks: Vec<Arc<dyn DataUpdateHook>> = {
            let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.hooks.iter().map(|(_, hook)| Arc::clone(hook)).collect()
        };

        for hook in hooks {
            if let Err(e) = hook.on_user_data_updated() {
                // Continue with other hooks even if one fails
                log::warn!("Hook '{}' failed: {e:#}", hook.name());
            }
        }
    }

    /// List all registered hooks
    pub fn list_hooks(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .hooks
            .iter()
            .map(|(_, hook)| hook.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .hooks
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`HookRegistry::register`]. Dropping it unregisters the hook.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<RegistryInner>>,
}

impl Subscription {
    /// Unregister the hook now instead of at end of scope
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut inner = registry.lock().unwrap_or_else(PoisonError::into_inner);
            inner.hooks.retain(|(id, _)| *id != self.id);
        }
    }
}
