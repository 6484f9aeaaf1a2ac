use log::{debug, trace};
use std::sync::{Arc, PoisonError, RwLock};
use time::{Duration, OffsetDateTime};

type Producer<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;

pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

pub struct TimedCache<T, E> {
    name: &'static str,
    producer: Producer<T, E>,
    interval: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
    slot: RwLock<Option<(OffsetDateTime, Arc<T>)>>,
}

impl<T, E> TimedCache<T, E> {
    pub fn new<F>(
        name: &'static str,
        interval: Duration,
        clock: Arc<dyn Clock + Send + Sync>,
        producer: F,
    ) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name,
            producer: Box::new(producer),
            interval,
            clock,
            slot: RwLock::new(None),
        }
    }

    // The lock is not held while producing; concurrent misses both build.
    pub fn get(&self) -> Result<Arc<T>, E> {
        let now = self.clock.now();
        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((stored_at, value)) = slot.as_ref() {
                if now - *stored_at <= self.interval {
                    trace!("Serving cached {} from {}", self.name, stored_at);
                    return Ok(value.clone());
                }
            }
        }

        debug!("Cached {} is missing or stale, rebuilding", self.name);
        let value = Arc::new((self.producer)()?);
        let stored_at = self.clock.now();
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) =
            Some((stored_at, value.clone()));

        Ok(value)
    }
}

pub struct OnceCache<T, E> {
    name: &'static str,
    producer: Producer<T, E>,
    slot: RwLock<Option<Arc<T>>>,
}

impl<T, E> OnceCache<T, E> {
    pub fn new<F>(name: &'static str, producer: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name,
            producer: Box::new(producer),
            slot: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Result<Arc<T>, E> {
        if let Some(value) = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            trace!("Serving cached {}", self.name);
            return Ok(value.clone());
        }

        debug!("Building {} for the first time", self.name);
        let value = Arc::new((self.producer)()?);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value.clone());

        Ok(value)
    }
}
