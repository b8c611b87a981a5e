//! One fetch per screen activation, published through a watch channel.

use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tokio::{
    sync::watch,
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, warn};

use crate::{DataOrError, FetchError, WeatherApi, WeatherSnapshot};

pub type WeatherResult = DataOrError<WeatherSnapshot, FetchError>;

/// What to do with a fetch still in flight when the screen is activated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReactivationPolicy {
    /// Abort the earlier fetch.
    #[default]
    CancelPrevious,
    /// Let the earlier fetch run; its result is discarded when it lands.
    KeepPrevious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ActivationId(pub u64);

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value observed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenState {
    pub activation: ActivationId,
    pub result: WeatherResult,
}

/// Handle to the fetch started by one activation.
#[derive(Debug)]
pub struct ActivationHandle {
    id: ActivationId,
    task: JoinHandle<()>,
}

impl ActivationHandle {
    pub fn id(&self) -> ActivationId {
        self.id
    }

    /// Resolves once the fetch is over: `true` if it completed, `false` if it
    /// was cancelled.
    pub async fn finished(self) -> bool {
        self.task.await.is_ok()
    }
}

pub struct ScreenLoader {
    api: Arc<dyn WeatherApi>,
    policy: ReactivationPolicy,
    state: Arc<watch::Sender<ScreenState>>,
    last_id: u64,
    in_flight: Option<AbortHandle>,
}

impl fmt::Debug for ScreenLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenLoader")
            .field("api", &self.api)
            .field("policy", &self.policy)
            .field("last_id", &self.last_id)
            .finish_non_exhaustive()
    }
}

impl ScreenLoader {
    pub fn new(api: Arc<dyn WeatherApi>, policy: ReactivationPolicy) -> Self {
        let (state, _) = watch::channel(ScreenState::default());

        Self {
            api,
            policy,
            state: Arc::new(state),
            last_id: 0,
            in_flight: None,
        }
    }

    pub fn policy(&self) -> ReactivationPolicy {
        self.policy
    }

    /// Receiver that has already seen the current state; `changed()` fires on
    /// the next publication.
    pub fn subscribe(&self) -> watch::Receiver<ScreenState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ScreenState {
        self.state.borrow().clone()
    }

    /// Starts a fetch for `location`. Must be called from within a Tokio runtime.
    ///
    /// The loading state is published before this returns. Only the most recent
    /// activation may publish a terminal state.
    pub fn activate(&mut self, location: &str) -> ActivationHandle {
        self.last_id += 1;
        let id = ActivationId(self.last_id);

        match self.in_flight.take() {
            Some(previous)
                if self.policy == ReactivationPolicy::CancelPrevious && !previous.is_finished() =>
            {
                debug!(activation = %id, "cancelling previous fetch");
                previous.abort();
            }
            _ => {}
        }

        self.state.send_replace(ScreenState {
            activation: id,
            result: WeatherResult::loading(),
        });
        debug!(activation = %id, location, "screen activated");

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let location = location.to_owned();

        let task = tokio::spawn(async move {
            let result = match api.fetch_weather(&location).await {
                Ok(snapshot) => WeatherResult::success(snapshot),
                Err(err) => {
                    warn!(activation = %id, %location, error = %err, "weather fetch failed");
                    WeatherResult::failure(err)
                }
            };

            state.send_if_modified(|current| {
                if current.activation != id {
                    let latest = current.activation;
                    debug!(activation = %id, %latest, "dropping stale result");
                    return false;
                }
                current.result = result;
                true
            });
        });

        self.in_flight = Some(task.abort_handle());
        ActivationHandle { id, task }
    }
}

impl Drop for ScreenLoader {
    fn drop(&mut self) {
        let in_flight = self.in_flight.take();
        if let (ReactivationPolicy::CancelPrevious, Some(task)) = (self.policy, in_flight) {
            task.abort();
        }
    }
}
