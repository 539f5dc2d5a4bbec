//! `bot_daemon`: the effectful half of the agent. Owns the provider, the
//! cached account state, the feature scheduler and the job handlers.

pub mod agent;
pub mod clock;
pub mod dispatch;
pub mod fleet_saver;
pub mod jobs;
pub mod notify;
pub mod provider;
pub mod scheduler;
pub mod simulated;
pub mod sleep_gate;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatch::{try_send, SendRequest};
pub use fleet_saver::{fleet_save, mission_order, SaveError, SaveRequest};
pub use jobs::Handlers;
pub use notify::{LogNotifier, Notifier};
pub use provider::{FleetOrder, GameProvider, ProviderError, ProviderResult};
pub use scheduler::{JobOutcome, JobRunner, Scheduler, TimerKey};
pub use simulated::{Endpoint, ProviderCall, SimulatedProvider};
pub use state::{AgentContext, AgentState, SharedState};
