//! The remote game-state provider the agent reads from and acts through.

use async_trait::async_trait;
use bot_core::{
    Buildable, Celestial, CelestialId, Coordinate, EspionageReport, Fleet, FleetId, GalaxySlot,
    HostileEvent, Mission, PlayerClass, ResearchType, Researches, Resources, ShipType, Ships,
    Slots, Speed, UniverseInfo,
};

/// Failure half of the provider's tri-state answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The game refused the request (not enough resources, queue busy, ...).
    #[error("provider refused: {0}")]
    Domain(String),
    /// The request never got a usable answer.
    #[error("provider unreachable: {0}")]
    Transport(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Everything the provider needs to launch a fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetOrder {
    pub origin: CelestialId,
    pub destination: Coordinate,
    pub ships: Ships,
    pub mission: Mission,
    pub speed: Speed,
    pub payload: Resources,
}

#[async_trait]
pub trait GameProvider: Send + Sync {
    async fn server_data(&self) -> ProviderResult<UniverseInfo>;
    async fn player_class(&self) -> ProviderResult<PlayerClass>;
    async fn researches(&self) -> ProviderResult<Researches>;
    async fn celestials(&self) -> ProviderResult<Vec<Celestial>>;
    async fn celestial(&self, id: CelestialId) -> ProviderResult<Celestial>;
    async fn fleets(&self) -> ProviderResult<Vec<Fleet>>;
    async fn slots(&self) -> ProviderResult<Slots>;
    async fn galaxy_system(&self, galaxy: u32, system: u32) -> ProviderResult<Vec<GalaxySlot>>;
    /// Reports that arrived since the last call.
    async fn espionage_reports(&self) -> ProviderResult<Vec<EspionageReport>>;
    async fn hostile_events(&self) -> ProviderResult<Vec<HostileEvent>>;

    async fn build(&self, celestial: CelestialId, buildable: Buildable) -> ProviderResult<()>;
    async fn research(&self, celestial: CelestialId, research: ResearchType) -> ProviderResult<()>;
    async fn build_ships(
        &self,
        celestial: CelestialId,
        ship: ShipType,
        count: u64,
    ) -> ProviderResult<()>;
    async fn send_fleet(&self, order: FleetOrder) -> ProviderResult<Fleet>;
    async fn recall_fleet(&self, fleet: FleetId) -> ProviderResult<()>;
}
