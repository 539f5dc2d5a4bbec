//! In-memory provider backed by a universe snapshot.
//!
//! Fleets fly on the injected clock using the injected rules, come home and
//! unload when their time is up, and every mutating call is recorded so
//! tests can assert on what reached the "server".

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use bot_config::UniverseSnapshot;
use bot_core::{
    level_of, Buildable, Celestial, CelestialId, Coordinate, EspionageReport, Fleet, FleetId,
    FlightContext, GalaxySlot, GameRules, HostileEvent, Leg, Mission, PlayerClass, ResearchType,
    Researches, ShipType, Slots, UniverseInfo,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::provider::{FleetOrder, GameProvider, ProviderError, ProviderResult};

/// Mutating requests that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Build(CelestialId, Buildable),
    Research(CelestialId, ResearchType),
    BuildShips(CelestialId, ShipType, u64),
    SendFleet(FleetOrder),
    RecallFleet(FleetId),
}

/// Which endpoint an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ServerData,
    Celestials,
    Fleets,
    Slots,
    Galaxy,
    Reports,
    Hostile,
    Build,
    Research,
    BuildShips,
    SendFleet,
    RecallFleet,
}

struct World {
    snapshot: UniverseSnapshot,
    next_fleet_id: u64,
    calls: Vec<ProviderCall>,
    failures: HashMap<Endpoint, VecDeque<ProviderError>>,
    /// Coordinates probed by our spy fleets, by arrival time.
    probed: Vec<(Coordinate, DateTime<Utc>)>,
}

impl World {
    fn fail(&mut self, endpoint: Endpoint) -> ProviderResult<()> {
        match self.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn celestial_mut(&mut self, id: CelestialId) -> ProviderResult<&mut Celestial> {
        self.snapshot
            .celestials
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ProviderError::Domain(format!("unknown celestial {id}")))
    }

    /// Land every fleet whose time is up.
    fn settle(&mut self, now: DateTime<Utc>) {
        let (done, flying): (Vec<Fleet>, Vec<Fleet>) = std::mem::take(&mut self.snapshot.fleets)
            .into_iter()
            .partition(|f| f.home_time() <= now);
        self.snapshot.fleets = flying;
        for fleet in done {
            let home = if fleet.mission == Mission::Deploy && !fleet.return_flight {
                fleet.destination
            } else {
                fleet.origin
            };
            if let Some(celestial) = self
                .snapshot
                .celestials
                .iter_mut()
                .find(|c| c.coordinate == home)
            {
                celestial.ships = celestial.ships.add(&fleet.ships);
                celestial.resources = celestial.resources.add(&fleet.payload);
            }
            let slots = &mut self.snapshot.slots;
            slots.in_use = slots.in_use.saturating_sub(1);
            if fleet.mission == Mission::Expedition {
                slots.expedition_in_use = slots.expedition_in_use.saturating_sub(1);
            }
        }
    }
}

pub struct SimulatedProvider {
    world: Mutex<World>,
    rules: Arc<dyn GameRules>,
    clock: Arc<dyn Clock>,
}

impl SimulatedProvider {
    pub fn new(snapshot: UniverseSnapshot, rules: Arc<dyn GameRules>, clock: Arc<dyn Clock>) -> Self {
        let next_fleet_id = snapshot.fleets.iter().map(|f| f.id.0).max().unwrap_or(0) + 1;
        Self {
            world: Mutex::new(World {
                snapshot,
                next_fleet_id,
                calls: Vec::new(),
                failures: HashMap::new(),
                probed: Vec::new(),
            }),
            rules,
            clock,
        }
    }

    /// Make the next call to `endpoint` fail with `error`. Queued failures
    /// are consumed in order.
    pub fn fail_next(&self, endpoint: Endpoint, error: ProviderError) {
        self.world
            .lock()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.world.lock().calls.clone()
    }

    pub fn sent_fleets(&self) -> Vec<FleetOrder> {
        self.world
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ProviderCall::SendFleet(order) => Some(order.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn push_hostile(&self, event: HostileEvent) {
        self.world.lock().snapshot.hostile.push(event);
    }

    pub fn update_celestial(&self, id: CelestialId, edit: impl FnOnce(&mut Celestial)) {
        if let Some(c) = self
            .world
            .lock()
            .snapshot
            .celestials
            .iter_mut()
            .find(|c| c.id == id)
        {
            edit(c);
        }
    }

    fn settled<T>(
        &self,
        endpoint: Endpoint,
        read: impl FnOnce(&UniverseSnapshot) -> T,
    ) -> ProviderResult<T> {
        let now = self.clock.now();
        let mut world = self.world.lock();
        world.fail(endpoint)?;
        world.settle(now);
        Ok(read(&world.snapshot))
    }
}

fn flight_secs(
    rules: &dyn GameRules,
    universe: &UniverseInfo,
    researches: &Researches,
    class: PlayerClass,
    from: &Coordinate,
    order: &FleetOrder,
) -> (u64, u64) {
    let ctx = FlightContext {
        universe,
        researches,
        class,
    };
    let leg = Leg {
        from,
        to: &order.destination,
        ships: &order.ships,
        speed: order.speed,
        mission: order.mission,
    };
    (rules.flight_time(&ctx, &leg), rules.fuel_consumption(&ctx, &leg))
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}

#[async_trait]
impl GameProvider for SimulatedProvider {
    async fn server_data(&self) -> ProviderResult<UniverseInfo> {
        self.settled(Endpoint::ServerData, |s| s.universe.clone())
    }

    async fn player_class(&self) -> ProviderResult<PlayerClass> {
        self.settled(Endpoint::ServerData, |s| s.class)
    }

    async fn researches(&self) -> ProviderResult<Researches> {
        self.settled(Endpoint::ServerData, |s| s.researches)
    }

    async fn celestials(&self) -> ProviderResult<Vec<Celestial>> {
        self.settled(Endpoint::Celestials, |s| s.celestials.clone())
    }

    async fn celestial(&self, id: CelestialId) -> ProviderResult<Celestial> {
        self.settled(Endpoint::Celestials, |s| {
            s.celestials.iter().find(|c| c.id == id).cloned()
        })?
        .ok_or_else(|| ProviderError::Domain(format!("unknown celestial {id}")))
    }

    async fn fleets(&self) -> ProviderResult<Vec<Fleet>> {
        self.settled(Endpoint::Fleets, |s| s.fleets.clone())
    }

    async fn slots(&self) -> ProviderResult<Slots> {
        self.settled(Endpoint::Slots, |s| s.slots)
    }

    async fn galaxy_system(&self, galaxy: u32, system: u32) -> ProviderResult<Vec<GalaxySlot>> {
        self.settled(Endpoint::Galaxy, |s| {
            s.galaxy
                .iter()
                .filter(|slot| slot.coordinate.galaxy == galaxy && slot.coordinate.system == system)
                .cloned()
                .collect()
        })
    }

    async fn espionage_reports(&self) -> ProviderResult<Vec<EspionageReport>> {
        let now = self.clock.now();
        let mut world = self.world.lock();
        world.fail(Endpoint::Reports)?;
        world.settle(now);
        let (arrived, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut world.probed).into_iter().partition(|(_, at)| *at <= now);
        world.probed = pending;
        let reports = arrived
            .iter()
            .filter_map(|(target, _)| {
                world
                    .snapshot
                    .reports
                    .iter()
                    .find(|r| r.coordinate == *target)
                    .map(|r| EspionageReport {
                        timestamp: now,
                        ..r.clone()
                    })
            })
            .collect();
        Ok(reports)
    }

    async fn hostile_events(&self) -> ProviderResult<Vec<HostileEvent>> {
        let now = self.clock.now();
        self.settled(Endpoint::Hostile, |s| {
            s.hostile
                .iter()
                .filter(|e| e.arrival_time > now)
                .cloned()
                .collect()
        })
    }

    async fn build(&self, celestial: CelestialId, buildable: Buildable) -> ProviderResult<()> {
        let mut world = self.world.lock();
        world.fail(Endpoint::Build)?;
        let universe = world.snapshot.universe.clone();
        let body = world.celestial_mut(celestial)?;
        if body.constructions.building.is_some() {
            return Err(ProviderError::Domain("construction already running".into()));
        }
        let level = level_of(&body.buildings, &body.facilities, buildable) + 1;
        let cost = self.rules.building_cost(buildable, level);
        if !body.resources.is_enough_for(&cost) {
            return Err(ProviderError::Domain("not enough resources".into()));
        }
        body.resources = body.resources.saturating_sub(&cost);
        let secs = self
            .rules
            .building_time(buildable, level, &body.facilities, &universe);
        body.constructions.building = Some((buildable, secs));
        world.calls.push(ProviderCall::Build(celestial, buildable));
        Ok(())
    }

    async fn research(&self, celestial: CelestialId, research: ResearchType) -> ProviderResult<()> {
        let mut world = self.world.lock();
        world.fail(Endpoint::Research)?;
        let universe = world.snapshot.universe.clone();
        let level = world.snapshot.researches.level(research) + 1;
        let body = world.celestial_mut(celestial)?;
        let cost = self.rules.research_cost(research, level);
        if !body.resources.is_enough_for(&cost) {
            return Err(ProviderError::Domain("not enough resources".into()));
        }
        body.resources = body.resources.saturating_sub(&cost);
        let secs = self
            .rules
            .research_time(research, level, body.facilities.research_lab, &universe);
        body.constructions.research = Some((research, secs));
        world.calls.push(ProviderCall::Research(celestial, research));
        Ok(())
    }

    async fn build_ships(
        &self,
        celestial: CelestialId,
        ship: ShipType,
        count: u64,
    ) -> ProviderResult<()> {
        let mut world = self.world.lock();
        world.fail(Endpoint::BuildShips)?;
        let body = world.celestial_mut(celestial)?;
        let unit = self.rules.ship_cost(ship);
        let cost = unit.scale(count as f64);
        if !body.resources.is_enough_for(&cost) {
            return Err(ProviderError::Domain("not enough resources".into()));
        }
        body.resources = body.resources.saturating_sub(&cost);
        let current = body.ships.get(ship);
        body.ships.set(ship, current + count);
        world.calls.push(ProviderCall::BuildShips(celestial, ship, count));
        Ok(())
    }

    async fn send_fleet(&self, order: FleetOrder) -> ProviderResult<Fleet> {
        let now = self.clock.now();
        let mut world = self.world.lock();
        world.fail(Endpoint::SendFleet)?;
        world.settle(now);
        if world.snapshot.slots.free() == 0 {
            return Err(ProviderError::Domain("no free fleet slot".into()));
        }
        let universe = world.snapshot.universe.clone();
        let researches = world.snapshot.researches;
        let class = world.snapshot.class;
        let body = world.celestial_mut(order.origin)?;
        let from = body.coordinate;
        if !body.ships.has_at_least(&order.ships) {
            return Err(ProviderError::Domain("ships not on the celestial".into()));
        }
        let (one_way, fuel) =
            flight_secs(self.rules.as_ref(), &universe, &researches, class, &from, &order);
        let needed = order.payload.add(&bot_core::Resources::deuterium(fuel));
        if !body.resources.is_enough_for(&needed) {
            return Err(ProviderError::Domain("not enough resources".into()));
        }
        body.ships = body.ships.saturating_sub(&order.ships);
        body.resources = body.resources.saturating_sub(&needed);

        let arrival = now + seconds(one_way);
        let back_time = match order.mission {
            Mission::Deploy => None,
            Mission::Expedition => {
                Some(arrival + seconds(self.rules.expedition_hold_secs()) + seconds(one_way))
            }
            _ => Some(arrival + seconds(one_way)),
        };
        let fleet = Fleet {
            id: FleetId(world.next_fleet_id),
            mission: order.mission,
            return_flight: false,
            origin: from,
            destination: order.destination,
            ships: order.ships,
            payload: order.payload,
            start_time: now,
            arrival_time: arrival,
            back_time,
        };
        world.next_fleet_id += 1;
        world.snapshot.slots.in_use += 1;
        if order.mission == Mission::Expedition {
            world.snapshot.slots.expedition_in_use += 1;
        }
        if order.mission == Mission::Spy {
            world.probed.push((order.destination, arrival));
        }
        world.snapshot.fleets.push(fleet.clone());
        world.calls.push(ProviderCall::SendFleet(order));
        Ok(fleet)
    }

    async fn recall_fleet(&self, id: FleetId) -> ProviderResult<()> {
        let now = self.clock.now();
        let mut world = self.world.lock();
        world.fail(Endpoint::RecallFleet)?;
        world.settle(now);
        let fleet = world
            .snapshot
            .fleets
            .iter_mut()
            .find(|f| f.id == id && !f.return_flight)
            .ok_or_else(|| ProviderError::Domain(format!("fleet {id} cannot be recalled")))?;
        let flown = now - fleet.start_time;
        fleet.return_flight = true;
        fleet.arrival_time = now + flown;
        fleet.back_time = None;
        world.calls.push(ProviderCall::RecallFleet(id));
        Ok(())
    }
}
