//! Buildings, facilities and research with explicit level accessors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Buildable {
    MetalMine,
    CrystalMine,
    DeuteriumSynthesizer,
    SolarPlant,
    FusionReactor,
    MetalStorage,
    CrystalStorage,
    DeuteriumTank,
    RoboticsFactory,
    Shipyard,
    ResearchLab,
    AllianceDepot,
    MissileSilo,
    NaniteFactory,
    Terraformer,
    SpaceDock,
    LunarBase,
    SensorPhalanx,
    JumpGate,
}

impl Buildable {
    pub const MINES: [Buildable; 3] = [
        Buildable::MetalMine,
        Buildable::CrystalMine,
        Buildable::DeuteriumSynthesizer,
    ];

    pub fn is_facility(self) -> bool {
        !matches!(
            self,
            Buildable::MetalMine
                | Buildable::CrystalMine
                | Buildable::DeuteriumSynthesizer
                | Buildable::SolarPlant
                | Buildable::FusionReactor
                | Buildable::MetalStorage
                | Buildable::CrystalStorage
                | Buildable::DeuteriumTank
        )
    }
}

/// Resource buildings of a celestial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buildings {
    pub metal_mine: u32,
    pub crystal_mine: u32,
    pub deuterium_synthesizer: u32,
    pub solar_plant: u32,
    pub fusion_reactor: u32,
    pub metal_storage: u32,
    pub crystal_storage: u32,
    pub deuterium_tank: u32,
}

/// Facilities of a celestial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facilities {
    pub robotics_factory: u32,
    pub shipyard: u32,
    pub research_lab: u32,
    pub alliance_depot: u32,
    pub missile_silo: u32,
    pub nanite_factory: u32,
    pub terraformer: u32,
    pub space_dock: u32,
    pub lunar_base: u32,
    pub sensor_phalanx: u32,
    pub jump_gate: u32,
}

/// Level of `buildable` across the two level tables.
pub fn level_of(buildings: &Buildings, facilities: &Facilities, buildable: Buildable) -> u32 {
    match buildable {
        Buildable::MetalMine => buildings.metal_mine,
        Buildable::CrystalMine => buildings.crystal_mine,
        Buildable::DeuteriumSynthesizer => buildings.deuterium_synthesizer,
        Buildable::SolarPlant => buildings.solar_plant,
        Buildable::FusionReactor => buildings.fusion_reactor,
        Buildable::MetalStorage => buildings.metal_storage,
        Buildable::CrystalStorage => buildings.crystal_storage,
        Buildable::DeuteriumTank => buildings.deuterium_tank,
        Buildable::RoboticsFactory => facilities.robotics_factory,
        Buildable::Shipyard => facilities.shipyard,
        Buildable::ResearchLab => facilities.research_lab,
        Buildable::AllianceDepot => facilities.alliance_depot,
        Buildable::MissileSilo => facilities.missile_silo,
        Buildable::NaniteFactory => facilities.nanite_factory,
        Buildable::Terraformer => facilities.terraformer,
        Buildable::SpaceDock => facilities.space_dock,
        Buildable::LunarBase => facilities.lunar_base,
        Buildable::SensorPhalanx => facilities.sensor_phalanx,
        Buildable::JumpGate => facilities.jump_gate,
    }
}

pub fn set_level_of(
    buildings: &mut Buildings,
    facilities: &mut Facilities,
    buildable: Buildable,
    level: u32,
) {
    let slot = match buildable {
        Buildable::MetalMine => &mut buildings.metal_mine,
        Buildable::CrystalMine => &mut buildings.crystal_mine,
        Buildable::DeuteriumSynthesizer => &mut buildings.deuterium_synthesizer,
        Buildable::SolarPlant => &mut buildings.solar_plant,
        Buildable::FusionReactor => &mut buildings.fusion_reactor,
        Buildable::MetalStorage => &mut buildings.metal_storage,
        Buildable::CrystalStorage => &mut buildings.crystal_storage,
        Buildable::DeuteriumTank => &mut buildings.deuterium_tank,
        Buildable::RoboticsFactory => &mut facilities.robotics_factory,
        Buildable::Shipyard => &mut facilities.shipyard,
        Buildable::ResearchLab => &mut facilities.research_lab,
        Buildable::AllianceDepot => &mut facilities.alliance_depot,
        Buildable::MissileSilo => &mut facilities.missile_silo,
        Buildable::NaniteFactory => &mut facilities.nanite_factory,
        Buildable::Terraformer => &mut facilities.terraformer,
        Buildable::SpaceDock => &mut facilities.space_dock,
        Buildable::LunarBase => &mut facilities.lunar_base,
        Buildable::SensorPhalanx => &mut facilities.sensor_phalanx,
        Buildable::JumpGate => &mut facilities.jump_gate,
    };
    *slot = level;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResearchType {
    EspionageTechnology,
    ComputerTechnology,
    WeaponsTechnology,
    ShieldingTechnology,
    ArmourTechnology,
    EnergyTechnology,
    HyperspaceTechnology,
    CombustionDrive,
    ImpulseDrive,
    HyperspaceDrive,
    LaserTechnology,
    IonTechnology,
    PlasmaTechnology,
    IntergalacticResearchNetwork,
    Astrophysics,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Researches {
    pub espionage_technology: u32,
    pub computer_technology: u32,
    pub weapons_technology: u32,
    pub shielding_technology: u32,
    pub armour_technology: u32,
    pub energy_technology: u32,
    pub hyperspace_technology: u32,
    pub combustion_drive: u32,
    pub impulse_drive: u32,
    pub hyperspace_drive: u32,
    pub laser_technology: u32,
    pub ion_technology: u32,
    pub plasma_technology: u32,
    pub intergalactic_research_network: u32,
    pub astrophysics: u32,
}

impl Researches {
    fn slot_mut(&mut self, research: ResearchType) -> &mut u32 {
        match research {
            ResearchType::EspionageTechnology => &mut self.espionage_technology,
            ResearchType::ComputerTechnology => &mut self.computer_technology,
            ResearchType::WeaponsTechnology => &mut self.weapons_technology,
            ResearchType::ShieldingTechnology => &mut self.shielding_technology,
            ResearchType::ArmourTechnology => &mut self.armour_technology,
            ResearchType::EnergyTechnology => &mut self.energy_technology,
            ResearchType::HyperspaceTechnology => &mut self.hyperspace_technology,
            ResearchType::CombustionDrive => &mut self.combustion_drive,
            ResearchType::ImpulseDrive => &mut self.impulse_drive,
            ResearchType::HyperspaceDrive => &mut self.hyperspace_drive,
            ResearchType::LaserTechnology => &mut self.laser_technology,
            ResearchType::IonTechnology => &mut self.ion_technology,
            ResearchType::PlasmaTechnology => &mut self.plasma_technology,
            ResearchType::IntergalacticResearchNetwork => &mut self.intergalactic_research_network,
            ResearchType::Astrophysics => &mut self.astrophysics,
        }
    }

    pub fn level(&self, research: ResearchType) -> u32 {
        match research {
            ResearchType::EspionageTechnology => self.espionage_technology,
            ResearchType::ComputerTechnology => self.computer_technology,
            ResearchType::WeaponsTechnology => self.weapons_technology,
            ResearchType::ShieldingTechnology => self.shielding_technology,
            ResearchType::ArmourTechnology => self.armour_technology,
            ResearchType::EnergyTechnology => self.energy_technology,
            ResearchType::HyperspaceTechnology => self.hyperspace_technology,
            ResearchType::CombustionDrive => self.combustion_drive,
            ResearchType::ImpulseDrive => self.impulse_drive,
            ResearchType::HyperspaceDrive => self.hyperspace_drive,
            ResearchType::LaserTechnology => self.laser_technology,
            ResearchType::IonTechnology => self.ion_technology,
            ResearchType::PlasmaTechnology => self.plasma_technology,
            ResearchType::IntergalacticResearchNetwork => self.intergalactic_research_network,
            ResearchType::Astrophysics => self.astrophysics,
        }
    }

    pub fn set_level(&mut self, research: ResearchType, level: u32) {
        *self.slot_mut(research) = level;
    }

    /// Planets the account may own: one plus one per two astrophysics levels.
    pub fn max_planets(&self) -> u32 {
        1 + self.astrophysics.div_ceil(2)
    }

    /// Expedition slots granted by astrophysics.
    pub fn expedition_slots(&self) -> u32 {
        (f64::from(self.astrophysics)).sqrt().floor() as u32
    }
}
