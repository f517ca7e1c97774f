//! Procedural voxel reef generation.
//!
//! A single pass over a centered grid lays down a terraced sand floor and then
//! runs every cell through a priority cascade of decorations (ruins, kelp,
//! chests, plants, coral). Structures claim their cell (and a neighbor for the
//! mechanism beside them) so no later rule can place over them.

use crate::config::ConfigError;
use glam::{IVec3, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::f32::consts::TAU;
use std::fmt;

/// Voxel categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoxelKind {
    Sand,
    Stone,
    Rune,
    Lamp,
    Kelp,
    Seagrass,
    Rock,
    Anemone,
    Starfish,
    SeaFlower,
    Coral,
}

impl VoxelKind {
    pub fn name(&self) -> &'static str {
        match self {
            VoxelKind::Sand => "sand",
            VoxelKind::Stone => "stone",
            VoxelKind::Rune => "rune",
            VoxelKind::Lamp => "lamp",
            VoxelKind::Kelp => "kelp",
            VoxelKind::Seagrass => "seagrass",
            VoxelKind::Rock => "rock",
            VoxelKind::Anemone => "anemone",
            VoxelKind::Starfish => "starfish",
            VoxelKind::SeaFlower => "sea flower",
            VoxelKind::Coral => "coral",
        }
    }
}

/// One placed voxel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Grid cell (x, layer, z)
    pub cell: IVec3,
    /// World-space center
    pub position: Vec3,
    /// Rotation about the vertical axis (radians)
    pub yaw: f32,
    pub scale: Vec3,
    pub color: Option<[u8; 3]>,
}

/// Interactable prop types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractableKind {
    Chest,
    Mechanism,
}

impl InteractableKind {
    pub fn name(&self) -> &'static str {
        match self {
            InteractableKind::Chest => "chest",
            InteractableKind::Mechanism => "mechanism",
        }
    }
}

/// Identifier derived from the grid cell an interactable stands on.
/// At most one interactable exists per cell, so ids are unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InteractableId {
    pub kind: InteractableKind,
    pub x: i32,
    pub z: i32,
}

impl fmt::Display for InteractableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{},{}", self.kind.name(), self.x, self.z)
    }
}

/// A one-time activatable prop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractableItem {
    pub id: InteractableId,
    pub kind: InteractableKind,
    pub position: Vec3,
    pub yaw: f32,
}

/// Minimap landmark categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoiKind {
    Ruin,
    Coral,
    Lamp,
    Kelp,
    Chest,
    Mechanism,
}

impl PoiKind {
    /// Minimap glyph
    pub fn char(&self) -> char {
        match self {
            PoiKind::Ruin => 'R',
            PoiKind::Coral => '*',
            PoiKind::Lamp => 'L',
            PoiKind::Kelp => 'k',
            PoiKind::Chest => 'C',
            PoiKind::Mechanism => 'M',
        }
    }

    /// Draw order on the minimap (higher wins a shared cell)
    fn priority(&self) -> u8 {
        match self {
            PoiKind::Kelp => 0,
            PoiKind::Coral => 1,
            PoiKind::Ruin => 2,
            PoiKind::Lamp => 3,
            PoiKind::Mechanism => 4,
            PoiKind::Chest => 5,
        }
    }
}

/// A minimap landmark
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f32,
    pub z: f32,
    pub kind: PoiKind,
    pub color: Option<[u8; 3]>,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Inclusive stack-height range in voxels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: u32,
    pub max: u32,
}

impl HeightRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.min >= 1 && self.min <= self.max
    }
}

/// Decoration cascade. Every cell draws one uniform number `r` and the rules
/// are tried in field order; a rule fires when `r` is below its threshold and
/// its vegetation-density gate holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTable {
    pub structure: f32,
    pub kelp: f32,
    pub chest: f32,
    pub seagrass: f32,
    pub rock: f32,
    pub anemone: f32,
    pub starfish: f32,
    pub sea_flower: f32,
    pub coral: f32,
    /// Kelp only grows where density is above this
    pub kelp_min_density: f32,
    /// Chests only rest where density is below this
    pub chest_max_density: f32,
    pub seagrass_min_density: f32,
    pub starfish_max_density: f32,
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self {
            structure: 0.008,
            kelp: 0.07,
            chest: 0.012,
            seagrass: 0.16,
            rock: 0.19,
            anemone: 0.215,
            starfish: 0.235,
            sea_flower: 0.27,
            coral: 0.33,
            kelp_min_density: 0.6,
            chest_max_density: 0.3,
            seagrass_min_density: 0.35,
            starfish_max_density: 0.4,
        }
    }
}

impl SpawnTable {
    fn probabilities(&self) -> [(&'static str, f32); 13] {
        [
            ("structure", self.structure),
            ("kelp", self.kelp),
            ("chest", self.chest),
            ("seagrass", self.seagrass),
            ("rock", self.rock),
            ("anemone", self.anemone),
            ("starfish", self.starfish),
            ("sea_flower", self.sea_flower),
            ("coral", self.coral),
            ("kelp_min_density", self.kelp_min_density),
            ("chest_max_density", self.chest_max_density),
            ("seagrass_min_density", self.seagrass_min_density),
            ("starfish_max_density", self.starfish_max_density),
        ]
    }
}

/// Terrain generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Edge length of one voxel in world units
    pub block_size: f32,
    /// Low-frequency rolling term
    pub height_frequency: f32,
    pub height_amplitude: f32,
    /// High-frequency ripple term
    pub detail_frequency_x: f32,
    pub detail_frequency_z: f32,
    pub detail_amplitude: f32,
    /// Vegetation density field
    pub vegetation_frequency_x: f32,
    pub vegetation_frequency_z: f32,
    pub spawn: SpawnTable,
    pub column_height: HeightRange,
    pub monolith_height: HeightRange,
    pub kelp_height: HeightRange,
    /// Height of a coral "tower" when one is rolled
    pub coral_tower_height: HeightRange,
    pub coral_tower_chance: f32,
    /// Chance a ruin carries a lamp on top
    pub lamp_chance: f32,
    /// Chance a ruin has a mechanism in the next cell
    pub mechanism_chance: f32,
    pub coral_palette: Vec<[u8; 3]>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            block_size: 1.0,
            height_frequency: 0.08,
            height_amplitude: 3.0,
            detail_frequency_x: 0.3,
            detail_frequency_z: 0.25,
            detail_amplitude: 0.8,
            vegetation_frequency_x: 0.05,
            vegetation_frequency_z: 0.07,
            spawn: SpawnTable::default(),
            column_height: HeightRange::new(2, 6),
            monolith_height: HeightRange::new(5, 15),
            kelp_height: HeightRange::new(3, 8),
            coral_tower_height: HeightRange::new(2, 3),
            coral_tower_chance: 0.35,
            lamp_chance: 0.6,
            mechanism_chance: 0.3,
            coral_palette: vec![
                [255, 111, 145],
                [255, 150, 113],
                [255, 199, 95],
                [249, 248, 113],
                [214, 93, 177],
                [132, 94, 194],
                [0, 201, 167],
            ],
        }
    }
}

/// Deepest floor swing, in voxel layers, either side of zero
pub const MAX_FLOOR_LAYERS: f32 = 4096.0;

/// Tallest stack any height range may request
pub const MAX_STACK_HEIGHT: u32 = 256;

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.block_size.is_finite() && self.block_size > 0.0) {
            return Err(ConfigError::Invalid("terrain.block_size must be > 0".to_string()));
        }
        for (name, value) in [
            ("height_frequency", self.height_frequency),
            ("height_amplitude", self.height_amplitude),
            ("detail_frequency_x", self.detail_frequency_x),
            ("detail_frequency_z", self.detail_frequency_z),
            ("detail_amplitude", self.detail_amplitude),
            ("vegetation_frequency_x", self.vegetation_frequency_x),
            ("vegetation_frequency_z", self.vegetation_frequency_z),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "terrain.{} must be finite and >= 0",
                    name
                )));
            }
        }
        let swing = (self.height_amplitude + self.detail_amplitude) / self.block_size;
        if !(swing <= MAX_FLOOR_LAYERS) {
            return Err(ConfigError::Invalid(format!(
                "terrain amplitudes span {} layers, at most {} allowed",
                swing, MAX_FLOOR_LAYERS
            )));
        }
        for (name, p) in self.spawn.probabilities() {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "terrain.spawn.{} must be within [0, 1]",
                    name
                )));
            }
        }
        for (name, p) in [
            ("coral_tower_chance", self.coral_tower_chance),
            ("lamp_chance", self.lamp_chance),
            ("mechanism_chance", self.mechanism_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("terrain.{} must be within [0, 1]", name)));
            }
        }
        for (name, range) in [
            ("column_height", self.column_height),
            ("monolith_height", self.monolith_height),
            ("kelp_height", self.kelp_height),
            ("coral_tower_height", self.coral_tower_height),
        ] {
            if !range.is_valid() || range.max > MAX_STACK_HEIGHT {
                return Err(ConfigError::Invalid(format!(
                    "terrain.{} must satisfy 1 <= min <= max <= {}",
                    name, MAX_STACK_HEIGHT
                )));
            }
        }
        if self.coral_palette.is_empty() {
            return Err(ConfigError::Invalid("terrain.coral_palette is empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Complete static reef produced by [`TerrainGenerator::generate`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainLayout {
    pub width: i32,
    pub depth: i32,
    pub block_size: f32,
    pub voxels: BTreeMap<VoxelKind, Vec<Placement>>,
    pub interactables: Vec<InteractableItem>,
    pub points_of_interest: Vec<MapPoint>,
    /// Floor layer per cell, row-major from (min_x, min_z)
    floor: Vec<i32>,
}

impl TerrainLayout {
    /// Layout with no cells
    pub fn empty(block_size: f32) -> Self {
        Self {
            width: 0,
            depth: 0,
            block_size,
            voxels: BTreeMap::new(),
            interactables: Vec::new(),
            points_of_interest: Vec::new(),
            floor: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.floor.is_empty()
    }

    /// Lowest cell coordinate on the x axis
    pub fn min_x(&self) -> i32 {
        -(self.width / 2)
    }

    pub fn min_z(&self) -> i32 {
        -(self.depth / 2)
    }

    pub fn contains_cell(&self, x: i32, z: i32) -> bool {
        x >= self.min_x()
            && x < self.min_x() + self.width
            && z >= self.min_z()
            && z < self.min_z() + self.depth
    }

    /// Floor layer at a grid cell
    pub fn floor_height(&self, x: i32, z: i32) -> Option<i32> {
        if !self.contains_cell(x, z) {
            return None;
        }
        let ix = (x - self.min_x()) as usize;
        let iz = (z - self.min_z()) as usize;
        self.floor.get(iz * self.width as usize + ix).copied()
    }

    /// World-space height of the floor voxel nearest to a world position
    pub fn surface_y_at(&self, world_x: f32, world_z: f32) -> Option<f32> {
        let x = (world_x / self.block_size).round() as i32;
        let z = (world_z / self.block_size).round() as i32;
        self.floor_height(x, z).map(|h| h as f32 * self.block_size)
    }

    /// Horizontal world-space bounds (min corner, max corner) of the grid
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = self.block_size * 0.5;
        let min = Vec3::new(
            self.min_x() as f32 * self.block_size - half,
            0.0,
            self.min_z() as f32 * self.block_size - half,
        );
        let max = Vec3::new(
            (self.min_x() + self.width - 1) as f32 * self.block_size + half,
            0.0,
            (self.min_z() + self.depth - 1) as f32 * self.block_size + half,
        );
        (min, max)
    }

    pub fn placements(&self, kind: VoxelKind) -> &[Placement] {
        self.voxels.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Voxel count per category
    pub fn counts(&self) -> BTreeMap<VoxelKind, usize> {
        self.voxels.iter().map(|(k, v)| (*k, v.len())).collect()
    }

    pub fn voxel_count(&self) -> usize {
        self.voxels.values().map(Vec::len).sum()
    }

    /// Point-of-interest count per category
    pub fn poi_counts(&self) -> BTreeMap<PoiKind, usize> {
        let mut counts = BTreeMap::new();
        for poi in &self.points_of_interest {
            *counts.entry(poi.kind).or_insert(0) += 1;
        }
        counts
    }

    /// ASCII minimap, one character per cell, north (min z) first
    pub fn render_minimap(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let w = self.width as usize;
        let d = self.depth as usize;
        let mut cells = vec![('.', 0u8); w * d];
        let mut marked = vec![false; w * d];

        for poi in &self.points_of_interest {
            let x = (poi.x / self.block_size).round() as i32;
            let z = (poi.z / self.block_size).round() as i32;
            if !self.contains_cell(x, z) {
                continue;
            }
            let idx = (z - self.min_z()) as usize * w + (x - self.min_x()) as usize;
            if !marked[idx] || poi.kind.priority() > cells[idx].1 {
                cells[idx] = (poi.kind.char(), poi.kind.priority());
                marked[idx] = true;
            }
        }

        let mut out = String::with_capacity((w + 1) * d);
        for row in cells.chunks(w) {
            out.extend(row.iter().map(|(c, _)| *c));
            out.push('\n');
        }
        out
    }

    fn push(&mut self, kind: VoxelKind, placement: Placement) {
        self.voxels.entry(kind).or_default().push(placement);
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Seed-dependent phase offsets for the height and vegetation fields
struct Fields {
    offset_x: f32,
    offset_z: f32,
}

/// Generates [`TerrainLayout`]s. Pure apart from the supplied random source.
#[derive(Debug, Clone, Default)]
pub struct TerrainGenerator {
    config: TerrainConfig,
}

impl TerrainGenerator {
    pub fn new(config: TerrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Generate with a fresh seeded generator
    pub fn generate_seeded(&self, width: i32, depth: i32, seed: u64) -> TerrainLayout {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(width, depth, &mut rng)
    }

    /// Generate a `width × depth` reef centered on the origin.
    /// Non-positive dimensions yield an empty layout.
    pub fn generate<R: Rng + ?Sized>(&self, width: i32, depth: i32, rng: &mut R) -> TerrainLayout {
        let cfg = &self.config;
        let mut layout = TerrainLayout::empty(cfg.block_size);

        if width <= 0 || depth <= 0 {
            log::debug!("terrain: degenerate grid {}x{}, empty layout", width, depth);
            return layout;
        }

        layout.width = width;
        layout.depth = depth;
        layout.floor = Vec::with_capacity((width * depth) as usize);

        let fields = Fields {
            offset_x: rng.gen_range(0.0..1000.0),
            offset_z: rng.gen_range(0.0..1000.0),
        };

        let min_x = layout.min_x();
        let min_z = layout.min_z();
        let mut claimed: HashSet<(i32, i32)> = HashSet::new();

        // Floor first so the height lookup is complete when structures look
        // at their neighbors.
        for z in min_z..min_z + depth {
            for x in min_x..min_x + width {
                let h = self.floor_layer(&fields, x, z);
                layout.floor.push(h);
                for layer in [h, h.saturating_sub(1)] {
                    let placement = self.block(x, layer, z);
                    layout.push(VoxelKind::Sand, placement);
                }
            }
        }

        for z in min_z..min_z + depth {
            for x in min_x..min_x + width {
                if claimed.contains(&(x, z)) {
                    continue;
                }
                let base = layout.floor_height(x, z).unwrap_or(0).saturating_add(1);
                let density = self.vegetation_density(&fields, x, z);
                let r: f32 = rng.gen();
                let spawn = &cfg.spawn;

                if r < spawn.structure {
                    claimed.insert((x, z));
                    self.place_structure(&mut layout, &mut claimed, x, z, base, rng);
                    continue;
                }

                if r < spawn.kelp && density > spawn.kelp_min_density {
                    let height = cfg.kelp_height.sample(rng) as i32;
                    for layer in base..base + height {
                        let mut p = self.block(x, layer, z);
                        p.yaw = rng.gen_range(0.0..TAU);
                        p.scale = Vec3::new(0.4, 1.0, 0.4);
                        layout.push(VoxelKind::Kelp, p);
                    }
                    self.mark(&mut layout, x, z, PoiKind::Kelp, None);
                    continue;
                }

                if r < spawn.chest && density < spawn.chest_max_density {
                    claimed.insert((x, z));
                    self.place_interactable(&mut layout, InteractableKind::Chest, x, z, base, rng);
                    continue;
                }

                if r < spawn.seagrass && density > spawn.seagrass_min_density {
                    let mut p = self.block(x, base, z);
                    p.yaw = rng.gen_range(0.0..TAU);
                    p.scale = Vec3::new(0.3, rng.gen_range(0.4..0.9), 0.3);
                    layout.push(VoxelKind::Seagrass, p);
                    continue;
                }

                if r < spawn.rock {
                    let mut p = self.block(x, base, z);
                    p.yaw = rng.gen_range(0.0..TAU);
                    p.scale = Vec3::splat(rng.gen_range(0.4..0.9));
                    layout.push(VoxelKind::Rock, p);
                    continue;
                }

                if r < spawn.anemone {
                    let mut p = self.block(x, base, z);
                    p.scale = Vec3::splat(0.6);
                    layout.push(VoxelKind::Anemone, p);
                    continue;
                }

                if r < spawn.starfish && density < spawn.starfish_max_density {
                    let mut p = self.block(x, base, z);
                    p.yaw = rng.gen_range(0.0..TAU);
                    p.scale = Vec3::new(0.6, 0.1, 0.6);
                    layout.push(VoxelKind::Starfish, p);
                    continue;
                }

                if r < spawn.sea_flower {
                    let mut p = self.block(x, base, z);
                    p.scale = Vec3::splat(0.5);
                    p.color = Some(self.pick_color(rng));
                    layout.push(VoxelKind::SeaFlower, p);
                    continue;
                }

                if r < spawn.coral {
                    let color = self.pick_color(rng);
                    let height = if rng.gen::<f32>() < cfg.coral_tower_chance {
                        cfg.coral_tower_height.sample(rng) as i32
                    } else {
                        1
                    };
                    for layer in base..base + height {
                        let mut p = self.block(x, layer, z);
                        p.color = Some(color);
                        layout.push(VoxelKind::Coral, p);
                    }
                    self.mark(&mut layout, x, z, PoiKind::Coral, Some(color));
                }
            }
        }

        log::debug!(
            "terrain: generated {}x{} reef, {} voxels, {} interactables, {} points of interest",
            width,
            depth,
            layout.voxel_count(),
            layout.interactables.len(),
            layout.points_of_interest.len()
        );

        layout
    }

    /// Ruin column or rune monolith, optional lamp on top, optional
    /// mechanism in the next cell along +x.
    fn place_structure<R: Rng + ?Sized>(
        &self,
        layout: &mut TerrainLayout,
        claimed: &mut HashSet<(i32, i32)>,
        x: i32,
        z: i32,
        base: i32,
        rng: &mut R,
    ) {
        let cfg = &self.config;
        let (kind, height) = if rng.gen_bool(0.5) {
            (VoxelKind::Stone, cfg.column_height.sample(rng) as i32)
        } else {
            (VoxelKind::Rune, cfg.monolith_height.sample(rng) as i32)
        };

        for layer in base..base + height {
            layout.push(kind, self.block(x, layer, z));
        }
        self.mark(layout, x, z, PoiKind::Ruin, None);

        if rng.gen::<f32>() < cfg.lamp_chance {
            let mut lamp = self.block(x, base + height, z);
            lamp.scale = Vec3::splat(0.5);
            lamp.color = Some([255, 214, 140]);
            layout.push(VoxelKind::Lamp, lamp);
            self.mark(layout, x, z, PoiKind::Lamp, Some([255, 214, 140]));
        }

        let (mx, mz) = (x + 1, z);
        if rng.gen::<f32>() < cfg.mechanism_chance
            && layout.contains_cell(mx, mz)
            && claimed.insert((mx, mz))
        {
            let mbase = layout.floor_height(mx, mz).unwrap_or(0).saturating_add(1);
            self.place_interactable(layout, InteractableKind::Mechanism, mx, mz, mbase, rng);
        }
    }

    fn place_interactable<R: Rng + ?Sized>(
        &self,
        layout: &mut TerrainLayout,
        kind: InteractableKind,
        x: i32,
        z: i32,
        base: i32,
        rng: &mut R,
    ) {
        let item = InteractableItem {
            id: InteractableId { kind, x, z },
            kind,
            position: self.world_position(x, base, z),
            yaw: rng.gen_range(0.0..TAU),
        };
        layout.interactables.push(item);

        let poi = match kind {
            InteractableKind::Chest => PoiKind::Chest,
            InteractableKind::Mechanism => PoiKind::Mechanism,
        };
        self.mark(layout, x, z, poi, None);
    }

    fn mark(&self, layout: &mut TerrainLayout, x: i32, z: i32, kind: PoiKind, color: Option<[u8; 3]>) {
        layout.points_of_interest.push(MapPoint {
            x: x as f32 * self.config.block_size,
            z: z as f32 * self.config.block_size,
            kind,
            color,
        });
    }

    fn pick_color<R: Rng + ?Sized>(&self, rng: &mut R) -> [u8; 3] {
        let palette = &self.config.coral_palette;
        if palette.is_empty() {
            return [255, 255, 255];
        }
        palette[rng.gen_range(0..palette.len())]
    }

    fn block(&self, x: i32, layer: i32, z: i32) -> Placement {
        Placement {
            cell: IVec3::new(x, layer, z),
            position: self.world_position(x, layer, z),
            yaw: 0.0,
            scale: Vec3::ONE,
            color: None,
        }
    }

    fn world_position(&self, x: i32, layer: i32, z: i32) -> Vec3 {
        IVec3::new(x, layer, z).as_vec3() * self.config.block_size
    }

    /// Terraced floor layer: sum of a rolling and a ripple term, snapped to
    /// whole voxels.
    fn floor_layer(&self, fields: &Fields, x: i32, z: i32) -> i32 {
        let cfg = &self.config;
        let px = x as f32 * cfg.block_size + fields.offset_x;
        let pz = z as f32 * cfg.block_size + fields.offset_z;

        let rolling = (px * cfg.height_frequency).sin()
            * (pz * cfg.height_frequency).cos()
            * cfg.height_amplitude;
        let ripple = (px * cfg.detail_frequency_x + pz * cfg.detail_frequency_z).sin()
            * cfg.detail_amplitude;

        ((rolling + ripple) / cfg.block_size)
            .round()
            .clamp(-MAX_FLOOR_LAYERS, MAX_FLOOR_LAYERS) as i32
    }

    /// Vegetation density in [0, 1]
    fn vegetation_density(&self, fields: &Fields, x: i32, z: i32) -> f32 {
        let cfg = &self.config;
        // Swap the offsets so the density field is not aligned with the floor.
        let px = x as f32 * cfg.block_size + fields.offset_z;
        let pz = z as f32 * cfg.block_size + fields.offset_x;

        let v = (px * cfg.vegetation_frequency_x).sin() * (pz * cfg.vegetation_frequency_z).cos();
        (v * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}
