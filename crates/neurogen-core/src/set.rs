use crate::buffer::PixelBuffer;
use crate::config::EngineConfig;
use crate::error::{NeuroGenError, Result};
use crate::mask::{self, MaskSources};
use crate::source::MapSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// The kinds of map a texture set can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapKind {
    Albedo,
    Normal,
    Roughness,
    Metallic,
    Occlusion,
    Height,
    PackedMask,
}

impl MapKind {
    /// Every kind, in export order.
    pub const ALL: [MapKind; 7] = [
        MapKind::Albedo,
        MapKind::Normal,
        MapKind::Roughness,
        MapKind::Metallic,
        MapKind::Occlusion,
        MapKind::Height,
        MapKind::PackedMask,
    ];

    /// Kinds derived from the base image and populated independently.
    pub const DERIVED: [MapKind; 5] = [
        MapKind::Normal,
        MapKind::Roughness,
        MapKind::Metallic,
        MapKind::Occlusion,
        MapKind::Height,
    ];
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MapKind::Albedo => "albedo",
            MapKind::Normal => "normal",
            MapKind::Roughness => "roughness",
            MapKind::Metallic => "metallic",
            MapKind::Occlusion => "occlusion",
            MapKind::Height => "height",
            MapKind::PackedMask => "packed-mask",
        };
        f.write_str(s)
    }
}

/// Externally observable state of one map slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    Pending,
    Ready,
    Failed,
}

/// One map slot: `Empty -> Pending -> Ready` on success, or
/// `Empty -> Pending -> Failed` on error. `Failed` keeps the reason for
/// reporting but behaves like `Empty` for retry purposes.
#[derive(Debug, Clone, Default)]
pub enum SlotState {
    #[default]
    Empty,
    Pending,
    Ready(PixelBuffer),
    Failed(String),
}

impl SlotState {
    pub fn status(&self) -> SlotStatus {
        match self {
            SlotState::Empty => SlotStatus::Empty,
            SlotState::Pending => SlotStatus::Pending,
            SlotState::Ready(_) => SlotStatus::Ready,
            SlotState::Failed(_) => SlotStatus::Failed,
        }
    }

    pub fn ready(&self) -> Option<&PixelBuffer> {
        match self {
            SlotState::Ready(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            SlotState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Opaque, stable identifier of one texture set. External tooling
/// rediscovers related files purely by this token plus fixed suffixes, so
/// it must not collide within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetId(String);

impl SetId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues millisecond-timestamp identifiers, bumped monotonically so two
/// allocations in the same millisecond never collide. Caller-owned; the
/// engine holds no process-wide state.
#[derive(Debug, Default)]
pub struct SetIdAllocator {
    last: u64,
}

impl SetIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> SetId {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let token = now_ms.max(self.last + 1);
        self.last = token;
        SetId(token.to_string())
    }
}

/// One logical material: a base (albedo) image plus independently populated
/// derived-map slots.
///
/// The albedo is supplied at construction (`Empty -> Ready` with no pending
/// state) and is immutable for the lifetime of the set; every derived map
/// completed into the set is resampled to the albedo's dimensions. Slots
/// are independent: one slot failing or being cleared never affects its
/// siblings. Starting a new material means discarding the whole set and
/// creating a fresh one; no history is kept.
#[derive(Debug, Clone)]
pub struct TextureSet {
    id: SetId,
    albedo: PixelBuffer,
    normal: SlotState,
    roughness: SlotState,
    metallic: SlotState,
    occlusion: SlotState,
    height: SlotState,
    packed_mask: SlotState,
}

impl TextureSet {
    pub fn new(id: SetId, albedo: PixelBuffer) -> Self {
        Self {
            id,
            albedo,
            normal: SlotState::Empty,
            roughness: SlotState::Empty,
            metallic: SlotState::Empty,
            occlusion: SlotState::Empty,
            height: SlotState::Empty,
            packed_mask: SlotState::Empty,
        }
    }

    pub fn id(&self) -> &SetId {
        &self.id
    }

    pub fn albedo(&self) -> &PixelBuffer {
        &self.albedo
    }

    /// Dimensions shared by the albedo and every completed derived map.
    pub fn dimensions(&self) -> (u32, u32) {
        self.albedo.dimensions()
    }

    fn slot(&self, kind: MapKind) -> Option<&SlotState> {
        match kind {
            MapKind::Albedo => None,
            MapKind::Normal => Some(&self.normal),
            MapKind::Roughness => Some(&self.roughness),
            MapKind::Metallic => Some(&self.metallic),
            MapKind::Occlusion => Some(&self.occlusion),
            MapKind::Height => Some(&self.height),
            MapKind::PackedMask => Some(&self.packed_mask),
        }
    }

    fn slot_mut(&mut self, kind: MapKind) -> Result<&mut SlotState> {
        match kind {
            MapKind::Albedo => Err(NeuroGenError::InvalidParameter(
                "albedo is supplied at creation and immutable".into(),
            )),
            MapKind::Normal => Ok(&mut self.normal),
            MapKind::Roughness => Ok(&mut self.roughness),
            MapKind::Metallic => Ok(&mut self.metallic),
            MapKind::Occlusion => Ok(&mut self.occlusion),
            MapKind::Height => Ok(&mut self.height),
            MapKind::PackedMask => Ok(&mut self.packed_mask),
        }
    }

    pub fn status(&self, kind: MapKind) -> SlotStatus {
        match self.slot(kind) {
            None => SlotStatus::Ready,
            Some(slot) => slot.status(),
        }
    }

    /// The map stored in `kind`, if ready.
    pub fn map(&self, kind: MapKind) -> Option<&PixelBuffer> {
        match self.slot(kind) {
            None => Some(&self.albedo),
            Some(slot) => slot.ready(),
        }
    }

    /// The recorded failure reason, if the slot's last generation failed.
    pub fn failure(&self, kind: MapKind) -> Option<&str> {
        self.slot(kind).and_then(|slot| slot.failure())
    }

    /// Marks `kind` as having a generation in flight.
    ///
    /// Allowed from `Empty`, `Failed` (retry), or `Ready` (regeneration);
    /// refused with `SlotBusy` while a generation is already pending, since
    /// a slot may only be written by the operation that is pending for it.
    pub fn begin(&mut self, kind: MapKind) -> Result<()> {
        let slot = self.slot_mut(kind)?;
        if matches!(slot, SlotState::Pending) {
            return Err(NeuroGenError::SlotBusy(kind));
        }
        *slot = SlotState::Pending;
        Ok(())
    }

    /// Completes the pending generation for `kind` with `buffer`.
    ///
    /// Derived maps are resampled to the albedo's dimensions; a packed mask
    /// keeps its own fixed resolution.
    pub fn complete(&mut self, kind: MapKind, buffer: PixelBuffer, cfg: &EngineConfig) -> Result<()> {
        let (width, height) = self.albedo.dimensions();
        let stored = if kind == MapKind::PackedMask {
            buffer
        } else {
            buffer.resample(width, height, cfg.filter)?
        };
        let slot = self.slot_mut(kind)?;
        if !matches!(slot, SlotState::Pending) {
            return Err(NeuroGenError::InvalidParameter(format!(
                "no generation pending for slot {kind}"
            )));
        }
        *slot = SlotState::Ready(stored);
        Ok(())
    }

    /// Records the pending generation for `kind` as failed. The slot stays
    /// retryable; siblings are untouched.
    pub fn fail(&mut self, kind: MapKind, reason: impl Into<String>) -> Result<()> {
        let reason = reason.into();
        let slot = self.slot_mut(kind)?;
        if !matches!(slot, SlotState::Pending) {
            return Err(NeuroGenError::InvalidParameter(format!(
                "no generation pending for slot {kind}"
            )));
        }
        warn!(kind = %kind, reason = %reason, "map generation failed");
        *slot = SlotState::Failed(reason);
        Ok(())
    }

    /// Clears `kind` back to `Empty`. Refused for the albedo and for slots
    /// with a generation still pending.
    pub fn clear(&mut self, kind: MapKind) -> Result<()> {
        let slot = self.slot_mut(kind)?;
        if matches!(slot, SlotState::Pending) {
            return Err(NeuroGenError::SlotBusy(kind));
        }
        *slot = SlotState::Empty;
        Ok(())
    }

    /// Runs `produce` against the albedo and records the outcome in `kind`:
    /// `Ready` on success, `Failed` (with the error text) otherwise.
    ///
    /// Producer errors are absorbed into the slot state rather than
    /// propagated; the returned status tells the caller which way it went.
    /// Only slot-discipline violations (busy slot, albedo) error out.
    pub fn populate<F>(&mut self, kind: MapKind, cfg: &EngineConfig, produce: F) -> Result<SlotStatus>
    where
        F: FnOnce(&PixelBuffer) -> Result<PixelBuffer>,
    {
        self.begin(kind)?;
        let produced = produce(&self.albedo);
        match produced {
            Ok(buffer) => self.complete(kind, buffer, cfg)?,
            Err(e) => self.fail(kind, e.to_string())?,
        }
        Ok(self.status(kind))
    }

    /// [`TextureSet::populate`] driven by an external map producer.
    pub fn populate_from(
        &mut self,
        kind: MapKind,
        source: &dyn MapSource,
        cfg: &EngineConfig,
    ) -> Result<SlotStatus> {
        self.populate(kind, cfg, |albedo| source.produce(albedo, kind))
    }

    /// The currently ready metallic/occlusion/roughness maps, as packer
    /// inputs.
    pub fn mask_sources(&self) -> MaskSources<'_> {
        MaskSources {
            metallic: self.map(MapKind::Metallic),
            occlusion: self.map(MapKind::Occlusion),
            roughness: self.map(MapKind::Roughness),
        }
    }

    /// Packs a mask map from the slots that are ready right now. Pure: the
    /// set is not modified, and the result reflects slot contents at call
    /// time.
    pub fn pack_mask(&self, cfg: &EngineConfig) -> Result<PixelBuffer> {
        mask::pack_mask_map(
            &self.mask_sources(),
            cfg.mask_width,
            cfg.mask_height,
            cfg.filter,
        )
    }

    /// Regenerates the stored packed-mask slot from the current source
    /// slots. The stored artifact is never edited in place, and later
    /// deletion of a source slot does not retroactively invalidate it.
    pub fn repack_mask(&mut self, cfg: &EngineConfig) -> Result<()> {
        if matches!(self.packed_mask, SlotState::Pending) {
            return Err(NeuroGenError::SlotBusy(MapKind::PackedMask));
        }
        let mask = self.pack_mask(cfg)?;
        self.packed_mask = SlotState::Ready(mask);
        Ok(())
    }
}
