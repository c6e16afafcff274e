use crate::config::EngineConfig;
use crate::set::{MapKind, SetId, TextureSet};
use image::RgbaImage;
use tracing::debug;

/// Default filename prefix of the export contract.
pub const EXPORT_PREFIX: &str = "neurogen";

/// One planned export artifact: the contract filename and its pixels.
pub struct ExportFile {
    pub file_name: String,
    pub rgba: RgbaImage,
}

/// The fixed filename suffix for `kind`.
///
/// These suffixes are a wire contract: external authoring-tool integrations
/// rediscover a texture set purely by shared id and these values, with no
/// accompanying manifest. Renaming one silently breaks every consumer.
pub fn map_suffix(kind: MapKind) -> &'static str {
    match kind {
        MapKind::Albedo => "albedo",
        MapKind::Normal => "normal",
        MapKind::Roughness => "roughness",
        MapKind::Metallic => "metallic",
        MapKind::Occlusion => "occlusion",
        MapKind::Height => "height",
        MapKind::PackedMask => "HDRP_Mask",
    }
}

/// The map kind for a filename suffix, or `None` for suffixes this version
/// does not know. Unknown suffixes are ignorable by contract, never errors,
/// so the scheme can grow new map kinds.
pub fn suffix_kind(suffix: &str) -> Option<MapKind> {
    match suffix {
        "albedo" => Some(MapKind::Albedo),
        "normal" => Some(MapKind::Normal),
        "roughness" => Some(MapKind::Roughness),
        "metallic" => Some(MapKind::Metallic),
        "occlusion" => Some(MapKind::Occlusion),
        "height" => Some(MapKind::Height),
        "HDRP_Mask" => Some(MapKind::PackedMask),
        _ => None,
    }
}

/// Builds the contract filename `{prefix}_{id}_{suffix}.png`.
pub fn export_file_name(prefix: &str, id: &SetId, kind: MapKind) -> String {
    format!("{}_{}_{}.png", prefix, id, map_suffix(kind))
}

/// Parses a contract filename back into `(prefix, id, kind)`.
///
/// Returns `None` for non-PNG names, names with too few segments, and
/// unknown suffixes (which consumers must skip, not reject). The prefix is
/// returned rather than checked so a scanner can filter on whichever prefix
/// its sets were exported with.
pub fn parse_export_name(file_name: &str) -> Option<(&str, &str, MapKind)> {
    let stem = file_name.strip_suffix(".png")?;
    let mut parts = stem.splitn(3, '_');
    let prefix = parts.next().filter(|s| !s.is_empty())?;
    let id = parts.next().filter(|s| !s.is_empty())?;
    // The remainder may itself contain underscores (HDRP_Mask).
    let kind = suffix_kind(parts.next()?)?;
    Some((prefix, id, kind))
}

/// Projects the set's populated slots into named export artifacts.
///
/// Read-only: the set is never mutated. Absent and failed slots are
/// silently skipped, since a partial asset set is a valid intermediate
/// state. With `include_mask`, a mask map is packed fresh from the slots
/// as they are at this moment and appended (replacing any stored
/// packed-mask artifact in the plan); packing that fails for lack of
/// sources is skipped like any other absent slot.
pub fn plan_export(set: &TextureSet, cfg: &EngineConfig, include_mask: bool) -> Vec<ExportFile> {
    let mut files = Vec::new();
    for kind in [
        MapKind::Albedo,
        MapKind::Normal,
        MapKind::Roughness,
        MapKind::Metallic,
        MapKind::Occlusion,
        MapKind::Height,
    ] {
        if let Some(buffer) = set.map(kind) {
            files.push(ExportFile {
                file_name: export_file_name(&cfg.export_prefix, set.id(), kind),
                rgba: buffer.to_rgba8(),
            });
        }
    }

    let mask = if include_mask {
        match set.pack_mask(cfg) {
            Ok(buffer) => Some(buffer.to_rgba8()),
            Err(e) => {
                debug!(error = %e, "mask not packed, skipping");
                None
            }
        }
    } else {
        set.map(MapKind::PackedMask).map(|b| b.to_rgba8())
    };
    if let Some(rgba) = mask {
        files.push(ExportFile {
            file_name: export_file_name(&cfg.export_prefix, set.id(), MapKind::PackedMask),
            rgba,
        });
    }
    files
}
