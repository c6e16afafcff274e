use neurogen_core::buffer::PixelBuffer;
use neurogen_core::config::EngineConfig;
use neurogen_core::export::{export_file_name, parse_export_name, plan_export};
use neurogen_core::normal::synthesize_normal_map;
use neurogen_core::set::{MapKind, SetId, TextureSet};

fn set_with_id(id: &str) -> TextureSet {
    let albedo = PixelBuffer::new(4, 4, [200, 180, 160, 255]).expect("buffer");
    TextureSet::new(SetId::new(id), albedo)
}

#[test]
fn populated_slots_export_exactly_their_contract_names() {
    let cfg = EngineConfig::default();
    let mut set = set_with_id("1700000000000");
    set.populate(MapKind::Normal, &cfg, |albedo| {
        synthesize_normal_map(albedo, 2.0)
    })
    .expect("populate");

    let files = plan_export(&set, &cfg, false);
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "neurogen_1700000000000_albedo.png",
            "neurogen_1700000000000_normal.png",
        ]
    );
}

#[test]
fn failed_and_absent_slots_are_silently_skipped() {
    let cfg = EngineConfig::default();
    let mut set = set_with_id("42");
    set.begin(MapKind::Roughness).expect("begin");
    set.fail(MapKind::Roughness, "no image").expect("fail");

    let files = plan_export(&set, &cfg, false);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "neurogen_42_albedo.png");
}

#[test]
fn requesting_a_mask_packs_from_the_slots_at_export_time() {
    let cfg = EngineConfig::builder().mask_dimensions(8, 8).build();
    let mut set = set_with_id("7");
    set.populate(MapKind::Metallic, &cfg, |_| {
        PixelBuffer::new(4, 4, [255, 0, 0, 255])
    })
    .expect("populate");

    let files = plan_export(&set, &cfg, true);
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "neurogen_7_albedo.png",
            "neurogen_7_metallic.png",
            "neurogen_7_HDRP_Mask.png",
        ]
    );
    let mask = &files[2].rgba;
    assert_eq!(mask.dimensions(), (8, 8));
    assert_eq!(mask.get_pixel(0, 0).0, [255, 255, 0, 255]);
}

#[test]
fn a_mask_without_sources_is_skipped_not_an_error() {
    let cfg = EngineConfig::default();
    let set = set_with_id("9");
    let files = plan_export(&set, &cfg, true);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "neurogen_9_albedo.png");
}

#[test]
fn export_is_a_read_only_projection() {
    let cfg = EngineConfig::builder().mask_dimensions(8, 8).build();
    let mut set = set_with_id("11");
    set.populate(MapKind::Metallic, &cfg, |_| {
        PixelBuffer::new(4, 4, [10, 0, 0, 255])
    })
    .expect("populate");

    let _ = plan_export(&set, &cfg, true);
    assert_eq!(set.status(MapKind::PackedMask), neurogen_core::set::SlotStatus::Empty);
}

#[test]
fn file_names_round_trip_through_the_parser() {
    let id = SetId::new("1700000000000");
    for kind in MapKind::ALL {
        let name = export_file_name("neurogen", &id, kind);
        let (prefix, parsed_id, parsed_kind) =
            parse_export_name(&name).expect("contract name parses");
        assert_eq!(prefix, "neurogen");
        assert_eq!(parsed_id, "1700000000000");
        assert_eq!(parsed_kind, kind);
    }
}

#[test]
fn the_packed_mask_suffix_keeps_its_underscore() {
    assert_eq!(
        export_file_name("neurogen", &SetId::new("5"), MapKind::PackedMask),
        "neurogen_5_HDRP_Mask.png"
    );
    assert_eq!(
        parse_export_name("neurogen_5_HDRP_Mask.png"),
        Some(("neurogen", "5", MapKind::PackedMask))
    );
}

#[test]
fn unknown_suffixes_and_foreign_files_are_ignorable() {
    // Future map kinds must be skippable, not errors.
    assert_eq!(parse_export_name("neurogen_123_emissive.png"), None);
    assert_eq!(parse_export_name("neurogen_123_albedo.jpg"), None);
    assert_eq!(parse_export_name("screenshot.png"), None);
    assert_eq!(parse_export_name("neurogen_.png"), None);
    // A different prefix still parses; the caller decides what to scan for.
    assert_eq!(
        parse_export_name("other_77_albedo.png"),
        Some(("other", "77", MapKind::Albedo))
    );
}
