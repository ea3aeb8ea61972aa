//! Integration tests for saving and loading parameter blocks through files.

use fscore::archive::{
    IArchive, OArchive, CID_LC_POINT, CID_PARAM, CID_PARAM_ID, CID_PARAM_TYPE, CID_PARAM_VALUE,
    LEGACY_VERSION_LIMIT,
};
use fscore::param::{
    CurveList, LoadCurve, ParamBlock, ParamContainer, ParamType, Parameter, CURVE_OBSOLETE_TAG,
};
use fscore::Error;
use glam::DVec3;

use tempfile::NamedTempFile;

/// Material-like schema with one parameter of every type.
fn material() -> ParamBlock {
    let mut b = ParamBlock::new();
    b.add(Parameter::float(1.0, "E").with_long_name("Young's modulus"));
    b.add(Parameter::float(0.3, "v"));
    b.add(Parameter::int(2, "order"));
    b.add(Parameter::choice(0, "formulation", "standard\0mixed\0"));
    b.add(Parameter::bool(true, "active"));
    b.add(Parameter::vec3(DVec3::Z, "fiber"));
    b.add(Parameter::string("steel", "label"));
    b.add(Parameter::math("2*t", "pressure"));
    b
}

#[test]
fn test_roundtrip_through_file() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let mut src = material();
    src.find_mut("E").unwrap().set_float(210e3).unwrap();
    src.find_mut("formulation").unwrap().set_int(1).unwrap();
    src.find_mut("fiber").unwrap().set_vec3(DVec3::new(1.0, 0.5, 0.0)).unwrap();
    src.find_mut("label").unwrap().set_string("aluminium").unwrap();
    src.find_mut("v")
        .unwrap()
        .set_load_curve(LoadCurve::from_points([(0.0, 0.0), (1.0, 0.3)]));

    {
        let mut ar = OArchive::new();
        src.save_params(&mut ar).expect("Failed to save");
        ar.write_file(path).expect("Failed to write archive");
    }

    let mut dst = material();
    let mut ar = IArchive::open(path).expect("Failed to open archive");
    assert!(!ar.is_legacy());
    dst.load_params(&mut ar).expect("Failed to load");

    assert_eq!(dst.find("E").unwrap().float_value(), Some(210e3));
    assert_eq!(dst.find("formulation").unwrap().int_value(), Some(1));
    assert_eq!(dst.find("formulation").unwrap().choice_label(), Some("mixed"));
    assert_eq!(dst.find("fiber").unwrap().vec3_value(), Some(DVec3::new(1.0, 0.5, 0.0)));
    assert_eq!(dst.find("label").unwrap().string_value(), Some("aluminium"));
    assert_eq!(dst.find("pressure").unwrap().math_string(), Some("2*t"));

    let lc = dst.find("v").unwrap().load_curve().expect("curve should survive");
    assert_eq!(lc.len(), 2);
    assert!((lc.value(0.5) - 0.15).abs() < 1e-12);

    // schema metadata is never persisted, so it stays as constructed
    assert_eq!(dst.find("E").unwrap().long_name(), "Young's modulus");
}

#[test]
fn test_unknown_top_level_chunks_are_skipped() {
    let mut ar = OArchive::new();
    ar.begin_chunk(0x7000).unwrap();
    ar.write(&42i32).unwrap();
    ar.end_chunk().unwrap();
    material().save(&mut ar).unwrap();
    ar.write_chunk(0x7001, &1.5f64).unwrap();

    let mut dst = material();
    dst.find_mut("order").unwrap().set_int(9).unwrap();
    let mut ar = IArchive::from_bytes(ar.finish().unwrap()).unwrap();
    dst.load(&mut ar).unwrap();
    assert_eq!(dst.find("order").unwrap().int_value(), Some(2));
}

/// Write a legacy parameter whose type is the retired curve tag.
fn write_obsolete_curve_param(ar: &mut OArchive, id: i32, points: &[(f64, f64)]) {
    ar.begin_chunk(CID_PARAM).unwrap();
    ar.write_chunk(CID_PARAM_ID, &id).unwrap();
    ar.write_chunk(CID_PARAM_TYPE, &CURVE_OBSOLETE_TAG).unwrap();
    ar.begin_chunk(CID_PARAM_VALUE).unwrap();
    for p in points {
        ar.write_chunk(CID_LC_POINT, p).unwrap();
    }
    ar.end_chunk().unwrap();
    ar.end_chunk().unwrap();
}

#[test]
fn test_obsolete_curve_type() {
    let mut ar = OArchive::with_version(LEGACY_VERSION_LIMIT - 1);
    write_obsolete_curve_param(&mut ar, 0, &[]);
    write_obsolete_curve_param(&mut ar, 1, &[(0.0, 1.0), (2.0, 3.0)]);

    let temp = NamedTempFile::new().unwrap();
    ar.write_file(temp.path()).unwrap();

    let mut dst = material();
    let mut ar = IArchive::open(temp.path()).unwrap();
    assert!(ar.is_legacy());
    dst.load(&mut ar).unwrap();

    let e = dst.by_id(0).unwrap();
    assert_eq!(e.param_type(), ParamType::Float);
    assert!(e.load_curve().is_none(), "empty obsolete curve must be dropped");

    let v = dst.by_id(1).unwrap();
    assert_eq!(v.param_type(), ParamType::Float);
    assert_eq!(v.load_curve().map(|lc| lc.len()), Some(2));
}

#[test]
fn test_legacy_loader_remaps_ids() {
    let mut old = ParamBlock::new();
    old.add(Parameter::float(7.0, "old_k"));
    let mut ar = OArchive::with_version(0x0001_0000);
    old.save(&mut ar).unwrap();

    let mut dst = material();
    let mut ar = IArchive::from_bytes(ar.finish().unwrap()).unwrap();
    // old id 0 became "v"
    dst.load_with(&mut ar, &mut |b: &mut ParamBlock, p: Parameter| {
        let v = p.float_value().unwrap_or_default();
        b.find_mut("v").unwrap().set_float(v)
    })
    .unwrap();

    assert_eq!(dst.find("v").unwrap().float_value(), Some(7.0));
    assert_eq!(dst.find("E").unwrap().float_value(), Some(1.0));
}

#[test]
fn test_truncated_file_fails() {
    let mut ar = OArchive::new();
    material().save(&mut ar).unwrap();
    let mut bytes = ar.finish().unwrap();
    bytes.truncate(bytes.len() - 3);

    let mut dst = material();
    let mut ar = IArchive::from_bytes(bytes).unwrap();
    let err = dst.load(&mut ar).unwrap_err();
    assert!(err.is_io_fault(), "unexpected error: {err}");
}

#[test]
fn test_bad_magic_and_missing_file() {
    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), b"NOPE\0\0\0\0").unwrap();
    assert!(matches!(IArchive::open(temp.path()), Err(Error::InvalidMagic)));

    let missing = temp.path().with_extension("missing");
    assert!(IArchive::open(&missing).is_err());
}

#[test]
fn test_curve_list_export_order() {
    let mut b = material();
    b.find_mut("pressure")
        .unwrap()
        .set_load_curve(LoadCurve::from_points([(0.0, 0.0), (1.0, 1.0)]));
    b.find_mut("E")
        .unwrap()
        .set_load_curve(LoadCurve::from_points([(0.0, 1.0)]));

    let mut list = CurveList::new();
    assert_eq!(list.register_block(&mut b), 2);
    // parameter order, not insertion order of the curves
    assert_eq!(b.find("E").unwrap().load_curve().unwrap().id(), 1);
    assert_eq!(b.find("pressure").unwrap().load_curve().unwrap().id(), 2);
    assert_eq!(list.get(1).unwrap().len(), 1);
}
