use fcekit_fce::{
    decode_fce, encode_fce, encode_fce_to_vec, fce_version, parse_fce, read_fce, write_fce,
    EncodeConfig, FceError, FceReader, FceVersion, FceWriter, Mesh, FCE3_HEADER_SIZE,
};
use fcekit_mesh::{ColorTable, Vector3};
use fcekit_test_data::{Fixture, FixturePart};
use float_eq::assert_float_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn body(names: &[&str]) -> Fixture {
    let parts = names
        .iter()
        .enumerate()
        .map(|(i, name)| FixturePart::diamond(name, [0.0, 0.5 + i as f32, -1.0]))
        .collect();
    let mut fixture = Fixture::new(parts);
    fixture.dummies = vec![
        (":HFLO".to_owned(), [0.5, 0.25, 2.0]),
        (":TRLN".to_owned(), [-0.5, 0.25, -2.0]),
    ];
    fixture.colors = vec![[10, 20, 30, 40], [200, 100, 50, 0]];
    fixture
}

fn reencode(buf: &[u8], version: FceVersion) -> anyhow::Result<Vec<u8>> {
    let mut mesh = parse_fce(buf)?;
    let (out, _) = encode_fce_to_vec(&mut mesh, version, &EncodeConfig::default())?;
    Ok(out)
}

#[test]
fn fce3_round_trip_is_byte_exact() -> anyhow::Result<()> {
    init_logging();
    let buf = body(&[":HB", ":OT", ":OL"]).fce3()?;
    assert_eq!(buf, reencode(&buf, FceVersion::Fce3)?);
    Ok(())
}

#[test]
fn fce4_round_trip_is_byte_exact() -> anyhow::Result<()> {
    init_logging();
    let buf = body(&[":HB", ":HLFW", ":HRRW"]).fce4()?;
    assert_eq!(FceVersion::Fce4, fce_version(&buf)?);
    assert_eq!(buf, reencode(&buf, FceVersion::Fce4)?);
    Ok(())
}

#[test]
fn fce4m_round_trip_is_byte_exact() -> anyhow::Result<()> {
    init_logging();
    let buf = body(&["body", "wheel"]).fce4m()?;
    assert_eq!(FceVersion::Fce4M, fce_version(&buf)?);
    assert_eq!(buf, reencode(&buf, FceVersion::Fce4M)?);
    Ok(())
}

#[test]
fn minimal_fce3_round_trip() -> anyhow::Result<()> {
    init_logging();
    let buf = vec![0u8; FCE3_HEADER_SIZE];
    let (mut mesh, _) = decode_fce(&buf)?;
    assert_eq!(0, mesh.num_parts());
    assert_eq!(0, mesh.num_triangles());
    assert_eq!(0, mesh.num_vertices());

    let mut out = vec![0xAAu8; FCE3_HEADER_SIZE];
    encode_fce(&mut mesh, FceVersion::Fce3, &EncodeConfig::default(), &mut out)?;
    // Counts are zero; NumArts comes back as 0, as read.
    assert!(out.iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn truncated_buffer_is_rejected() {
    init_logging();
    let buf = body(&[":HB"]).fce3().unwrap();
    assert!(matches!(
        parse_fce(&buf[..FCE3_HEADER_SIZE - 4]),
        Err(FceError::Format { .. })
    ));
    assert!(matches!(
        parse_fce(&buf[..buf.len() - 1]),
        Err(FceError::Format { .. })
    ));
}

#[test]
fn decoded_fields_match_fixture() -> anyhow::Result<()> {
    init_logging();
    let fixture = body(&[":HB", ":OT"]);
    let mesh = parse_fce(&fixture.fce4()?)?;

    assert_eq!(2, mesh.num_parts());
    assert_eq!(12, mesh.num_vertices());
    assert_eq!(16, mesh.num_triangles());
    let names: Vec<_> = mesh.parts().map(|p| p.name().to_owned()).collect();
    assert_eq!(vec![":HB", ":OT"], names);
    assert_eq!(
        Vector3::new(0.0, 1.5, -1.0),
        mesh.part(1)?.position()
    );
    assert_eq!(":TRLN", mesh.dummies()[1].name);
    assert_eq!(2, mesh.colors(ColorTable::Interior).len());
    assert_eq!(200, mesh.colors(ColorTable::Driver)[1].hue);
    assert_eq!(vec![0x2, 0x2, 0x2, 0x2, 0, 0, 0, 0], mesh.part_triangle_flags(0)?);
    Ok(())
}

#[test]
fn edits_survive_encoding() -> anyhow::Result<()> {
    init_logging();
    let mut mesh = parse_fce(&body(&[":HB", ":OT", ":OL"]).fce3()?)?;
    mesh.delete_part(1)?;
    mesh.delete_part_triangles(0, &[0, 1])?;
    mesh.delete_unreferenced_vertices()?;
    let merged = mesh.merge_parts_to_new(0, 1)?;
    mesh.set_part_name(merged, ":HB merged")?;

    let (buf, _) = encode_fce_to_vec(&mut mesh, FceVersion::Fce3, &EncodeConfig::default())?;
    let decoded = parse_fce(&buf)?;
    assert_eq!(mesh.num_parts(), decoded.num_parts());
    assert_eq!(mesh.num_vertices(), decoded.num_vertices());
    assert_eq!(mesh.num_triangles(), decoded.num_triangles());
    assert_eq!(":HB merged", decoded.part(merged)?.name());
    assert_eq!(
        mesh.part_triangle_vertex_orders(0)?,
        decoded.part_triangle_vertex_orders(0)?
    );
    assert!(decoded.is_valid());
    Ok(())
}

#[test]
fn fce3_to_fce4_keeps_geometry() -> anyhow::Result<()> {
    init_logging();
    let mut mesh = parse_fce(&body(&[":HB"]).fce3()?)?;
    let (buf, _) = encode_fce_to_vec(&mut mesh, FceVersion::Fce4, &EncodeConfig::default())?;
    let converted = parse_fce(&buf)?;
    assert_eq!(
        mesh.part_vertex_positions(0)?,
        converted.part_vertex_positions(0)?
    );
    let (_, v) = mesh.part_triangle_tex_coords(0)?[0];
    let (_, converted_v) = converted.part_triangle_tex_coords(0)?[0];
    for (a, b) in v.iter().zip(converted_v.iter()) {
        assert_float_eq!(*a, *b, abs <= 1e-6);
    }
    Ok(())
}

#[test]
fn files_and_streams() -> anyhow::Result<()> {
    init_logging();
    let mut mesh = parse_fce(&body(&[":HB", ":OT"]).fce4()?)?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("car.fce");
    write_fce(&path, &mut mesh, FceVersion::Fce4, &EncodeConfig::default())?;
    let from_file = read_fce(&path)?;
    assert_eq!(mesh, from_file);

    let mut bytes = Vec::new();
    bytes.write_fce(&mut mesh, FceVersion::Fce4M, &EncodeConfig::default())?;
    let from_stream = std::io::Cursor::new(bytes).read_fce()?;
    assert_eq!(mesh.num_vertices(), from_stream.num_vertices());
    Ok(())
}

#[test]
fn helper_part_encodes() -> anyhow::Result<()> {
    init_logging();
    let mut mesh = Mesh::new();
    mesh.add_helper_part(":HB", Vector3::new(0.0, 0.5, 0.0))?;
    let (buf, warnings) =
        encode_fce_to_vec(&mut mesh, FceVersion::Fce3, &EncodeConfig::default())?;
    assert!(warnings.is_empty());
    let (decoded, warnings) = decode_fce(&buf)?;
    assert!(warnings.is_empty());
    assert_eq!(1, decoded.num_parts());
    assert_eq!(8, decoded.num_triangles());
    Ok(())
}
