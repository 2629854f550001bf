use crate::{
    error::{FceError, FceResult},
    header::Header,
    layout::Table,
    version::FceVersion,
    warning::{Warning, Warnings},
};
use fcekit_mesh::{Vector3, MAX_COLORS, MAX_DUMMIES, MAX_PARTS};

/// Runs the full structural validation of an FCE buffer without building a mesh.
///
/// Every check runs; if any fails, the returned `FceError::Format` lists all of them.
/// On success the non-fatal findings are returned.
pub fn validate_fce(buf: &[u8]) -> FceResult<Warnings> {
    let header = Header::parse(buf)?;
    validate_header(&header, buf.len())
}

pub fn is_valid_fce(buf: &[u8]) -> bool {
    validate_fce(buf).is_ok()
}

/// Checks `header` against itself and against the size of the file it came from.
pub fn validate_header(header: &Header, file_size: usize) -> FceResult<Warnings> {
    let mut report = Report::default();
    let file_size = file_size as i64;
    let nv = i64::from(header.num_vertices);
    let nt = i64::from(header.num_triangles);

    if nt < 0 {
        report.error(format!("invalid number of triangles ({})", nt));
    }
    if nv < 0 {
        report.error(format!("invalid number of vertices ({})", nv));
    }
    check_count(&mut report, "dummies", header.num_dummies, MAX_DUMMIES);
    check_count(&mut report, "parts", header.num_parts, MAX_PARTS);
    match header.version {
        FceVersion::Fce3 => {
            check_count(&mut report, "primary colors", header.num_colors, MAX_COLORS);
            check_count(
                &mut report,
                "secondary colors",
                header.num_secondary_colors,
                MAX_COLORS,
            );
        }
        // FCE4M files in the wild carry arbitrary color counts.
        FceVersion::Fce4 => check_count(&mut report, "colors", header.num_colors, MAX_COLORS),
        FceVersion::Fce4M => {}
    }

    let (sum_v, sum_t) = check_part_counts(&mut report, header);
    let fce4m = header.version == FceVersion::Fce4M;
    let required = header.version.file_size_i64(sum_v, sum_t);
    match header.version {
        FceVersion::Fce3 => {
            if required > file_size {
                report.error(format!(
                    "parts need {} bytes, file has {}",
                    required, file_size
                ));
            }
        }
        FceVersion::Fce4 | FceVersion::Fce4M => {
            if required > file_size {
                check_trailing_slack(&mut report, header, required, file_size, "parts", |a, b| {
                    a > b
                });
            }
        }
    }

    check_part_ranges(&mut report, header, nv, nt);

    let header_size = header.version.header_size() as i64;
    match header.version {
        FceVersion::Fce3 => {
            let required = header.version.file_size_i64(nv, nt);
            if required != file_size {
                report.error(format!(
                    "file is {} bytes, counts require {}",
                    file_size, required
                ));
            }
            let mut dist_to_eof = 0;
            for table in Table::FCE3.into_iter().rev() {
                dist_to_eof += table.byte_len(false, nv, nt);
                check_offset(&mut report, header, table, file_size - header_size, dist_to_eof);
            }
        }
        FceVersion::Fce4 | FceVersion::Fce4M => {
            let required = header.version.file_size_i64(nv, nt);
            if required != file_size {
                check_trailing_slack(&mut report, header, required, file_size, "counts", |a, b| {
                    a != b
                });
            }

            let reserve5 = i64::from(header.offset(Table::Reserve5));
            let reserve6 = i64::from(header.offset(Table::Reserve6));
            if reserve5 > reserve6
                || header_size + reserve6 > file_size
                || header_size + reserve5 > file_size
            {
                report.error(format!(
                    "reserve5 offset {:#x} or reserve6 offset {:#x} out of bounds",
                    reserve5, reserve6
                ));
            }

            // The last two tables are unreliable in real files; mismatches only warn.
            let mut dist_to_eof = 0;
            for (table, offset) in [(Table::Reserve6, reserve6), (Table::Reserve5, reserve5)] {
                dist_to_eof += table.byte_len(fce4m, nv, nt);
                let expected = file_size - header_size - dist_to_eof;
                if offset < 0 || offset != expected {
                    report.warn(Warning::TrailingTableOffset {
                        table: table.name(),
                        offset,
                        expected,
                    });
                }
            }

            // Everything before reserve5 must line up exactly once the reserve area,
            // whatever its actual size, is set aside.
            let reserve_area = (file_size - header_size - reserve5).abs();
            let mut dist_to_eof = 0;
            for table in Table::FCE4[..12].iter().rev() {
                dist_to_eof += table.byte_len(fce4m, nv, nt);
                check_offset(
                    &mut report,
                    header,
                    *table,
                    file_size - header_size - reserve_area,
                    dist_to_eof,
                );
            }
        }
    }

    if report.errors.is_empty() {
        if nv != sum_v {
            report.warn(Warning::CountMismatch {
                what: "vertex",
                header: nv,
                parts: sum_v,
            });
        }
        if nt != sum_t {
            report.warn(Warning::CountMismatch {
                what: "triangle",
                header: nt,
                parts: sum_t,
            });
        }
    }
    if header.num_arts != 1 {
        report.warn(Warning::NumArts(header.num_arts));
    }
    if header.offset(Table::Vertices) != 0 {
        report.warn(Warning::VertexTableOffset(header.offset(Table::Vertices)));
    }
    if header.version == FceVersion::Fce3 && header.num_colors < header.num_secondary_colors {
        report.warn(Warning::FewerPrimaryColors {
            primary: header.num_colors,
            secondary: header.num_secondary_colors,
        });
    }
    if let Some(warning) = half_size_warning(header.half_size) {
        report.warn(warning);
    }

    log::debug!(
        "validated {} header: {} vertices, {} triangles, {} parts, {} errors, {} warnings",
        header.version,
        nv,
        nt,
        header.num_parts,
        report.errors.len(),
        report.warnings.len()
    );
    report.finish()
}

/// Half extents the game may choke on.
pub(crate) fn half_size_warning(half: Vector3) -> Option<Warning> {
    if half.x < 0.001 || half.z < 0.001 || half.x * half.z < 0.1 || half.y < 0.0 {
        Some(Warning::DegenerateHalfSize {
            x: half.x,
            y: half.y,
            z: half.z,
        })
    } else {
        None
    }
}

#[derive(Default)]
struct Report {
    errors: Vec<String>,
    warnings: Warnings,
}

impl Report {
    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    fn finish(self) -> FceResult<Warnings> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(FceError::format(self.errors.join("; ")))
        }
    }
}

fn check_count(report: &mut Report, what: &str, count: i32, max: usize) {
    if count < 0 || count as usize > max {
        report.error(format!("invalid number of {} ({})", what, count));
    }
}

/// Tallies per-part counts and checks them against the global counts.
fn check_part_counts(report: &mut Report, header: &Header) -> (i64, i64) {
    let nv = i64::from(header.num_vertices);
    let nt = i64::from(header.num_triangles);
    let mut sum_v = 0i64;
    let mut sum_t = 0i64;
    for (i, part) in header.part_ranges().iter().enumerate() {
        if part.num_vertices < 0 || part.num_triangles < 0 {
            report.error(format!(
                "part {} has negative counts ({} vertices, {} triangles)",
                i, part.num_vertices, part.num_triangles
            ));
        }
        if part.num_triangles > 0 && part.num_vertices < 3 {
            report.error(format!(
                "part {} has triangles but only {} vertices",
                i, part.num_vertices
            ));
        }
        sum_v += i64::from(part.num_vertices);
        sum_t += i64::from(part.num_triangles);
    }
    if nv < sum_v {
        report.error(format!("expects {} vertices, parts hold {}", nv, sum_v));
    }
    if nt < sum_t {
        report.error(format!("expects {} triangles, parts hold {}", nt, sum_t));
    }
    (sum_v, sum_t)
}

/// Part ranges must be in bounds and must not overlap the next part's range.
fn check_part_ranges(report: &mut Report, header: &Header, nv: i64, nt: i64) {
    let parts = header.part_ranges();
    for (i, part) in parts.iter().enumerate() {
        let next = parts.get(i + 1);
        let checks = [
            (
                "vertices",
                part.first_vertex,
                part.num_vertices,
                nv,
                next.map(|n| n.first_vertex),
            ),
            (
                "triangles",
                part.first_triangle,
                part.num_triangles,
                nt,
                next.map(|n| n.first_triangle),
            ),
        ];
        for (what, first, count, total, next_first) in checks {
            let end = i64::from(first) + i64::from(count);
            if first < 0 || end > total {
                report.error(format!("part {} out of bounds ({})", i, what));
                return;
            }
            if let Some(next_first) = next_first {
                if end > i64::from(next_first) {
                    report.error(format!("parts {} and {} overlap ({})", i, i + 1, what));
                    return;
                }
            }
        }
    }
}

fn check_offset(report: &mut Report, header: &Header, table: Table, data_len: i64, dist_to_eof: i64) {
    let offset = i64::from(header.offset(table));
    if offset < 0 || data_len - offset != dist_to_eof {
        report.error(format!(
            "{} offset {:#x} invalid (expects {:#x})",
            table.name(),
            offset,
            data_len - dist_to_eof
        ));
    }
}

/// FCE4 size checks tolerate a wrong size as long as the mismatch is confined to the
/// reserve5 and reserve6 tables.
fn check_trailing_slack(
    report: &mut Report,
    header: &Header,
    required: i64,
    file_size: i64,
    what: &str,
    fails: impl Fn(i64, i64) -> bool,
) {
    let nv = i64::from(header.num_vertices);
    let nt = i64::from(header.num_triangles);
    let fce4m = header.version == FceVersion::Fce4M;
    let reserve_len =
        Table::Reserve5.byte_len(fce4m, nv, nt) + Table::Reserve6.byte_len(fce4m, nv, nt);
    let reserve5 = i64::from(header.offset(Table::Reserve5));
    let until_reserve5 =
        file_size - (file_size - header.version.header_size() as i64 - reserve5).abs();
    if fails(required - reserve_len, until_reserve5) {
        report.error(format!(
            "file is {} bytes, {} require {}",
            file_size, what, required
        ));
    } else {
        report.warn(Warning::TrailingSize {
            required,
            actual: file_size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{fce3, fce4, FCE3_HEADER_SIZE, FCE4_HEADER_SIZE};
    use byteorder::{ByteOrder, LittleEndian};
    use fcekit_test_data::{Fixture, FixturePart};

    fn one_part() -> Fixture {
        Fixture::new(vec![FixturePart::diamond(":HB", [0.0, 0.5, 0.0])])
    }

    #[test]
    fn zero_buffer_is_valid() {
        let warnings = validate_fce(&[0u8; FCE3_HEADER_SIZE]).unwrap();
        // NumArts is 0 and HalfSize is degenerate.
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::DegenerateHalfSize { .. })));
        assert!(warnings.iter().any(|w| *w == Warning::NumArts(0)));
    }

    #[test]
    fn fixtures_are_valid() {
        assert!(is_valid_fce(&one_part().fce3().unwrap()));
        assert!(is_valid_fce(&one_part().fce4().unwrap()));
        assert!(is_valid_fce(&one_part().fce4m().unwrap()));
    }

    #[test]
    fn fce3_size_mismatch_is_fatal() {
        let mut buf = one_part().fce3().unwrap();
        buf.push(0);
        assert!(matches!(validate_fce(&buf), Err(FceError::Format { .. })));
    }

    #[test]
    fn fce3_offset_mismatch_is_fatal() {
        let mut buf = one_part().fce3().unwrap();
        LittleEndian::write_i32(&mut buf[fce3::TABLE_OFFSETS + 4..], 0);
        let err = validate_fce(&buf).unwrap_err().to_string();
        assert!(err.contains("normal table offset"), "{}", err);
    }

    #[test]
    fn all_problems_are_reported() {
        let mut buf = vec![0u8; FCE3_HEADER_SIZE];
        LittleEndian::write_i32(&mut buf[fce3::NUM_DUMMIES..], 17);
        LittleEndian::write_i32(&mut buf[fce3::NUM_PARTS..], -1);
        let err = validate_fce(&buf).unwrap_err().to_string();
        assert!(err.contains("dummies (17)"), "{}", err);
        assert!(err.contains("parts (-1)"), "{}", err);
    }

    #[test]
    fn overlapping_parts_are_rejected() {
        let mut buf = Fixture::new(vec![
            FixturePart::diamond(":HB", [0.0; 3]),
            FixturePart::diamond(":OT", [0.0; 3]),
        ])
        .fce3()
        .unwrap();
        // Second part starts inside the first.
        LittleEndian::write_i32(&mut buf[fce3::PART_FIRST_VERTICES + 4..], 3);
        let err = validate_fce(&buf).unwrap_err().to_string();
        assert!(err.contains("overlap"), "{}", err);
    }

    #[test]
    fn fce4_reserve_offsets_only_warn() {
        let mut buf = one_part().fce4().unwrap();
        let reserve6 = fce4::TABLE_OFFSETS + 4 * Table::Reserve6.index();
        let value = LittleEndian::read_i32(&buf[reserve6..]);
        LittleEndian::write_i32(&mut buf[reserve6..], value + 4);
        let warnings = validate_fce(&buf).unwrap();
        assert!(warnings.iter().any(|w| matches!(
            w,
            Warning::TrailingTableOffset {
                table: "reserve6 table",
                ..
            }
        )));
    }

    #[test]
    fn fce4_truncated_reserve_tables_only_warn() {
        let mut buf = one_part().fce4().unwrap();
        // Drop reserve6 and point it at the end of the file.
        let nt = 8;
        buf.truncate(buf.len() - 12 * nt);
        let reserve6 = fce4::TABLE_OFFSETS + 4 * Table::Reserve6.index();
        let data_len = (buf.len() - FCE4_HEADER_SIZE) as i32;
        LittleEndian::write_i32(&mut buf[reserve6..], data_len);
        let warnings = validate_fce(&buf).unwrap();
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::TrailingSize { .. })));
    }

    #[test]
    fn fce4_core_offset_mismatch_is_fatal() {
        let mut buf = one_part().fce4().unwrap();
        let animation = fce4::TABLE_OFFSETS + 4 * Table::Animation.index();
        LittleEndian::write_i32(&mut buf[animation..], 0);
        assert!(!is_valid_fce(&buf));
    }

    #[test]
    fn degenerate_half_size() {
        assert!(half_size_warning(Vector3::new(1.0, 0.5, 1.0)).is_none());
        assert!(half_size_warning(Vector3::new(1.0, -0.5, 1.0)).is_some());
        assert!(half_size_warning(Vector3::new(0.2, 0.5, 0.2)).is_some());
    }
}
