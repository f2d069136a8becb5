use crate::format::{channel_from_byte, channel_to_byte};
use crate::{IoError, Result};
use pointview_core::{Colors, PointCloud};
use std::fs;
use std::path::Path;

const FIELDS_PER_ROW: usize = 6;

/// Reads whitespace separated `x y z r g b` rows.
///
/// Color values are on a 0-255 scale and are divided by 255, then clipped
/// into `[0, 1]`. Blank lines and `#` comments are skipped. Any row without
/// exactly six numeric fields fails the whole load.
pub fn read_xyzrgb(path: impl AsRef<Path>) -> Result<PointCloud> {
    let content = fs::read_to_string(path)?;
    parse_xyzrgb(&content)
}

pub(crate) fn parse_xyzrgb(content: &str) -> Result<PointCloud> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();
    let mut colors = Colors::default();

    for (i, line) in content.lines().enumerate() {
        let lineno = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut row = [0f64; FIELDS_PER_ROW];
        let mut count = 0usize;
        for token in trimmed.split_whitespace() {
            if count == FIELDS_PER_ROW {
                count += 1;
                break;
            }
            row[count] = token.parse::<f64>().map_err(|e| {
                IoError::at(lineno, format!("failed to parse {:?}: {}", token, e))
            })?;
            count += 1;
        }
        if count != FIELDS_PER_ROW {
            let found = trimmed.split_whitespace().count();
            return Err(IoError::at(
                lineno,
                format!("expected {} fields, found {}", FIELDS_PER_ROW, found),
            ));
        }

        x.push(row[0] as f32);
        y.push(row[1] as f32);
        z.push(row[2] as f32);
        colors.push([
            channel_from_byte(row[3]),
            channel_from_byte(row[4]),
            channel_from_byte(row[5]),
        ]);
    }

    PointCloud::from_xyz(x, y, z)
        .with_colors(colors)
        .map_err(|e| IoError::parse(e.to_string()))
}

/// Writes `x y z r g b` rows with colors scaled back to 0-255.
///
/// Clouds without colors are written white.
pub fn write_xyzrgb(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let mut out = String::with_capacity(cloud.len() * 32);
    for i in 0..cloud.len() {
        let [r, g, b] = cloud.color(i).unwrap_or([1.0; 3]).map(channel_to_byte);
        out.push_str(&format!(
            "{} {} {} {} {} {}\n",
            cloud.x[i], cloud.y[i], cloud.z[i], r, g, b
        ));
    }
    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_rows_and_normalizes_colors() {
        let cloud = parse_xyzrgb("0 0 0 255 0 0\n1.5 -2 3e1 0 51 255\n").unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(1), [1.5, -2.0, 30.0]);
        assert_eq!(cloud.color(0), Some([1.0, 0.0, 0.0]));
        assert_eq!(cloud.color(1), Some([0.0, 0.2, 1.0]));
    }

    #[test]
    fn out_of_range_colors_are_clipped() {
        let cloud = parse_xyzrgb("0 0 0 510 -20 127.5\n").unwrap();
        assert_eq!(cloud.color(0), Some([1.0, 0.0, 0.5]));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let cloud = parse_xyzrgb("# header\n\n1 2 3 0 0 0\n   \n").unwrap();
        assert_eq!(cloud.len(), 1);
    }

    #[test]
    fn empty_file_is_empty_cloud() {
        let cloud = parse_xyzrgb("").unwrap();
        assert!(cloud.is_empty());
        assert_eq!(cloud.colors.as_ref().map(|c| c.len()), Some(0));
    }

    #[test]
    fn rejects_wrong_field_count() {
        match parse_xyzrgb("1 2 3 4 5 6\n1 2 3 4 5\n") {
            Err(IoError::Parse { line, message }) => {
                assert_eq!(line, Some(2));
                assert!(message.contains("found 5"), "{}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        match parse_xyzrgb("1 2 3 4 5 6 7\n") {
            Err(IoError::Parse { message, .. }) => assert!(message.contains("found 7")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_numeric_field() {
        assert!(matches!(
            parse_xyzrgb("1 2 3 red 5 6\n"),
            Err(IoError::Parse { line: Some(1), .. })
        ));
    }

    #[test]
    fn write_then_read() {
        let cloud = PointCloud::from_points(&[[1.0, 2.0, 3.0]])
            .with_colors(Colors::from_rgb(&[[0.2, 0.4, 1.0]]))
            .unwrap();
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_xyzrgb(tmp.path(), &cloud).unwrap();
        let loaded = read_xyzrgb(tmp.path()).unwrap();
        assert_eq!(loaded, cloud);
    }

    proptest! {
        #[test]
        fn color_is_raw_over_255_clipped(
            raw in prop::collection::vec((-100.0f64..400.0, -100.0f64..400.0, -100.0f64..400.0), 1..100)
        ) {
            let text: String = raw
                .iter()
                .map(|(r, g, b)| format!("0 0 0 {} {} {}\n", r, g, b))
                .collect();
            let cloud = parse_xyzrgb(&text).unwrap();
            for (c, (r, g, b)) in cloud.colors.as_ref().unwrap().iter().zip(&raw) {
                let expect = [r, g, b].map(|v| (v / 255.0).clamp(0.0, 1.0) as f32);
                prop_assert_eq!(c, expect);
            }
        }
    }
}
