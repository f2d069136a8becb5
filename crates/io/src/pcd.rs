use crate::format::{channel_from_byte, channel_to_byte};
use crate::{IoError, Result};
use pointview_core::{Colors, PointCloud};
use std::fs;
use std::path::Path;

/// Reads a PCD file (ASCII or binary format).
///
/// Positions come from the `x`, `y`, `z` fields. Colors come from a packed
/// `rgb` or `rgba` field (bytes `0x00RRGGBB`, stored either as float bits or
/// as an unsigned integer) and are normalized to `[0, 1]`.
pub fn read_pcd(path: impl AsRef<Path>) -> Result<PointCloud> {
    let raw = fs::read(path)?;

    let data_offset = find_data_line_end(&raw)
        .ok_or_else(|| IoError::parse("PCD file missing DATA line"))?;
    let header_text = std::str::from_utf8(&raw[..data_offset])
        .map_err(|_| IoError::parse("PCD header is not valid UTF-8"))?;
    let header = PcdHeader::parse(header_text)?;
    let layout = FieldLayout::new(&header)?;

    match header.data {
        DataFormat::Ascii => read_pcd_ascii(&raw[data_offset..], &header, &layout),
        DataFormat::Binary => read_pcd_binary(&raw[data_offset..], &header, &layout),
    }
}

fn push_header(out: &mut String, cloud: &PointCloud, data: &str) {
    let colored = cloud.colors.is_some();
    out.push_str("# .PCD v0.7 - Point Cloud Data file format\n");
    out.push_str("VERSION 0.7\n");
    if colored {
        out.push_str("FIELDS x y z rgb\n");
        out.push_str("SIZE 4 4 4 4\n");
        out.push_str("TYPE F F F U\n");
        out.push_str("COUNT 1 1 1 1\n");
    } else {
        out.push_str("FIELDS x y z\n");
        out.push_str("SIZE 4 4 4\n");
        out.push_str("TYPE F F F\n");
        out.push_str("COUNT 1 1 1\n");
    }
    out.push_str(&format!("WIDTH {}\n", cloud.len()));
    out.push_str("HEIGHT 1\n");
    out.push_str("VIEWPOINT 0 0 0 1 0 0 0\n");
    out.push_str(&format!("POINTS {}\n", cloud.len()));
    out.push_str(&format!("DATA {}\n", data));
}

fn pack_rgb(rgb: [f32; 3]) -> u32 {
    let [r, g, b] = rgb.map(channel_to_byte);
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(packed: u32) -> [f32; 3] {
    [
        channel_from_byte(((packed >> 16) & 0xff) as f64),
        channel_from_byte(((packed >> 8) & 0xff) as f64),
        channel_from_byte((packed & 0xff) as f64),
    ]
}

/// Writes a PCD file in ASCII format.
pub fn write_pcd(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let mut out = String::new();
    push_header(&mut out, cloud, "ascii");

    for i in 0..cloud.len() {
        out.push_str(&format!("{} {} {}", cloud.x[i], cloud.y[i], cloud.z[i]));
        if let Some(rgb) = cloud.color(i) {
            out.push_str(&format!(" {}", pack_rgb(rgb)));
        }
        out.push('\n');
    }

    fs::write(path, out)?;
    Ok(())
}

/// Writes a PCD file in binary format.
pub fn write_pcd_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let mut header = String::new();
    push_header(&mut header, cloud, "binary");

    let header_bytes = header.as_bytes();
    let point_size = if cloud.colors.is_some() { 16 } else { 12 };
    let mut buf = Vec::with_capacity(header_bytes.len() + cloud.len() * point_size);
    buf.extend_from_slice(header_bytes);

    for i in 0..cloud.len() {
        buf.extend_from_slice(&cloud.x[i].to_le_bytes());
        buf.extend_from_slice(&cloud.y[i].to_le_bytes());
        buf.extend_from_slice(&cloud.z[i].to_le_bytes());
        if let Some(rgb) = cloud.color(i) {
            buf.extend_from_slice(&pack_rgb(rgb).to_le_bytes());
        }
    }

    fs::write(path, buf)?;
    Ok(())
}

// --- Internal helpers ---

#[derive(Debug, PartialEq)]
enum DataFormat {
    Ascii,
    Binary,
}

/// One declared field with its storage type.
#[derive(Debug, Clone)]
struct PcdField {
    name: String,
    size: usize,
    kind: char,
    count: usize,
}

impl PcdField {
    fn byte_len(&self) -> Option<usize> {
        self.size.checked_mul(self.count)
    }
}

#[derive(Debug)]
struct PcdHeader {
    fields: Vec<PcdField>,
    points: usize,
    data: DataFormat,
    header_lines: usize,
}

impl PcdHeader {
    fn parse(text: &str) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        let mut sizes: Option<Vec<usize>> = None;
        let mut kinds: Option<Vec<char>> = None;
        let mut counts: Option<Vec<usize>> = None;
        let mut width: Option<usize> = None;
        let mut height: usize = 1;
        let mut points: Option<usize> = None;
        let mut data = None;
        let mut header_lines = 0;

        for (i, line) in text.lines().enumerate() {
            let lineno = i + 1;
            header_lines = lineno;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            let values = &parts[1..];
            let numbers = |what: &str| -> Result<Vec<usize>> {
                values
                    .iter()
                    .map(|v| {
                        v.parse::<usize>()
                            .map_err(|e| IoError::at(lineno, format!("invalid {} value: {}", what, e)))
                    })
                    .collect()
            };
            let single = |what: &str| -> Result<usize> {
                numbers(what)?
                    .first()
                    .copied()
                    .ok_or_else(|| IoError::at(lineno, format!("{} has no value", what)))
            };

            match parts[0] {
                "VERSION" | "VIEWPOINT" => {}
                "FIELDS" => names = values.iter().map(|s| s.to_string()).collect(),
                "SIZE" => sizes = Some(numbers("SIZE")?),
                "COUNT" => counts = Some(numbers("COUNT")?),
                "TYPE" => {
                    let parsed = values
                        .iter()
                        .map(|v| match *v {
                            "F" | "U" | "I" => Ok(v.chars().next().unwrap_or('F')),
                            other => Err(IoError::at(lineno, format!("invalid TYPE {}", other))),
                        })
                        .collect::<Result<Vec<char>>>()?;
                    kinds = Some(parsed);
                }
                "WIDTH" => width = Some(single("WIDTH")?),
                "HEIGHT" => height = single("HEIGHT")?,
                "POINTS" => points = Some(single("POINTS")?),
                "DATA" => {
                    data = Some(match values.first().copied() {
                        Some("ascii") => DataFormat::Ascii,
                        Some("binary") => DataFormat::Binary,
                        other => {
                            return Err(IoError::at(
                                lineno,
                                format!("unsupported PCD DATA format: {}", other.unwrap_or("")),
                            ))
                        }
                    });
                }
                other => {
                    return Err(IoError::at(lineno, format!("unknown PCD header entry {}", other)))
                }
            }
        }

        if names.is_empty() {
            names = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        }
        let n = names.len();
        let sizes = sizes.unwrap_or_else(|| vec![4; n]);
        let kinds = kinds.unwrap_or_else(|| vec!['F'; n]);
        let counts = counts.unwrap_or_else(|| vec![1; n]);
        if sizes.len() != n || kinds.len() != n || counts.len() != n {
            return Err(IoError::parse(format!(
                "PCD header declares {} fields but {} sizes, {} types, {} counts",
                n,
                sizes.len(),
                kinds.len(),
                counts.len()
            )));
        }

        let fields = names
            .into_iter()
            .zip(sizes)
            .zip(kinds)
            .zip(counts)
            .map(|(((name, size), kind), count)| {
                let valid = match kind {
                    'F' => size == 4 || size == 8,
                    _ => matches!(size, 1 | 2 | 4 | 8),
                };
                if valid {
                    Ok(PcdField {
                        name,
                        size,
                        kind,
                        count,
                    })
                } else {
                    Err(IoError::parse(format!(
                        "unsupported PCD field {} with TYPE {} SIZE {}",
                        name, kind, size
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let points = match (points, width) {
            (Some(points), _) => points,
            (None, Some(w)) => w
                .checked_mul(height)
                .ok_or_else(|| IoError::parse("PCD WIDTH x HEIGHT overflows"))?,
            (None, None) => return Err(IoError::parse("PCD file missing POINTS/WIDTH header")),
        };
        let data = data.ok_or_else(|| IoError::parse("PCD file missing DATA line"))?;

        Ok(Self {
            fields,
            points,
            data,
            header_lines,
        })
    }
}

/// Positions of the fields we read, as indices into the header's field list.
struct FieldLayout {
    xyz: [usize; 3],
    rgb: Option<usize>,
}

impl FieldLayout {
    fn new(header: &PcdHeader) -> Result<Self> {
        let find = |name: &str| header.fields.iter().position(|f| f.name == name);
        let xyz = match (find("x"), find("y"), find("z")) {
            (Some(ix), Some(iy), Some(iz)) => [ix, iy, iz],
            _ => return Err(IoError::parse("PCD file missing x, y, z fields")),
        };
        let rgb = find("rgb").or_else(|| find("rgba"));
        for i in xyz.iter().chain(rgb.iter()) {
            let field = &header.fields[*i];
            if field.count == 0 {
                return Err(IoError::parse(format!("PCD field {} has COUNT 0", field.name)));
            }
        }
        if let Some(i) = rgb {
            if header.fields[i].size != 4 {
                return Err(IoError::parse("PCD rgb field must be 4 bytes"));
            }
        }
        Ok(Self { xyz, rgb })
    }
}

/// Finds the byte offset just past the newline ending the DATA line.
fn find_data_line_end(raw: &[u8]) -> Option<usize> {
    let data_marker = b"DATA";
    for i in 0..raw.len().saturating_sub(data_marker.len() - 1) {
        if (i == 0 || raw[i - 1] == b'\n') && raw[i..].starts_with(data_marker) {
            if let Some(offset) = raw[i..].iter().position(|&b| b == b'\n') {
                return Some(i + offset + 1);
            }
            return Some(raw.len());
        }
    }
    None
}

fn decode_le(bytes: &[u8], kind: char) -> f64 {
    macro_rules! le {
        ($t:ty, $n:expr) => {{
            let mut raw = [0u8; $n];
            raw.copy_from_slice(&bytes[..$n]);
            <$t>::from_le_bytes(raw) as f64
        }};
    }

    match (kind, bytes.len()) {
        ('F', 8) => le!(f64, 8),
        ('F', _) => le!(f32, 4),
        ('I', 1) => bytes[0] as i8 as f64,
        ('I', 2) => le!(i16, 2),
        ('I', 4) => le!(i32, 4),
        ('I', _) => le!(i64, 8),
        (_, 1) => bytes[0] as f64,
        (_, 2) => le!(u16, 2),
        (_, 4) => le!(u32, 4),
        _ => le!(u64, 8),
    }
}

fn build_cloud(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>, colors: Option<Colors>) -> Result<PointCloud> {
    let cloud = PointCloud::from_xyz(x, y, z);
    match colors {
        Some(colors) => cloud
            .with_colors(colors)
            .map_err(|e| IoError::parse(e.to_string())),
        None => Ok(cloud),
    }
}

fn read_pcd_ascii(body: &[u8], header: &PcdHeader, layout: &FieldLayout) -> Result<PointCloud> {
    let content = std::str::from_utf8(body)
        .map_err(|e| IoError::parse(format!("invalid UTF-8: {}", e)))?;

    // Column of the first element of each field within a row.
    let mut columns = Vec::with_capacity(header.fields.len());
    let mut total = 0usize;
    for field in &header.fields {
        columns.push(total);
        total = total
            .checked_add(field.count)
            .ok_or_else(|| IoError::parse("PCD COUNT total overflows"))?;
    }

    // One row per line at most.
    let capacity = header.points.min(content.lines().count());
    let mut x = Vec::with_capacity(capacity);
    let mut y = Vec::with_capacity(capacity);
    let mut z = Vec::with_capacity(capacity);
    let mut colors = layout.rgb.map(|_| Colors::with_capacity(capacity));

    for (i, line) in content.lines().enumerate() {
        let lineno = header.header_lines + i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if x.len() == header.points {
            return Err(IoError::at(
                lineno,
                format!("more rows than the {} declared POINTS", header.points),
            ));
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() != total {
            return Err(IoError::at(
                lineno,
                format!("expected {} fields, found {}", total, parts.len()),
            ));
        }

        let coord = |axis: usize| -> Result<f32> {
            let token = parts[columns[layout.xyz[axis]]];
            token
                .parse::<f32>()
                .map_err(|e| IoError::at(lineno, format!("failed to parse {:?}: {}", token, e)))
        };
        x.push(coord(0)?);
        y.push(coord(1)?);
        z.push(coord(2)?);

        if let (Some(colors), Some(field_idx)) = (colors.as_mut(), layout.rgb) {
            let token = parts[columns[field_idx]];
            let packed = if header.fields[field_idx].kind == 'F' {
                token.parse::<f32>().map(f32::to_bits).map_err(|e| e.to_string())
            } else {
                token.parse::<u32>().map_err(|e| e.to_string())
            }
            .map_err(|e| IoError::at(lineno, format!("failed to parse rgb {:?}: {}", token, e)))?;
            colors.push(unpack_rgb(packed));
        }
    }

    if x.len() != header.points {
        return Err(IoError::parse(format!(
            "expected {} points, found {}",
            header.points,
            x.len()
        )));
    }

    build_cloud(x, y, z, colors)
}

fn read_pcd_binary(body: &[u8], header: &PcdHeader, layout: &FieldLayout) -> Result<PointCloud> {
    let mut offsets = Vec::with_capacity(header.fields.len());
    let mut stride = 0usize;
    for field in &header.fields {
        offsets.push(stride);
        stride = field
            .byte_len()
            .and_then(|len| stride.checked_add(len))
            .ok_or_else(|| IoError::parse("PCD row size overflows"))?;
    }

    let expected_size = header
        .points
        .checked_mul(stride)
        .ok_or_else(|| IoError::parse("PCD POINTS x row size overflows"))?;
    if body.len() < expected_size {
        return Err(IoError::parse(format!(
            "binary PCD data too short: have {} bytes, expected {} ({} points x {} bytes)",
            body.len(),
            expected_size,
            header.points,
            stride
        )));
    }

    // Bounded by the body length checked above.
    let mut x = Vec::with_capacity(header.points);
    let mut y = Vec::with_capacity(header.points);
    let mut z = Vec::with_capacity(header.points);
    let mut colors = layout.rgb.map(|_| Colors::with_capacity(header.points));

    for row in body[..expected_size].chunks_exact(stride.max(1)) {
        let field_bytes = |idx: usize| {
            let field = &header.fields[idx];
            &row[offsets[idx]..offsets[idx] + field.size]
        };
        let coord = |axis: usize| {
            let idx = layout.xyz[axis];
            decode_le(field_bytes(idx), header.fields[idx].kind) as f32
        };
        x.push(coord(0));
        y.push(coord(1));
        z.push(coord(2));

        if let (Some(colors), Some(idx)) = (colors.as_mut(), layout.rgb) {
            let b = field_bytes(idx);
            colors.push(unpack_rgb(u32::from_le_bytes([b[0], b[1], b[2], b[3]])));
        }
    }

    build_cloud(x, y, z, colors)
}
