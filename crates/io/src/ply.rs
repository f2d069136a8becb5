use crate::format::channel_to_byte;
use crate::{IoError, Result};
use pointview_core::{Colors, PointCloud};
use std::fs;
use std::io::{BufWriter, Write as _};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

/// Scalar type as declared in the PLY header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => ScalarType::I8,
            "uchar" | "uint8" => ScalarType::U8,
            "short" | "int16" => ScalarType::I16,
            "ushort" | "uint16" => ScalarType::U16,
            "int" | "int32" => ScalarType::I32,
            "uint" | "uint32" => ScalarType::U32,
            "float" | "float32" => ScalarType::F32,
            "double" | "float64" => ScalarType::F64,
            _ => return None,
        })
    }

    fn byte_size(self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }

    /// Divisor mapping a stored color value onto `[0, 1]`.
    fn color_scale(self) -> f64 {
        match self {
            ScalarType::F32 | ScalarType::F64 => 1.0,
            ScalarType::I16 | ScalarType::U16 => 65535.0,
            _ => 255.0,
        }
    }

    /// Decodes one value; `b` must hold at least `byte_size()` bytes.
    fn read(self, b: &[u8], big_endian: bool) -> f64 {
        macro_rules! decode {
            ($t:ty, $n:expr) => {{
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&b[..$n]);
                if big_endian {
                    <$t>::from_be_bytes(raw) as f64
                } else {
                    <$t>::from_le_bytes(raw) as f64
                }
            }};
        }

        match self {
            ScalarType::I8 => b[0] as i8 as f64,
            ScalarType::U8 => b[0] as f64,
            ScalarType::I16 => decode!(i16, 2),
            ScalarType::U16 => decode!(u16, 2),
            ScalarType::I32 => decode!(i32, 4),
            ScalarType::U32 => decode!(u32, 4),
            ScalarType::F32 => decode!(f32, 4),
            ScalarType::F64 => decode!(f64, 8),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PropKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone)]
struct PlyProperty {
    name: String,
    kind: PropKind,
}

#[derive(Debug, Clone)]
struct PlyElement {
    name: String,
    count: usize,
    properties: Vec<PlyProperty>,
}

/// Parsed header information.
struct PlyHeader {
    format: PlyFormat,
    elements: Vec<PlyElement>,
    header_lines: usize,
    body_offset: usize, // byte offset just after the end_header line
}

/// Where the vertex attributes we keep live inside a vertex row.
struct VertexLayout {
    xyz: [usize; 3],
    color: Option<([usize; 3], [f64; 3])>,
}

impl VertexLayout {
    fn new(vertex: &PlyElement) -> Result<Self> {
        let scalar = |name: &str| {
            vertex
                .properties
                .iter()
                .position(|p| p.name == name && matches!(p.kind, PropKind::Scalar(_)))
        };

        let xyz = match (scalar("x"), scalar("y"), scalar("z")) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => {
                return Err(IoError::parse(
                    "PLY vertex element missing required x, y, z properties",
                ))
            }
        };

        let channels = match (scalar("red"), scalar("green"), scalar("blue")) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            _ => match (scalar("r"), scalar("g"), scalar("b")) {
                (Some(r), Some(g), Some(b)) => Some([r, g, b]),
                _ => None,
            },
        };

        let color = channels.map(|idx| {
            let scale = idx.map(|i| match vertex.properties[i].kind {
                PropKind::Scalar(t) => t.color_scale(),
                PropKind::List { .. } => 255.0,
            });
            (idx, scale)
        });

        Ok(Self { xyz, color })
    }
}

fn parse_ply_header(data: &[u8]) -> Result<PlyHeader> {
    let marker = b"end_header";
    let header_end = find_bytes(data, marker)
        .ok_or_else(|| IoError::parse("missing end_header in PLY file"))?;
    let body_offset = data[header_end..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| header_end + p + 1)
        .unwrap_or(data.len());

    let header_text = std::str::from_utf8(&data[..header_end])
        .map_err(|_| IoError::parse("PLY header not valid UTF-8"))?;

    let mut format = None;
    let mut elements: Vec<PlyElement> = Vec::new();
    let mut seen_ply_magic = false;
    let mut header_lines = 1; // the end_header line itself

    for (i, raw_line) in header_text.lines().enumerate() {
        let lineno = i + 1;
        header_lines += 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if !seen_ply_magic {
            if line == "ply" {
                seen_ply_magic = true;
                continue;
            }
            return Err(IoError::at(lineno, "file does not start with 'ply'"));
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "format" => {
                format = Some(match parts.get(1).copied() {
                    Some("ascii") => PlyFormat::Ascii,
                    Some("binary_little_endian") => PlyFormat::BinaryLittleEndian,
                    Some("binary_big_endian") => PlyFormat::BinaryBigEndian,
                    _ => {
                        return Err(IoError::at(
                            lineno,
                            format!("unsupported PLY format: {}", line),
                        ))
                    }
                });
            }
            "element" => {
                if parts.len() < 3 {
                    return Err(IoError::at(lineno, "invalid element line"));
                }
                let count = parts[2].parse::<usize>().map_err(|e| {
                    IoError::at(lineno, format!("invalid element count: {}", e))
                })?;
                elements.push(PlyElement {
                    name: parts[1].to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            "property" => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| IoError::at(lineno, "property declared before any element"))?;
                let kind_of = |name: &str| {
                    ScalarType::parse(name).ok_or_else(|| {
                        IoError::at(lineno, format!("unsupported property type: {}", name))
                    })
                };
                let property = if parts.get(1) == Some(&"list") {
                    if parts.len() < 5 {
                        return Err(IoError::at(lineno, "invalid list property line"));
                    }
                    PlyProperty {
                        name: parts[4].to_string(),
                        kind: PropKind::List {
                            count: kind_of(parts[2])?,
                            item: kind_of(parts[3])?,
                        },
                    }
                } else {
                    if parts.len() < 3 {
                        return Err(IoError::at(lineno, "invalid property line"));
                    }
                    PlyProperty {
                        name: parts[2].to_string(),
                        kind: PropKind::Scalar(kind_of(parts[1])?),
                    }
                };
                element.properties.push(property);
            }
            "comment" | "obj_info" => {}
            other => {
                return Err(IoError::at(
                    lineno,
                    format!("unexpected PLY header keyword: {}", other),
                ))
            }
        }
    }

    if !seen_ply_magic {
        return Err(IoError::parse("file does not start with 'ply'"));
    }
    let format = format.ok_or_else(|| IoError::parse("PLY format line missing"))?;

    Ok(PlyHeader {
        format,
        elements,
        header_lines,
        body_offset,
    })
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Reads the vertex element of a PLY file into a cloud.
///
/// Colors stored as integers are normalized by their type range (255 for
/// bytes); float colors are taken as-is. Every color channel ends up clamped
/// into `[0, 1]`.
pub fn read_ply(path: impl AsRef<Path>) -> Result<PointCloud> {
    let data = fs::read(&path)?;
    let header = parse_ply_header(&data)?;

    let vertex_pos = header
        .elements
        .iter()
        .position(|e| e.name == "vertex")
        .ok_or_else(|| IoError::parse("PLY file has no vertex element"))?;
    let layout = VertexLayout::new(&header.elements[vertex_pos])?;

    let body = &data[header.body_offset..];
    // Every vertex takes at least one body byte, so the header count alone
    // never drives the allocation.
    let capacity = header.elements[vertex_pos].count.min(body.len());
    let mut sink = VertexSink::new(capacity, layout);

    match header.format {
        PlyFormat::Ascii => read_ascii_body(body, &header, vertex_pos, &mut sink)?,
        PlyFormat::BinaryLittleEndian => read_binary_body(body, &header, vertex_pos, false, &mut sink)?,
        PlyFormat::BinaryBigEndian => read_binary_body(body, &header, vertex_pos, true, &mut sink)?,
    }

    sink.finish()
}

/// Collects vertex rows into columns.
struct VertexSink {
    layout: VertexLayout,
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    colors: Option<Colors>,
}

impl VertexSink {
    fn new(capacity: usize, layout: VertexLayout) -> Self {
        let colors = layout.color.map(|_| Colors::with_capacity(capacity));
        Self {
            layout,
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            colors,
        }
    }

    fn push(&mut self, row: &[f64]) {
        let [ix, iy, iz] = self.layout.xyz;
        self.x.push(row[ix] as f32);
        self.y.push(row[iy] as f32);
        self.z.push(row[iz] as f32);

        if let (Some(colors), Some((idx, scale))) = (self.colors.as_mut(), self.layout.color) {
            colors.push([
                (row[idx[0]] / scale[0]) as f32,
                (row[idx[1]] / scale[1]) as f32,
                (row[idx[2]] / scale[2]) as f32,
            ]);
        }
    }

    fn finish(self) -> Result<PointCloud> {
        let cloud = PointCloud::from_xyz(self.x, self.y, self.z);
        match self.colors {
            Some(colors) => cloud
                .with_colors(colors)
                .map_err(|e| IoError::parse(e.to_string())),
            None => Ok(cloud),
        }
    }
}

fn read_ascii_body(
    body: &[u8],
    header: &PlyHeader,
    vertex_pos: usize,
    sink: &mut VertexSink,
) -> Result<()> {
    let text =
        std::str::from_utf8(body).map_err(|_| IoError::parse("PLY body not valid UTF-8"))?;
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (header.header_lines + i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let mut row = Vec::new();
    for element in &header.elements[..=vertex_pos] {
        let is_vertex = element.name == "vertex";
        for read in 0..element.count {
            let (lineno, line) = lines.next().ok_or_else(|| {
                IoError::parse(format!(
                    "expected {} {} rows, found {}",
                    element.count, element.name, read
                ))
            })?;
            if !is_vertex {
                continue;
            }

            row.clear();
            let mut tokens = line.split_whitespace();
            let mut next_value = |what: &str| -> Result<f64> {
                let token = tokens
                    .next()
                    .ok_or_else(|| IoError::at(lineno, format!("missing value for {}", what)))?;
                token.parse::<f64>().map_err(|e| {
                    IoError::at(lineno, format!("failed to parse {} {:?}: {}", what, token, e))
                })
            };

            for prop in &element.properties {
                match prop.kind {
                    PropKind::Scalar(_) => row.push(next_value(&prop.name)?),
                    PropKind::List { .. } => {
                        let n = next_value(&prop.name)?;
                        if !(n >= 0.0 && n.fract() == 0.0) {
                            return Err(IoError::at(lineno, format!("invalid list length {}", n)));
                        }
                        for _ in 0..n as usize {
                            next_value(&prop.name)?;
                        }
                        row.push(f64::NAN);
                    }
                }
            }

            if tokens.next().is_some() {
                return Err(IoError::at(
                    lineno,
                    format!(
                        "vertex row has more than {} fields",
                        element.properties.len()
                    ),
                ));
            }
            sink.push(&row);
        }
    }
    Ok(())
}

fn read_binary_body(
    body: &[u8],
    header: &PlyHeader,
    vertex_pos: usize,
    big_endian: bool,
    sink: &mut VertexSink,
) -> Result<()> {
    let mut cursor = ByteCursor { data: body, offset: 0 };

    let mut row = Vec::new();
    for element in &header.elements[..=vertex_pos] {
        let is_vertex = element.name == "vertex";
        for _ in 0..element.count {
            row.clear();
            for prop in &element.properties {
                match prop.kind {
                    PropKind::Scalar(t) => {
                        let value = t.read(cursor.take(t.byte_size())?, big_endian);
                        row.push(value);
                    }
                    PropKind::List { count, item } => {
                        let n = count.read(cursor.take(count.byte_size())?, big_endian);
                        if !(n >= 0.0 && n.fract() == 0.0) {
                            return Err(IoError::parse(format!("invalid list length {}", n)));
                        }
                        let len = (n as usize).checked_mul(item.byte_size()).ok_or_else(|| {
                            IoError::parse(format!("list length {} overflows", n))
                        })?;
                        cursor.take(len)?;
                        row.push(f64::NAN);
                    }
                }
            }
            if is_vertex {
                sink.push(&row);
            }
        }
    }
    Ok(())
}

struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    fn take(&mut self, size: usize) -> Result<&'a [u8]> {
        let end = self.offset.saturating_add(size);
        if end > self.data.len() {
            return Err(IoError::parse(format!(
                "PLY binary body too short: need at least {} bytes, got {}",
                end,
                self.data.len()
            )));
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }
}

fn push_header(out: &mut String, format: &str, cloud: &PointCloud) {
    out.push_str("ply\n");
    out.push_str(&format!("format {} 1.0\n", format));
    out.push_str(&format!("element vertex {}\n", cloud.len()));
    out.push_str("property float x\n");
    out.push_str("property float y\n");
    out.push_str("property float z\n");

    if cloud.colors.is_some() {
        out.push_str("property uchar red\n");
        out.push_str("property uchar green\n");
        out.push_str("property uchar blue\n");
    }

    out.push_str("end_header\n");
}

/// Write a PLY file in ASCII format.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let mut out = String::new();
    push_header(&mut out, "ascii", cloud);

    for i in 0..cloud.len() {
        out.push_str(&format!("{} {} {}", cloud.x[i], cloud.y[i], cloud.z[i]));

        if let Some(ref colors) = cloud.colors {
            out.push_str(&format!(
                " {} {} {}",
                channel_to_byte(colors.r[i]),
                channel_to_byte(colors.g[i]),
                channel_to_byte(colors.b[i])
            ));
        }

        out.push('\n');
    }

    fs::write(path, out)?;
    Ok(())
}

/// Write a PLY file in binary_little_endian format.
pub fn write_ply_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);

    let mut header = String::new();
    push_header(&mut header, "binary_little_endian", cloud);
    w.write_all(header.as_bytes())?;

    for i in 0..cloud.len() {
        w.write_all(&cloud.x[i].to_le_bytes())?;
        w.write_all(&cloud.y[i].to_le_bytes())?;
        w.write_all(&cloud.z[i].to_le_bytes())?;

        if let Some(ref colors) = cloud.colors {
            w.write_all(&[
                channel_to_byte(colors.r[i]),
                channel_to_byte(colors.g[i]),
                channel_to_byte(colors.b[i]),
            ])?;
        }
    }

    w.flush()?;
    Ok(())
}
