use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::io::{self, Read, Write};

/// One NBT tag. Bedrock block palettes are shipped as a gzip-compressed,
/// big-endian NBT compound holding a list of block-state compounds.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(HashMap<String, Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

// Lengths come straight off the wire; pre-allocation is capped so a huge
// claimed length fails with a read error instead of exhausting memory
const MAX_PREALLOC: usize = 4096;

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let length = reader.read_u16::<BigEndian>()?;
    let mut bytes = vec![0u8; length as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn payload_length(length: i32) -> io::Result<usize> {
    usize::try_from(length).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Invalid length: {}", length),
        )
    })
}

impl Tag {
    pub fn type_id(&self) -> u8 {
        match self {
            Tag::End => 0,
            Tag::Byte(_) => 1,
            Tag::Short(_) => 2,
            Tag::Int(_) => 3,
            Tag::Long(_) => 4,
            Tag::Float(_) => 5,
            Tag::Double(_) => 6,
            Tag::ByteArray(_) => 7,
            Tag::String(_) => 8,
            Tag::List(_) => 9,
            Tag::Compound(_) => 10,
            Tag::IntArray(_) => 11,
            Tag::LongArray(_) => 12,
        }
    }

    /// Reads one named tag (type id, name, payload).
    pub fn read_named<R: Read>(reader: &mut R) -> io::Result<(String, Tag)> {
        let type_id = reader.read_u8()?;
        if type_id == 0 {
            return Ok((String::new(), Tag::End));
        }
        let name = read_string(reader)?;
        let tag = Tag::read_payload(reader, type_id)?;
        Ok((name, tag))
    }

    fn read_payload<R: Read>(reader: &mut R, type_id: u8) -> io::Result<Tag> {
        match type_id {
            0 => Ok(Tag::End),
            1 => Ok(Tag::Byte(reader.read_i8()?)),
            2 => Ok(Tag::Short(reader.read_i16::<BigEndian>()?)),
            3 => Ok(Tag::Int(reader.read_i32::<BigEndian>()?)),
            4 => Ok(Tag::Long(reader.read_i64::<BigEndian>()?)),
            5 => Ok(Tag::Float(reader.read_f32::<BigEndian>()?)),
            6 => Ok(Tag::Double(reader.read_f64::<BigEndian>()?)),
            7 => {
                let length = payload_length(reader.read_i32::<BigEndian>()?)?;
                let mut bytes = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    bytes.push(reader.read_i8()?);
                }
                Ok(Tag::ByteArray(bytes))
            }
            8 => Ok(Tag::String(read_string(reader)?)),
            9 => {
                let element_type = reader.read_u8()?;
                let length = payload_length(reader.read_i32::<BigEndian>()?)?;
                let mut list = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    list.push(Tag::read_payload(reader, element_type)?);
                }
                Ok(Tag::List(list))
            }
            10 => {
                let mut compound = HashMap::new();
                loop {
                    let (name, tag) = Tag::read_named(reader)?;
                    if let Tag::End = tag {
                        break;
                    }
                    compound.insert(name, tag);
                }
                Ok(Tag::Compound(compound))
            }
            11 => {
                let length = payload_length(reader.read_i32::<BigEndian>()?)?;
                let mut ints = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    ints.push(reader.read_i32::<BigEndian>()?);
                }
                Ok(Tag::IntArray(ints))
            }
            12 => {
                let length = payload_length(reader.read_i32::<BigEndian>()?)?;
                let mut longs = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    longs.push(reader.read_i64::<BigEndian>()?);
                }
                Ok(Tag::LongArray(longs))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid tag type: {}", type_id),
            )),
        }
    }

    pub fn write_named<W: Write>(&self, writer: &mut W, name: &str) -> io::Result<()> {
        writer.write_u8(self.type_id())?;
        if !matches!(self, Tag::End) {
            writer.write_u16::<BigEndian>(name.len() as u16)?;
            writer.write_all(name.as_bytes())?;
        }
        self.write_payload(writer)
    }

    fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Tag::End => Ok(()),
            Tag::Byte(v) => writer.write_i8(*v),
            Tag::Short(v) => writer.write_i16::<BigEndian>(*v),
            Tag::Int(v) => writer.write_i32::<BigEndian>(*v),
            Tag::Long(v) => writer.write_i64::<BigEndian>(*v),
            Tag::Float(v) => writer.write_f32::<BigEndian>(*v),
            Tag::Double(v) => writer.write_f64::<BigEndian>(*v),
            Tag::ByteArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for &b in v {
                    writer.write_i8(b)?;
                }
                Ok(())
            }
            Tag::String(v) => {
                writer.write_u16::<BigEndian>(v.len() as u16)?;
                writer.write_all(v.as_bytes())
            }
            Tag::List(v) => {
                // An empty list carries TAG_End as its element type
                let element_type = v.first().map(Tag::type_id).unwrap_or(0);
                writer.write_u8(element_type)?;
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for tag in v {
                    tag.write_payload(writer)?;
                }
                Ok(())
            }
            Tag::Compound(v) => {
                for (name, tag) in v {
                    tag.write_named(writer, name)?;
                }
                Tag::End.write_named(writer, "")
            }
            Tag::IntArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for &i in v {
                    writer.write_i32::<BigEndian>(i)?;
                }
                Ok(())
            }
            Tag::LongArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for &l in v {
                    writer.write_i64::<BigEndian>(l)?;
                }
                Ok(())
            }
        }
    }

    pub fn as_compound(&self) -> Option<&HashMap<String, Tag>> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// A complete named NBT document, optionally gzip-framed.
pub struct NbtFile {
    pub name: String,
    pub root: Tag,
}

impl NbtFile {
    pub fn new(name: String, root: Tag) -> Self {
        NbtFile { name, root }
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let (name, root) = Tag::read_named(reader)?;
        Ok(NbtFile { name, root })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.root.write_named(writer, &self.name)
    }

    pub fn read_gzip<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut decoder = GzDecoder::new(reader);
        Self::read(&mut decoder)
    }

    pub fn write_gzip<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        self.write(&mut encoder)?;
        encoder.finish()?;
        Ok(())
    }
}
