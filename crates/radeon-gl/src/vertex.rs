//! # Vertex and Index Streams
//!
//! Turns the vertex arrays and index buffer of a draw into buffers the
//! fetcher can read, and describes each vertex stream with a fetch
//! resource.
//!
//! ```text
//! named buffer  ─────────────────────────────▶ referenced in place
//! client array  ──▶ DMA region (packed)      ─▶ Stream
//! int / double  ──▶ DMA region (as float)    ─▶ Stream
//! u8 indices    ──▶ DMA region (u16 pairs)   ─▶ IndexStream
//! ```

use alloc::vec::Vec;

use radeon_cmd::regs::sq;
use radeon_cmd::stream::{RELOC_DWORDS, reg_seq_dwords};
use radeon_core::{ChipFamily, Domain, Error, FallbackReason, Result};
use radeon_mem::{Bo, BufferManager, DmaManager};

use crate::atoms::{RegSeq, SeqReloc};
use crate::enums::*;
use crate::translate::texture::{resource_dwords, resource_reg};
use crate::types::GLenum;

/// Alignment of vertex data in DMA regions
const VERTEX_ALIGNMENT: u32 = 32;
/// Alignment of index data in DMA regions
const INDEX_ALIGNMENT: u32 = 4;
/// Largest stride the fetcher accepts
const MAX_STRIDE: u32 = (1 << 11) - 1;

// =============================================================================
// SOURCES
// =============================================================================

/// Where array or index data lives
#[derive(Debug, Clone, Copy)]
pub enum DataSource<'a> {
    /// A named buffer object at a byte offset
    Buffer {
        /// The buffer
        bo: &'a Bo,
        /// Byte offset of the first element
        offset: u32,
    },
    /// Application memory
    Client(&'a [u8]),
}

impl DataSource<'_> {
    /// Run `f` over the source bytes, mapping a buffer object first
    fn with_bytes<R>(&self, mgr: &dyn BufferManager, f: impl FnOnce(&[u8]) -> Result<R>) -> Result<R> {
        match *self {
            DataSource::Client(data) => f(data),
            DataSource::Buffer { bo, offset } => {
                let map = mgr.map(bo);
                let bytes = map.get(offset as usize..).ok_or(Error::OutOfBounds)?;
                f(bytes)
            }
        }
    }
}

/// One enabled vertex attribute array
#[derive(Debug, Clone, Copy)]
pub struct VertexArray<'a> {
    /// Data location
    pub source: DataSource<'a>,
    /// Components per element (1 to 4)
    pub size: u32,
    /// Component type
    pub ty: GLenum,
    /// Bytes between elements; zero repeats one element for every vertex
    pub stride: u32,
    /// Integer components map to [0, 1] or [-1, 1]
    pub normalized: bool,
}

impl<'a> VertexArray<'a> {
    /// Array in application memory
    pub fn client(data: &'a [u8], size: u32, ty: GLenum, stride: u32) -> Self {
        Self {
            source: DataSource::Client(data),
            size,
            ty,
            stride,
            normalized: false,
        }
    }

    /// Array in a named buffer object
    pub fn buffer(bo: &'a Bo, offset: u32, size: u32, ty: GLenum, stride: u32) -> Self {
        Self {
            source: DataSource::Buffer { bo, offset },
            size,
            ty,
            stride,
            normalized: false,
        }
    }

    /// Same array with normalized integer components
    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    fn element_bytes(&self) -> u32 {
        type_size(self.ty).unwrap_or(0) * self.size
    }

    /// Elements read for `count` vertices
    fn elements(&self, count: u32) -> u32 {
        if self.stride == 0 { 1 } else { count }
    }

    /// Source distance between elements
    fn source_stride(&self) -> u32 {
        if self.stride == 0 {
            self.element_bytes()
        } else {
            self.stride
        }
    }
}

/// The index data of an indexed draw
#[derive(Debug, Clone, Copy)]
pub struct IndexBuffer<'a> {
    /// Data location
    pub source: DataSource<'a>,
    /// GL_UNSIGNED_BYTE, GL_UNSIGNED_SHORT or GL_UNSIGNED_INT
    pub ty: GLenum,
    /// Number of indices
    pub count: u32,
}

impl<'a> IndexBuffer<'a> {
    /// Indices in application memory
    pub fn client(data: &'a [u8], ty: GLenum, count: u32) -> Self {
        Self {
            source: DataSource::Client(data),
            ty,
            count,
        }
    }

    /// Indices in a named buffer object
    pub fn buffer(bo: &'a Bo, offset: u32, ty: GLenum, count: u32) -> Self {
        Self {
            source: DataSource::Buffer { bo, offset },
            ty,
            count,
        }
    }

    /// Whether the hardware can fetch these indices
    pub fn is_supported(&self) -> bool {
        matches!(self.ty, GL_UNSIGNED_BYTE | GL_UNSIGNED_SHORT | GL_UNSIGNED_INT)
    }

    /// Largest index value, zero for an empty buffer
    pub fn max_value(&self, mgr: &dyn BufferManager) -> Result<u32> {
        let count = self.count as usize;
        if !self.is_supported() {
            return Err(Error::InvalidParameter);
        }
        let width = type_size(self.ty).ok_or(Error::InvalidParameter)? as usize;
        self.source.with_bytes(mgr, |bytes| {
            let data = bytes.get(..count * width).ok_or(Error::OutOfBounds)?;
            let max = match width {
                1 => data.iter().map(|&index| index as u32).max(),
                2 => data
                    .chunks_exact(2)
                    .map(|index| bytemuck::pod_read_unaligned::<u16>(index) as u32)
                    .max(),
                _ => data
                    .chunks_exact(4)
                    .map(bytemuck::pod_read_unaligned::<u32>)
                    .max(),
            };
            Ok(max.unwrap_or(0))
        })
    }
}

// =============================================================================
// FORMATS
// =============================================================================

/// Bytes per component of `ty`
pub fn type_size(ty: GLenum) -> Option<u32> {
    match ty {
        GL_BYTE | GL_UNSIGNED_BYTE => Some(1),
        GL_SHORT | GL_UNSIGNED_SHORT => Some(2),
        GL_INT | GL_UNSIGNED_INT | GL_FLOAT => Some(4),
        GL_DOUBLE => Some(8),
        _ => None,
    }
}

/// The fetcher has no 32-bit integer or double formats
fn needs_conversion(ty: GLenum) -> bool {
    matches!(ty, GL_DOUBLE | GL_INT | GL_UNSIGNED_INT)
}

/// How the fetcher decodes one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchFormat {
    /// FMT_* data format
    pub data_format: u32,
    /// Number format (normalized or scaled)
    pub num_format: u32,
    /// Components are signed
    pub signed: bool,
}

/// Fetch format for `array`, after any conversion to float
pub fn fetch_format(array: &VertexArray<'_>) -> core::result::Result<FetchFormat, FallbackReason> {
    const BYTES: [u32; 4] = [sq::FMT_8, sq::FMT_8_8, sq::FMT_8_8_8, sq::FMT_8_8_8_8];
    const SHORTS: [u32; 4] = [sq::FMT_16, sq::FMT_16_16, sq::FMT_16_16_16, sq::FMT_16_16_16_16];
    const FLOATS: [u32; 4] = [
        sq::FMT_32_FLOAT,
        sq::FMT_32_32_FLOAT,
        sq::FMT_32_32_32_FLOAT,
        sq::FMT_32_32_32_32_FLOAT,
    ];

    if !(1..=4).contains(&array.size) || array.stride > MAX_STRIDE {
        return Err(FallbackReason::VertexFormat);
    }
    let slot = array.size as usize - 1;
    let (data_format, signed) = match array.ty {
        GL_BYTE => (BYTES[slot], true),
        GL_UNSIGNED_BYTE => (BYTES[slot], false),
        GL_SHORT => (SHORTS[slot], true),
        GL_UNSIGNED_SHORT => (SHORTS[slot], false),
        GL_FLOAT | GL_INT | GL_UNSIGNED_INT | GL_DOUBLE => (FLOATS[slot], false),
        _ => return Err(FallbackReason::VertexFormat),
    };
    let integer = !matches!(array.ty, GL_FLOAT) && !needs_conversion(array.ty);
    let num_format = if array.normalized && integer {
        sq::SQ_NUM_FORMAT_NORM
    } else {
        sq::SQ_NUM_FORMAT_SCALED
    };
    Ok(FetchFormat {
        data_format,
        num_format,
        signed,
    })
}

// =============================================================================
// VERTEX STREAMS
// =============================================================================

/// A vertex stream as the fetcher reads it
#[derive(Debug, Clone)]
pub struct Stream {
    /// Buffer holding the data
    pub bo: Bo,
    /// Byte offset of the first element
    pub offset: u32,
    /// Bytes between elements
    pub stride: u32,
    /// Fetch format
    pub format: FetchFormat,
    /// Data lives in an application buffer object rather than DMA
    pub named: bool,
}

/// Make every array in `arrays` readable for `count` vertices.
///
/// Named buffers are referenced in place; client arrays are copied into
/// DMA regions and integer or double arrays are converted to float.
pub fn setup_streams(
    dma: &mut DmaManager,
    mgr: &dyn BufferManager,
    arrays: &[VertexArray<'_>],
    count: u32,
) -> Result<Vec<Stream>> {
    let mut streams = Vec::with_capacity(arrays.len());
    for array in arrays {
        let format = fetch_format(array).map_err(Error::Fallback)?;
        let stream = if needs_conversion(array.ty) {
            convert_attrib(dma, mgr, array, format, count)?
        } else {
            match array.source {
                DataSource::Buffer { bo, offset } => Stream {
                    bo: bo.clone(),
                    offset,
                    stride: array.stride,
                    format,
                    named: true,
                },
                DataSource::Client(data) => copy_client(dma, mgr, array, data, format, count)?,
            }
        };
        log::trace!(
            "stream {}: bo {} offset {} stride {}{}",
            streams.len(),
            stream.bo.id().id(),
            stream.offset,
            stream.stride,
            if stream.named { " (named)" } else { "" }
        );
        streams.push(stream);
    }
    Ok(streams)
}

/// Copy a client array into DMA, each element padded to whole dwords
fn copy_client(
    dma: &mut DmaManager,
    mgr: &dyn BufferManager,
    array: &VertexArray<'_>,
    data: &[u8],
    format: FetchFormat,
    count: u32,
) -> Result<Stream> {
    let elem = array.element_bytes() as usize;
    let packed = (elem + 3) & !3;
    let elements = array.elements(count) as usize;
    let src_stride = array.source_stride() as usize;

    let region = dma.alloc_region(mgr, (packed * elements) as u32, VERTEX_ALIGNMENT)?;
    {
        let mut out = region.map();
        for i in 0..elements {
            let src = data
                .get(i * src_stride..i * src_stride + elem)
                .ok_or(Error::OutOfBounds)?;
            out[i * packed..i * packed + elem].copy_from_slice(src);
        }
    }

    Ok(Stream {
        bo: region.bo,
        offset: region.offset,
        stride: if array.stride == 0 { 0 } else { packed as u32 },
        format,
        named: false,
    })
}

/// Read one component of a 32-bit integer or double array as float
fn component_to_float(bytes: &[u8], ty: GLenum, normalized: bool) -> f32 {
    const U32_RANGE: f64 = 4_294_967_295.0;
    match ty {
        GL_DOUBLE => bytemuck::pod_read_unaligned::<f64>(bytes) as f32,
        GL_INT => {
            let v = bytemuck::pod_read_unaligned::<i32>(bytes) as f64;
            if normalized {
                ((2.0 * v + 1.0) / U32_RANGE) as f32
            } else {
                v as f32
            }
        }
        _ => {
            let v = bytemuck::pod_read_unaligned::<u32>(bytes) as f64;
            if normalized { (v / U32_RANGE) as f32 } else { v as f32 }
        }
    }
}

/// Convert an array the fetcher cannot read into floats in DMA
fn convert_attrib(
    dma: &mut DmaManager,
    mgr: &dyn BufferManager,
    array: &VertexArray<'_>,
    format: FetchFormat,
    count: u32,
) -> Result<Stream> {
    let tsize = type_size(array.ty).ok_or(Error::InvalidParameter)? as usize;
    let size = array.size as usize;
    let elements = array.elements(count) as usize;
    let src_stride = array.source_stride() as usize;

    let floats = array.source.with_bytes(mgr, |bytes| {
        let mut out = Vec::with_capacity(elements * size);
        for i in 0..elements {
            for j in 0..size {
                let at = i * src_stride + j * tsize;
                let src = bytes.get(at..at + tsize).ok_or(Error::OutOfBounds)?;
                out.push(component_to_float(src, array.ty, array.normalized));
            }
        }
        Ok(out)
    })?;

    let region = dma.alloc_region(mgr, (floats.len() * 4) as u32, VERTEX_ALIGNMENT)?;
    region.write(bytemuck::cast_slice(&floats))?;

    Ok(Stream {
        bo: region.bo,
        offset: region.offset,
        stride: if array.stride == 0 { 0 } else { (size * 4) as u32 },
        format,
        named: false,
    })
}

// =============================================================================
// INDEX STREAM
// =============================================================================

/// Indices as the vertex grouper fetches them
#[derive(Debug, Clone)]
pub struct IndexStream {
    /// Buffer holding the indices
    pub bo: Bo,
    /// Byte offset of the first index
    pub offset: u32,
    /// 32-bit rather than 16-bit indices
    pub is_32bit: bool,
    /// Number of indices
    pub count: u32,
}

/// Make the indices of `ib` fetchable. Returns `None` for an empty buffer.
///
/// 8-bit indices are widened to 16 bits, two per dword, the odd last index
/// alone in its dword. 16- and 32-bit indices in a dword-aligned buffer
/// object are used in place; anything else is copied.
pub fn setup_indices(
    dma: &mut DmaManager,
    mgr: &dyn BufferManager,
    ib: &IndexBuffer<'_>,
) -> Result<Option<IndexStream>> {
    if ib.count == 0 {
        return Ok(None);
    }
    let count = ib.count as usize;

    if ib.ty == GL_UNSIGNED_BYTE {
        let words = ib.source.with_bytes(mgr, |bytes| {
            let input = bytes.get(..count).ok_or(Error::OutOfBounds)?;
            Ok(input
                .chunks(2)
                .map(|pair| match *pair {
                    [lo, hi] => lo as u32 | (hi as u32) << 16,
                    [last] => last as u32,
                    _ => 0,
                })
                .collect::<Vec<u32>>())
        })?;
        let region = dma.alloc_region(mgr, (words.len() * 4) as u32, INDEX_ALIGNMENT)?;
        region.write(bytemuck::cast_slice(&words))?;
        return Ok(Some(IndexStream {
            bo: region.bo,
            offset: region.offset,
            is_32bit: false,
            count: ib.count,
        }));
    }

    let is_32bit = match ib.ty {
        GL_UNSIGNED_SHORT => false,
        GL_UNSIGNED_INT => true,
        _ => return Err(Error::InvalidParameter),
    };

    if let DataSource::Buffer { bo, offset } = ib.source {
        if offset % INDEX_ALIGNMENT == 0 {
            return Ok(Some(IndexStream {
                bo: bo.clone(),
                offset,
                is_32bit,
                count: ib.count,
            }));
        }
    }

    let bytes = count * if is_32bit { 4 } else { 2 };
    let region = dma.alloc_region(mgr, bytes as u32, INDEX_ALIGNMENT)?;
    ib.source.with_bytes(mgr, |src| {
        region.write(src.get(..bytes).ok_or(Error::OutOfBounds)?)
    })?;
    Ok(Some(IndexStream {
        bo: region.bo,
        offset: region.offset,
        is_32bit,
        count: ib.count,
    }))
}

// =============================================================================
// FETCH RESOURCES
// =============================================================================

/// Resource slot of the first vertex stream
const fn fetch_base(chip: ChipFamily) -> u32 {
    match chip {
        ChipFamily::Evergreen => sq::EG_FETCH_RESOURCE_VS_OFFSET,
        _ => sq::FETCH_RESOURCE_VS_OFFSET,
    }
}

/// Resource words describing `stream`
fn vtx_words(chip: ChipFamily, stream: &Stream) -> Vec<u32> {
    let mut words = alloc::vec![0; resource_dwords(chip) as usize];
    let last = words.len() - 1;

    let mut word2 = sq::VTX_STRIDE.set(0, stream.stride);
    word2 = sq::VTX_DATA_FORMAT.set(word2, stream.format.data_format);
    word2 = sq::VTX_NUM_FORMAT_ALL.set(word2, stream.format.num_format);
    if stream.format.signed {
        word2 |= sq::VTX_FORMAT_COMP_ALL;
    }

    words[0] = stream.offset;
    words[1] = stream.bo.size().saturating_sub(stream.offset + 1);
    words[2] = word2;
    if chip == ChipFamily::Evergreen {
        words[3] = sq::EG_VTX_DST_SEL_XYZW;
    }
    words[last] = sq::SQ_TEX_VTX_VALID_BUFFER;
    words
}

/// Vertex fetch resources for `streams`, one relocated sequence each
pub fn vtx_seqs(chip: ChipFamily, streams: &[Stream]) -> Vec<RegSeq> {
    let base = fetch_base(chip);
    streams
        .iter()
        .enumerate()
        .map(|(i, stream)| {
            RegSeq::with_values(resource_reg(chip, base + i as u32), vtx_words(chip, stream))
                .with_reloc(SeqReloc::read(&stream.bo, Domain::GTT))
        })
        .collect()
}

/// Dwords the fetch resources of `streams` streams take
pub const fn vtx_dwords(chip: ChipFamily, streams: u32) -> u32 {
    streams * (reg_seq_dwords(resource_dwords(chip)) + RELOC_DWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use radeon_mem::{DmaConfig, HostBufferManager};

    fn setup() -> (HostBufferManager, DmaManager) {
        (HostBufferManager::new(), DmaManager::new(DmaConfig::default()))
    }

    fn read(bo: &Bo, offset: u32, len: usize) -> Vec<u8> {
        bo.lock()[offset as usize..offset as usize + len].to_vec()
    }

    fn read_u32s(bo: &Bo, offset: u32, n: usize) -> Vec<u32> {
        read(bo, offset, n * 4)
            .chunks(4)
            .map(bytemuck::pod_read_unaligned::<u32>)
            .collect()
    }

    fn read_f32s(bo: &Bo, offset: u32, n: usize) -> Vec<f32> {
        read(bo, offset, n * 4)
            .chunks(4)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect()
    }

    #[test]
    fn test_byte_indices_widened_in_pairs() {
        let (mgr, mut dma) = setup();
        let ib = IndexBuffer::client(&[1, 2, 3], GL_UNSIGNED_BYTE, 3);

        let stream = setup_indices(&mut dma, &mgr, &ib).unwrap().unwrap();
        assert!(!stream.is_32bit);
        assert_eq!(stream.count, 3);
        assert_eq!(stream.offset % 4, 0);
        assert_eq!(read_u32s(&stream.bo, stream.offset, 2), [0x0002_0001, 3]);
    }

    #[test]
    fn test_short_indices_copied() {
        let (mgr, mut dma) = setup();
        let data: Vec<u8> = [7u16, 8, 9, 10].iter().flat_map(|i| i.to_ne_bytes()).collect();
        let ib = IndexBuffer::client(&data, GL_UNSIGNED_SHORT, 4);

        let stream = setup_indices(&mut dma, &mgr, &ib).unwrap().unwrap();
        assert!(!stream.is_32bit);
        assert_eq!(read(&stream.bo, stream.offset, 8), data);
    }

    #[test]
    fn test_buffer_indices_used_in_place() {
        let (mgr, mut dma) = setup();
        let bo = mgr.alloc(64, 4, Domain::GTT).unwrap();
        let ib = IndexBuffer::buffer(&bo, 16, GL_UNSIGNED_INT, 6);

        let stream = setup_indices(&mut dma, &mgr, &ib).unwrap().unwrap();
        assert!(Arc::ptr_eq(&stream.bo, &bo));
        assert_eq!(stream.offset, 16);
        assert!(stream.is_32bit);
        assert!(dma.current_bo().is_none());
    }

    #[test]
    fn test_empty_indices() {
        let (mgr, mut dma) = setup();
        let ib = IndexBuffer::client(&[], GL_UNSIGNED_SHORT, 0);
        assert!(setup_indices(&mut dma, &mgr, &ib).unwrap().is_none());
    }

    #[test]
    fn test_short_client_indices_out_of_bounds() {
        let (mgr, mut dma) = setup();
        let ib = IndexBuffer::client(&[0, 0], GL_UNSIGNED_SHORT, 4);
        assert_eq!(setup_indices(&mut dma, &mgr, &ib).err(), Some(Error::OutOfBounds));
    }

    #[test]
    fn test_index_max_value() {
        let mgr = HostBufferManager::new();
        assert_eq!(IndexBuffer::client(&[7, 9, 8], GL_UNSIGNED_BYTE, 3).max_value(&mgr), Ok(9));

        let shorts: Vec<u8> = [3u16, 700, 2].iter().flat_map(|i| i.to_ne_bytes()).collect();
        let ib = IndexBuffer::client(&shorts, GL_UNSIGNED_SHORT, 3);
        assert_eq!(ib.max_value(&mgr), Ok(700));

        let bo = mgr.alloc(64, 4, Domain::GTT).unwrap();
        bo.write(4, &70_000u32.to_ne_bytes()).unwrap();
        let ib = IndexBuffer::buffer(&bo, 0, GL_UNSIGNED_INT, 4);
        assert_eq!(ib.max_value(&mgr), Ok(70_000));

        assert_eq!(IndexBuffer::client(&[], GL_UNSIGNED_SHORT, 0).max_value(&mgr), Ok(0));
        let short = IndexBuffer::client(&[1, 2], GL_UNSIGNED_SHORT, 2);
        assert_eq!(short.max_value(&mgr), Err(Error::OutOfBounds));
    }

    #[test]
    fn test_named_array_referenced_in_place() {
        let (mgr, mut dma) = setup();
        let bo = mgr.alloc(256, 4, Domain::GTT).unwrap();
        let arrays = [VertexArray::buffer(&bo, 32, 3, GL_FLOAT, 12)];

        let streams = setup_streams(&mut dma, &mgr, &arrays, 4).unwrap();
        assert!(streams[0].named);
        assert!(Arc::ptr_eq(&streams[0].bo, &bo));
        assert_eq!(streams[0].offset, 32);
        assert_eq!(streams[0].stride, 12);
        assert_eq!(streams[0].format.data_format, sq::FMT_32_32_32_FLOAT);
    }

    #[test]
    fn test_client_array_packed_to_dwords() {
        let (mgr, mut dma) = setup();
        let data = [1u8, 2, 3, 0xAA, 4, 5, 6, 0xBB];
        let arrays = [VertexArray::client(&data, 3, GL_UNSIGNED_BYTE, 4).normalized()];

        let streams = setup_streams(&mut dma, &mgr, &arrays, 2).unwrap();
        let stream = &streams[0];
        assert!(!stream.named);
        assert_eq!(stream.stride, 4);
        assert_eq!(stream.offset % VERTEX_ALIGNMENT, 0);
        assert_eq!(stream.format.num_format, sq::SQ_NUM_FORMAT_NORM);
        let bytes = read(&stream.bo, stream.offset, 8);
        assert_eq!(&bytes[..3], &[1, 2, 3]);
        assert_eq!(&bytes[4..7], &[4, 5, 6]);
    }

    #[test]
    fn test_constant_array_uploads_one_element() {
        let (mgr, mut dma) = setup();
        let data: Vec<u8> = [0.25f32, 0.5].iter().flat_map(|f| f.to_ne_bytes()).collect();
        let arrays = [VertexArray::client(&data, 2, GL_FLOAT, 0)];

        let streams = setup_streams(&mut dma, &mgr, &arrays, 100).unwrap();
        assert_eq!(streams[0].stride, 0);
        assert_eq!(read_f32s(&streams[0].bo, streams[0].offset, 2), [0.25, 0.5]);
        assert_eq!(dma.stats().bytes, 8);
    }

    #[test]
    fn test_int_arrays_converted_to_float() {
        let (mgr, mut dma) = setup();
        let ints: Vec<u8> = [-3i32, 7].iter().flat_map(|i| i.to_ne_bytes()).collect();
        let doubles: Vec<u8> = [1.5f64, -2.0].iter().flat_map(|d| d.to_ne_bytes()).collect();
        let uints: Vec<u8> = [u32::MAX, 0].iter().flat_map(|u| u.to_ne_bytes()).collect();
        let arrays = [
            VertexArray::client(&ints, 1, GL_INT, 4),
            VertexArray::client(&doubles, 1, GL_DOUBLE, 8),
            VertexArray::client(&uints, 1, GL_UNSIGNED_INT, 4).normalized(),
        ];

        let streams = setup_streams(&mut dma, &mgr, &arrays, 2).unwrap();
        assert_eq!(read_f32s(&streams[0].bo, streams[0].offset, 2), [-3.0, 7.0]);
        assert_eq!(read_f32s(&streams[1].bo, streams[1].offset, 2), [1.5, -2.0]);
        assert_eq!(read_f32s(&streams[2].bo, streams[2].offset, 2), [1.0, 0.0]);
        assert!(streams.iter().all(|s| s.format.data_format == sq::FMT_32_FLOAT));
        assert!(streams.iter().all(|s| s.stride == 4 && !s.named));
    }

    #[test]
    fn test_named_int_array_converted() {
        let (mgr, mut dma) = setup();
        let bo = mgr.alloc(64, 4, Domain::GTT).unwrap();
        bo.write(8, &5i32.to_ne_bytes()).unwrap();
        let arrays = [VertexArray::buffer(&bo, 8, 1, GL_INT, 0)];

        let streams = setup_streams(&mut dma, &mgr, &arrays, 3).unwrap();
        assert!(!streams[0].named);
        assert!(!Arc::ptr_eq(&streams[0].bo, &bo));
        assert_eq!(read_f32s(&streams[0].bo, streams[0].offset, 1), [5.0]);
    }

    #[test]
    fn test_unfetchable_formats() {
        let data = [0u8; 64];
        let wide = VertexArray::client(&data, 5, GL_FLOAT, 20);
        assert_eq!(fetch_format(&wide), Err(FallbackReason::VertexFormat));
        let unknown = VertexArray::client(&data, 2, 0x1234, 8);
        assert_eq!(fetch_format(&unknown), Err(FallbackReason::VertexFormat));
        let strided = VertexArray::client(&data, 2, GL_FLOAT, 4096);
        assert_eq!(fetch_format(&strided), Err(FallbackReason::VertexFormat));

        let signed = fetch_format(&VertexArray::client(&data, 4, GL_SHORT, 8)).unwrap();
        assert!(signed.signed);
        assert_eq!(signed.data_format, sq::FMT_16_16_16_16);
        assert_eq!(signed.num_format, sq::SQ_NUM_FORMAT_SCALED);
    }

    #[test]
    fn test_fetch_resource_layout() {
        let mgr = HostBufferManager::new();
        let bo = mgr.alloc(1024, 4, Domain::GTT).unwrap();
        let stream = Stream {
            bo: bo.clone(),
            offset: 64,
            stride: 16,
            format: FetchFormat {
                data_format: sq::FMT_32_32_32_32_FLOAT,
                num_format: sq::SQ_NUM_FORMAT_SCALED,
                signed: false,
            },
            named: true,
        };

        let r700 = vtx_seqs(ChipFamily::R700, &[stream.clone(), stream.clone()]);
        assert_eq!(r700.len(), 2);
        assert_eq!(r700[0].start(), 0x38000 + 160 * 28);
        assert_eq!(r700[1].start(), 0x38000 + 161 * 28);
        let words = r700[0].values();
        assert_eq!(words.len(), 7);
        assert_eq!(words[0], 64);
        assert_eq!(words[1], 1024 - 64 - 1);
        assert_eq!(sq::VTX_STRIDE.get(words[2]), 16);
        assert_eq!(sq::VTX_DATA_FORMAT.get(words[2]), sq::FMT_32_32_32_32_FLOAT);
        assert_eq!(words[6], sq::SQ_TEX_VTX_VALID_BUFFER);
        assert!(r700[0].reloc().is_some());
        assert_eq!(
            vtx_dwords(ChipFamily::R700, 2),
            r700.iter().map(RegSeq::dwords).sum::<u32>()
        );

        let eg = vtx_seqs(ChipFamily::Evergreen, &[stream]);
        assert_eq!(eg[0].start(), 0x38000 + 176 * 32);
        assert_eq!(eg[0].values()[3], sq::EG_VTX_DST_SEL_XYZW);
        assert_eq!(eg[0].values()[7], sq::SQ_TEX_VTX_VALID_BUFFER);
    }

    #[test]
    fn test_regions_come_from_one_pool_buffer() {
        let (mgr, mut dma) = setup();
        let a = [1.0f32; 4];
        let arrays = [
            VertexArray::client(bytemuck::cast_slice(&a), 4, GL_FLOAT, 16),
            VertexArray::client(bytemuck::cast_slice(&a), 2, GL_FLOAT, 8),
        ];
        let streams = setup_streams(&mut dma, &mgr, &arrays, 1).unwrap();
        assert!(Arc::ptr_eq(&streams[0].bo, &streams[1].bo));
        assert_eq!(streams[1].offset % VERTEX_ALIGNMENT, 0);
        assert!(streams[1].offset >= 16);
    }
}
