//! Scene builder
//!
//! Turns parsed metadata plus the binary payload into a [`Document`]:
//!
//! 1. Measure every retained value and size the arena exactly
//! 2. Default scene (name and root nodes)
//! 3. Nodes (children, name, mesh reference, TRS)
//! 4. Materials (base color texture through the image codec)
//! 5. Meshes (every known attribute of every primitive)
//!
//! Any failure drops what was built so far: the arena goes with it and
//! decoded pixel buffers are released through the codec.

use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};

use crate::accessor::{AttributeKind, AttributeReader};
use crate::arena::{Arena, Span};
use crate::codec::ImageCodec;
use crate::document::{Document, Material, MaterialSet, Mesh, Node, Primitive, Texture};
use crate::error::{GlbError, StructureError};
use crate::options::DecodeOptions;
use crate::schema::{self, Gltf, TextureInfo};


/// Build a document from container contents.
///
/// # Arguments
/// * `gltf` - Parsed JSON chunk
/// * `binary` - Bytes of buffer 0
/// * `codec` - Decoder for embedded images
/// * `options` - Attribute decoding options
pub fn build_document(
    gltf: &Gltf,
    binary: &[u8],
    codec: Arc<dyn ImageCodec>,
    options: &DecodeOptions,
) -> Result<Document, GlbError> {
    let reader = AttributeReader::new(gltf, binary, options);

    let budget = measure(gltf, &reader)?;
    let mut arena = Arena::with_budget(budget)?;
    tracing::debug!(budget, "sized arena");

    let scene = gltf.scenes.get(gltf.scene).ok_or(GlbError::OutOfBounds {
        what: "scene",
        index: gltf.scene,
        len: gltf.scenes.len(),
    })?;
    let scene_name = arena.alloc_str(&scene.name)?;
    let scene_nodes = node_indices(&mut arena, &scene.nodes, gltf.nodes.len())?;

    let nodes = build_nodes(gltf, &mut arena)?;
    tracing::debug!(nodes = nodes.len(), "built nodes");

    let materials = build_materials(gltf, &reader, codec)?;
    tracing::debug!(materials = gltf.materials.len(), "built materials");

    let meshes = build_meshes(gltf, &reader, &mut arena)?;
    tracing::debug!(
        meshes = meshes.len(),
        arena_used = arena.used_bytes(),
        "built meshes"
    );

    Ok(Document {
        arena,
        scene_name,
        scene_nodes,
        nodes,
        meshes,
        materials,
    })
}

/// Exact arena bytes the build will allocate.
///
/// Mirrors every allocation below; widened attributes are measured at their
/// decoded size.
fn measure(gltf: &Gltf, reader: &AttributeReader<'_>) -> Result<usize, GlbError> {
    let mut bytes = 0usize;
    let mut add = |n: usize| {
        bytes = bytes.checked_add(n).ok_or(GlbError::ArenaExhausted {
            requested: usize::MAX,
            remaining: 0,
        })?;
        Ok::<_, GlbError>(())
    };

    if let Some(scene) = gltf.scenes.get(gltf.scene) {
        add(Arena::text_footprint(scene.name.len()))?;
        add(Arena::footprint::<u32>(scene.nodes.len()))?;
    }

    for node in &gltf.nodes {
        add(Arena::footprint::<u32>(node.children.len()))?;
        if let Some(name) = node.name.as_deref() {
            add(Arena::text_footprint(name.len()))?;
        }
    }

    for primitive in gltf.meshes.iter().flat_map(|m| &m.primitives) {
        if let Some(indices) = primitive.indices {
            add(reader.measure(AttributeKind::Indices, indices)?)?;
        }
        for kind in AttributeKind::VERTEX {
            if let Some(&accessor) = primitive.attributes.get(kind.semantic()) {
                add(reader.measure(kind, accessor)?)?;
            }
        }
    }

    Ok(bytes)
}

/// Copy node indices into the arena, checking each against the node count
fn node_indices(arena: &mut Arena, indices: &[u32], len: usize) -> Result<Span<u32>, GlbError> {
    arena.alloc_with(indices.len(), |i| {
        let index = indices[i];
        if index as usize >= len {
            return Err(GlbError::OutOfBounds {
                what: "node",
                index: index as usize,
                len,
            });
        }
        Ok(index)
    })
}

fn build_nodes(gltf: &Gltf, arena: &mut Arena) -> Result<Vec<Node>, GlbError> {
    let mut nodes = Vec::with_capacity(gltf.nodes.len());

    for node in &gltf.nodes {
        if let Some(mesh) = node.mesh
            && mesh >= gltf.meshes.len()
        {
            return Err(GlbError::OutOfBounds {
                what: "mesh",
                index: mesh,
                len: gltf.meshes.len(),
            });
        }

        let children = node_indices(arena, &node.children, gltf.nodes.len())?;
        let name = node
            .name
            .as_deref()
            .map(|name| arena.alloc_str(name))
            .transpose()?;

        let [x, y, z, w] = node.rotation;
        nodes.push(Node {
            mesh: node.mesh,
            children,
            name,
            scale: Vec3::from_array(node.scale),
            rotation: Vec3::new(x, y, z),
            orientation: Quat::from_xyzw(x, y, z, w),
            translation: Vec3::from_array(node.translation),
        });
    }

    Ok(nodes)
}

fn build_materials(
    gltf: &Gltf,
    reader: &AttributeReader<'_>,
    codec: Arc<dyn ImageCodec>,
) -> Result<MaterialSet, GlbError> {
    let mut materials = MaterialSet::new(codec, gltf.materials.len());

    for (index, material) in gltf.materials.iter().enumerate() {
        let pbr = material.pbr_metallic_roughness.as_ref();
        let base_color_factor = pbr.map_or(Vec4::ONE, |p| Vec4::from_array(p.base_color_factor));

        let albedo = match pbr.and_then(|p| p.base_color_texture) {
            Some(info) => Some(decode_texture(gltf, reader, materials.codec(), info)?),
            None => {
                tracing::debug!(material = index, "material has no base color texture");
                None
            }
        };

        materials.push(Material {
            albedo,
            base_color_factor,
        });
    }

    Ok(materials)
}

/// Resolve texture -> image -> buffer view and run the codec on its bytes
fn decode_texture(
    gltf: &Gltf,
    reader: &AttributeReader<'_>,
    codec: &dyn ImageCodec,
    info: TextureInfo,
) -> Result<Texture, GlbError> {
    let texture = gltf.textures.get(info.index).ok_or(GlbError::OutOfBounds {
        what: "texture",
        index: info.index,
        len: gltf.textures.len(),
    })?;
    let image_index = texture.source;
    let image = gltf.images.get(image_index).ok_or(GlbError::OutOfBounds {
        what: "image",
        index: image_index,
        len: gltf.images.len(),
    })?;
    let sampler = match texture.sampler {
        Some(s) => *gltf.samplers.get(s).ok_or(GlbError::OutOfBounds {
            what: "sampler",
            index: s,
            len: gltf.samplers.len(),
        })?,
        None => schema::Sampler::default(),
    };

    let Some(view_index) = image.buffer_view else {
        return Err(GlbError::UnsupportedImageSource { image: image_index });
    };
    let view = gltf
        .buffer_views
        .get(view_index)
        .ok_or(GlbError::OutOfBounds {
            what: "buffer view",
            index: view_index,
            len: gltf.buffer_views.len(),
        })?;
    if view.byte_stride.is_some() {
        return Err(StructureError::StridedImageView {
            image: image_index,
            view: view_index,
        }
        .into());
    }
    if view.buffer != 0 {
        return Err(GlbError::OutOfBounds {
            what: "buffer",
            index: view.buffer,
            len: 1,
        });
    }

    let bytes = reader.view_bytes(view_index)?;
    let mime_type = image.mime_type.clone();
    let decoded = codec
        .decode(bytes, mime_type.as_deref())
        .map_err(|source| GlbError::Image {
            image: image_index,
            source,
        })?;
    tracing::trace!(
        image = image_index,
        width = decoded.width,
        height = decoded.height,
        "decoded image"
    );

    Ok(Texture {
        width: decoded.width,
        height: decoded.height,
        pixels: decoded.pixels,
        mime_type,
        sampler,
    })
}

fn build_meshes(
    gltf: &Gltf,
    reader: &AttributeReader<'_>,
    arena: &mut Arena,
) -> Result<Vec<Mesh>, GlbError> {
    let mut meshes = Vec::with_capacity(gltf.meshes.len());

    for (mesh_index, mesh) in gltf.meshes.iter().enumerate() {
        if mesh.primitives.is_empty() {
            return Err(StructureError::EmptyMesh { mesh: mesh_index }.into());
        }

        let primitives = mesh
            .primitives
            .iter()
            .map(|p| build_primitive(gltf, reader, arena, mesh_index, p))
            .collect::<Result<Vec<_>, _>>()?;
        meshes.push(Mesh { primitives });
    }

    Ok(meshes)
}

fn build_primitive(
    gltf: &Gltf,
    reader: &AttributeReader<'_>,
    arena: &mut Arena,
    mesh_index: usize,
    source: &schema::Primitive,
) -> Result<Primitive, GlbError> {
    for semantic in source.attributes.keys() {
        if AttributeKind::from_semantic(semantic).is_none() {
            tracing::warn!(mesh = mesh_index, %semantic, "ignoring unsupported attribute");
        }
    }

    if let Some(material) = source.material
        && material >= gltf.materials.len()
    {
        return Err(GlbError::OutOfBounds {
            what: "material",
            index: material,
            len: gltf.materials.len(),
        });
    }

    let accessor = |kind: AttributeKind| source.attributes.get(kind.semantic()).copied();

    // Fixed order keeps arena layout independent of JSON key order
    let mut primitive = Primitive {
        material: source.material,
        ..Primitive::default()
    };
    if let Some(index) = source.indices {
        primitive.indices = Some(reader.indices(arena, index)?);
    }
    if let Some(index) = accessor(AttributeKind::Position) {
        primitive.position = Some(reader.position(arena, index)?);
    }
    if let Some(index) = accessor(AttributeKind::Normal) {
        primitive.normal = Some(reader.normal(arena, index)?);
    }
    if let Some(index) = accessor(AttributeKind::Tangent) {
        primitive.tangent = Some(reader.tangent(arena, index)?);
    }
    if let Some(index) = accessor(AttributeKind::TexCoord0) {
        primitive.texcoord0 = Some(reader.texcoord(arena, index, AttributeKind::TexCoord0)?);
    }
    if let Some(index) = accessor(AttributeKind::TexCoord1) {
        primitive.texcoord1 = Some(reader.texcoord(arena, index, AttributeKind::TexCoord1)?);
    }
    if let Some(index) = accessor(AttributeKind::Color0) {
        primitive.color0 = Some(reader.color(arena, index)?);
    }
    if let Some(index) = accessor(AttributeKind::Joints0) {
        primitive.joints0 = Some(reader.joints(arena, index)?);
    }
    if let Some(index) = accessor(AttributeKind::Weights0) {
        primitive.weights0 = Some(reader.weights(arena, index)?);
    }

    Ok(primitive)
}
