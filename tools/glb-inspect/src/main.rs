//! glb-inspect - decode a GLB file and print what it contains
//!
//! Logs the default scene, node/mesh/material counts and the element count of
//! every attribute of every primitive.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use nether_glb::{
    AttributeKind, DecodeOptions, Document, ImageCodec, ImageCrateCodec, SkipImages, decode_glb,
};

#[derive(Parser)]
#[command(name = "glb-inspect")]
#[command(about = "Decode a GLB file and print a scene summary")]
#[command(version)]
struct Cli {
    /// Input .glb file
    input: PathBuf,

    /// Decode options (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip texture decoding (geometry only)
    #[arg(long)]
    skip_images: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let options = match &cli.config {
        Some(path) => DecodeOptions::load(path)
            .with_context(|| format!("Failed to load decode options from {:?}", path))?,
        None => DecodeOptions::default(),
    };
    let codec: Arc<dyn ImageCodec> = if cli.skip_images {
        Arc::new(SkipImages)
    } else {
        Arc::new(ImageCrateCodec)
    };

    let data =
        std::fs::read(&cli.input).with_context(|| format!("Failed to read {:?}", cli.input))?;

    let start = Instant::now();
    let doc = decode_glb(&data, codec, &options)
        .with_context(|| format!("Failed to decode {:?}", cli.input))?;
    tracing::info!(
        "Decoded {:?} ({} bytes) in {:.2?}",
        cli.input,
        data.len(),
        start.elapsed()
    );

    print_summary(&doc);
    Ok(())
}

fn print_summary(doc: &Document) {
    tracing::info!(
        "Scene {:?}: {} root node(s)",
        doc.scene_name(),
        doc.scene_nodes().len()
    );
    tracing::info!(
        "{} node(s), {} mesh(es), {} material(s)",
        doc.nodes().len(),
        doc.meshes().len(),
        doc.materials().len()
    );
    tracing::info!(
        "Arena: {} of {} bytes used",
        doc.arena_used(),
        doc.arena_capacity()
    );

    for (i, node) in doc.nodes().iter().enumerate() {
        tracing::debug!(
            "  node {}: {:?} mesh={:?} children={:?} t={} s={}",
            i,
            doc.node_name(node).unwrap_or(""),
            node.mesh,
            doc.node_children(node),
            node.translation,
            node.scale
        );
    }

    for (m, mesh) in doc.meshes().iter().enumerate() {
        for (p, primitive) in mesh.primitives.iter().enumerate() {
            let attributes: Vec<String> = std::iter::once(AttributeKind::Indices)
                .chain(AttributeKind::VERTEX)
                .filter_map(|kind| {
                    primitive
                        .attribute_len(kind)
                        .map(|len| format!("{kind}={len}"))
                })
                .collect();
            tracing::info!(
                "  mesh {} primitive {}: {} material={:?}",
                m,
                p,
                attributes.join(" "),
                primitive.material
            );
        }
    }

    for (i, material) in doc.materials().iter().enumerate() {
        match &material.albedo {
            Some(texture) => tracing::info!(
                "  material {}: {}x{} {} albedo, factor {}",
                i,
                texture.width,
                texture.height,
                texture.mime_type.as_deref().unwrap_or("unknown"),
                material.base_color_factor
            ),
            None => tracing::info!(
                "  material {}: no albedo, factor {}",
                i,
                material.base_color_factor
            ),
        }
    }
}
