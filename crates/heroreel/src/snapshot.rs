use std::path::Path;

use anyhow::{bail, Context, Result};
use renderer::{
    Compositor, Direction, ShaderUniforms, SoftwareCompositor, TextureLoad, TransitionState,
    Viewport,
};
use tracing::info;

use crate::cli::SnapshotArgs;
use crate::deck::DeckInputs;

/// Renders one frame of the `from` → `to` transition with the software
/// compositor and writes it as an image. `progress` is the eased value the
/// scheduler would hand the shader.
pub fn render_snapshot(inputs: &DeckInputs, args: &SnapshotArgs) -> Result<()> {
    let count = inputs.slides.len();
    for (name, index) in [("from", args.from), ("to", args.to)] {
        if index >= count {
            bail!("--{name} {index} is out of range; the deck has {count} slides");
        }
    }
    if !(0.0..=1.0).contains(&args.progress) {
        bail!("--progress must be within [0, 1] (got {})", args.progress);
    }
    let viewport = Viewport::new(args.size.0, args.size.1).context("snapshot size is empty")?;

    let sources = [
        inputs.slides[args.from].image.clone(),
        inputs.slides[args.to].image.clone(),
    ];
    let images = TextureLoad::spawn(&sources)
        .wait()
        .context("failed to load snapshot slides")?;

    let direction = args
        .direction
        .map(Direction::from)
        .unwrap_or_else(|| Direction::between(args.from, args.to, count));
    let state = TransitionState {
        from: 0,
        to: 1,
        progress: args.progress,
        direction,
        active: args.progress > 0.0 && args.progress < 1.0,
    };
    let aspects: Vec<f32> = images.iter().map(|image| image.aspect()).collect();
    let uniforms = ShaderUniforms::derive(&state, &aspects, viewport);

    let mut compositor = SoftwareCompositor::new();
    compositor.resize(viewport)?;
    compositor.upload_slides(&images)?;
    compositor.draw(&uniforms)?;
    let frame = compositor.into_frame();
    save(&frame, &args.output)?;

    info!(
        output = %args.output.display(),
        from = args.from,
        to = args.to,
        progress = args.progress,
        ?direction,
        "wrote snapshot"
    );
    Ok(())
}

fn save(frame: &image::RgbaImage, path: &Path) -> Result<()> {
    frame
        .save(path)
        .with_context(|| format!("failed to write snapshot to {}", path.display()))
}
