use sprite_atlas::*;
use std::{env, error::Error, fs, path::PathBuf};

struct Args {
    output: PathBuf,
    page_size: i32,
    inputs: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    pack(&args)?;
    Ok(())
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut output = None;
    let mut page_size = DEFAULT_PAGE_SIZE;
    let mut inputs = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" => match args.next() {
                Some(path) => output = Some(PathBuf::from(path)),
                None => return Err("--output requires a path".into()),
            },
            "--page-size" => match args.next() {
                Some(size) => page_size = size.parse()?,
                None => return Err("--page-size requires a number".into()),
            },
            _ => inputs.push(PathBuf::from(arg)),
        }
    }
    let output = output.ok_or("missing --output <dir>")?;
    if inputs.is_empty() {
        return Err("usage: atlas_pack --output <dir> [--page-size N] <image.png>...".into());
    }
    if page_size < BLOCK_SIZE * 2 {
        return Err(format!("page size must be at least {}", BLOCK_SIZE * 2).into());
    }
    Ok(Args { output, page_size, inputs })
}

fn pack(args: &Args) -> Result<(), Box<dyn Error>> {
    let renderer = RendererHandle::new(MemoryRenderer::new());
    let config = AtlasConfig { page_width: args.page_size, page_height: args.page_size, ..AtlasConfig::default() };
    let mut atlas = AtlasPageSet::with_config(renderer.clone(), config);

    for path in &args.inputs {
        let bytes = fs::read(path)?;
        let bitmap = load_image_bytes(ImageSource::Png { bytes: &bytes })?;
        let id = atlas.install(&bitmap)?;
        let size = atlas.get_size(id);
        println!("{} -> sprite {} ({}x{})", path.display(), id.raw(), size.width, size.height);
        for tile in atlas.sprite(id).into_iter().flatten() {
            let r = tile.placement.rect;
            println!(
                "    page {} rect ({}, {}, {}, {}) offset ({}, {})",
                tile.placement.page, r.x, r.y, r.width, r.height, tile.offset_positive.x, tile.offset_positive.y
            );
        }
    }

    fs::create_dir_all(&args.output)?;
    for (index, page) in atlas.pages().iter().enumerate() {
        let bytes = renderer.scope(|r| r.texture_png_bytes(page.texture()))?;
        let path = args.output.join(format!("page_{}.png", index));
        fs::write(&path, bytes)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
