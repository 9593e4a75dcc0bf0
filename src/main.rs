use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sticker_studio::config::GlobalOptions;
use sticker_studio::imaging::{self, CropRect, FreehandTool, MaskMode};
use sticker_studio::store::{export_file_name, now_millis};
use sticker_studio::{
    Background, Color, EffectSymbol, FontWeight, JsonFileStore, Point, Result, Session,
    StickerCollection, StickerError, StudioConfig, TextStyle,
};

#[derive(Parser, Debug)]
#[command(name = "sticker-studio", about = "Compose, cut out and collect stickers")]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out an image, texts and effects on the canvas and write a PNG
    Compose(ComposeCommand),
    /// Remove the background connected to the top-left pixel
    Cutout {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Also add the silhouette border
        #[arg(long)]
        border: bool,
    },
    /// Add a silhouette border around the opaque pixels
    Border {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Keep or erase the inside of a polygon (image pixel coordinates)
    Mask {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "keep")]
        mode: MaskMode,
        /// Polygon vertex as `x,y`; repeat at least three times
        #[arg(long = "point", value_parser = parse_point, required = true)]
        points: Vec<Point>,
    },
    /// Cut a rectangle `x,y,width,height` out of an image
    Crop {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        rect: CropRect,
    },
    /// Compose a finished sticker and add it to the collection
    Save(ComposeArgs),
    /// List saved stickers
    List,
    /// Delete one saved sticker
    Delete { id: u64 },
    /// Delete every saved sticker
    Clear,
    /// Write one saved sticker to a PNG file
    Export {
        id: u64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write every saved sticker into a directory
    ExportAll { dir: PathBuf },
}

#[derive(Args, Debug)]
struct ComposeCommand {
    #[command(flatten)]
    args: ComposeArgs,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Base photo
    #[arg(long)]
    image: Option<PathBuf>,
    /// Remove the photo's background first
    #[arg(long)]
    cutout: bool,
    /// Add a silhouette border to the photo
    #[arg(long)]
    border: bool,
    /// Text label; repeat for more than one
    #[arg(long = "text")]
    texts: Vec<String>,
    #[arg(long, default_value = "#000000")]
    color: Color,
    #[arg(long)]
    bold: bool,
    #[arg(long = "font-size")]
    font_size: Option<f32>,
    /// Effect name (heart, star, sweat, ...); repeat for more than one
    #[arg(long = "effect")]
    effects: Vec<EffectSymbol>,
    /// `transparent`, `white` or `#rrggbb`
    #[arg(long, default_value = "transparent")]
    background: Background,
}

fn parse_point(value: &str) -> std::result::Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got `{value}`"))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_user_facing() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.global.resolve()?;

    match cli.command {
        Command::Compose(cmd) => {
            let session = compose(&config, &cmd.args)?;
            let output = cmd
                .output
                .unwrap_or_else(|| PathBuf::from(export_file_name(now_millis())));
            fs::write(&output, session.export_png()?)?;
            println!("Wrote '{}'", output.display());
        }
        Command::Cutout {
            input,
            output,
            border,
        } => {
            let mut image = read_image(&input)?;
            let cleared = imaging::remove_background(&mut image, &config.cutout_options())?;
            if border {
                image = imaging::add_border(&image, &config.border_options()?)?;
            }
            write_image(&output, &image)?;
            println!("Cleared {cleared} pixels, wrote '{}'", output.display());
        }
        Command::Border { input, output } => {
            let image = imaging::add_border(&read_image(&input)?, &config.border_options()?)?;
            write_image(&output, &image)?;
            println!("Wrote '{}'", output.display());
        }
        Command::Mask {
            input,
            output,
            mode,
            points,
        } => {
            let image = read_image(&input)?;
            let mut tool = FreehandTool::with_scale(1.0);
            tool.set_points(points);
            write_image(&output, &tool.apply(&image, mode)?)?;
            println!("Wrote '{}'", output.display());
        }
        Command::Crop {
            input,
            output,
            rect,
        } => {
            let image = imaging::crop(&read_image(&input)?, rect)?;
            write_image(&output, &image)?;
            println!(
                "Cropped to {}x{}, wrote '{}'",
                image.width(),
                image.height(),
                output.display()
            );
        }
        Command::Save(args) => {
            let session = compose(&config, &args)?;
            let mut collection = open_collection(&config);
            let id = session.save_sticker(&mut collection)?;
            println!(
                "Saved sticker {id} ({}/{})",
                collection.len(),
                collection.capacity()
            );
        }
        Command::List => {
            let collection = open_collection(&config);
            for record in collection.records() {
                println!("{}\t{} bytes", record.id, record.png.len());
            }
            println!("{}/{} stickers", collection.len(), collection.capacity());
        }
        Command::Delete { id } => {
            let mut collection = open_collection(&config);
            collection.remove(id)?;
            println!("Deleted sticker {id}");
        }
        Command::Clear => {
            let mut collection = open_collection(&config);
            let count = collection.clear()?;
            println!("Deleted {count} stickers");
        }
        Command::Export { id, output } => {
            let collection = open_collection(&config);
            let record = collection.get(id)?;
            let output = output.unwrap_or_else(|| PathBuf::from(export_file_name(now_millis())));
            fs::write(&output, &record.png)?;
            println!("Wrote '{}'", output.display());
        }
        Command::ExportAll { dir } => {
            let collection = open_collection(&config);
            let written = collection.export_all(&dir)?;
            println!("Wrote {} stickers to '{}'", written.len(), dir.display());
        }
    }
    Ok(())
}

fn compose(config: &StudioConfig, args: &ComposeArgs) -> Result<Session> {
    let mut session = Session::from_config(config)?;

    if let Some(path) = &args.image {
        session.upload(&fs::read(path)?)?;
        if args.cutout {
            session.auto_cutout(args.border)?;
        } else if args.border {
            session.add_border()?;
        }
    } else if args.cutout || args.border {
        return Err(StickerError::NoImage);
    }

    let style = session.text_style_mut();
    style.color = args.color;
    style.weight = if args.bold {
        FontWeight::Bold
    } else {
        FontWeight::Normal
    };
    if let Some(size) = args.font_size {
        style.font_size = size;
    }
    let style: TextStyle = *style;

    for text in &args.texts {
        session.scene_mut().add_text(text, style)?;
    }
    for effect in &args.effects {
        session.scene_mut().add_effect(*effect);
    }
    session.scene_mut().background = args.background;
    session.scene_mut().clear_selection();
    Ok(session)
}

fn open_collection(config: &StudioConfig) -> StickerCollection<JsonFileStore> {
    StickerCollection::with_capacity(JsonFileStore::new(&config.store_path), config.capacity)
}

fn read_image(path: &Path) -> Result<image::RgbaImage> {
    imaging::decode(&fs::read(path)?)
}

fn write_image(path: &Path, image: &image::RgbaImage) -> Result<()> {
    fs::write(path, imaging::encode_png(image)?)?;
    Ok(())
}
