use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use avatar_qr::storage::FileStore;
use avatar_qr::{
    Accessory, Avatar, AvatarColor, AvatarStore, BackgroundStyle,
    ClothingStyle, Config, FacialFeature, Features, GlassesStyle, HairStyle,
    Preferences,
};

#[derive(Parser, Debug)]
#[command(name = "avatar-qr")]
#[command(about = "Build avatars and share them as QR codes", long_about = None)]
struct Cli {
    /// JSON config file, defaults are used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved avatars
    List,
    /// Create and save a new avatar
    New {
        #[arg(long, default_value = avatar_qr::model::DEFAULT_AVATAR_NAME)]
        name: String,
        /// Start from random features instead of the defaults
        #[arg(long)]
        random: bool,
        #[command(flatten)]
        features: FeatureArgs,
    },
    /// Change a saved avatar
    Edit {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        features: FeatureArgs,
    },
    /// Delete a saved avatar
    Delete { id: Uuid },
    /// Print the QR payload of a saved avatar
    Payload { id: Option<Uuid> },
    /// Show a saved avatar as a QR code
    Qr {
        id: Option<Uuid>,
        /// Write an image instead of drawing in the terminal
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Decode payload text
    Decode {
        text: String,
        /// Keep the decoded avatar
        #[arg(long)]
        save: bool,
    },
    /// Read a QR code from an image file
    Scan {
        image: PathBuf,
        /// Keep the decoded avatar
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug)]
struct FeatureArgs {
    #[arg(long)]
    hair: Option<HairStyle>,
    #[arg(long)]
    hair_color: Option<AvatarColor>,
    #[arg(long)]
    skin_tone: Option<AvatarColor>,
    #[arg(long)]
    eye_color: Option<AvatarColor>,
    #[arg(long)]
    face: Option<FacialFeature>,
    #[arg(long)]
    glasses: Option<GlassesStyle>,
    #[arg(long)]
    glasses_color: Option<AvatarColor>,
    #[arg(long)]
    clothing: Option<ClothingStyle>,
    #[arg(long)]
    clothing_color: Option<AvatarColor>,
    #[arg(long)]
    accessory: Option<Accessory>,
    #[arg(long)]
    accessory_color: Option<AvatarColor>,
    #[arg(long)]
    background_style: Option<BackgroundStyle>,
    #[arg(long)]
    background: Option<AvatarColor>,
    #[arg(long)]
    gradient_start: Option<AvatarColor>,
    #[arg(long)]
    gradient_end: Option<AvatarColor>,
}

impl FeatureArgs {
    fn apply(&self, f: &mut Features) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        set(&mut f.hair_style, self.hair);
        set(&mut f.hair_color, self.hair_color);
        set(&mut f.skin_tone, self.skin_tone);
        set(&mut f.eye_color, self.eye_color);
        set(&mut f.facial_feature, self.face);
        set(&mut f.glasses, self.glasses);
        set(&mut f.glasses_color, self.glasses_color);
        set(&mut f.clothing, self.clothing);
        set(&mut f.clothing_color, self.clothing_color);
        set(&mut f.accessory, self.accessory);
        set(&mut f.accessory_color, self.accessory_color);
        set(&mut f.background_style, self.background_style);
        set(&mut f.background_color, self.background);
        set(&mut f.gradient_start_color, self.gradient_start);
        set(&mut f.gradient_end_color, self.gradient_end);
    }
}

struct App {
    config: Config,
    store: AvatarStore<FileStore>,
    prefs_storage: FileStore,
}

impl App {
    fn open(config: Config) -> Self {
        let store = AvatarStore::load_with_key(
            config.file_store(),
            config.storage_key.clone(),
        );
        let prefs_storage = config.file_store();
        Self {
            config,
            store,
            prefs_storage,
        }
    }

    fn remember(&mut self, id: Uuid) -> Result<()> {
        let mut prefs = Preferences::load(&self.prefs_storage);
        prefs.last_used_avatar_id = Some(id);
        prefs.save(&mut self.prefs_storage)?;
        Ok(())
    }

    /// The avatar named by `id`, or the last one used.
    fn pick(&self, id: Option<Uuid>) -> Result<&Avatar> {
        let id = match id {
            Some(id) => id,
            None => Preferences::load(&self.prefs_storage)
                .last_used_avatar_id
                .ok_or_else(|| anyhow!("No avatar given and none used yet"))?,
        };
        self.store
            .get(&id)
            .ok_or_else(|| anyhow!("No saved avatar with id {}", id))
    }

    fn keep(&mut self, avatar: Avatar) -> Result<()> {
        let id = self.store.save(avatar)?;
        self.remember(id)?;
        println!("{}", id);
        Ok(())
    }

    fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::List => {
                let last = Preferences::load(&self.prefs_storage)
                    .last_used_avatar_id;
                for avatar in self.store.avatars() {
                    let marker =
                        if Some(avatar.id) == last { "*" } else { " " };
                    println!(
                        "{} {} {} {}",
                        marker,
                        avatar.id,
                        avatar.date_created.format("%Y-%m-%d %H:%M"),
                        avatar.name
                    );
                }
            }
            Command::New {
                name,
                random,
                features,
            } => {
                let mut base = if random {
                    Features::random()
                } else {
                    Features::default()
                };
                features.apply(&mut base);
                self.keep(Avatar::new(name, base))?;
            }
            Command::Edit { id, name, features } => {
                let mut avatar = self.pick(Some(id))?.clone();
                if let Some(name) = name {
                    avatar.name = name;
                }
                features.apply(&mut avatar.features);
                self.keep(avatar)?;
            }
            Command::Delete { id } => {
                self.store.delete(&id)?;
                let mut prefs = Preferences::load(&self.prefs_storage);
                if prefs.last_used_avatar_id == Some(id) {
                    prefs.last_used_avatar_id = None;
                    prefs.save(&mut self.prefs_storage)?;
                }
            }
            Command::Payload { id } => {
                let avatar = self.pick(id)?;
                println!("{}", self.config.codec().encode(avatar));
            }
            Command::Qr { id, out, size } => {
                let qr = self.config.qr();
                let avatar = self.pick(id)?;
                match out {
                    Some(path) => {
                        let size = size.unwrap_or(self.config.qr_size);
                        qr.save_avatar(avatar, size, &path)
                            .with_context(|| {
                                format!("Writing {}", path.display())
                            })?;
                    }
                    None => {
                        let text = qr.codec().encode(avatar);
                        println!("{}", qr.render_text(&text)?);
                    }
                }
            }
            Command::Decode { text, save } => {
                let avatar = self.config.codec().decode(text.trim())?;
                self.show_imported(avatar, save)?;
            }
            Command::Scan { image, save } => {
                let qr = self.config.qr();
                let text = qr
                    .scan_file(&image)
                    .with_context(|| format!("Reading {}", image.display()))?
                    .ok_or_else(|| {
                        anyhow!("No QR code found in {}", image.display())
                    })?;
                let avatar = qr.codec().decode(&text)?;
                self.show_imported(avatar, save)?;
            }
        }
        Ok(())
    }

    fn show_imported(&mut self, avatar: Avatar, save: bool) -> Result<()> {
        let f = &avatar.features;
        let with_color = |style: &str, color: AvatarColor| {
            format!("{} ({})", style, color.display_name())
        };
        println!("name: {}", avatar.name);
        let hair = with_color(f.hair_style.display_name(), f.hair_color);
        let glasses = with_color(f.glasses.display_name(), f.glasses_color);
        let clothing = with_color(f.clothing.display_name(), f.clothing_color);
        let accessory =
            with_color(f.accessory.display_name(), f.accessory_color);
        println!("hair: {}", hair);
        println!("skin: {}", f.skin_tone.display_name());
        println!("eyes: {}", f.eye_color.display_name());
        println!("face: {}", f.facial_feature.display_name());
        println!("glasses: {}", glasses);
        println!("clothing: {}", clothing);
        println!("accessory: {}", accessory);
        match f.background_style {
            BackgroundStyle::Solid => {
                println!("background: {}", f.background_color.display_name())
            }
            BackgroundStyle::Gradient => println!(
                "background: {} to {}",
                f.gradient_start_color.display_name(),
                f.gradient_end_color.display_name()
            ),
        }
        if save {
            self.keep(avatar)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Loading config {}", path.display()))?,
        None => Config::default(),
    };
    log::debug!("using storage at {}", config.storage_dir.display());

    App::open(config).run(cli.command)
}
