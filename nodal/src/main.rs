mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nodal_core::{
    DataSet, DataSetAccessProps, DataSetCreateProps, DataTypeAccessProps, DataValue, File,
    FileMode, H5Type, IndexType, LinkAccessProps, LinkCreateProps, MemoryEngine, NodeTraits,
    ObjectKind, TypeDescriptor,
};
use output::{
    CatOutput, CreatedOutput, EntryInfo, ExistsOutput, InitOutput, LinkOutput, LsOutput,
    MoveOutput, OutputWriter, RemoveOutput, StatOutput,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

/// Nodal - groups, datasets and links inside a container image
#[derive(Parser)]
#[command(name = "nodal")]
#[command(about = "Manage groups, datasets and links inside a container image", long_about = None)]
#[command(version)]
struct Cli {
    /// Container image path (defaults to NODAL_FILE env var or ./nodal.json)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Order {
    Name,
    Creation,
}

impl From<Order> for IndexType {
    fn from(order: Order) -> Self {
        match order {
            Order::Name => IndexType::ByName,
            Order::Creation => IndexType::ByCreationOrder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Dtype {
    I64,
    F64,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new image holding one empty file
    Init {
        /// Name of the file inside the image
        #[arg(long, default_value = "data.h5")]
        name: String,

        /// Overwrite an existing image
        #[arg(long)]
        force: bool,
    },

    /// List the children of a group
    Ls {
        /// Group path
        #[arg(default_value = "/")]
        path: String,

        /// Listing order
        #[arg(long, value_enum, default_value_t = Order::Name)]
        order: Order,

        /// Show link and object types
        #[arg(short, long)]
        long: bool,
    },

    /// Create a group
    Mkgroup {
        /// Group path
        path: String,

        /// Create missing parent groups
        #[arg(short, long)]
        parents: bool,
    },

    /// Create a one-dimensional dataset from values
    Put {
        /// Dataset path
        path: String,

        /// Element values
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,

        /// Element type
        #[arg(long, value_enum, default_value_t = Dtype::F64)]
        dtype: Dtype,

        /// Create missing parent groups
        #[arg(short, long)]
        parents: bool,
    },

    /// Print the contents of a dataset
    Cat {
        /// Dataset path
        path: String,
    },

    /// Create a link (hard by default)
    Ln {
        /// Target object path
        target: String,

        /// Path of the new link
        name: String,

        /// Create a soft link
        #[arg(long, conflicts_with = "external")]
        soft: bool,

        /// Create an external link into FILE
        #[arg(long, value_name = "FILE")]
        external: Option<String>,

        /// Create missing parent groups
        #[arg(short, long)]
        parents: bool,
    },

    /// Move a link
    Mv {
        /// Current path
        src: String,

        /// New path
        dst: String,

        /// Create missing parent groups
        #[arg(short, long)]
        parents: bool,
    },

    /// Remove a link
    Rm {
        /// Link path
        path: String,
    },

    /// Check whether a path exists
    Exists {
        /// Path to check
        path: String,
    },

    /// Show link and object metadata
    Stat {
        /// Path to inspect
        path: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::set_up_logging();
    let output = OutputWriter::new(cli.json);

    // Determine image path: CLI arg > NODAL_FILE env var > ./nodal.json default
    let image = cli
        .file
        .or_else(|| std::env::var("NODAL_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./nodal.json"));

    match run(cli.command, &image, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.write_error(&err, 1);
            ExitCode::from(1)
        }
    }
}

fn run(command: Commands, image: &Path, out: &OutputWriter) -> Result<()> {
    match command {
        Commands::Init { name, force } => cmd_init(image, &name, force, out),
        Commands::Ls { path, order, long } => cmd_ls(image, &path, order, long, out),
        Commands::Mkgroup { path, parents } => cmd_mkgroup(image, &path, parents, out),
        Commands::Put {
            path,
            values,
            dtype,
            parents,
        } => cmd_put(image, &path, &values, dtype, parents, out),
        Commands::Cat { path } => cmd_cat(image, &path, out),
        Commands::Ln {
            target,
            name,
            soft,
            external,
            parents,
        } => cmd_ln(image, &target, &name, soft, external, parents, out),
        Commands::Mv { src, dst, parents } => cmd_mv(image, &src, &dst, parents, out),
        Commands::Rm { path } => cmd_rm(image, &path, out),
        Commands::Exists { path } => cmd_exists(image, &path, out),
        Commands::Stat { path } => cmd_stat(image, &path, out),
    }
}

/// An image loaded into a fresh engine, with its file open.
struct Session {
    engine: Arc<MemoryEngine>,
    file: File,
    image: PathBuf,
}

impl Session {
    fn open(image: &Path, mode: FileMode) -> Result<Self> {
        let engine = Arc::new(MemoryEngine::new());
        let name = engine
            .load_image(image)
            .with_context(|| format!("Failed to load image at {}", image.display()))?;
        let file = File::open(engine.clone(), &name, mode)
            .with_context(|| format!("Failed to open file {}", name))?;
        tracing::debug!(image = %image.display(), file = %name, "opened session");
        Ok(Self {
            engine,
            file,
            image: image.to_path_buf(),
        })
    }

    fn save(&self) -> Result<()> {
        self.engine
            .save_image(self.file.name(), &self.image)
            .with_context(|| format!("Failed to save image at {}", self.image.display()))
    }
}

fn cmd_init(image: &Path, name: &str, force: bool, out: &OutputWriter) -> Result<()> {
    if image.exists() && !force {
        anyhow::bail!(
            "Image already exists at {} (use --force to overwrite)",
            image.display()
        );
    }

    let engine = Arc::new(MemoryEngine::new());
    let file = File::open(engine.clone(), name, FileMode::Create)
        .with_context(|| format!("Failed to create file {}", name))?;
    engine
        .save_image(file.name(), image)
        .with_context(|| format!("Failed to write image at {}", image.display()))?;

    let data = InitOutput {
        success: true,
        result_code: 0,
        image: image.display().to_string(),
        file: name.to_string(),
    };
    out.write(&data, || {
        format!(
            "Initialized nodal image at {}\nFile: {}\n",
            image.display(),
            name
        )
    })
}

fn list_entries<C: NodeTraits>(container: &C, order: Order, long: bool) -> Result<Vec<EntryInfo>> {
    let names = container
        .list_object_names(order.into())
        .with_context(|| "Failed to list objects")?;

    names
        .into_iter()
        .map(|name| {
            if !long {
                return Ok(EntryInfo {
                    name,
                    link_type: None,
                    object_type: None,
                });
            }
            let link_type = container
                .link_type(&name)
                .with_context(|| format!("Failed to get link type of {}", name))?;
            // Soft and external links may dangle.
            let object_type = container
                .object_type(&name)
                .map(|kind| kind.to_string())
                .unwrap_or_else(|_| "dangling".to_string());
            Ok(EntryInfo {
                name,
                link_type: Some(link_type.to_string()),
                object_type: Some(object_type),
            })
        })
        .collect()
}

fn cmd_ls(image: &Path, path: &str, order: Order, long: bool, out: &OutputWriter) -> Result<()> {
    let session = Session::open(image, FileMode::ReadOnly)?;
    let group = session
        .file
        .group(path)
        .with_context(|| format!("Failed to open group {}", path))?;
    let entries = list_entries(&group, order, long)?;

    let data = LsOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        order: match order {
            Order::Name => "name".to_string(),
            Order::Creation => "creation".to_string(),
        },
        entries: entries.clone(),
    };
    out.write(&data, || {
        let mut text = String::new();
        for entry in &entries {
            match (&entry.link_type, &entry.object_type) {
                (Some(link), Some(object)) => {
                    text.push_str(&format!("{:<8} {:<9} {}\n", link, object, entry.name))
                }
                _ => text.push_str(&format!("{}\n", entry.name)),
            }
        }
        text
    })
}

fn cmd_mkgroup(image: &Path, path: &str, parents: bool, out: &OutputWriter) -> Result<()> {
    let session = Session::open(image, FileMode::ReadWrite)?;
    session
        .file
        .create_group(path, parents)
        .with_context(|| format!("Failed to create group {}", path))?;
    session.save()?;

    let data = CreatedOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        object_type: ObjectKind::Group.to_string(),
    };
    out.write(&data, || format!("Created group {}\n", path))
}

fn parse_values<T>(values: &[String]) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    values
        .iter()
        .map(|v| v.parse::<T>().with_context(|| format!("Invalid value: {}", v)))
        .collect()
}

fn cmd_put(
    image: &Path,
    path: &str,
    values: &[String],
    dtype: Dtype,
    parents: bool,
    out: &OutputWriter,
) -> Result<()> {
    let session = Session::open(image, FileMode::ReadWrite)?;
    let dcpl = DataSetCreateProps::default();
    let dapl = DataSetAccessProps::default();
    let created = match dtype {
        Dtype::I64 => {
            let parsed: Vec<i64> = parse_values(values)?;
            session
                .file
                .create_dataset_with(path, &parsed, &dcpl, &dapl, parents)
        }
        Dtype::F64 => {
            let parsed: Vec<f64> = parse_values(values)?;
            session
                .file
                .create_dataset_with(path, &parsed, &dcpl, &dapl, parents)
        }
    };
    created.with_context(|| format!("Failed to create dataset {}", path))?;
    session.save()?;

    let data = CreatedOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        object_type: ObjectKind::Dataset.to_string(),
    };
    out.write(&data, || {
        format!("Created dataset {} ({} values)\n", path, values.len())
    })
}

fn read_values<T>(dataset: &DataSet, rank: usize) -> Result<Vec<serde_json::Value>>
where
    T: H5Type + DataValue<Element = T> + Serialize,
{
    let values: Vec<T> = match rank {
        0 => vec![dataset.read::<T>()?],
        1 => dataset.read::<Vec<T>>()?,
        2 => dataset.read::<Vec<Vec<T>>>()?.into_iter().flatten().collect(),
        _ => anyhow::bail!("Datasets of rank {} are not supported", rank),
    };
    values
        .iter()
        .map(|v| serde_json::to_value(v).map_err(Into::into))
        .collect()
}

fn cmd_cat(image: &Path, path: &str, out: &OutputWriter) -> Result<()> {
    let session = Session::open(image, FileMode::ReadOnly)?;
    let dataset = session
        .file
        .dataset(path, &DataSetAccessProps::default())
        .with_context(|| format!("Failed to open dataset {}", path))?;
    let dims = dataset.dims()?;
    let descriptor = dataset.datatype()?.descriptor()?;
    let rank = dims.len();

    let values = match &descriptor {
        TypeDescriptor::Integer { size: 1, signed: true } => read_values::<i8>(&dataset, rank)?,
        TypeDescriptor::Integer { size: 2, signed: true } => read_values::<i16>(&dataset, rank)?,
        TypeDescriptor::Integer { size: 4, signed: true } => read_values::<i32>(&dataset, rank)?,
        TypeDescriptor::Integer { size: 8, signed: true } => read_values::<i64>(&dataset, rank)?,
        TypeDescriptor::Integer { size: 1, signed: false } => read_values::<u8>(&dataset, rank)?,
        TypeDescriptor::Integer { size: 2, signed: false } => read_values::<u16>(&dataset, rank)?,
        TypeDescriptor::Integer { size: 4, signed: false } => read_values::<u32>(&dataset, rank)?,
        TypeDescriptor::Integer { size: 8, signed: false } => read_values::<u64>(&dataset, rank)?,
        TypeDescriptor::Float { size: 4 } => read_values::<f32>(&dataset, rank)?,
        TypeDescriptor::Float { size: 8 } => read_values::<f64>(&dataset, rank)?,
        TypeDescriptor::Boolean => read_values::<bool>(&dataset, rank)?,
        other => anyhow::bail!("Unsupported element type: {}", other.name()),
    };

    let data = CatOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        dtype: descriptor.name(),
        dims,
        values,
    };
    out.write(&data, || {
        let rendered: Vec<String> = data.values.iter().map(|v| v.to_string()).collect();
        format!("{}\n", rendered.join(" "))
    })
}

fn cmd_ln(
    image: &Path,
    target: &str,
    name: &str,
    soft: bool,
    external: Option<String>,
    parents: bool,
    out: &OutputWriter,
) -> Result<()> {
    let session = Session::open(image, FileMode::ReadWrite)?;
    let file = &session.file;
    let lcpl = LinkCreateProps::default();
    let lapl = LinkAccessProps::default();

    let link_type = if let Some(target_file) = &external {
        file.create_external_link(name, target_file, target, &lcpl, &lapl, parents)
            .with_context(|| format!("Failed to link {} -> {}:{}", name, target_file, target))?;
        "external"
    } else if soft {
        file.create_soft_link(name, target, &lcpl, &lapl, parents)
            .with_context(|| format!("Failed to link {} -> {}", name, target))?;
        "soft"
    } else {
        let kind = file
            .object_type(target)
            .with_context(|| format!("Failed to resolve link target {}", target))?;
        let linked = match kind {
            ObjectKind::Group => {
                file.create_hard_link(name, &file.group(target)?, &lcpl, &lapl, parents)
            }
            ObjectKind::Dataset => file.create_hard_link(
                name,
                &file.dataset(target, &DataSetAccessProps::default())?,
                &lcpl,
                &lapl,
                parents,
            ),
            ObjectKind::UserDataType => file.create_hard_link(
                name,
                &file.datatype(target, &DataTypeAccessProps::default())?,
                &lcpl,
                &lapl,
                parents,
            ),
            other => anyhow::bail!("Cannot hard link to a {}", other),
        };
        linked.with_context(|| format!("Failed to link {} -> {}", name, target))?;
        "hard"
    };
    session.save()?;

    let data = LinkOutput {
        success: true,
        result_code: 0,
        name: name.to_string(),
        target: target.to_string(),
        link_type: link_type.to_string(),
        target_file: external.clone(),
    };
    out.write(&data, || match &external {
        Some(target_file) => format!("{} -> {}:{} ({})\n", name, target_file, target, link_type),
        None => format!("{} -> {} ({})\n", name, target, link_type),
    })
}

fn cmd_mv(image: &Path, src: &str, dst: &str, parents: bool, out: &OutputWriter) -> Result<()> {
    let session = Session::open(image, FileMode::ReadWrite)?;
    if !session.file.rename(src, dst, parents) {
        anyhow::bail!("Failed to move {} to {}", src, dst);
    }
    session.save()?;

    let data = MoveOutput {
        success: true,
        result_code: 0,
        src: src.to_string(),
        dst: dst.to_string(),
    };
    out.write(&data, || format!("Moved {} -> {}\n", src, dst))
}

fn cmd_rm(image: &Path, path: &str, out: &OutputWriter) -> Result<()> {
    let session = Session::open(image, FileMode::ReadWrite)?;
    session
        .file
        .unlink(path)
        .with_context(|| format!("Failed to remove {}", path))?;
    session.save()?;

    let data = RemoveOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
    };
    out.write(&data, || format!("Removed {}\n", path))
}

fn cmd_exists(image: &Path, path: &str, out: &OutputWriter) -> Result<()> {
    let session = Session::open(image, FileMode::ReadOnly)?;
    let exists = session
        .file
        .exist(path)
        .with_context(|| format!("Failed to check {}", path))?;

    let data = ExistsOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        exists,
    };
    out.write(&data, || format!("{}\n", exists))
}

fn cmd_stat(image: &Path, path: &str, out: &OutputWriter) -> Result<()> {
    let session = Session::open(image, FileMode::ReadOnly)?;
    let file = &session.file;

    let link_type = if nodal_core::is_root(path) {
        None
    } else {
        let kind = file
            .link_type(path)
            .with_context(|| format!("Failed to get link type of {}", path))?;
        Some(kind.to_string())
    };
    let object_type = file
        .object_type(path)
        .with_context(|| format!("Failed to resolve {}", path))?;

    let (children, dtype, dims) = match object_type {
        ObjectKind::Group => (Some(file.group(path)?.num_objects()?), None, None),
        ObjectKind::Dataset => {
            let dataset = file.dataset(path, &DataSetAccessProps::default())?;
            let dtype = dataset.datatype()?.descriptor()?.name();
            (None, Some(dtype), Some(dataset.dims()?))
        }
        ObjectKind::UserDataType => {
            let dtype = file.datatype(path, &DataTypeAccessProps::default())?;
            (None, Some(dtype.descriptor()?.name()), None)
        }
        _ => (None, None, None),
    };

    let data = StatOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        link_type,
        object_type: object_type.to_string(),
        children,
        dtype,
        dims,
    };
    out.write(&data, || {
        let mut text = format!("Path: {}\n", data.path);
        if let Some(link) = &data.link_type {
            text.push_str(&format!("Link: {}\n", link));
        }
        text.push_str(&format!("Type: {}\n", data.object_type));
        if let Some(children) = data.children {
            text.push_str(&format!("Children: {}\n", children));
        }
        if let Some(dtype) = &data.dtype {
            text.push_str(&format!("Element type: {}\n", dtype));
        }
        if let Some(dims) = &data.dims {
            text.push_str(&format!("Dims: {:?}\n", dims));
        }
        text
    })
}
