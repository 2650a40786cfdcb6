use anyhow::Context as _;
use datasplit::{Dataset, DatasetConfig, SplitOptions};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Split a tabular dataset into train and test files")]
struct Opt {
    /// TOML file with `data_path`, `target_column` and `delimiter`
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Dataset to load (overrides the configured path)
    #[structopt(long, parse(from_os_str))]
    data: Option<PathBuf>,

    /// Target column (overrides the configured one)
    #[structopt(long)]
    target: Option<String>,

    #[structopt(long, parse(from_os_str), default_value = "data/processed")]
    output: PathBuf,

    #[structopt(long, default_value = "0.3")]
    test_fraction: f64,

    #[structopt(long, default_value = "42")]
    seed: u64,

    /// Keep the target's class proportions in both partitions
    #[structopt(long)]
    stratify: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("datasplit=info")),
        )
        .init();

    let opt = Opt::from_args();
    let mut config = match &opt.config {
        Some(path) => DatasetConfig::from_toml_file(path)
            .with_context(|| format!("cannot load config {:?}", path))?,
        None => DatasetConfig::default(),
    };
    if let Some(target) = opt.target {
        config = config.target_column(target);
    }
    let dataset = Dataset::new(config);

    println!("Loading dataset...");
    let table = dataset.load(opt.data.as_deref())?;
    println!(
        "Dataset loaded: {} rows, {} columns",
        table.rows_len(),
        table.columns_len()
    );
    println!("Columns: {:?}", table.column_names().collect::<Vec<_>>());

    println!("\nSplitting dataset...");
    let options = SplitOptions::new()
        .test_fraction(opt.test_fraction)
        .seed(opt.seed)
        .stratify(opt.stratify);
    let split = dataset.split(&table, &options)?;
    println!("Training set: {} samples", split.train_indices.len());
    println!("Test set: {} samples", split.test_indices.len());

    datasplit::write_split(&opt.output, &split)
        .with_context(|| format!("cannot save split data to {:?}", opt.output))?;
    println!("\nSplit data saved to {}", opt.output.display());

    Ok(())
}
