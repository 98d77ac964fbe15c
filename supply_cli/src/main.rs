use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use supply_core::*;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "suptrack")]
#[command(about = "Supplement inventory tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Supplement file to open (.sup)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show supplements and days remaining (default)
    List {
        /// Only show supplements whose name or tags contain this text
        #[arg(long)]
        search: Option<String>,

        /// Only show supplements running low
        #[arg(long)]
        low: bool,
    },

    /// Add a supplement
    Add {
        #[arg(long)]
        name: String,

        /// Units currently on hand
        #[arg(long)]
        count: f64,

        /// Units in a full container (defaults to --count)
        #[arg(long)]
        initial: Option<f64>,

        /// Price of a full container
        #[arg(long, default_value_t = 0.0)]
        cost: f64,

        /// Units taken per day
        #[arg(long)]
        daily_dose: f64,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        link: Option<String>,

        /// Do not reduce the count as days pass
        #[arg(long)]
        no_auto_decrement: bool,
    },

    /// Change fields of a supplement
    Edit {
        /// List position, name, or id
        selector: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        count: Option<f64>,

        #[arg(long)]
        initial: Option<f64>,

        #[arg(long)]
        cost: Option<f64>,

        #[arg(long)]
        daily_dose: Option<f64>,

        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,

        /// New link; an empty value clears it
        #[arg(long)]
        link: Option<String>,

        #[arg(long, action = clap::ArgAction::Set)]
        auto_decrement: Option<bool>,
    },

    /// Remove a supplement
    Remove {
        /// List position, name, or id
        selector: String,
    },

    /// Compare the cost per day of purchase options
    Calc {
        /// A purchase option as DOSES,PRICE,DAILY_DOSE (repeat at least twice)
        #[arg(long = "option", value_name = "DOSES,PRICE,DAILY_DOSE", value_parser = parse_cost_option)]
        options: Vec<CostOption>,
    },

    /// Write the inventory to a CSV file
    Export {
        path: PathBuf,

        /// Only export supplements whose name or tags contain this text
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> ExitCode {
    supply_core::logging::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    let default_path = match cli.data_dir {
        Some(ref dir) => dir.join(config::DEFAULT_STORE_FILE),
        None => config.default_store_path(),
    };

    let explicit_file = cli.file.is_some();
    let path = resolve_store_path(&cli, &config, &default_path);
    let mut files = Files {
        config: &mut config,
        default_path: &default_path,
    };
    tracing::debug!("Using supplement file {:?}", path);

    match cli.command {
        Some(Commands::List { search, low }) => {
            cmd_list(&path, explicit_file, search.as_deref(), low, &mut files)
        }
        Some(Commands::Add {
            name,
            count,
            initial,
            cost,
            daily_dose,
            tags,
            link,
            no_auto_decrement,
        }) => {
            let mut supplement = Supplement::new(name, count, daily_dose);
            supplement.initial_count = initial.unwrap_or(count);
            supplement.cost = cost;
            supplement.tags = tags.as_deref().map(parse_tags).unwrap_or_default();
            supplement.link = link.filter(|l| !l.trim().is_empty());
            supplement.auto_decrement = !no_auto_decrement;
            cmd_add(&path, supplement, &mut files)
        }
        Some(Commands::Edit {
            selector,
            name,
            count,
            initial,
            cost,
            daily_dose,
            tags,
            link,
            auto_decrement,
        }) => {
            let update = SupplementUpdate {
                name,
                current_count: count,
                initial_count: initial,
                cost,
                tags: tags.as_deref().map(parse_tags),
                link: link.map(|l| Some(l).filter(|l| !l.trim().is_empty())),
                daily_dose,
                auto_decrement,
            };
            cmd_edit(&path, &selector, &update, &mut files)
        }
        Some(Commands::Remove { selector }) => cmd_remove(&path, &selector, &mut files),
        Some(Commands::Calc { options }) => cmd_calc(&options),
        Some(Commands::Export { path: csv_path, search }) => {
            cmd_export(&path, &csv_path, search.as_deref())
        }
        None => cmd_list(&path, explicit_file, None, false, &mut files),
    }
}

/// Config plus the store path that is never remembered
struct Files<'a> {
    config: &'a mut Config,
    default_path: &'a Path,
}

/// `--file`, then the remembered file, then the data directory default
fn resolve_store_path(cli: &Cli, config: &Config, default_path: &Path) -> PathBuf {
    if let Some(ref file) = cli.file {
        return file.clone();
    }

    if cli.data_dir.is_none() {
        if let Some(ref last) = config.last_file {
            if last.exists() {
                return last.clone();
            }
            tracing::info!("Remembered file {:?} no longer exists", last);
        }
    }

    default_path.to_path_buf()
}

/// Load the store, or start empty if the file does not exist yet
fn open_store(path: &Path) -> Result<Store> {
    if !path.exists() {
        tracing::info!("No supplement file at {:?}, starting empty", path);
        return Ok(Store::new());
    }

    let mut store = Store::new();
    store.load(path)?;
    Ok(store)
}

fn save_store(store: &mut Store, path: &Path, files: &mut Files) -> Result<()> {
    store.save(path)?;
    remember_file(path, files);
    Ok(())
}

/// Record `path` as the file to open next time. Failures only warn.
fn remember_file(path: &Path, files: &mut Files) {
    if path == files.default_path {
        return;
    }

    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if files.config.last_file.as_deref() == Some(path.as_path()) {
        return;
    }

    files.config.last_file = Some(path);
    if let Err(e) = files.config.save() {
        tracing::warn!("Unable to remember last file: {}", e);
    }
}

/// Resolve a list position (1-based), id, or case-insensitive name
fn resolve_selector(store: &Store, selector: &str) -> Result<Uuid> {
    if let Ok(position) = selector.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| store.list().get(index))
            .map(|s| s.id)
            .ok_or_else(|| {
                Error::Other(format!(
                    "No supplement at position {} (list has {})",
                    position,
                    store.len()
                ))
            });
    }

    if let Ok(id) = Uuid::parse_str(selector) {
        return store.get(id).map(|s| s.id).ok_or(Error::NotFound(id));
    }

    let wanted = selector.to_lowercase();
    let matches: Vec<_> = store
        .list()
        .iter()
        .filter(|s| s.name.to_lowercase() == wanted)
        .collect();

    match matches.as_slice() {
        [] => Err(Error::Other(format!("No supplement named {:?}", selector))),
        [only] => Ok(only.id),
        _ => Err(Error::Other(format!(
            "{} supplements are named {:?}; use the list position instead",
            matches.len(),
            selector
        ))),
    }
}

fn cmd_list(
    path: &Path,
    explicit_file: bool,
    search: Option<&str>,
    low: bool,
    files: &mut Files,
) -> Result<()> {
    let store = open_store(path)?;
    if explicit_file && path.exists() {
        remember_file(path, files);
    }

    if store.is_empty() {
        println!("No supplements yet. Add one with `suptrack add`.");
        return Ok(());
    }

    let threshold = files.config.display.low_stock_days;
    let rows: Vec<(usize, &Supplement)> = store
        .list()
        .iter()
        .enumerate()
        .filter(|(_, s)| search.map_or(true, |q| s.matches(q)))
        .filter(|(_, s)| !low || s.is_low(threshold))
        .collect();

    if rows.is_empty() {
        println!("No supplements match.");
        return Ok(());
    }

    println!(
        "{:>3}  {:<24} {:>8} {:>8} {:>9}  {:<20} {:>5} {:>9}",
        "#", "Name", "Current", "Initial", "Cost", "Tags", "Dose", "Days left"
    );
    for (index, supplement) in rows {
        let marker = if supplement.is_low(threshold) { "  low" } else { "" };
        println!(
            "{:>3}  {:<24} {:>8} {:>8} {:>9}  {:<20} {:>5} {:>9}{}",
            index + 1,
            supplement.name,
            supplement.current_count,
            supplement.initial_count,
            format!("${:.2}", supplement.cost),
            supplement.tags.join(", "),
            supplement.daily_dose,
            format_days(supplement.days_remaining()),
            marker
        );
    }

    println!();
    match store.next_empty() {
        Some((supplement, days)) => println!(
            "Next empty: {} in {} days",
            supplement.name,
            format_days(Some(days))
        ),
        None => println!("No supplements with tracked usage"),
    }

    Ok(())
}

fn cmd_add(path: &Path, supplement: Supplement, files: &mut Files) -> Result<()> {
    let mut store = open_store(path)?;
    let name = supplement.name.clone();
    store.add(supplement)?;
    save_store(&mut store, path, files)?;

    println!("✓ Added {}", name);
    Ok(())
}

fn cmd_edit(
    path: &Path,
    selector: &str,
    update: &SupplementUpdate,
    files: &mut Files,
) -> Result<()> {
    if update.is_empty() {
        return Err(Error::Other("Nothing to change; pass at least one field".into()));
    }

    let mut store = open_store(path)?;
    let id = resolve_selector(&store, selector)?;
    let name = store.update(id, update)?.name.clone();
    save_store(&mut store, path, files)?;

    println!("✓ Updated {}", name);
    Ok(())
}

fn cmd_remove(path: &Path, selector: &str, files: &mut Files) -> Result<()> {
    let mut store = open_store(path)?;
    let id = resolve_selector(&store, selector)?;
    let removed = store.remove(id)?;
    save_store(&mut store, path, files)?;

    println!("✓ Removed {}", removed.name);
    Ok(())
}

fn cmd_calc(options: &[CostOption]) -> Result<()> {
    if options.len() < 2 {
        return Err(Error::Other(
            "Provide at least two --option values to compare".into(),
        ));
    }

    let results = compare(options)?;

    println!(
        "{:>4}  {:>6}  {:>10}  {:>11}  {:>9}",
        "Rank", "Option", "Cost/day", "Days supply", "Price"
    );
    for result in &results {
        println!(
            "{:>4}  {:>6}  {:>10}  {:>11}  {:>9}",
            result.rank,
            result.index + 1,
            format!("${:.2}", result.cost_per_day),
            format!("{:.1}", result.days_supply),
            format!("${:.2}", result.option.price),
        );
    }

    let best: Vec<String> = results
        .iter()
        .filter(|r| r.best)
        .map(|r| (r.index + 1).to_string())
        .collect();
    println!();
    if best.len() == 1 {
        println!("Best value: option {}", best[0]);
    } else {
        println!("Best value (tied): options {}", best.join(", "));
    }

    Ok(())
}

fn cmd_export(path: &Path, csv_path: &Path, search: Option<&str>) -> Result<()> {
    let store = open_store(path)?;
    let count = export::write_csv(store.search(search.unwrap_or("")), csv_path)?;

    println!("✓ Exported {} supplements", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}

fn parse_cost_option(raw: &str) -> std::result::Result<CostOption, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [doses, price, daily] = parts.as_slice() else {
        return Err(format!("expected DOSES,PRICE,DAILY_DOSE, got {:?}", raw));
    };

    let number = |label: &str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| format!("{} must be a number, got {:?}", label, value))
    };

    Ok(CostOption::new(
        number("DOSES", *doses)?,
        number("PRICE", *price)?,
        number("DAILY_DOSE", *daily)?,
    ))
}
